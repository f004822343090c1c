//! Panel layout resolution.
//!
//! Resolution runs in three stages, each consuming the previous immutable
//! [`LayoutPlan`] and returning a new one:
//!
//! ```text
//! lengths ──► assign axes, place mean/reference ──► collapse ──► swap
//! ```
//!
//! Only two dimensions may vary per figure. The shorter of the two goes on
//! the rows and the longer on the columns, so figures grow horizontally.
//! A single varying dimension of more than three panels is re-packed into a
//! near-square grid.

use field_common::{Dimension, DimensionMap, PlotError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::packing::{packed_shape, PANEL_LIMIT, SINGLE_ROW_LIMIT};
use crate::plan::{Axis, AxisAssignment, LayoutPlan, PanelShape, SlotPosition};

/// Inputs to layout resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub num_models: usize,
    pub num_lead_times: usize,
    /// Ensemble members to plot; `None` for a deterministic run.
    pub ensemble_size: Option<usize>,
    pub plot_ensemble_mean: bool,
    pub include_reference: bool,
    /// Transpose the final grid, making the figure tall instead of wide.
    pub swap_axes: bool,
}

impl LayoutRequest {
    pub fn new(num_models: usize, num_lead_times: usize) -> Self {
        Self {
            num_models,
            num_lead_times,
            ..Self::default()
        }
    }

    pub fn with_ensemble(mut self, size: usize) -> Self {
        self.ensemble_size = Some(size);
        self
    }

    pub fn with_ensemble_mean(mut self, enabled: bool) -> Self {
        self.plot_ensemble_mean = enabled;
        self
    }

    pub fn with_reference(mut self, enabled: bool) -> Self {
        self.include_reference = enabled;
        self
    }

    pub fn with_swap_axes(mut self, enabled: bool) -> Self {
        self.swap_axes = enabled;
        self
    }

    /// Member slots along the ensemble dimension, including the mean panel.
    ///
    /// A deterministic run counts as one member, unless only the mean is
    /// plotted, in which case the mean panel is the single slot.
    pub fn member_slots(&self) -> usize {
        let members = match self.ensemble_size {
            Some(n) => n,
            None if self.plot_ensemble_mean => 0,
            None => 1,
        };
        members + usize::from(self.plot_ensemble_mean)
    }

    /// Dimension cardinalities after resolving the ensemble size.
    pub fn lengths(&self) -> DimensionMap<usize> {
        DimensionMap::new(self.num_models, self.num_lead_times, self.member_slots())
    }

    /// Resolve the request into a layout plan.
    pub fn resolve(&self) -> Result<LayoutPlan> {
        let lengths = self.validate()?;

        let plan = self.assign_axes(lengths).collapse()?;
        let plan = if self.swap_axes { plan.transpose() } else { plan };

        debug!(
            rows = plan.panel_shape.rows,
            cols = plan.panel_shape.cols,
            axes = ?plan.axis_assignment.dimensions(),
            ensemble_mean = ?plan.ensemble_mean_slot,
            reference = ?plan.reference_slot,
            "Resolved panel layout"
        );

        Ok(plan)
    }

    fn validate(&self) -> Result<DimensionMap<usize>> {
        let lengths = self.lengths();
        let fail = |message: &str| {
            PlotError::invalid_dimension(
                message,
                lengths.model,
                lengths.lead_time,
                lengths.ensemble,
            )
        };

        if self.ensemble_size == Some(0) {
            return Err(fail("ensemble size must be at least 1 when given"));
        }
        if lengths.iter().any(|(_, &len)| len == 0) {
            return Err(fail("cannot lay out a dimension of length zero"));
        }
        if !lengths.iter().any(|(_, &len)| len == 1) {
            return Err(fail("at most two dimensions may vary, one needs length 1"));
        }

        Ok(lengths)
    }

    /// Pick the two longest dimensions as grid axes and append the synthetic
    /// mean and reference slots.
    fn assign_axes(&self, lengths: DimensionMap<usize>) -> LayoutPlan {
        let [_, row_dim, col_dim] = lengths.ascending();
        let axis = |dimension: Dimension| Axis {
            dimension,
            length: self.real_length(dimension, &lengths),
            slots: lengths[dimension],
        };
        let mut rows = axis(row_dim);
        let mut cols = axis(col_dim);

        let ensemble_mean_slot = self.plot_ensemble_mean.then(|| {
            if rows.dimension == Dimension::Ensemble {
                SlotPosition::Row(rows.slots - 1)
            } else if cols.dimension == Dimension::Ensemble {
                SlotPosition::Column(cols.slots - 1)
            } else {
                SlotPosition::All
            }
        });

        // Reference panels never extend the lead time progression.
        let reference_slot = self.include_reference.then(|| {
            if rows.dimension != Dimension::LeadTime {
                rows.slots += 1;
                SlotPosition::Row(rows.slots - 1)
            } else {
                cols.slots += 1;
                SlotPosition::Column(cols.slots - 1)
            }
        });

        let panel_shape = PanelShape::new(rows.slots, cols.slots);
        LayoutPlan {
            panel_shape,
            axis_assignment: AxisAssignment::Grid { rows, cols },
            ensemble_mean_slot,
            reference_slot,
            lengths,
            occupied: panel_shape.count(),
        }
    }

    fn real_length(&self, dimension: Dimension, lengths: &DimensionMap<usize>) -> usize {
        match dimension {
            Dimension::Ensemble => lengths.ensemble - usize::from(self.plot_ensemble_mean),
            other => lengths[other],
        }
    }
}

impl LayoutPlan {
    /// Re-pack a grid with a single varying dimension into a near-square one.
    ///
    /// Grids that already vary in both directions, and single rows of at most
    /// three panels, are returned unchanged.
    pub fn collapse(self) -> Result<Self> {
        let (rows, cols) = match self.axis_assignment {
            AxisAssignment::Grid { rows, cols } => (rows, cols),
            AxisAssignment::Collapsed { .. } => return Ok(self),
        };
        if !self.panel_shape.is_line() {
            return Ok(self);
        }

        let along_rows = rows.slots > 1 && cols.slots == 1;
        let axis = if along_rows { rows } else { cols };
        let count = axis.slots;
        if count <= SINGLE_ROW_LIMIT {
            return Ok(self);
        }

        let panel_shape = packed_shape(count).ok_or(PlotError::PanelLimitExceeded {
            requested: count,
            limit: PANEL_LIMIT,
        })?;

        let remap = |slot: SlotPosition| match (slot, along_rows) {
            (SlotPosition::Row(r), true) => SlotPosition::Panel(r),
            (SlotPosition::Column(c), false) => SlotPosition::Panel(c),
            // the other axis has a single slot, so it covers every panel
            (SlotPosition::Row(_), false) | (SlotPosition::Column(_), true) => SlotPosition::All,
            (other, _) => other,
        };

        debug!(count, rows = panel_shape.rows, cols = panel_shape.cols, dimension = %axis.dimension, "Collapsed single-dimension layout");

        Ok(Self {
            panel_shape,
            axis_assignment: AxisAssignment::Collapsed { axis },
            ensemble_mean_slot: self.ensemble_mean_slot.map(remap),
            reference_slot: self.reference_slot.map(remap),
            lengths: self.lengths,
            occupied: count,
        })
    }
}

/// Resolve a panel layout from dimension cardinalities and flags.
pub fn resolve(
    num_models: usize,
    num_lead_times: usize,
    ensemble_size: Option<usize>,
    plot_ensemble_mean: bool,
    include_reference: bool,
    swap_axes: bool,
) -> Result<LayoutPlan> {
    LayoutRequest {
        num_models,
        num_lead_times,
        ensemble_size,
        plot_ensemble_mean,
        include_reference,
        swap_axes,
    }
    .resolve()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_dims(plan: &LayoutPlan) -> (Dimension, Dimension) {
        match plan.axis_assignment {
            AxisAssignment::Grid { rows, cols } => (rows.dimension, cols.dimension),
            AxisAssignment::Collapsed { .. } => panic!("expected a grid layout, got {:?}", plan),
        }
    }

    #[test]
    fn test_member_slots() {
        assert_eq!(LayoutRequest::new(1, 1).member_slots(), 1);
        assert_eq!(LayoutRequest::new(1, 1).with_ensemble_mean(true).member_slots(), 1);
        assert_eq!(LayoutRequest::new(1, 1).with_ensemble(5).member_slots(), 5);
        assert_eq!(
            LayoutRequest::new(1, 1)
                .with_ensemble(5)
                .with_ensemble_mean(true)
                .member_slots(),
            6
        );
    }

    #[test]
    fn test_three_lead_times_stay_on_one_row() {
        let plan = resolve(1, 3, None, false, false, false).unwrap();
        assert_eq!(plan.panel_shape, PanelShape::new(1, 3));
        assert!(!plan.is_collapsed());
        assert_eq!(grid_dims(&plan), (Dimension::Ensemble, Dimension::LeadTime));
        assert_eq!(plan.occupied, 3);
    }

    #[test]
    fn test_seven_lead_times_collapse() {
        let plan = resolve(1, 7, None, false, false, false).unwrap();
        assert_eq!(plan.panel_shape, PanelShape::new(2, 4));
        assert!(plan.is_collapsed());
        assert_eq!(plan.axis_assignment.dimensions(), vec![Dimension::LeadTime]);
        assert_eq!(plan.axis_lengths(), vec![7]);
        assert!(plan.is_empty_cell(1, 3));
        assert!(!plan.is_empty_cell(1, 2));
    }

    #[test]
    fn test_models_by_lead_times() {
        let plan = resolve(2, 3, None, false, false, false).unwrap();
        assert_eq!(plan.panel_shape, PanelShape::new(2, 3));
        assert_eq!(grid_dims(&plan), (Dimension::Model, Dimension::LeadTime));
        assert_eq!(plan.axis_lengths(), vec![2, 3]);
    }

    #[test]
    fn test_equal_lengths_prefer_later_dimension_on_columns() {
        let plan = resolve(3, 3, None, false, false, false).unwrap();
        assert_eq!(grid_dims(&plan), (Dimension::Model, Dimension::LeadTime));

        let plan = resolve(1, 4, Some(4), false, false, false).unwrap();
        assert_eq!(grid_dims(&plan), (Dimension::LeadTime, Dimension::Ensemble));
    }

    #[test]
    fn test_reference_extends_model_axis() {
        let plan = resolve(2, 4, None, false, true, false).unwrap();
        assert_eq!(plan.panel_shape, PanelShape::new(3, 4));
        assert_eq!(grid_dims(&plan), (Dimension::Model, Dimension::LeadTime));
        assert_eq!(plan.reference_slot, Some(SlotPosition::Row(2)));
        assert_eq!(plan.axis_lengths(), vec![2, 4]);
    }

    #[test]
    fn test_reference_row_below_single_model() {
        let plan = resolve(1, 3, None, false, true, false).unwrap();
        assert_eq!(plan.panel_shape, PanelShape::new(2, 3));
        assert_eq!(plan.reference_slot, Some(SlotPosition::Row(1)));
    }

    #[test]
    fn test_reference_never_extends_lead_times() {
        // lead times on the rows, members on the columns
        let plan = resolve(1, 3, Some(4), false, true, false).unwrap();
        assert_eq!(grid_dims(&plan), (Dimension::LeadTime, Dimension::Ensemble));
        assert_eq!(plan.panel_shape, PanelShape::new(3, 5));
        assert_eq!(plan.reference_slot, Some(SlotPosition::Column(4)));
    }

    #[test]
    fn test_ensemble_mean_after_last_member() {
        let plan = resolve(1, 2, Some(5), true, false, false).unwrap();
        assert_eq!(grid_dims(&plan), (Dimension::LeadTime, Dimension::Ensemble));
        assert_eq!(plan.panel_shape, PanelShape::new(2, 6));
        assert_eq!(plan.ensemble_mean_slot, Some(SlotPosition::Column(5)));
        assert_eq!(plan.axis_lengths(), vec![2, 5]);
    }

    #[test]
    fn test_ensemble_mean_everywhere_when_ensemble_implicit() {
        let plan = resolve(2, 3, None, true, false, false).unwrap();
        assert_eq!(grid_dims(&plan), (Dimension::Model, Dimension::LeadTime));
        assert_eq!(plan.ensemble_mean_slot, Some(SlotPosition::All));
    }

    #[test]
    fn test_collapsed_members_with_mean_and_reference() {
        let plan = resolve(1, 1, Some(5), true, true, false).unwrap();
        // 5 members + mean + reference = 7 panels
        assert_eq!(plan.panel_shape, PanelShape::new(2, 4));
        assert_eq!(plan.occupied, 7);
        assert_eq!(plan.ensemble_mean_slot, Some(SlotPosition::Panel(5)));
        assert_eq!(plan.reference_slot, Some(SlotPosition::Panel(6)));
        assert_eq!(plan.axis_lengths(), vec![5]);
    }

    #[test]
    fn test_collapsed_mean_only_ensemble_is_everywhere() {
        // mean-only member slot sits on the vanished length-1 axis
        let plan = resolve(1, 6, None, true, false, false).unwrap();
        assert!(plan.is_collapsed());
        assert_eq!(plan.panel_shape, PanelShape::new(2, 3));
        assert_eq!(plan.ensemble_mean_slot, Some(SlotPosition::All));
    }

    #[test]
    fn test_single_panel() {
        let plan = resolve(1, 1, None, false, false, false).unwrap();
        assert_eq!(plan.panel_shape, PanelShape::new(1, 1));
        assert_eq!(plan.cell_count(), 1);
    }

    #[test]
    fn test_swap_transposes_grid() {
        let plain = resolve(2, 4, None, false, true, false).unwrap();
        let swapped = resolve(2, 4, None, false, true, true).unwrap();
        assert_eq!(swapped.panel_shape, PanelShape::new(4, 3));
        assert_eq!(swapped.reference_slot, Some(SlotPosition::Column(2)));
        assert_eq!(swapped, plain.transpose());
    }

    #[test]
    fn test_swap_collapsed_keeps_panel_indices() {
        let swapped = resolve(1, 1, Some(5), true, true, true).unwrap();
        assert_eq!(swapped.panel_shape, PanelShape::new(4, 2));
        assert_eq!(swapped.ensemble_mean_slot, Some(SlotPosition::Panel(5)));
        assert_eq!(swapped.reference_slot, Some(SlotPosition::Panel(6)));
    }

    #[test]
    fn test_three_varying_dimensions_rejected() {
        let err = resolve(3, 4, Some(2), false, false, false).unwrap_err();
        assert!(matches!(err, PlotError::InvalidDimension { .. }));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            resolve(0, 4, None, false, false, false),
            Err(PlotError::InvalidDimension { .. })
        ));
        assert!(matches!(
            resolve(1, 4, Some(0), false, false, false),
            Err(PlotError::InvalidDimension { .. })
        ));
        assert!(matches!(
            resolve(1, 4, Some(0), true, false, false),
            Err(PlotError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_panel_limit() {
        assert!(resolve(1, 16, None, false, false, false).is_ok());
        let err = resolve(1, 17, None, false, false, false).unwrap_err();
        assert!(matches!(
            err,
            PlotError::PanelLimitExceeded { requested: 17, limit: 16 }
        ));
        // reference pushes a full sweep over the limit
        assert!(matches!(
            resolve(1, 1, Some(16), false, true, false),
            Err(PlotError::PanelLimitExceeded { requested: 17, .. })
        ));
    }

    #[test]
    fn test_wide_two_dimensional_grid_is_not_limited() {
        let plan = resolve(2, 20, None, false, false, false).unwrap();
        assert_eq!(plan.panel_shape, PanelShape::new(2, 20));
    }
}
