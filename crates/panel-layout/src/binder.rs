//! Binding of grid cells to data slices.
//!
//! The binder walks a [`LayoutPlan`] row-major and yields one
//! [`PanelRequest`] per cell. It never touches the data itself, only the
//! dataset bounds, so the same plan can be bound any number of times.

use field_common::{Dimension, DimensionMap, ForecastSource, PlotError, ReferenceSource, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::context::{PanelContext, ENSEMBLE_MEAN_LABEL};
use crate::plan::{AxisAssignment, LayoutPlan, SlotPosition};

/// Data slice of an ordinary forecast panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Index into the model list.
    pub model: usize,
    /// Dataset lead time step.
    pub lead_time: usize,
    /// Index along the dataset's member axis.
    pub member: usize,
}

/// What a cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum PanelRole {
    Ordinary(Selection),
    /// Mean over all members of one model at one lead time step.
    EnsembleMean { model: usize, lead_time: usize },
    /// Reference data at one lead time step.
    Reference { lead_time: usize },
    /// Grid over-allocation past the last item; the panel is removed.
    Empty,
}

/// Binding of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRequest {
    pub row: usize,
    pub col: usize,
    pub role: PanelRole,
    pub top_label: Option<String>,
    pub left_label: Option<String>,
}

impl PanelRequest {
    pub fn is_empty(&self) -> bool {
        self.role == PanelRole::Empty
    }

    fn empty(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            role: PanelRole::Empty,
            top_label: None,
            left_label: None,
        }
    }
}

/// Lazy row-major walk over the cells of a layout plan.
///
/// The iterator stops after the first error: a bad selection means the caller
/// configured lead times or members that the data does not have, and no
/// partial figure is produced.
pub struct PanelBinder<'a, M> {
    plan: &'a LayoutPlan,
    models: &'a [M],
    reference: Option<&'a dyn ReferenceSource>,
    context: &'a PanelContext,
    next: usize,
    failed: bool,
}

/// Bind every cell of `plan` to model, ensemble or reference data.
///
/// A reference slot takes precedence over an ensemble mean that covers every
/// panel, so the reference row or column is still drawn from the reference.
pub fn bind<'a, M: ForecastSource>(
    plan: &'a LayoutPlan,
    models: &'a [M],
    reference: Option<&'a dyn ReferenceSource>,
    context: &'a PanelContext,
) -> PanelBinder<'a, M> {
    PanelBinder {
        plan,
        models,
        reference,
        context,
        next: 0,
        failed: false,
    }
}

impl<'a, M: ForecastSource> PanelBinder<'a, M> {
    fn bind_cell(&self, row: usize, col: usize) -> Result<PanelRequest> {
        let plan = self.plan;
        let cols = plan.panel_shape.cols;

        let mut index = DimensionMap::<usize>::default();
        match plan.axis_assignment {
            AxisAssignment::Grid { rows: row_axis, cols: col_axis } => {
                index[row_axis.dimension] = row;
                index[col_axis.dimension] = col;
            }
            AxisAssignment::Collapsed { axis } => {
                if plan.is_empty_cell(row, col) {
                    return Ok(PanelRequest::empty(row, col));
                }
                index[axis.dimension] = plan.linear_index(row, col);
            }
        }

        let in_slot = |slot: Option<SlotPosition>| slot.is_some_and(|s| s.matches(row, col, cols));

        // The reference slot is always a freshly appended index, so it only
        // competes with an ensemble mean that covers every panel.
        let role = if in_slot(plan.reference_slot) {
            let reference = self
                .reference
                .ok_or(PlotError::MissingReference { row, col })?;
            let lead_time = self.context.lead_time_step(index.lead_time)?;
            check_bound(Dimension::LeadTime, lead_time, reference.num_lead_times())?;
            PanelRole::Reference { lead_time }
        } else if in_slot(plan.ensemble_mean_slot) {
            let model = self.model(index.model)?;
            let lead_time = self.context.lead_time_step(index.lead_time)?;
            check_bound(Dimension::LeadTime, lead_time, model.num_lead_times())?;
            PanelRole::EnsembleMean {
                model: index.model,
                lead_time,
            }
        } else {
            let model = self.model(index.model)?;
            let lead_time = self.context.lead_time_step(index.lead_time)?;
            check_bound(Dimension::LeadTime, lead_time, model.num_lead_times())?;
            check_bound(Dimension::Ensemble, index.ensemble, model.num_members())?;
            PanelRole::Ordinary(Selection {
                model: index.model,
                lead_time,
                member: index.ensemble,
            })
        };

        let (top_label, left_label) = self.labels(row, col);

        Ok(PanelRequest {
            row,
            col,
            role,
            top_label,
            left_label,
        })
    }

    fn model(&self, index: usize) -> Result<&'a M> {
        self.models
            .get(index)
            .ok_or_else(|| PlotError::out_of_range(Dimension::Model, index, self.models.len()))
    }

    /// Edge-only titles: column titles on the first row, row titles on the
    /// first column. A collapsed grid titles every panel instead, since
    /// neighbouring panels no longer share a row or column value.
    fn labels(&self, row: usize, col: usize) -> (Option<String>, Option<String>) {
        let plan = self.plan;
        match plan.axis_assignment {
            AxisAssignment::Grid { rows, cols } => {
                let top = (row == 0)
                    .then(|| {
                        self.axis_label(cols.dimension, col, |slot| match slot {
                            SlotPosition::Column(c) => c == col,
                            _ => false,
                        })
                    })
                    .flatten();
                let left = (col == 0)
                    .then(|| {
                        self.axis_label(rows.dimension, row, |slot| match slot {
                            SlotPosition::Row(r) => r == row,
                            _ => false,
                        })
                    })
                    .flatten();
                (top, left)
            }
            AxisAssignment::Collapsed { axis } => {
                let k = plan.linear_index(row, col);
                let top = self.axis_label(axis.dimension, k, |slot| slot == SlotPosition::Panel(k));
                (top, None)
            }
        }
    }

    /// Blank names (the member of a deterministic run, models past the
    /// label list) give no title at all.
    fn axis_label(
        &self,
        dimension: Dimension,
        position: usize,
        on_axis: impl Fn(SlotPosition) -> bool,
    ) -> Option<String> {
        let label = if self.plan.reference_slot.is_some_and(&on_axis) {
            self.context.reference_label.clone()
        } else if self.plan.ensemble_mean_slot.is_some_and(&on_axis) {
            ENSEMBLE_MEAN_LABEL.to_string()
        } else {
            self.context.label(dimension, position)
        };
        (!label.is_empty()).then_some(label)
    }
}

fn check_bound(dimension: Dimension, index: usize, available: usize) -> Result<()> {
    if index < available {
        Ok(())
    } else {
        Err(PlotError::out_of_range(dimension, index, available))
    }
}

impl<'a, M: ForecastSource> Iterator for PanelBinder<'a, M> {
    type Item = Result<PanelRequest>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next >= self.plan.cell_count() {
            return None;
        }
        let cols = self.plan.panel_shape.cols;
        let (row, col) = (self.next / cols, self.next % cols);
        self.next += 1;

        let result = self.bind_cell(row, col);
        match &result {
            Ok(request) => trace!(row, col, role = ?request.role, "Bound panel"),
            Err(_) => self.failed = true,
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.plan.cell_count().saturating_sub(self.next);
        (0, Some(remaining))
    }
}
