//! Immutable description of a figure's panel grid.

use field_common::{Dimension, DimensionMap};
use serde::{Deserialize, Serialize};

/// Number of panel rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelShape {
    pub rows: usize,
    pub cols: usize,
}

impl PanelShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells.
    pub fn count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn transpose(self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Whether the grid is a single row or a single column.
    pub fn is_line(&self) -> bool {
        self.rows == 1 || self.cols == 1
    }
}

/// One grid axis bound to a logical dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub dimension: Dimension,
    /// Real items along the axis, excluding synthetic mean/reference slots.
    pub length: usize,
    /// Slots along the axis, including synthetic ones.
    pub slots: usize,
}

/// Which dimensions vary along the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisAssignment {
    /// Two dimensions laid out as a rectangle: one per grid direction.
    Grid { rows: Axis, cols: Axis },
    /// A single varying dimension packed row-major into a near-square grid.
    Collapsed { axis: Axis },
}

impl AxisAssignment {
    /// Assigned dimensions, rows first.
    pub fn dimensions(&self) -> Vec<Dimension> {
        match self {
            AxisAssignment::Grid { rows, cols } => vec![rows.dimension, cols.dimension],
            AxisAssignment::Collapsed { axis } => vec![axis.dimension],
        }
    }

    /// Real item counts along each assigned axis, rows first.
    pub fn lengths(&self) -> Vec<usize> {
        match self {
            AxisAssignment::Grid { rows, cols } => vec![rows.length, cols.length],
            AxisAssignment::Collapsed { axis } => vec![axis.length],
        }
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self, AxisAssignment::Collapsed { .. })
    }
}

/// Where a synthetic panel (ensemble mean or reference) sits in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "at", content = "index", rename_all = "snake_case")]
pub enum SlotPosition {
    /// Every forecast panel.
    All,
    /// Every cell of one row.
    Row(usize),
    /// Every cell of one column.
    Column(usize),
    /// One cell of a collapsed grid, by row-major panel index.
    Panel(usize),
}

impl SlotPosition {
    /// Whether the cell at `(row, col)` of a grid with `cols` columns is in
    /// this slot.
    pub fn matches(&self, row: usize, col: usize, cols: usize) -> bool {
        match *self {
            SlotPosition::All => true,
            SlotPosition::Row(r) => row == r,
            SlotPosition::Column(c) => col == c,
            SlotPosition::Panel(k) => cols * row + col == k,
        }
    }

    /// Exchange the roles of rows and columns.
    pub fn transpose(self) -> Self {
        match self {
            SlotPosition::Row(r) => SlotPosition::Column(r),
            SlotPosition::Column(c) => SlotPosition::Row(c),
            other => other,
        }
    }
}

/// Result of layout resolution, computed once per plot call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub panel_shape: PanelShape,
    pub axis_assignment: AxisAssignment,
    pub ensemble_mean_slot: Option<SlotPosition>,
    pub reference_slot: Option<SlotPosition>,
    /// Resolved cardinality of every dimension. The ensemble entry counts
    /// member slots, so it includes the mean panel when one is requested.
    pub lengths: DimensionMap<usize>,
    /// Panels that carry data. Cells past this row-major index are empty.
    pub occupied: usize,
}

impl LayoutPlan {
    /// Real item counts along each assigned axis, rows first.
    pub fn axis_lengths(&self) -> Vec<usize> {
        self.axis_assignment.lengths()
    }

    pub fn is_collapsed(&self) -> bool {
        self.axis_assignment.is_collapsed()
    }

    /// Number of cells, including empty ones.
    pub fn cell_count(&self) -> usize {
        self.panel_shape.count()
    }

    /// Row-major linear index of a cell.
    pub fn linear_index(&self, row: usize, col: usize) -> usize {
        self.panel_shape.cols * row + col
    }

    /// Whether a cell is past the last data-bearing panel.
    pub fn is_empty_cell(&self, row: usize, col: usize) -> bool {
        self.linear_index(row, col) >= self.occupied
    }

    /// Cell coordinates in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.panel_shape.cols;
        (0..self.cell_count()).map(move |k| (k / cols, k % cols))
    }

    /// Exchange the roles of rows and columns. In a collapsed grid only the
    /// packed shape is transposed; panels keep their row-major indices.
    pub fn transpose(self) -> Self {
        let axis_assignment = match self.axis_assignment {
            AxisAssignment::Grid { rows, cols } => AxisAssignment::Grid {
                rows: cols,
                cols: rows,
            },
            collapsed => collapsed,
        };
        Self {
            panel_shape: self.panel_shape.transpose(),
            axis_assignment,
            ensemble_mean_slot: self.ensemble_mean_slot.map(SlotPosition::transpose),
            reference_slot: self.reference_slot.map(SlotPosition::transpose),
            ..self
        }
    }
}
