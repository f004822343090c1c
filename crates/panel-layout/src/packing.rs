//! Near-square packing of a single varying dimension.

use crate::plan::PanelShape;

/// Largest panel count the packing table covers.
pub const PANEL_LIMIT: usize = 16;

/// Counts up to this value fit on a single row and are never re-packed.
pub const SINGLE_ROW_LIMIT: usize = 3;

/// Near-square grid for `count` panels, preferring wider over taller.
///
/// Returns `None` for zero or for counts above [`PANEL_LIMIT`].
pub fn packed_shape(count: usize) -> Option<PanelShape> {
    let (rows, cols) = match count {
        1 => (1, 1),
        2 => (1, 2),
        3 => (1, 3),
        4 => (2, 2),
        5 | 6 => (2, 3),
        7 | 8 => (2, 4),
        9 => (3, 3),
        10..=12 => (3, 4),
        13..=16 => (4, 4),
        _ => return None,
    };
    Some(PanelShape::new(rows, cols))
}
