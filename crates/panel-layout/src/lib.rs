//! Panel layout for multi-model, multi-member, multi-lead-time figures.
//!
//! A figure varies along at most two of three dimensions: models, lead times
//! and ensemble members. This crate decides where each slice of data goes.
//!
//! # Architecture
//!
//! ```text
//! LayoutRequest (cardinalities + flags)
//!      │
//!      ▼
//! resolve() ──► LayoutPlan (shape, axes, mean/reference slots)
//!      │
//!      ▼
//! bind(plan, models, reference, context)
//!      │
//!      └─► PanelRequest per cell, row-major ──► renderer
//! ```
//!
//! # Example
//!
//! ```
//! use panel_layout::{resolve, PanelShape, SlotPosition};
//!
//! // two models, four lead times, with a reference row
//! let plan = resolve(2, 4, None, false, true, false).unwrap();
//! assert_eq!(plan.panel_shape, PanelShape::new(3, 4));
//! assert_eq!(plan.reference_slot, Some(SlotPosition::Row(2)));
//! ```

pub mod binder;
pub mod context;
pub mod packing;
pub mod plan;
pub mod resolver;

pub use binder::{bind, PanelBinder, PanelRequest, PanelRole, Selection};
pub use context::{PanelContext, DEFAULT_REFERENCE_LABEL, ENSEMBLE_MEAN_LABEL};
pub use packing::{packed_shape, PANEL_LIMIT};
pub use plan::{Axis, AxisAssignment, LayoutPlan, PanelShape, SlotPosition};
pub use resolver::{resolve, LayoutRequest};
