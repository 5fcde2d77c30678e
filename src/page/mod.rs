//! In-memory page model.
//!
//! # Data Flow
//! ```text
//! Document (body subtree)
//!     → selector.rs (find deferred images)
//!     → geometry.rs (bounds vs. viewport + root margin)
//!     → MutationRecord broadcast on append/remove
//! ```
//!
//! # Design Decisions
//! - Elements are shared handles; identity, not structure, defines equality
//! - Only changes made through `Document` produce mutation records

pub mod document;
pub mod element;
pub mod geometry;
pub mod selector;

pub use document::{Document, MutationRecord};
pub use element::{Element, ElementId};
pub use geometry::{Rect, RootMargin, Viewport};
pub use selector::Selector;
