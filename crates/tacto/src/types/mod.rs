/*! Core types for Tacto.

Regenerate TypeScript bindings for the UI adapter: `cargo test -p tacto export_bindings`
*/

#![allow(missing_docs)]

mod element;
mod error;
mod event;
mod geometry;
mod ids;
mod magnifier;

pub use element::{AccessibleElement, ElementKind, ElementSpec, NO_TEXT_PLACEHOLDER};
pub use error::{TactoError, TactoResult};
pub use event::{Event, Modes, Snapshot, Utterance};
pub use geometry::{BoundingBox, Bounds, Circle, Point};
pub use ids::ElementId;
pub use magnifier::{MagnifierHit, MagnifierState};
