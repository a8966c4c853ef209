pub mod controller;
pub mod edit;
pub mod events;
pub mod geometry;
pub mod kind;
pub mod measure;
pub mod options;

pub use controller::*;
pub use edit::EditTarget;
pub use events::*;
pub use kind::*;
pub use measure::{Measurements, SegmentMeasure};
pub use options::*;
