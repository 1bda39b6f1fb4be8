pub mod frame;
pub mod grid;
pub mod hit;
pub mod paint;
pub mod style;

pub use frame::{AreaShape, Frame, FrameInput, Marker, MarkerSource, build_frame};
pub use hit::hit_catalog;
