pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod persist;
pub mod snap;
pub mod view;

pub use config::PlannerConfig;
pub use error::PlannerError;
pub use id::ResourceId;
pub use model::*;
pub use persist::{load_document, parse_document};
pub use snap::{snap, snap_point};
pub use view::{ClientRect, ViewTransform, clamped_view_box};
