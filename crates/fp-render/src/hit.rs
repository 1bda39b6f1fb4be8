//! Hit testing: world point → marker lookup.
//!
//! Reverse-walks the frame's markers (last painted = topmost) so the marker
//! the user sees on top is the one a click lands on.

use crate::frame::{Frame, MarkerSource};
use fp_core::id::ResourceId;
use fp_core::model::Point;

/// Topmost catalog marker under `world`. Placed markers are not clickable
/// targets for selection, so they are skipped even when painted above.
pub fn hit_catalog(frame: &Frame, world: Point) -> Option<ResourceId> {
    frame
        .markers
        .iter()
        .rev()
        .filter(|m| m.source == MarkerSource::Catalog)
        .find(|m| m.rect.contains(world))
        .map(|m| m.resource_id)
}
