//! Node placement: "resource selected" notifications → placed nodes.
//!
//! Hosts notify the planner either with an explicit position
//! (`{id, position: {x, y}, thumbnail_url}`) or with a catalog record, whose
//! `latitude`/`longitude` give the position. Both become one `PlacedNode`,
//! appended without de-duplication or bounds checks.

use fp_core::error::PlannerError;
use fp_core::id::ResourceId;
use fp_core::model::{PlacedNode, Point, ResourceNode};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResourceSelection {
    Direct {
        id: ResourceId,
        position: Point,
        #[serde(default)]
        thumbnail_url: Option<String>,
    },
    Catalog(ResourceNode),
}

impl ResourceSelection {
    pub fn from_json(json: &str) -> Result<Self, PlannerError> {
        serde_json::from_str(json).map_err(PlannerError::Decode)
    }

    pub fn resource_id(&self) -> ResourceId {
        match self {
            ResourceSelection::Direct { id, .. } => *id,
            ResourceSelection::Catalog(node) => node.id,
        }
    }

    pub fn into_placed(self) -> PlacedNode {
        match self {
            ResourceSelection::Direct {
                id,
                position,
                thumbnail_url,
            } => PlacedNode {
                node_id: id,
                position,
                thumbnail_url,
            },
            ResourceSelection::Catalog(node) => PlacedNode {
                node_id: node.id,
                position: node.position(),
                thumbnail_url: node.thumbnail_url,
            },
        }
    }
}

impl From<ResourceNode> for ResourceSelection {
    fn from(node: ResourceNode) -> Self {
        ResourceSelection::Catalog(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn direct_notification() {
        let sel = ResourceSelection::from_json(
            r#"{"id":5,"position":{"x":120,"y":80},"thumbnail_url":"/t/5.png"}"#,
        )
        .unwrap();
        assert_eq!(
            sel.into_placed(),
            PlacedNode {
                node_id: ResourceId(5),
                position: Point::new(120.0, 80.0),
                thumbnail_url: Some("/t/5.png".into()),
            }
        );
    }

    #[test]
    fn catalog_record_uses_latitude_longitude() {
        let sel = ResourceSelection::from_json(
            r#"{"id":"9","name":"Copper","resource_type":"copper_ore","latitude":300,"longitude":450,"thumbnail_url":null}"#,
        )
        .unwrap();
        assert_eq!(sel.resource_id(), ResourceId(9));
        let placed = sel.into_placed();
        assert_eq!(placed.position, Point::new(300.0, 450.0));
        assert_eq!(placed.thumbnail_url, None);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            ResourceSelection::from_json(r#""iron""#),
            Err(PlannerError::Decode(_))
        ));
    }
}
