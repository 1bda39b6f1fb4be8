//! Layout document codec: load with default synthesis, save payload, export.
//!
//! Loading never fails from the caller's point of view. Input that is empty,
//! not JSON, or not a JSON object yields the empty document. A JSON object
//! whose individual fields have the wrong shape keeps every well-formed field
//! and defaults only the broken ones. Inside `placed_nodes` only the broken
//! entries are dropped, and a foundation value that cannot be read is carried
//! along untouched so the next save writes it back.

use crate::error::PlannerError;
use crate::id::ResourceId;
use crate::model::{Foundation, LayoutDocument, Material, PlacedNode, ResourceNode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

// ─── Load ────────────────────────────────────────────────────────────────

/// Parse a persisted layout, reporting only outright JSON syntax errors.
///
/// # Errors
/// Returns `PlannerError::Decode` if `raw` is not JSON at all.
pub fn parse_document(raw: &str) -> Result<LayoutDocument, PlannerError> {
    let value: Value = serde_json::from_str(raw).map_err(PlannerError::Decode)?;
    Ok(document_from_value(value))
}

/// Load a persisted layout, recovering silently from anything malformed.
pub fn load_document(raw: &str) -> LayoutDocument {
    if raw.trim().is_empty() {
        return LayoutDocument::default();
    }
    parse_document(raw).unwrap_or_else(|e| {
        log::warn!("{e}; starting from an empty layout");
        LayoutDocument::default()
    })
}

/// Build a document from an already-parsed JSON value.
pub fn document_from_value(value: Value) -> LayoutDocument {
    let mut map = match value {
        Value::Object(map) => map,
        Value::Null => return LayoutDocument::default(),
        other => {
            log::warn!("layout document is a JSON {}, expected an object", kind_of(&other));
            return LayoutDocument::default();
        }
    };

    LayoutDocument {
        placed_nodes: take_placed_nodes(&mut map),
        buildings: take_field(&mut map, "buildings"),
        conveyors: take_field(&mut map, "conveyors"),
        power_lines: take_field(&mut map, "power_lines"),
        balancers: take_field(&mut map, "balancers"),
        factory_area: take_field(&mut map, "factory_area"),
        grid_on: take_field::<Option<bool>>(&mut map, "grid_on").unwrap_or(true),
        foundation: take_foundation(&mut map),
        extra: map,
    }
}

fn take_field<T: DeserializeOwned + Default>(map: &mut Map<String, Value>, key: &str) -> T {
    match map.remove(key) {
        None | Some(Value::Null) => T::default(),
        Some(v) => serde_json::from_value(v).unwrap_or_else(|e| {
            log::warn!("ignoring malformed `{key}` in layout document: {e}");
            T::default()
        }),
    }
}

fn take_placed_nodes(map: &mut Map<String, Value>) -> Vec<PlacedNode> {
    let entries = match map.remove("placed_nodes") {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            log::warn!("ignoring `placed_nodes`: a JSON {}, expected an array", kind_of(&other));
            return Vec::new();
        }
    };
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(node) => Some(node),
            Err(e) => {
                log::warn!("dropping malformed placed node #{i}: {e}");
                None
            }
        })
        .collect()
}

fn take_foundation(map: &mut Map<String, Value>) -> Foundation {
    let mut fields = match map.remove("foundation") {
        None | Some(Value::Null) => return Foundation::default(),
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            log::warn!("ignoring `foundation`: a JSON {}, expected an object", kind_of(&other));
            return Foundation::default();
        }
    };

    let size = match fields.remove("size") {
        None | Some(Value::Null) => None,
        Some(raw) => match foundation_size(&raw) {
            Some(size) => Some(size),
            None => {
                log::warn!("unreadable foundation size {raw}; keeping it as is");
                fields.insert("size".into(), raw);
                None
            }
        },
    };
    let material = match fields.remove("material") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(Material::parse(&s)),
        Some(raw) => {
            log::warn!("unreadable foundation material {raw}; keeping it as is");
            fields.insert("material".into(), raw);
            None
        }
    };

    Foundation {
        size,
        material,
        extra: fields,
    }
}

/// Sizes are whole grid units; `4.0` is as good as `4`.
fn foundation_size(raw: &Value) -> Option<u32> {
    if let Some(n) = raw.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = raw.as_f64()?;
    (f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fields of `raw` whose content did not make it into `doc`: a list that lost
/// entries, or a value that was replaced by something of another kind
/// (including `null`). Checks the top level and the keys of `foundation`.
///
/// # Errors
/// Returns `PlannerError::Encode` if `doc` cannot be serialized.
pub fn lost_fields(raw: &Value, doc: &LayoutDocument) -> Result<Vec<String>, PlannerError> {
    let kept = serde_json::to_value(doc).map_err(PlannerError::Encode)?;
    let (Some(before), Some(after)) = (raw.as_object(), kept.as_object()) else {
        return Ok(Vec::new());
    };

    let mut lost: Vec<String> = shrunk_keys(before, after).collect();
    if let (Some(Value::Object(a)), Some(Value::Object(b))) =
        (before.get("foundation"), after.get("foundation"))
    {
        lost.extend(shrunk_keys(a, b).map(|key| format!("foundation.{key}")));
    }
    Ok(lost)
}

fn shrunk_keys<'a>(
    before: &'a Map<String, Value>,
    after: &'a Map<String, Value>,
) -> impl Iterator<Item = String> + 'a {
    before
        .iter()
        .filter(|(key, old)| {
            let new = after.get(key.as_str()).unwrap_or(&Value::Null);
            match (old, new) {
                (Value::Null, _) => false,
                (Value::Array(a), Value::Array(b)) => b.len() < a.len(),
                (old, new) => kind_of(old) != kind_of(new),
            }
        })
        .map(|(key, _)| key.clone())
}

// ─── Save / export ───────────────────────────────────────────────────────

/// Request body for the project update endpoint: `{"data": <document>}`.
#[derive(Debug, Serialize)]
pub struct SavePayload<'a> {
    pub data: &'a LayoutDocument,
}

/// Compact JSON of the document.
///
/// # Errors
/// Returns `PlannerError::Encode` if serialization fails.
pub fn to_json(doc: &LayoutDocument) -> Result<String, PlannerError> {
    serde_json::to_string(doc).map_err(PlannerError::Encode)
}

/// Human-readable JSON (two-space indent) used for file export.
///
/// # Errors
/// Returns `PlannerError::Encode` if serialization fails.
pub fn to_pretty_json(doc: &LayoutDocument) -> Result<String, PlannerError> {
    serde_json::to_string_pretty(doc).map_err(PlannerError::Encode)
}

/// Serialized body for `PATCH /factory_projects/:id`.
///
/// # Errors
/// Returns `PlannerError::Encode` if serialization fails.
pub fn save_body(doc: &LayoutDocument) -> Result<String, PlannerError> {
    serde_json::to_string(&SavePayload { data: doc }).map_err(PlannerError::Encode)
}

/// Download name for an exported layout.
pub fn export_file_name(project_id: u64) -> String {
    format!("factory_project_{project_id}_layout.json")
}

// ─── Endpoints ───────────────────────────────────────────────────────────

pub fn project_url(api_base: &str, project_id: u64) -> String {
    format!("{}/factory_projects/{project_id}", api_base.trim_end_matches('/'))
}

pub fn catalog_url(api_base: &str) -> String {
    format!("{}/api/v1/resource_nodes", api_base.trim_end_matches('/'))
}

pub fn resource_url(api_base: &str, id: ResourceId) -> String {
    format!("{}/{id}", catalog_url(api_base))
}

/// Decode the catalog index response.
///
/// # Errors
/// Returns `PlannerError::Catalog` if the body is not a list of resource nodes.
pub fn decode_catalog(json: &str) -> Result<Vec<ResourceNode>, PlannerError> {
    serde_json::from_str(json).map_err(|e| PlannerError::Catalog(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Material, Rect};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_and_garbage_inputs_synthesize_default() {
        for raw in ["", "   ", "{", "not json", "42", "[1,2]", "null", "\"str\""] {
            let doc = load_document(raw);
            assert_eq!(doc, LayoutDocument::default(), "input {raw:?}");
            assert!(doc.grid_on);
            assert!(doc.factory_area.is_none());
            assert!(doc.foundation.is_empty());
        }
    }

    #[test]
    fn parse_reports_syntax_errors() {
        assert!(matches!(parse_document("{"), Err(PlannerError::Decode(_))));
    }

    #[test]
    fn partial_object_defaults_missing_fields() {
        let doc = load_document(r#"{"factory_area":{"x":4,"y":8,"width":40,"height":20}}"#);
        assert_eq!(doc.factory_area, Some(Rect::new(4.0, 8.0, 40.0, 20.0)));
        assert!(doc.placed_nodes.is_empty());
        assert!(doc.grid_on);
    }

    #[test]
    fn malformed_field_is_defaulted_alone() {
        let doc = load_document(
            r#"{"placed_nodes":"oops","grid_on":false,"foundation":{"size":4,"material":"metal"}}"#,
        );
        assert!(doc.placed_nodes.is_empty());
        assert!(!doc.grid_on);
        assert_eq!(doc.foundation.size, Some(4));
        assert_eq!(doc.foundation.material, Some(Material::Metal));
    }

    #[test]
    fn integral_float_size_is_accepted() {
        let doc = load_document(r#"{"foundation":{"size":4.0,"material":"metal"}}"#);
        assert_eq!(doc.foundation.size, Some(4));
        assert_eq!(doc.foundation.material, Some(Material::Metal));
    }

    #[test]
    fn unreadable_foundation_values_are_written_back() {
        let doc = load_document(r#"{"foundation":{"size":"large","material":7}}"#);
        assert_eq!(doc.foundation.size, None);
        assert_eq!(doc.foundation.material, None);

        let body: Value = serde_json::from_str(&save_body(&doc).unwrap()).unwrap();
        assert_eq!(body["data"]["foundation"]["size"], Value::from("large"));
        assert_eq!(body["data"]["foundation"]["material"], Value::from(7));
    }

    #[test]
    fn lost_fields_names_what_loading_dropped() {
        let raw: Value = serde_json::from_str(
            r#"{"placed_nodes":[{"node_id":1,"position":{"x":1,"y":2}},{"node_id":2}],
                "factory_area":"wide","grid_on":false,"notes":"kept",
                "foundation":{"size":4.0,"material":"metal"}}"#,
        )
        .unwrap();
        let doc = document_from_value(raw.clone());
        let mut lost = lost_fields(&raw, &doc).unwrap();
        lost.sort();
        assert_eq!(lost, vec!["factory_area".to_string(), "placed_nodes".to_string()]);
    }

    #[test]
    fn clean_document_loses_nothing() {
        let raw: Value = serde_json::from_str(include_str!("../tests/fixtures/saved_project.json")).unwrap();
        let doc = document_from_value(raw.clone());
        assert!(lost_fields(&raw, &doc).unwrap().is_empty());
    }

    #[test]
    fn null_fields_mean_default() {
        let doc = load_document(r#"{"buildings":null,"grid_on":null,"factory_area":null}"#);
        assert!(doc.buildings.is_empty());
        assert!(doc.grid_on);
        assert!(doc.factory_area.is_none());
    }

    #[test]
    fn unknown_keys_survive_save() {
        let doc = load_document(r#"{"version":3,"placed_nodes":[]}"#);
        let body: Value = serde_json::from_str(&save_body(&doc).unwrap()).unwrap();
        assert_eq!(body["data"]["version"], Value::from(3));
        assert_eq!(body["data"]["grid_on"], Value::Bool(true));
    }

    #[test]
    fn export_is_two_space_indented() {
        let pretty = to_pretty_json(&LayoutDocument::default()).unwrap();
        assert!(pretty.starts_with("{\n  \"placed_nodes\": []"));
        assert_eq!(export_file_name(17), "factory_project_17_layout.json");
    }

    #[test]
    fn endpoint_urls() {
        assert_eq!(project_url("", 5), "/factory_projects/5");
        assert_eq!(project_url("https://x.test/", 5), "https://x.test/factory_projects/5");
        assert_eq!(catalog_url(""), "/api/v1/resource_nodes");
        assert_eq!(resource_url("", ResourceId(9)), "/api/v1/resource_nodes/9");
    }
}
