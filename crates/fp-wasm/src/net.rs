//! HTTP transport for saving projects and reading the resource catalog.
//!
//! Real requests go through `gloo-net`. Every function returns a
//! `PlannerError` instead of panicking so a failed request only changes the
//! save status or leaves the catalog empty.

use fp_core::error::PlannerError;
use fp_core::model::ResourceNode;
use fp_core::persist::decode_catalog;
use gloo_net::http::Request;

const JSON: &str = "application/json";

/// CSRF token published by the host page in `<meta name="csrf-token">`.
pub fn csrf_token() -> Option<String> {
    web_sys::window()?
        .document()?
        .query_selector("meta[name=csrf-token]")
        .ok()??
        .get_attribute("content")
        .filter(|t| !t.is_empty())
}

fn transport(e: gloo_net::Error) -> PlannerError {
    PlannerError::Transport(e.to_string())
}

/// `PATCH` the save body to the project endpoint.
///
/// # Errors
/// `Transport` when the request cannot be sent, `SaveRejected` on a non-2xx
/// response.
pub async fn save_project(url: &str, body: String, csrf: Option<String>) -> Result<(), PlannerError> {
    let mut builder = Request::patch(url)
        .header("Content-Type", JSON)
        .header("Accept", JSON);
    if let Some(token) = csrf.as_deref() {
        builder = builder.header("X-CSRF-Token", token);
    }
    let resp = builder.body(body).map_err(transport)?.send().await.map_err(transport)?;
    if !resp.ok() {
        return Err(PlannerError::SaveRejected {
            status: resp.status(),
        });
    }
    Ok(())
}

/// `GET` the full resource-node catalog.
///
/// # Errors
/// `Catalog` on any failure.
pub async fn fetch_catalog(url: &str) -> Result<Vec<ResourceNode>, PlannerError> {
    let body = get_text(url).await?;
    decode_catalog(&body)
}

/// `GET` one resource node.
///
/// # Errors
/// `Catalog` on any failure.
pub async fn fetch_resource(url: &str) -> Result<ResourceNode, PlannerError> {
    let body = get_text(url).await?;
    serde_json::from_str(&body).map_err(|e| PlannerError::Catalog(e.to_string()))
}

async fn get_text(url: &str) -> Result<String, PlannerError> {
    let catalog = |e: gloo_net::Error| PlannerError::Catalog(e.to_string());
    let resp = Request::get(url)
        .header("Accept", JSON)
        .send()
        .await
        .map_err(catalog)?;
    if !resp.ok() {
        return Err(PlannerError::Catalog(format!("{url}: status {}", resp.status())));
    }
    resp.text().await.map_err(catalog)
}
