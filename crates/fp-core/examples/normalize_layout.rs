//! Rewrite exported layout files in canonical form.
//!
//! Each file goes through the planner's loader (so legacy layouts gain their
//! defaults) and is written back pretty-printed. A file is left alone when it
//! is not a JSON object, or when loading it would drop anything it holds: a
//! list entry, or a field that had a value.
//!
//!     RUST_LOG=warn cargo run -p fp-core --example normalize_layout -- a.json b.json

use fp_core::persist::{document_from_value, lost_fields, to_pretty_json};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();

    let paths: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: normalize_layout <layout.json>...");
        std::process::exit(2);
    }

    let mut rewritten = 0;
    let mut skipped = 0;

    for path in &paths {
        match normalize(path) {
            Ok(true) => {
                log::info!("normalized {}", path.display());
                rewritten += 1;
            }
            Ok(false) => skipped += 1,
            Err(reason) => {
                eprintln!("SKIP {}: {}", path.display(), reason);
                skipped += 1;
            }
        }
    }

    println!("{rewritten} rewritten, {skipped} unchanged or skipped");
}

/// Returns whether the file was rewritten.
fn normalize(path: &Path) -> Result<bool, String> {
    let input = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let before: Value = serde_json::from_str(&input).map_err(|e| e.to_string())?;
    if !before.is_object() {
        return Err("not a JSON object".into());
    }

    let doc = document_from_value(before.clone());
    let output = to_pretty_json(&doc).map_err(|e| e.to_string())? + "\n";
    if output == input {
        return Ok(false);
    }

    let lost = lost_fields(&before, &doc).map_err(|e| e.to_string())?;
    if !lost.is_empty() {
        return Err(format!("would lose data in {}", lost.join(", ")));
    }

    fs::write(path, &output).map_err(|e| e.to_string())?;
    Ok(true)
}
