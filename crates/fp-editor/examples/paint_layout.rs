//! Paint a saved layout into a Vello scene without a browser.
//!
//! Opens the layout the way the canvas does, optionally zooms in on a world
//! point, and encodes the resulting frame. Handy for checking a layout file
//! draws what it should before it reaches a user.
//!
//!     RUST_LOG=info cargo run -p fp-editor --example paint_layout -- layout.json [x y]

use fp_core::config::PlannerConfig;
use fp_editor::PlannerSession;
use fp_render::paint::{paint_frame, view_affine};
use std::env;
use std::fs;
use vello::Scene;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(path) = args.first() else {
        eprintln!("usage: paint_layout <layout.json> [zoom_x zoom_y]");
        std::process::exit(2);
    };
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("FAIL {path}: {e}");
            std::process::exit(1);
        }
    };

    let mut session = PlannerSession::new(0, &raw, PlannerConfig::default());
    if let [_, x, y] = args.as_slice() {
        match (x.parse::<f64>(), y.parse::<f64>()) {
            (Ok(x), Ok(y)) => {
                // The default client rect is the map itself, so client = world.
                let outcome = session.click(x, y);
                log::info!("zoom click at ({x}, {y}): {outcome:?}");
            }
            _ => {
                eprintln!("zoom point must be two numbers, got {x:?} {y:?}");
                std::process::exit(2);
            }
        }
    }

    let frame = session.frame();
    let mut scene = Scene::new();
    paint_frame(&mut scene, &frame, view_affine(&session.view_transform()));

    println!(
        "{path}: view {:?}, {} grid lines, {} markers, area {}, {} paths encoded",
        frame.view_box,
        frame.grid.len(),
        frame.markers.len(),
        if frame.factory_area.is_some() { "yes" } else { "no" },
        scene.encoding().n_paths
    );
}
