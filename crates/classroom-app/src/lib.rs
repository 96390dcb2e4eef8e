//! Classroom App: WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the platform adapters into a `SessionDirectory` and exposes
//! it to JavaScript as `ClassroomApp`.

mod app;
mod config_store;


pub use app::ClassroomApp;

use wasm_bindgen::prelude::*;

/// WASM entry point: runs once when the module is instantiated
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Classroom sessions module loaded");
}
