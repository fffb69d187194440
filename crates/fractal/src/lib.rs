// Library crate: geometry, scene and export pipeline shared by the CLI,
// the wasm bindings and integration tests.

pub mod assemble;
pub mod cache;
pub mod compose;
pub mod config;
pub mod error;
pub mod export;
pub mod extrude;
pub mod fixtures;
pub mod generator;
pub mod instances;
pub mod mesh;
pub mod scene;
pub mod session;
pub mod validation;
