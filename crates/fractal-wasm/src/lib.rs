use wasm_bindgen::prelude::*;

use fractal_gen_lib::error::{ExportError, FractalError};
use fractal_gen_lib::export::DOWNLOAD_FILENAME;
use fractal_gen_lib::generator::TreeGenerator;
use fractal_gen_lib::session::Session;
use shared::{ExportFormat, GenerationParams, SceneConfig};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    tracing::info!("fractal-gen wasm initialized");
}

fn to_js(e: FractalError) -> JsError {
    JsError::new(&e.to_string())
}

/// Empty input means defaults
fn parse_config(config_json: &str) -> Result<SceneConfig, JsError> {
    if config_json.trim().is_empty() {
        return Ok(SceneConfig::default());
    }
    serde_json::from_str(config_json).map_err(|e| JsError::new(&format!("invalid config: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, FractalError> {
    serde_json::to_string(value).map_err(|e| ExportError::Serialize(e).into())
}

fn branches_json(size: f64, iterations: i32, position: [f64; 3]) -> Result<String, FractalError> {
    let params = GenerationParams::from_signed(size, iterations.into(), position)?;
    to_json(&TreeGenerator::new(&params)?.branches())
}

fn spheres_json(
    size: f64,
    iterations: i32,
    position: [f64; 3],
    z_offset: f64,
) -> Result<String, FractalError> {
    let params = GenerationParams::from_signed(size, iterations.into(), position)?;
    to_json(&TreeGenerator::new(&params)?.sphere_positions(z_offset))
}

/// Build the configured scene and return it as a base64 data URI
#[wasm_bindgen]
pub fn export_scene(config_json: &str) -> Result<String, JsError> {
    let mut session = Session::new(parse_config(config_json)?);
    let download = session.export().map_err(to_js)?;
    Ok(download.data_uri)
}

/// Same scene as [`export_scene`], as raw GLB bytes
#[wasm_bindgen]
pub fn export_scene_glb(config_json: &str) -> Result<Vec<u8>, JsError> {
    let mut config = parse_config(config_json)?;
    config.export_format = ExportFormat::Binary;
    let mut session = Session::new(config);
    session
        .export()
        .and_then(|d| d.bytes().map_err(FractalError::from))
        .map_err(to_js)
}

/// File name the host should use for downloads
#[wasm_bindgen]
pub fn export_filename() -> String {
    DOWNLOAD_FILENAME.to_string()
}

/// Pythagoras-tree branches as JSON `[{size, position}]`
#[wasm_bindgen]
pub fn generate_branches(size: f64, iterations: i32, x: f64, y: f64, z: f64) -> Result<String, JsError> {
    branches_json(size, iterations, [x, y, z]).map_err(to_js)
}

/// Sphere marker centres as JSON `[[x, y, z]]`
#[wasm_bindgen]
pub fn generate_sphere_positions(
    size: f64,
    iterations: i32,
    x: f64,
    y: f64,
    z: f64,
    z_offset: f64,
) -> Result<String, JsError> {
    spheres_json(size, iterations, [x, y, z], z_offset).map_err(to_js)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Branch, ParamsError};

    #[test]
    fn test_branches_json_scenario() {
        let json = branches_json(20.0, 2, [0.0; 3]).unwrap();
        let branches: Vec<Branch> = serde_json::from_str(&json).unwrap();
        assert_eq!(branches.len(), 6);
    }

    #[test]
    fn test_negative_iterations_rejected() {
        let err = branches_json(20.0, -1, [0.0; 3]).unwrap_err();
        assert!(matches!(err, FractalError::Params(ParamsError::NegativeIterations(-1))));
    }

    #[test]
    fn test_spheres_json_offset() {
        let json = spheres_json(40.0, 1, [0.0; 3], 2.5).unwrap();
        let positions: Vec<[f64; 3]> = serde_json::from_str(&json).unwrap();
        assert_eq!(positions.len(), 2);
        assert!(positions.iter().all(|p| p[2] == 2.5));
    }
}
