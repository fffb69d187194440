//! Integration tests for glTF export.

use fractal_gen_lib::export::{
    build_gltf, decode_data_uri, export, export_bytes, parse_glb, ExportOptions,
    DOWNLOAD_FILENAME,
};
use fractal_gen_lib::fixtures::*;
use fractal_gen_lib::scene::HELPER_NAME;
use fractal_gen_lib::session::Session;
use shared::{ExportFormat, SceneVariant};

#[test]
fn test_export_is_idempotent() {
    let mut scene = scene_with_grid();
    let first = export(&mut scene, &ExportOptions::default()).unwrap();
    let second = export(&mut scene, &ExportOptions::default()).unwrap();
    assert_eq!(first, second);

    let json = ExportOptions {
        format: ExportFormat::Json,
    };
    assert_eq!(
        export_bytes(&mut scene, &json).unwrap(),
        export_bytes(&mut scene, &json).unwrap()
    );
}

#[test]
fn test_helper_restored_at_same_index() {
    let mut scene = scene_with_grid();
    let before: Vec<String> = scene.objects().iter().map(|o| o.name.clone()).collect();
    export(&mut scene, &ExportOptions::default()).unwrap();
    let after: Vec<String> = scene.objects().iter().map(|o| o.name.clone()).collect();
    assert_eq!(before, after);
    assert_eq!(after[1], HELPER_NAME);
}

#[test]
fn test_helper_not_in_output() {
    let mut scene = scene_with_grid();
    let bytes = export_bytes(&mut scene, &ExportOptions::default()).unwrap();
    let (doc, _) = parse_glb(&bytes).unwrap();
    let names: Vec<&str> = doc["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["name"].as_str())
        .collect();
    assert_eq!(names, vec!["cube"]);
}

#[test]
fn test_download_is_base64_glb() {
    let download = export(&mut scene_single_cube(1.0), &ExportOptions::default()).unwrap();
    assert_eq!(download.filename, DOWNLOAD_FILENAME);
    assert!(download
        .data_uri
        .starts_with("data:application/octet-stream;base64,"));
    let bytes = decode_data_uri(&download.data_uri).unwrap();
    assert_eq!(&bytes[..4], b"glTF");
}

#[test]
fn test_json_and_binary_share_document_shape() {
    let scene = scene_single_cube(2.0);
    let (glb_doc, _) = parse_glb(&build_gltf(&scene, ExportFormat::Binary).unwrap()).unwrap();
    let json_doc: serde_json::Value =
        serde_json::from_slice(&build_gltf(&scene, ExportFormat::Json).unwrap()).unwrap();
    assert_eq!(glb_doc["meshes"], json_doc["meshes"]);
    assert_eq!(glb_doc["accessors"], json_doc["accessors"]);
    assert!(glb_doc["buffers"][0].get("uri").is_none());
    assert!(json_doc["buffers"][0]["uri"].is_string());
}

#[test]
fn test_write_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested");
    let download = export(&mut scene_single_cube(1.0), &ExportOptions::default()).unwrap();
    let path = download.write_to(&out).unwrap();
    assert_eq!(path, out.join("scene.gltf"));
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, download.bytes().unwrap());
}

#[test]
fn test_session_export_keeps_grid() {
    let mut session = Session::new(small_config_with_grid(SceneVariant::Sierpinski));
    let download = session.export().unwrap();
    assert!(session.scene().get_object_by_name(HELPER_NAME).is_some());

    let (doc, _) = parse_glb(&download.bytes().unwrap()).unwrap();
    // five cubes share one buffer entry
    assert_eq!(doc["accessors"].as_array().unwrap().len(), 3);
    assert!(doc["cameras"].is_array());
}
