//! glTF 2.0 export of a [`Scene`], with helper objects held back

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use shared::{CameraSettings, ExportFormat, Transform};

use crate::error::ExportError;
use crate::mesh::{Aabb, LineData, MeshData};
use crate::scene::{Color, Material, ObjectKind, Scene, SceneObject, Shading, HELPER_NAME};
use crate::validation::MeshValidator;

/// GLB magic number: "glTF"
const GLB_MAGIC: u32 = 0x46546C67;
/// GLB version 2
const GLB_VERSION: u32 = 2;
/// JSON chunk type
const CHUNK_TYPE_JSON: u32 = 0x4E4F534A;
/// BIN chunk type
const CHUNK_TYPE_BIN: u32 = 0x004E4942;

/// glTF component types
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;

/// glTF buffer view targets
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// glTF primitive modes
const MODE_LINES: u32 = 1;

const UNLIT_EXTENSION: &str = "KHR_materials_unlit";

pub const DOWNLOAD_FILENAME: &str = "scene.gltf";
pub const DATA_URI_PREFIX: &str = "data:application/octet-stream;base64,";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
}

/// Export result ready for a host to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub data_uri: String,
}

impl Download {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            filename: DOWNLOAD_FILENAME.to_string(),
            data_uri: to_data_uri(bytes),
        }
    }

    pub fn bytes(&self) -> Result<Vec<u8>, ExportError> {
        decode_data_uri(&self.data_uri)
    }

    /// Write the decoded payload as `dir/filename`, creating `dir` if needed
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.filename);
        let bytes = self.bytes()?;
        std::fs::create_dir_all(dir)
            .and_then(|_| std::fs::write(&path, &bytes))
            .map_err(|source| ExportError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::info!("export: wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(bytes))
}

pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ExportError> {
    let payload = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or(ExportError::NotADataUri)?;
    Ok(STANDARD.decode(payload)?)
}

/// Detaches helper objects for the guard's lifetime and puts them back on drop,
/// including when export fails or unwinds.
pub struct HelperGuard<'a> {
    scene: &'a mut Scene,
    removed: Vec<(usize, SceneObject)>,
}

impl<'a> HelperGuard<'a> {
    pub fn new(scene: &'a mut Scene, name: &str) -> Self {
        let removed = scene.remove_by_name(name);
        if !removed.is_empty() {
            tracing::debug!("export: hiding {} '{}' helper(s)", removed.len(), name);
        }
        Self { scene, removed }
    }

    pub fn scene(&self) -> &Scene {
        self.scene
    }
}

impl Drop for HelperGuard<'_> {
    fn drop(&mut self) {
        self.scene.restore(std::mem::take(&mut self.removed));
    }
}

/// Serialize `scene` without its helpers and wrap it as a download
pub fn export(scene: &mut Scene, options: &ExportOptions) -> Result<Download, ExportError> {
    let bytes = export_bytes(scene, options)?;
    Ok(Download::new(&bytes))
}

/// Raw glTF bytes: GLB for [`ExportFormat::Binary`], UTF-8 JSON otherwise
pub fn export_bytes(scene: &mut Scene, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let guard = HelperGuard::new(scene, HELPER_NAME);
    let bytes = build_gltf(guard.scene(), options.format)?;
    tracing::info!(
        "export: {} objects -> {} bytes ({:?})",
        guard.scene().len(),
        bytes.len(),
        options.format
    );
    Ok(bytes)
}

/// Build glTF output for every object in `scene`.
pub fn build_gltf(scene: &Scene, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let mut builder = GltfBuilder::default();
    let mut roots = Vec::new();
    for object in scene.objects() {
        if let Some(node) = builder.add_object(object)? {
            roots.push(node);
        }
    }
    if roots.is_empty() {
        return Err(ExportError::EmptyScene);
    }

    match format {
        ExportFormat::Binary => {
            let doc = builder.document(&roots, None);
            let json_bytes = serde_json::to_vec(&doc)?;
            Ok(assemble_glb(json_bytes, builder.bin))
        }
        ExportFormat::Json => {
            let uri = (!builder.bin.is_empty()).then(|| to_data_uri(&builder.bin));
            let doc = builder.document(&roots, uri);
            Ok(serde_json::to_vec(&doc)?)
        }
    }
}

/// Split a GLB into its JSON document and binary chunk
pub fn parse_glb(bytes: &[u8]) -> Option<(Value, &[u8])> {
    let word = |at: usize| -> Option<u32> {
        let b = bytes.get(at..at + 4)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    };
    if word(0)? != GLB_MAGIC || word(4)? != GLB_VERSION || word(8)? as usize != bytes.len() {
        return None;
    }
    let json_len = word(12)? as usize;
    if word(16)? != CHUNK_TYPE_JSON {
        return None;
    }
    let json: Value = serde_json::from_slice(bytes.get(20..20 + json_len)?).ok()?;

    let bin_start = 20 + json_len;
    if bin_start == bytes.len() {
        return Some((json, &[]));
    }
    let bin_len = word(bin_start)? as usize;
    if word(bin_start + 4)? != CHUNK_TYPE_BIN {
        return None;
    }
    let bin = bytes.get(bin_start + 8..bin_start + 8 + bin_len)?;
    Some((json, bin))
}

#[derive(Debug, Clone, Copy)]
struct GeometryAccessors {
    position: usize,
    normal: Option<usize>,
    indices: Option<usize>,
    mode: Option<u32>,
}

#[derive(Default)]
struct GltfBuilder {
    bin: Vec<u8>,
    buffer_views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Value>,
    materials: Vec<Value>,
    nodes: Vec<Value>,
    cameras: Vec<Value>,
    /// Geometry already in the buffer, by `Arc` address
    geometry: HashMap<usize, GeometryAccessors>,
    /// glTF mesh per (geometry, material)
    mesh_lookup: HashMap<(usize, usize), usize>,
    material_keys: Vec<Material>,
    uses_unlit: bool,
}

impl GltfBuilder {
    fn add_object(&mut self, object: &SceneObject) -> Result<Option<usize>, ExportError> {
        let mut node = serde_json::Map::new();
        node.insert("name".into(), json!(object.name));
        write_trs(&mut node, &object.transform);

        match &object.kind {
            ObjectKind::Group => {}
            ObjectKind::Mesh { mesh, material } => {
                let key = Arc::as_ptr(mesh) as usize;
                if let Some(index) = self.mesh(key, &object.name, mesh, material)? {
                    node.insert("mesh".into(), json!(index));
                }
            }
            ObjectKind::Lines { lines, color } => {
                let key = Arc::as_ptr(lines) as usize;
                if let Some(index) = self.lines(key, &object.name, lines, *color)? {
                    node.insert("mesh".into(), json!(index));
                }
            }
            ObjectKind::Camera(camera) => {
                node.insert("camera".into(), json!(self.camera(camera)));
            }
            ObjectKind::AmbientLight { .. } => {
                tracing::debug!("export: skipping ambient light '{}'", object.name);
                return Ok(None);
            }
        }

        let mut children = Vec::new();
        for child in &object.children {
            if let Some(index) = self.add_object(child)? {
                children.push(index);
            }
        }
        if !children.is_empty() {
            node.insert("children".into(), json!(children));
        }

        self.nodes.push(Value::Object(node));
        Ok(Some(self.nodes.len() - 1))
    }

    fn mesh(
        &mut self,
        key: usize,
        name: &str,
        mesh: &MeshData,
        material: &Material,
    ) -> Result<Option<usize>, ExportError> {
        let problems = MeshValidator::new(mesh).validate_buffers();
        if !problems.is_empty() {
            return Err(ExportError::MalformedMesh {
                name: name.to_string(),
                reason: problems.join("; "),
            });
        }
        if mesh.is_empty() {
            tracing::debug!("export: '{}' has no triangles, writing bare node", name);
            return Ok(None);
        }
        let material = self.material(material);
        if let Some(&index) = self.mesh_lookup.get(&(key, material)) {
            return Ok(Some(index));
        }

        let geometry = match self.geometry.get(&key).copied() {
            Some(g) => g,
            None => {
                let normals: Cow<[f32]> = match &mesh.normals {
                    Some(n) => Cow::Borrowed(n.as_slice()),
                    None => Cow::Owned(mesh.compute_vertex_normals()),
                };
                let position = self.vec3_accessor(&mesh.positions, true);
                let normal = self.vec3_accessor(&normals, false);
                let indices = self.index_accessor(&mesh.indices);
                let g = GeometryAccessors {
                    position,
                    normal: Some(normal),
                    indices: Some(indices),
                    mode: None,
                };
                self.geometry.insert(key, g);
                g
            }
        };

        Ok(Some(self.push_mesh(key, name, geometry, material)))
    }

    fn lines(
        &mut self,
        key: usize,
        name: &str,
        lines: &LineData,
        color: Color,
    ) -> Result<Option<usize>, ExportError> {
        if lines.positions.len() % 3 != 0 {
            return Err(ExportError::MalformedMesh {
                name: name.to_string(),
                reason: format!(
                    "position buffer length {} is not a multiple of 3",
                    lines.positions.len()
                ),
            });
        }
        if lines.vertex_count() < 2 {
            return Ok(None);
        }
        let material = self.material(&Material {
            color,
            wireframe: false,
            shading: Shading::Basic,
        });
        if let Some(&index) = self.mesh_lookup.get(&(key, material)) {
            return Ok(Some(index));
        }
        let geometry = match self.geometry.get(&key).copied() {
            Some(g) => g,
            None => {
                let g = GeometryAccessors {
                    position: self.vec3_accessor(&lines.positions, true),
                    normal: None,
                    indices: None,
                    mode: Some(MODE_LINES),
                };
                self.geometry.insert(key, g);
                g
            }
        };
        Ok(Some(self.push_mesh(key, name, geometry, material)))
    }

    fn push_mesh(
        &mut self,
        key: usize,
        name: &str,
        geometry: GeometryAccessors,
        material: usize,
    ) -> usize {
        let mut attributes = serde_json::Map::new();
        attributes.insert("POSITION".into(), json!(geometry.position));
        if let Some(normal) = geometry.normal {
            attributes.insert("NORMAL".into(), json!(normal));
        }
        let mut primitive = serde_json::Map::new();
        primitive.insert("attributes".into(), Value::Object(attributes));
        primitive.insert("material".into(), json!(material));
        if let Some(indices) = geometry.indices {
            primitive.insert("indices".into(), json!(indices));
        }
        if let Some(mode) = geometry.mode {
            primitive.insert("mode".into(), json!(mode));
        }

        self.meshes.push(json!({
            "name": name,
            "primitives": [Value::Object(primitive)]
        }));
        let index = self.meshes.len() - 1;
        self.mesh_lookup.insert((key, material), index);
        index
    }

    fn material(&mut self, material: &Material) -> usize {
        if let Some(i) = self.material_keys.iter().position(|m| m == material) {
            return i;
        }
        let [r, g, b] = material.color.to_linear();
        let mut value = json!({
            "name": format!("material_{}", self.material_keys.len()),
            "pbrMetallicRoughness": {
                "baseColorFactor": [r, g, b, 1.0],
                "metallicFactor": 0.0,
                "roughnessFactor": 1.0
            }
        });
        if material.shading == Shading::Basic {
            let mut extensions = serde_json::Map::new();
            extensions.insert(UNLIT_EXTENSION.into(), json!({}));
            value["extensions"] = Value::Object(extensions);
            self.uses_unlit = true;
        }
        if material.wireframe {
            value["extras"] = json!({ "wireframe": true });
        }
        self.materials.push(value);
        self.material_keys.push(material.clone());
        self.material_keys.len() - 1
    }

    fn camera(&mut self, camera: &CameraSettings) -> usize {
        self.cameras.push(json!({
            "type": "perspective",
            "perspective": {
                "yfov": camera.effective_yfov(),
                "znear": camera.near,
                "zfar": camera.far
            }
        }));
        self.cameras.len() - 1
    }

    fn push_view(&mut self, bytes: &[u8], target: u32) -> usize {
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        // Pad to 4-byte alignment
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
            "target": target
        }));
        self.buffer_views.len() - 1
    }

    fn vec3_accessor(&mut self, data: &[f32], with_bounds: bool) -> usize {
        let view = self.push_view(&floats_to_bytes(data), ARRAY_BUFFER);
        let mut accessor = json!({
            "bufferView": view,
            "byteOffset": 0,
            "componentType": FLOAT,
            "count": data.len() / 3,
            "type": "VEC3"
        });
        if with_bounds {
            if let Some(Aabb { min, max }) = Aabb::from_positions(data) {
                accessor["min"] = json!([min.x, min.y, min.z]);
                accessor["max"] = json!([max.x, max.y, max.z]);
            }
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    fn index_accessor(&mut self, indices: &[u32]) -> usize {
        let view = self.push_view(&u32s_to_bytes(indices), ELEMENT_ARRAY_BUFFER);
        self.accessors.push(json!({
            "bufferView": view,
            "byteOffset": 0,
            "componentType": UNSIGNED_INT,
            "count": indices.len(),
            "type": "SCALAR"
        }));
        self.accessors.len() - 1
    }

    fn document(&self, roots: &[usize], buffer_uri: Option<String>) -> Value {
        let mut doc = json!({
            "asset": {
                "version": "2.0",
                "generator": concat!("fractal-gen v", env!("CARGO_PKG_VERSION"))
            },
            "scene": 0,
            "scenes": [{
                "name": "Scene",
                "nodes": roots
            }],
            "nodes": self.nodes
        });

        // glTF forbids empty top-level arrays
        for (key, items) in [
            ("meshes", &self.meshes),
            ("materials", &self.materials),
            ("accessors", &self.accessors),
            ("bufferViews", &self.buffer_views),
            ("cameras", &self.cameras),
        ] {
            if !items.is_empty() {
                doc[key] = json!(items);
            }
        }
        if !self.bin.is_empty() {
            let mut buffer = json!({ "byteLength": self.bin.len() });
            if let Some(uri) = buffer_uri {
                buffer["uri"] = json!(uri);
            }
            doc["buffers"] = json!([buffer]);
        }
        if self.uses_unlit {
            doc["extensionsUsed"] = json!([UNLIT_EXTENSION]);
        }
        doc
    }
}

fn write_trs(node: &mut serde_json::Map<String, Value>, transform: &Transform) {
    let [tx, ty, tz] = transform.position;
    let [rx, ry, rz] = transform.rotation;
    if transform.position != [0.0; 3] {
        node.insert("translation".into(), json!([tx as f32, ty as f32, tz as f32]));
    }
    if transform.rotation != [0.0; 3] {
        let q = glam::DQuat::from_euler(glam::EulerRot::XYZ, rx, ry, rz);
        node.insert(
            "rotation".into(),
            json!([q.x as f32, q.y as f32, q.z as f32, q.w as f32]),
        );
    }
    if transform.scale != [1.0; 3] {
        let [sx, sy, sz] = transform.scale;
        node.insert("scale".into(), json!([sx as f32, sy as f32, sz as f32]));
    }
}

fn assemble_glb(mut json_bytes: Vec<u8>, mut bin_data: Vec<u8>) -> Vec<u8> {
    // Pad JSON to 4-byte alignment with spaces (GLB chunk rule)
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    // Pad BIN to 4-byte alignment with zeros (GLB chunk rule)
    while bin_data.len() % 4 != 0 {
        bin_data.push(0);
    }

    let json_chunk_length = json_bytes.len() as u32;
    let bin_chunk_length = bin_data.len() as u32;
    let bin_section = if bin_data.is_empty() { 0 } else { 8 + bin_chunk_length };

    let total_length: u32 = 12 // header
        + 8 + json_chunk_length  // JSON chunk header + data
        + bin_section; // BIN chunk header + data

    let mut glb = Vec::with_capacity(total_length as usize);

    // Header
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&total_length.to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&json_chunk_length.to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    glb.extend_from_slice(&json_bytes);

    // BIN chunk
    if !bin_data.is_empty() {
        glb.extend_from_slice(&bin_chunk_length.to_le_bytes());
        glb.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
        glb.extend_from_slice(&bin_data);
    }

    glb
}

fn floats_to_bytes(data: &[f32]) -> Vec<u8> {
    data.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn u32s_to_bytes(data: &[u32]) -> Vec<u8> {
    data.iter().flat_map(|v| v.to_le_bytes()).collect()
}
