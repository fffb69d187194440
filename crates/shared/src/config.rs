//! Scene configuration. Every field has a default matching the stock scene,
//! so a partial JSON file only needs to name what it changes.

use serde::{Deserialize, Serialize};

use crate::{GenerationParams, Position};

/// Which fractal the scene is built around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneVariant {
    /// Extruded path tree with sphere markers subtracted
    #[default]
    ResultTree,
    /// Instanced template per branch
    PythagorasTree,
    /// Instanced template per subdivision leaf
    Sierpinski,
}

/// Extrusion parameters for path segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrudeSettings {
    pub depth: f64,
    pub steps: u32,
    pub bevel_enabled: bool,
    /// Width of the outline built around each segment. Zero keeps the bare segment.
    pub thickness: f64,
}

impl Default for ExtrudeSettings {
    fn default() -> Self {
        Self {
            depth: 3.0,
            steps: 1,
            bevel_enabled: false,
            thickness: 0.5,
        }
    }
}

/// Sphere used as the subtraction tool at every marker position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereSettings {
    pub radius: f64,
    pub segments: u32,
    pub scale: [f64; 3],
}

impl Default for SphereSettings {
    fn default() -> Self {
        Self {
            radius: 1.5,
            segments: 8,
            scale: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov: f64,
    pub zoom: f64,
    pub position: Position,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 90.0,
            zoom: 8.0,
            position: [100.0, 0.0, 350.0],
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl CameraSettings {
    /// Field of view after zoom, in radians
    pub fn effective_yfov(&self) -> f64 {
        let half = (self.fov.to_radians() / 2.0).tan() / self.zoom.max(f64::EPSILON);
        2.0 * half.atan()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub size: f64,
    pub divisions: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size: 100.0,
            divisions: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLightSettings {
    pub color: String,
    pub intensity: f64,
}

impl Default for AmbientLightSettings {
    fn default() -> Self {
        Self {
            color: "white".to_string(),
            intensity: 1.0,
        }
    }
}

/// Path tree extruded into a base solid, minus a sphere tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultTreeConfig {
    pub path_tree: GenerationParams,
    /// Must be twice the path tree size to line up with the scaled base
    pub sphere_tree: GenerationParams,
    pub extrude: ExtrudeSettings,
    pub spheres: SphereSettings,
    pub base_scale: [f64; 3],
    /// Visual offset of sphere markers from the skeleton plane
    pub sphere_z_offset: f64,
    pub color: String,
    /// Rotation of the result mesh when it is mounted (radians)
    pub rotation: [f64; 3],
}

impl Default for ResultTreeConfig {
    fn default() -> Self {
        Self {
            path_tree: GenerationParams::new(20.0, 7),
            sphere_tree: GenerationParams::new(40.0, 6),
            extrude: ExtrudeSettings::default(),
            spheres: SphereSettings::default(),
            base_scale: [2.0, 2.0, 2.0],
            sphere_z_offset: 2.5,
            color: "red".to_string(),
            rotation: [0.0, 12.0, 0.0],
        }
    }
}

/// Parameters for the instanced variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstancedConfig {
    pub params: GenerationParams,
    /// Template scale per unit of branch size
    pub scale_factor: f64,
    /// Per-frame rotation of every instance (radians)
    pub instance_spin: [f64; 3],
    /// Per-frame rotation of the whole group (radians)
    pub group_spin: [f64; 3],
}

impl Default for InstancedConfig {
    fn default() -> Self {
        Self {
            params: GenerationParams::new(20.0, 4),
            scale_factor: 1.0,
            instance_spin: [0.1, 0.0, 0.0],
            group_spin: [0.0, 0.01, 0.0],
        }
    }
}

impl InstancedConfig {
    pub fn sierpinski() -> Self {
        Self {
            params: GenerationParams::new(20.0, 3).at([0.0, 12.0, 0.0]),
            scale_factor: 1.0,
            instance_spin: [0.0; 3],
            group_spin: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Binary GLB container
    #[default]
    Binary,
    /// JSON document with the buffer embedded as a data URI
    Json,
}

/// Everything the session needs to build and export a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub variant: SceneVariant,
    pub result_tree: ResultTreeConfig,
    pub pythagoras_tree: InstancedConfig,
    pub sierpinski: InstancedConfig,
    pub camera: CameraSettings,
    pub ambient_light: AmbientLightSettings,
    /// Grid helper; never exported
    pub grid: Option<GridSettings>,
    /// Colours cycled over instances by generation index
    pub palette: Vec<String>,
    pub export_format: ExportFormat,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            variant: SceneVariant::default(),
            result_tree: ResultTreeConfig::default(),
            pythagoras_tree: InstancedConfig::default(),
            sierpinski: InstancedConfig::sierpinski(),
            camera: CameraSettings::default(),
            ambient_light: AmbientLightSettings::default(),
            grid: None,
            palette: ["red", "blue", "green", "yellow", "orange", "purple"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            export_format: ExportFormat::default(),
        }
    }
}
