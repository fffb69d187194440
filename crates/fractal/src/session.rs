//! Live scene hosting: configuration, memoised rebuilds, frame ticks, export

use std::sync::Arc;

use shared::{
    ExtrudeSettings, GenerationParams, InstancedConfig, SceneConfig, SceneVariant, SphereSettings,
    Transform,
};

use crate::assemble::extrude_shapes;
use crate::cache::{GenerationKey, Memo};
use crate::compose::compose_shapes;
use crate::error::Result;
use crate::export::{export, Download, ExportOptions};
use crate::generator::{sierpinski, TreeGenerator};
use crate::instances::{parse_palette, InstanceArena};
use crate::mesh::{cube, grid_lines, MeshData};
use crate::scene::{Color, Material, ObjectKind, Scene, SceneObject, HELPER_NAME};

/// Scene slot holding whichever fractal variant is active
pub const FRACTAL_OBJECT: &str = "fractal";
pub const CAMERA_OBJECT: &str = "camera";
pub const LIGHT_OBJECT: &str = "ambient_light";

#[derive(Debug, Clone, PartialEq)]
struct ResultKey {
    path_tree: GenerationKey,
    sphere_tree: GenerationKey,
    extrude: ExtrudeSettings,
    spheres: SphereSettings,
    base_scale: [f64; 3],
    sphere_z_offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct InstanceKey {
    variant: SceneVariant,
    generation: GenerationKey,
    config: InstancedConfig,
    palette: Vec<String>,
}

fn color_or_white(name: &str) -> Color {
    Color::parse(name).unwrap_or_else(|| {
        tracing::warn!("unknown colour '{}', using white", name);
        Color::WHITE
    })
}

/// Extrude the path tree, then carve out the sphere tree.
pub fn build_result_tree(config: &shared::ResultTreeConfig) -> Result<MeshData> {
    let segments = TreeGenerator::new(&config.path_tree)?.path_segments();
    let spheres = TreeGenerator::new(&config.sphere_tree)?.sphere_positions(config.sphere_z_offset);
    let shapes = extrude_shapes(&segments, &config.extrude)?;
    let composition = compose_shapes(&shapes, &spheres, config.base_scale, &config.spheres)?;
    tracing::info!(
        "result tree: {} segments, {} spheres -> {} triangles{}",
        segments.len(),
        composition.sphere_count,
        composition.mesh.triangle_count(),
        if composition.subtracted { "" } else { " (unsubtracted)" }
    );
    Ok(composition.mesh)
}

pub struct Session {
    config: SceneConfig,
    scene: Scene,
    template: Arc<MeshData>,
    result_tree: Memo<ResultKey, MeshData>,
    instances: Memo<InstanceKey, InstanceArena>,
    dirty: bool,
}

impl Session {
    pub fn new(config: SceneConfig) -> Self {
        let mut session = Self {
            config,
            scene: Scene::new(),
            template: Arc::new(cube(1.0)),
            result_tree: Memo::new(),
            instances: Memo::new(),
            dirty: true,
        };
        session.build_furniture();
        session
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn variant(&self) -> SceneVariant {
        self.config.variant
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of result-tree rebuilds
    pub fn result_rebuilds(&self) -> u64 {
        self.result_tree.rebuild_count()
    }

    /// Number of instance-arena rebuilds
    pub fn instance_rebuilds(&self) -> u64 {
        self.instances.rebuild_count()
    }

    pub fn set_variant(&mut self, variant: SceneVariant) {
        if self.config.variant != variant {
            self.config.variant = variant;
            self.dirty = true;
        }
    }

    /// Replace the active variant's generation parameters.
    ///
    /// For the result tree these drive the path tree; the sphere tree follows
    /// at double size and one generation fewer.
    pub fn set_params(&mut self, params: GenerationParams) -> Result<()> {
        params.validate()?;
        match self.config.variant {
            SceneVariant::ResultTree => {
                let tree = &mut self.config.result_tree;
                tree.sphere_tree = GenerationParams {
                    size: params.size * 2.0,
                    iterations: params.iterations.saturating_sub(1),
                    ..params.clone()
                };
                tree.path_tree = params;
            }
            SceneVariant::PythagorasTree => self.config.pythagoras_tree.params = params,
            SceneVariant::Sierpinski => self.config.sierpinski.params = params,
        }
        self.dirty = true;
        Ok(())
    }

    /// Re-derive the active variant and put it in the scene.
    /// Unchanged inputs reuse the memoised geometry.
    pub fn regenerate(&mut self) -> Result<()> {
        let object = match self.config.variant {
            SceneVariant::ResultTree => self.result_tree_object()?,
            variant => self.instanced_object(variant)?,
        };
        self.scene.replace(object);
        self.dirty = false;
        Ok(())
    }

    /// Regenerate only if something changed since the last build
    pub fn ensure_current(&mut self) -> Result<()> {
        if self.dirty {
            self.regenerate()?;
        }
        Ok(())
    }

    /// Advance one frame
    pub fn tick(&mut self) {
        self.scene.tick();
    }

    pub fn export(&mut self) -> Result<Download> {
        self.ensure_current()?;
        let options = ExportOptions {
            format: self.config.export_format,
        };
        Ok(export(&mut self.scene, &options)?)
    }

    fn result_tree_object(&mut self) -> Result<SceneObject> {
        let config = &self.config.result_tree;
        let key = ResultKey {
            path_tree: GenerationKey::new(&config.path_tree, 0.0),
            sphere_tree: GenerationKey::new(&config.sphere_tree, 0.0),
            extrude: config.extrude.clone(),
            spheres: config.spheres.clone(),
            base_scale: config.base_scale,
            sphere_z_offset: config.sphere_z_offset,
        };
        let mesh = self
            .result_tree
            .try_get_or_compute(&key, |_| build_result_tree(config))?;
        let material =
            Material::standard(color_or_white(&config.color)).with_wireframe(config.path_tree.wireframe);
        let transform = Transform {
            rotation: config.rotation,
            ..Transform::new()
        };
        Ok(SceneObject::mesh(FRACTAL_OBJECT, mesh, material).with_transform(transform))
    }

    fn instanced_object(&mut self, variant: SceneVariant) -> Result<SceneObject> {
        let config = match variant {
            SceneVariant::Sierpinski => &self.config.sierpinski,
            _ => &self.config.pythagoras_tree,
        };
        let key = InstanceKey {
            variant,
            generation: GenerationKey::new(&config.params, 0.0),
            config: config.clone(),
            palette: self.config.palette.clone(),
        };
        let template = &self.template;
        let palette = &self.config.palette;
        let arena = self.instances.try_get_or_compute(&key, |_| {
            let params = &config.params;
            let branches = match variant {
                SceneVariant::Sierpinski => {
                    params.validate()?;
                    sierpinski(params.size, params.iterations, params.position)
                }
                _ => TreeGenerator::new(params)?.branches(),
            };
            tracing::info!("{:?}: {} instances", variant, branches.len());
            Ok::<_, crate::error::FractalError>(InstanceArena::from_branches(
                Arc::clone(template),
                &branches,
                config.scale_factor,
                config.instance_spin,
                &parse_palette(palette),
                params.wireframe,
            ))
        })?;
        Ok(arena.to_group(FRACTAL_OBJECT, config.group_spin))
    }

    fn build_furniture(&mut self) {
        let light = &self.config.ambient_light;
        self.scene.add(SceneObject::new(
            LIGHT_OBJECT,
            ObjectKind::AmbientLight {
                color: color_or_white(&light.color),
                intensity: light.intensity as f32,
            },
        ));

        let camera = &self.config.camera;
        self.scene.add(
            SceneObject::new(CAMERA_OBJECT, ObjectKind::Camera(camera.clone()))
                .with_transform(Transform::at(camera.position)),
        );

        if let Some(grid) = &self.config.grid {
            self.scene.add(SceneObject::new(
                HELPER_NAME,
                ObjectKind::Lines {
                    lines: Arc::new(grid_lines(grid.size as f32, grid.divisions)),
                    color: Color::parse("gray").unwrap_or(Color::WHITE),
                },
            ));
        }
    }
}
