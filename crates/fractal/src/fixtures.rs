//! Factory functions for test data.
//!
//! Small configurations and scenes that keep CSG and export fast, used by
//! integration tests and the wasm smoke tests.

use std::sync::Arc;

use kurbo::{Line, Point};
use shared::{GenerationParams, GridSettings, SceneConfig, SceneVariant};

use crate::generator::PathSegment;
use crate::mesh::{cube, grid_lines};
use crate::scene::{Color, Material, ObjectKind, Scene, SceneObject, HELPER_NAME};

// ── Geometry ────────────────────────────────────────────────────

/// Straight segment from `(x0, y0)` to `(x1, y1)`
pub fn segment(x0: f64, y0: f64, x1: f64, y1: f64) -> PathSegment {
    Line::new(Point::new(x0, y0), Point::new(x1, y1))
}

// ── Scenes ──────────────────────────────────────────────────────

/// Scene holding one red cube of edge `size`
pub fn scene_single_cube(size: f32) -> Scene {
    let mut scene = Scene::new();
    scene.add(SceneObject::mesh(
        "cube",
        Arc::new(cube(size)),
        Material::standard(Color::from_hex(0xff0000)),
    ));
    scene
}

/// [`scene_single_cube`] plus a grid helper between two other objects
pub fn scene_with_grid() -> Scene {
    let mut scene = Scene::new();
    scene.add(SceneObject::new(
        "light",
        ObjectKind::AmbientLight {
            color: Color::WHITE,
            intensity: 1.0,
        },
    ));
    scene.add(SceneObject::new(
        HELPER_NAME,
        ObjectKind::Lines {
            lines: Arc::new(grid_lines(100.0, 100)),
            color: Color::WHITE,
        },
    ));
    for object in scene_single_cube(1.0).objects() {
        scene.add(object.clone());
    }
    scene
}

// ── Configs ─────────────────────────────────────────────────────

/// Config with shallow trees so a full build stays quick
pub fn small_config(variant: SceneVariant) -> SceneConfig {
    let mut config = SceneConfig {
        variant,
        ..Default::default()
    };
    config.result_tree.path_tree = GenerationParams::new(20.0, 2);
    config.result_tree.sphere_tree = GenerationParams::new(40.0, 1);
    config.pythagoras_tree.params = GenerationParams::new(20.0, 2);
    config.sierpinski.params.iterations = 1;
    config
}

/// [`small_config`] with the grid helper enabled
pub fn small_config_with_grid(variant: SceneVariant) -> SceneConfig {
    SceneConfig {
        grid: Some(GridSettings::default()),
        ..small_config(variant)
    }
}
