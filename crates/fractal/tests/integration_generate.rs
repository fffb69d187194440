//! Integration tests for the generation pipeline.
//!
//! Tests end-to-end: GenerationParams -> generators -> assemble -> compose.

use fractal_gen_lib::assemble::{assemble, extrude_shapes, merge_meshes};
use fractal_gen_lib::compose::{compose, compose_shapes};
use fractal_gen_lib::fixtures::segment;
use fractal_gen_lib::generator::{sierpinski, TreeGenerator, FACTOR, SPHERE_Z_OFFSET};
use fractal_gen_lib::session::build_result_tree;
use fractal_gen_lib::validation::MeshValidator;
use shared::{ExtrudeSettings, GenerationParams, ResultTreeConfig, SphereSettings};

#[test]
fn test_scenario_two_generations() {
    let tree = TreeGenerator::new(&GenerationParams::new(20.0, 2)).unwrap();
    let branches = tree.branches();
    assert_eq!(branches.len(), 6);

    let first = 20.0 * FACTOR;
    let second = first * FACTOR;
    assert!(branches[..2].iter().all(|b| (b.size - first).abs() < 1e-12));
    assert!(branches[2..].iter().all(|b| (b.size - second).abs() < 1e-12));
}

#[test]
fn test_counts_by_depth() {
    for (iterations, expected) in [(0, 0), (1, 2), (2, 6), (3, 14)] {
        let tree = TreeGenerator::new(&GenerationParams::new(20.0, iterations)).unwrap();
        assert_eq!(tree.branches().len(), expected, "iterations {}", iterations);
        assert_eq!(tree.path_segments().len(), expected);
        assert_eq!(tree.sphere_positions(SPHERE_Z_OFFSET).len(), expected);
    }
}

#[test]
fn test_tiny_size_is_empty() {
    let tree = TreeGenerator::new(&GenerationParams::new(0.9, 5)).unwrap();
    assert!(tree.branches().is_empty());
}

#[test]
fn test_identical_inputs_identical_outputs() {
    let params = GenerationParams::new(17.5, 4).at([1.0, -2.0, 3.0]);
    let a = TreeGenerator::new(&params).unwrap();
    let b = TreeGenerator::new(&params).unwrap();
    assert_eq!(a.branches(), b.branches());
    assert_eq!(a.path_segments(), b.path_segments());
    assert_eq!(a.sphere_positions(2.5), b.sphere_positions(2.5));
}

#[test]
fn test_sphere_markers_sit_above_branches() {
    let tree = TreeGenerator::new(&GenerationParams::new(20.0, 3)).unwrap();
    let branches = tree.branches();
    let spheres = tree.sphere_positions(SPHERE_Z_OFFSET);
    for (b, s) in branches.iter().zip(&spheres) {
        assert_eq!(b.position[0], s[0]);
        assert_eq!(b.position[1], s[1]);
        assert_eq!(s[2], b.position[2] + SPHERE_Z_OFFSET);
    }
}

#[test]
fn test_sierpinski_leaf_count() {
    assert_eq!(sierpinski(20.0, 0, [0.0; 3]).len(), 1);
    assert_eq!(sierpinski(20.0, 3, [0.0, 12.0, 0.0]).len(), 125);
}

#[test]
fn test_assembled_tree_is_valid_mesh() {
    let tree = TreeGenerator::new(&GenerationParams::new(20.0, 3)).unwrap();
    let surface = assemble(&tree.path_segments(), &ExtrudeSettings::default()).unwrap();

    let v = MeshValidator::new(&surface);
    assert!(v.validate_all().is_empty(), "{:?}", v.validate_all());
    assert_eq!(v.vertex_count(), 14 * 24);
}

#[test]
fn test_merge_matches_manual_offsets() {
    let settings = ExtrudeSettings::default();
    let a = assemble(&[segment(0.0, 0.0, 4.0, 0.0)], &settings).unwrap();
    let b = assemble(&[segment(0.0, 0.0, 0.0, 4.0)], &settings).unwrap();
    let merged = merge_meshes(&[a.clone(), b.clone()]);
    let both = assemble(
        &[segment(0.0, 0.0, 4.0, 0.0), segment(0.0, 0.0, 0.0, 4.0)],
        &settings,
    )
    .unwrap();
    assert_eq!(merged, both);
    assert_eq!(merged.vertex_count(), a.vertex_count() + b.vertex_count());
}

#[cfg(feature = "csg")]
#[test]
fn test_compose_single_bar_with_sphere() {
    let surface = assemble(&[segment(0.0, 0.0, 10.0, 0.0)], &ExtrudeSettings::default()).unwrap();
    let out = compose(&surface, &[[5.0, 0.0, 3.0]], [1.0; 3], &SphereSettings::default()).unwrap();
    assert!(out.subtracted);
    assert!(out.mesh.triangle_count() > 12);
    assert!(MeshValidator::new(&out.mesh).are_indices_in_range());
}

#[test]
fn test_result_tree_from_zero_iterations_fails_visibly() {
    let config = ResultTreeConfig {
        path_tree: GenerationParams::new(20.0, 0),
        ..Default::default()
    };
    assert!(build_result_tree(&config).is_err());
}

#[test]
fn test_default_result_tree_shapes_are_closed() {
    let config = ResultTreeConfig::default();
    let segments = TreeGenerator::new(&config.path_tree).unwrap().path_segments();
    assert_eq!(segments.len(), 254);

    let shapes = extrude_shapes(&segments, &config.extrude).unwrap();
    for (i, shape) in shapes.iter().enumerate() {
        assert!(MeshValidator::new(&shape.welded()).is_closed(), "shape {} is open", i);
    }
    // touching prisms only fail when judged as one welded buffer
    assert!(!MeshValidator::new(&merge_meshes(&shapes).welded()).is_closed());
}

#[cfg(feature = "csg")]
#[test]
fn test_default_result_tree_is_subtracted() {
    let config = ResultTreeConfig::default();
    let segments = TreeGenerator::new(&config.path_tree).unwrap().path_segments();
    let spheres = TreeGenerator::new(&config.sphere_tree)
        .unwrap()
        .sphere_positions(config.sphere_z_offset);
    let shapes = extrude_shapes(&segments, &config.extrude).unwrap();

    let out = compose_shapes(&shapes, &spheres, config.base_scale, &config.spheres).unwrap();
    assert!(out.subtracted);
    assert_eq!(out.sphere_count, spheres.len());
    assert!(MeshValidator::new(&out.mesh).validate_buffers().is_empty());
    // the pass-through would be exactly 12 triangles per prism
    assert_ne!(out.mesh.triangle_count(), shapes.len() * 12);
}
