//! Constructive solid composition: combined surface minus sphere markers.
//!
//! Uses `vcad::Part` on top of a manifold kernel; every input shape has to be
//! a closed manifold for the subtraction to be meaningful.

#[cfg(feature = "csg")]
use manifold_rs::{Manifold, Mesh};
use shared::{Position, SphereSettings};
#[cfg(feature = "csg")]
use shared::Transform;
#[cfg(feature = "csg")]
use vcad::Part;

use crate::assemble::merge_meshes;
use crate::error::ComposeError;
use crate::mesh::MeshData;
use crate::validation::MeshValidator;

/// Output of [`compose`]
#[derive(Debug, Clone)]
pub struct Composition {
    /// Flat-shaded result with recomputed normals
    pub mesh: MeshData,
    /// False when the base could not be turned into a solid and was passed through
    pub subtracted: bool,
    pub sphere_count: usize,
}

/// Apply a Transform to a vcad Part. Rotation is given in radians.
#[cfg(feature = "csg")]
pub fn apply_transform(part: Part, transform: &Transform) -> Part {
    let [tx, ty, tz] = transform.position;
    let [rx, ry, rz] = transform.rotation;
    let [sx, sy, sz] = transform.scale;

    let mut p = part;
    if sx != 1.0 || sy != 1.0 || sz != 1.0 {
        p = p.scale(sx, sy, sz);
    }
    if rx != 0.0 || ry != 0.0 || rz != 0.0 {
        p = p.rotate(rx.to_degrees(), ry.to_degrees(), rz.to_degrees());
    }
    if tx != 0.0 || ty != 0.0 || tz != 0.0 {
        p = p.translate(tx, ty, tz);
    }
    p
}

fn validate_sphere(sphere: &SphereSettings) -> Result<(), ComposeError> {
    if !sphere.radius.is_finite() || sphere.radius <= 0.0 {
        return Err(ComposeError::InvalidSphereRadius(sphere.radius));
    }
    if sphere.segments < 3 {
        return Err(ComposeError::TooFewSphereSegments(sphere.segments));
    }
    Ok(())
}

fn scaled_passthrough(surface: &MeshData, base_scale: [f64; 3], sphere_count: usize) -> Composition {
    let scale = glam::Vec3::new(base_scale[0] as f32, base_scale[1] as f32, base_scale[2] as f32);
    Composition {
        mesh: surface.transformed(scale, glam::Vec3::ZERO).flat_shaded(),
        subtracted: false,
        sphere_count,
    }
}

/// Build `surface · base_scale − ⋃ spheres` for a single solid surface.
///
/// See [`compose_shapes`] for a base made of several solids.
pub fn compose(
    surface: &MeshData,
    spheres: &[Position],
    base_scale: [f64; 3],
    sphere: &SphereSettings,
) -> Result<Composition, ComposeError> {
    compose_shapes(std::slice::from_ref(surface), spheres, base_scale, sphere)
}

/// Build `(⋃ shapes) · base_scale − ⋃ spheres`.
///
/// Each shape is welded and checked for closure on its own, so shapes that
/// touch or overlap are fine. An open shape is logged and the merged surface
/// is returned scaled but unsubtracted; an empty base is an error.
pub fn compose_shapes(
    shapes: &[MeshData],
    spheres: &[Position],
    base_scale: [f64; 3],
    sphere: &SphereSettings,
) -> Result<Composition, ComposeError> {
    let welded: Vec<MeshData> = shapes
        .iter()
        .filter(|shape| !shape.is_empty())
        .map(MeshData::welded)
        .collect();
    if welded.is_empty() {
        return Err(ComposeError::EmptyBase);
    }
    validate_sphere(sphere)?;

    if let Some(open) = welded.iter().position(|w| !MeshValidator::new(w).is_closed()) {
        tracing::warn!(
            "compose: shape {} of {} is not closed ({} triangles), skipping subtraction",
            open,
            welded.len(),
            welded[open].triangle_count()
        );
        return Ok(scaled_passthrough(&merge_meshes(shapes), base_scale, 0));
    }

    subtract(&welded, spheres, base_scale, sphere)
}

#[cfg(not(feature = "csg"))]
fn subtract(
    welded: &[MeshData],
    _spheres: &[Position],
    base_scale: [f64; 3],
    _sphere: &SphereSettings,
) -> Result<Composition, ComposeError> {
    tracing::warn!("compose: built without csg support, skipping subtraction");
    Ok(scaled_passthrough(&merge_meshes(welded), base_scale, 0))
}

#[cfg(feature = "csg")]
fn subtract(
    welded: &[MeshData],
    spheres: &[Position],
    base_scale: [f64; 3],
    sphere: &SphereSettings,
) -> Result<Composition, ComposeError> {
    let mut combined: Option<Manifold> = None;
    for (i, shape) in welded.iter().enumerate() {
        let manifold = Mesh::new(&shape.positions, &shape.indices).to_manifold();
        if manifold.is_empty() {
            tracing::warn!(
                "compose: shape {} is not a valid manifold, skipping subtraction",
                i
            );
            return Ok(scaled_passthrough(&merge_meshes(welded), base_scale, 0));
        }
        combined = Some(match combined {
            Some(existing) => existing.union(&manifold),
            None => manifold,
        });
    }
    let Some(manifold) = combined else {
        return Err(ComposeError::EmptyBase);
    };

    let base_transform = Transform {
        scale: base_scale,
        ..Transform::new()
    };
    let base = apply_transform(Part::new("base", manifold), &base_transform);

    let mut tool: Option<Part> = None;
    for (i, position) in spheres.iter().enumerate() {
        let t = apply_transform(
            Part::sphere(&format!("sphere_{}", i), sphere.radius, sphere.segments),
            &Transform {
                position: *position,
                rotation: [0.0; 3],
                scale: sphere.scale,
            },
        );
        tool = Some(match tool {
            Some(existing) => existing.union(&t),
            None => t,
        });
    }

    let result = match &tool {
        Some(tool) => base.difference(tool),
        None => base,
    };

    let mesh = result.to_mesh();
    let positions = mesh.vertices();
    let indices = mesh.indices();
    if positions.is_empty() || indices.is_empty() {
        return Err(ComposeError::EmptyResult);
    }

    let solid = MeshData {
        positions: positions.to_vec(),
        normals: None,
        indices: indices.to_vec(),
    }
    .flat_shaded();

    tracing::info!(
        "compose: {} shapes minus {} spheres -> {} triangles",
        welded.len(),
        spheres.len(),
        solid.triangle_count()
    );

    Ok(Composition {
        mesh: solid,
        subtracted: true,
        sphere_count: spheres.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cube;
    use glam::Vec3;

    #[test]
    fn test_empty_base_rejected() {
        let err = compose(&MeshData::new(), &[[0.0; 3]], [1.0; 3], &SphereSettings::default())
            .unwrap_err();
        assert!(matches!(err, ComposeError::EmptyBase));
    }

    #[test]
    fn test_invalid_sphere_rejected() {
        let bad = SphereSettings {
            radius: 0.0,
            ..Default::default()
        };
        let err = compose(&cube(1.0), &[], [1.0; 3], &bad).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidSphereRadius(_)));

        let coarse = SphereSettings {
            segments: 2,
            ..Default::default()
        };
        let err = compose(&cube(1.0), &[], [1.0; 3], &coarse).unwrap_err();
        assert!(matches!(err, ComposeError::TooFewSphereSegments(2)));
    }

    #[test]
    fn test_open_surface_passes_through_scaled() {
        let mut open = cube(2.0);
        open.indices.truncate(6);
        let out = compose(&open, &[[0.0; 3]], [2.0, 2.0, 2.0], &SphereSettings::default()).unwrap();
        assert!(!out.subtracted);
        assert_eq!(out.mesh.triangle_count(), 2);
        let aabb = out.mesh.aabb().unwrap();
        assert_eq!(aabb.max.z, 2.0);
    }

    #[test]
    fn test_touching_shapes_judged_separately() {
        // two boxes sharing a face: welding them together would leave
        // edges used four times
        let left = cube(1.0);
        let right = cube(1.0).transformed(Vec3::ONE, Vec3::new(1.0, 0.0, 0.0));
        let merged = merge_meshes(&[left.clone(), right.clone()]);
        assert!(!MeshValidator::new(&merged.welded()).is_closed());

        let out = compose_shapes(&[left, right], &[], [1.0; 3], &SphereSettings::default()).unwrap();
        assert_eq!(out.subtracted, cfg!(feature = "csg"));
        let aabb = out.mesh.aabb().unwrap();
        assert!((aabb.size() - Vec3::new(2.0, 1.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_all_empty_shapes_rejected() {
        let err = compose_shapes(&[MeshData::new(), MeshData::new()], &[], [1.0; 3], &SphereSettings::default())
            .unwrap_err();
        assert!(matches!(err, ComposeError::EmptyBase));
    }

    #[cfg(feature = "csg")]
    #[test]
    fn test_sphere_subtraction_changes_cube() {
        let base = cube(4.0);
        let sphere = SphereSettings::default();
        let out = compose(&base, &[[2.0, 2.0, 2.0]], [1.0; 3], &sphere).unwrap();
        assert!(out.subtracted);
        assert_eq!(out.sphere_count, 1);
        // the bitten corner adds faces to a 12-triangle box
        assert!(out.mesh.triangle_count() > 12);

        let aabb = out.mesh.aabb().unwrap();
        assert!((aabb.size() - Vec3::splat(4.0)).length() < 1e-3);
        assert!(MeshValidator::new(&out.mesh).are_indices_in_range());
    }

    #[cfg(feature = "csg")]
    #[test]
    fn test_no_spheres_keeps_scaled_base() {
        let out = compose(&cube(1.0), &[], [2.0, 2.0, 2.0], &SphereSettings::default()).unwrap();
        assert!(out.subtracted);
        let aabb = out.mesh.aabb().unwrap();
        assert!((aabb.size() - Vec3::splat(2.0)).length() < 1e-4);
    }
}
