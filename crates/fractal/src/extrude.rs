use glam::Vec3;
use kurbo::{Point, Vec2};
use shared::ExtrudeSettings;

use crate::error::ExtrudeError;
use crate::generator::PathSegment;
use crate::mesh::MeshData;

/// Segments shorter than this have no usable direction
const MIN_SEGMENT_LENGTH: f64 = 1e-9;

// ── Extrude ─────────────────────────────────────────────────

pub fn validate_settings(settings: &ExtrudeSettings) -> Result<(), ExtrudeError> {
    if settings.bevel_enabled {
        return Err(ExtrudeError::BevelUnsupported);
    }
    if !settings.depth.is_finite() || settings.depth <= 0.0 {
        return Err(ExtrudeError::InvalidDepth(settings.depth));
    }
    if !settings.thickness.is_finite() || settings.thickness < 0.0 {
        return Err(ExtrudeError::InvalidThickness(settings.thickness));
    }
    Ok(())
}

/// Closed counter-clockwise outline around a segment.
///
/// Zero thickness gives the bare two-point loop `start → end → start`.
pub fn segment_outline(segment: &PathSegment, thickness: f64) -> Vec<Point> {
    if thickness <= 0.0 {
        return vec![segment.p0, segment.p1];
    }

    let d = segment.p1 - segment.p0;
    let len = d.hypot();
    let dir = if len < MIN_SEGMENT_LENGTH {
        Vec2::new(1.0, 0.0)
    } else {
        d / len
    };
    let side = Vec2::new(-dir.y, dir.x) * (thickness / 2.0);

    vec![
        segment.p0 - side,
        segment.p1 - side,
        segment.p1 + side,
        segment.p0 + side,
    ]
}

fn layer_z(depth: f64, layer: u32, steps: u32) -> f32 {
    if layer == steps {
        depth as f32
    } else {
        (depth * layer as f64 / steps as f64) as f32
    }
}

/// Sweep a CCW outline from z = 0 to z = `depth` in `steps` layers.
///
/// Walls get flat outward normals. Caps are fan-triangulated and only exist
/// for outlines with at least three points (convex outlines only).
pub fn extrude_outline(outline: &[Point], depth: f64, steps: u32) -> MeshData {
    let mut mesh = MeshData::with_normals();
    let n = outline.len();
    if n < 2 {
        return mesh;
    }
    let steps = steps.max(1);
    let at = |p: Point, z: f32| Vec3::new(p.x as f32, p.y as f32, z);

    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        let edge = b - a;
        let normal = Vec3::new(edge.y as f32, -edge.x as f32, 0.0).normalize_or_zero();

        for s in 0..steps {
            let z0 = layer_z(depth, s, steps);
            let z1 = layer_z(depth, s + 1, steps);
            let v0 = mesh.push_vertex(at(a, z0), normal);
            let v1 = mesh.push_vertex(at(b, z0), normal);
            let v2 = mesh.push_vertex(at(b, z1), normal);
            let v3 = mesh.push_vertex(at(a, z1), normal);
            mesh.push_triangle(v0, v1, v2);
            mesh.push_triangle(v0, v2, v3);
        }
    }

    if n >= 3 {
        let bottom = mesh.vertex_count() as u32;
        for p in outline {
            mesh.push_vertex(at(*p, layer_z(depth, 0, steps)), Vec3::NEG_Z);
        }
        for i in 1..(n as u32 - 1) {
            mesh.push_triangle(bottom, bottom + i + 1, bottom + i);
        }

        let top = mesh.vertex_count() as u32;
        for p in outline {
            mesh.push_vertex(at(*p, layer_z(depth, steps, steps)), Vec3::Z);
        }
        for i in 1..(n as u32 - 1) {
            mesh.push_triangle(top, top + i, top + i + 1);
        }
    }

    mesh
}

/// Extruded shape for one skeleton segment
pub fn extrude_segment(
    segment: &PathSegment,
    settings: &ExtrudeSettings,
) -> Result<MeshData, ExtrudeError> {
    validate_settings(settings)?;
    let outline = segment_outline(segment, settings.thickness);
    Ok(extrude_outline(&outline, settings.depth, settings.steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Line;

    fn unit_segment() -> PathSegment {
        Line::new(Point::new(0.0, 0.0), Point::new(4.0, 0.0))
    }

    #[test]
    fn test_rectangle_outline_is_ccw() {
        let outline = segment_outline(&unit_segment(), 1.0);
        assert_eq!(outline.len(), 4);
        assert_eq!(outline[0], Point::new(0.0, -0.5));
        assert_eq!(outline[2], Point::new(4.0, 0.5));

        // shoelace: positive area means counter-clockwise
        let area: f64 = (0..4)
            .map(|i| {
                let (a, b) = (outline[i], outline[(i + 1) % 4]);
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0;
        assert!((area - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_thickness_keeps_bare_segment() {
        let outline = segment_outline(&unit_segment(), 0.0);
        assert_eq!(outline, vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)]);

        let mesh = extrude_outline(&outline, 3.0, 1);
        // two opposite walls, no caps
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn test_extruded_rectangle_counts() {
        let settings = ExtrudeSettings::default();
        let mesh = extrude_segment(&unit_segment(), &settings).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);

        let aabb = mesh.aabb().unwrap();
        assert_eq!(aabb.min.z, 0.0);
        assert_eq!(aabb.max.z, 3.0);
    }

    #[test]
    fn test_steps_add_wall_layers() {
        let outline = segment_outline(&unit_segment(), 1.0);
        let mesh = extrude_outline(&outline, 3.0, 3);
        assert_eq!(mesh.vertex_count(), 4 * 4 * 3 + 8);
        // layers still weld into an 8-corner prism plus the intermediate rings
        assert_eq!(mesh.welded().vertex_count(), 4 * 4);
    }

    #[test]
    fn test_wall_normals_point_outward() {
        let mesh = extrude_outline(&segment_outline(&unit_segment(), 1.0), 1.0, 1);
        let normals = mesh.normals.as_ref().unwrap();
        // first wall runs along +x on the y = -0.5 side
        assert_eq!(&normals[0..3], &[0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_welded_prism_is_closed() {
        let mesh = extrude_outline(&segment_outline(&unit_segment(), 1.0), 2.0, 1).welded();
        assert_eq!(mesh.vertex_count(), 8);
        let validator = crate::validation::MeshValidator::new(&mesh);
        assert!(validator.is_closed());
    }

    #[test]
    fn test_settings_validation() {
        let bevel = ExtrudeSettings {
            bevel_enabled: true,
            ..Default::default()
        };
        assert!(matches!(validate_settings(&bevel), Err(ExtrudeError::BevelUnsupported)));

        let flat = ExtrudeSettings {
            depth: 0.0,
            ..Default::default()
        };
        assert!(matches!(validate_settings(&flat), Err(ExtrudeError::InvalidDepth(_))));

        let negative = ExtrudeSettings {
            thickness: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&negative),
            Err(ExtrudeError::InvalidThickness(_))
        ));
    }

    #[test]
    fn test_zero_length_segment_is_tolerated() {
        let point = Line::new(Point::new(1.0, 1.0), Point::new(1.0, 1.0));
        let mesh = extrude_segment(&point, &ExtrudeSettings::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert!(mesh.positions.iter().all(|v| v.is_finite()));
    }
}
