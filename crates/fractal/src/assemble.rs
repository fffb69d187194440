//! Path segments → extruded shapes → one combined surface

use shared::ExtrudeSettings;

use crate::error::ExtrudeError;
use crate::extrude::{extrude_outline, segment_outline, validate_settings};
use crate::generator::PathSegment;
use crate::mesh::MeshData;

/// One extruded shape per segment, in segment order
pub fn extrude_shapes(
    segments: &[PathSegment],
    settings: &ExtrudeSettings,
) -> Result<Vec<MeshData>, ExtrudeError> {
    validate_settings(settings)?;
    Ok(segments
        .iter()
        .map(|segment| {
            let outline = segment_outline(segment, settings.thickness);
            extrude_outline(&outline, settings.depth, settings.steps)
        })
        .collect())
}

/// Extrude every segment and merge the results into one buffer.
///
/// An empty segment list yields an empty surface.
pub fn assemble(
    segments: &[PathSegment],
    settings: &ExtrudeSettings,
) -> Result<MeshData, ExtrudeError> {
    let shapes = extrude_shapes(segments, settings)?;
    let combined = merge_meshes(&shapes);
    tracing::debug!(
        "assemble: {} segments -> {} vertices, {} triangles",
        segments.len(),
        combined.vertex_count(),
        combined.triangle_count()
    );
    Ok(combined)
}

/// Concatenate meshes, offsetting each part's indices by the vertices before it.
///
/// If any part carries normals the result does too; parts without normals
/// get them computed from their own faces.
pub fn merge_meshes(parts: &[MeshData]) -> MeshData {
    let with_normals = parts.iter().any(|p| p.normals.is_some());
    let vertex_total: usize = parts.iter().map(|p| p.positions.len()).sum();
    let index_total: usize = parts.iter().map(|p| p.indices.len()).sum();

    let mut merged = MeshData {
        positions: Vec::with_capacity(vertex_total),
        normals: with_normals.then(|| Vec::with_capacity(vertex_total)),
        indices: Vec::with_capacity(index_total),
    };

    for part in parts {
        let base = merged.vertex_count() as u32;
        merged.positions.extend_from_slice(&part.positions);
        if let Some(normals) = merged.normals.as_mut() {
            match &part.normals {
                Some(n) => normals.extend_from_slice(n),
                None => normals.extend(part.compute_vertex_normals()),
            }
        }
        merged.indices.extend(part.indices.iter().map(|&i| i + base));
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use kurbo::{Line, Point};

    fn quad(offset: f32, with_normals: bool) -> MeshData {
        let mut m = if with_normals {
            MeshData::with_normals()
        } else {
            MeshData::new()
        };
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            m.push_vertex(Vec3::new(x + offset, y, 0.0), Vec3::Z);
        }
        m.push_triangle(0, 1, 2);
        m.push_triangle(0, 2, 3);
        m
    }

    #[test]
    fn test_merge_two_quads_offsets_indices() {
        let merged = merge_meshes(&[quad(0.0, true), quad(5.0, true)]);
        assert_eq!(merged.vertex_count(), 8);
        assert_eq!(merged.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(merged.position(4), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(merged.normals.as_ref().unwrap().len(), 24);
    }

    #[test]
    fn test_merge_heterogeneous_attributes() {
        let merged = merge_meshes(&[quad(0.0, true), quad(2.0, false)]);
        let normals = merged.normals.unwrap();
        assert_eq!(normals.len(), 24);
        // computed normals of the second quad face +Z as well
        assert_eq!(&normals[12..15], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_merge_without_normals_stays_bare() {
        let merged = merge_meshes(&[quad(0.0, false), quad(1.0, false)]);
        assert!(merged.normals.is_none());
        assert_eq!(merged.vertex_count(), 8);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_meshes(&[]).is_empty());
    }

    #[test]
    fn test_assemble_vertex_total() {
        let segments = vec![
            Line::new(Point::new(0.0, 0.0), Point::new(3.0, 0.0)),
            Line::new(Point::new(0.0, 0.0), Point::new(0.0, 3.0)),
            Line::new(Point::new(0.0, 3.0), Point::new(2.0, 5.0)),
        ];
        let surface = assemble(&segments, &ExtrudeSettings::default()).unwrap();
        assert_eq!(surface.vertex_count(), 3 * 24);
        assert_eq!(surface.triangle_count(), 3 * 12);
        assert_eq!(*surface.indices.iter().max().unwrap(), 3 * 24 - 1);
    }

    #[test]
    fn test_shapes_merge_into_assembled_surface() {
        let segments = vec![
            Line::new(Point::new(0.0, 0.0), Point::new(3.0, 0.0)),
            Line::new(Point::new(3.0, 0.0), Point::new(3.0, 3.0)),
        ];
        let settings = ExtrudeSettings::default();
        let shapes = extrude_shapes(&segments, &settings).unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(merge_meshes(&shapes), assemble(&segments, &settings).unwrap());
    }

    #[test]
    fn test_assemble_empty_input() {
        let surface = assemble(&[], &ExtrudeSettings::default()).unwrap();
        assert!(surface.is_empty());
    }

    #[test]
    fn test_assemble_rejects_bevel() {
        let settings = ExtrudeSettings {
            bevel_enabled: true,
            ..Default::default()
        };
        assert!(assemble(&[], &settings).is_err());
    }
}
