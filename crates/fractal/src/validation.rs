//! Mesh validation utilities.
//!
//! `MeshValidator` checks buffer integrity (strides, index range, unit
//! normals) and whether a welded mesh is a closed, consistently oriented
//! surface suitable for boolean operations.

use std::collections::HashMap;

use crate::mesh::{Aabb, MeshData};

/// Validator for `MeshData` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    /// Create a new validator for the given mesh.
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Check that the position buffer length is a multiple of 3.
    pub fn is_stride_valid(&self) -> bool {
        self.mesh.positions.len() % 3 == 0
    }

    /// Check that the index buffer length is a multiple of 3.
    pub fn is_index_stride_valid(&self) -> bool {
        self.mesh.indices.len() % 3 == 0
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.vertex_count() as u32;
        self.mesh.indices.iter().all(|&i| i < max_idx)
    }

    /// Normals, when present, match the position count.
    pub fn normals_match_positions(&self) -> bool {
        self.mesh
            .normals
            .as_ref()
            .map_or(true, |n| n.len() == self.mesh.positions.len())
    }

    /// Check that all vertex normals have unit length (within epsilon).
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        let Some(normals) = self.mesh.normals.as_ref() else {
            return true;
        };
        normals.chunks_exact(3).all(|n| {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            (len - 1.0).abs() <= epsilon
        })
    }

    pub fn aabb(&self) -> Option<Aabb> {
        self.mesh.aabb()
    }

    /// Every directed edge appears once and its reverse appears once.
    ///
    /// Only meaningful on welded meshes; unwelded buffers always fail.
    pub fn is_closed(&self) -> bool {
        if self.mesh.indices.is_empty() {
            return false;
        }
        let mut edges: HashMap<(u32, u32), u32> = HashMap::new();
        for tri in self.mesh.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                *edges.entry((a, b)).or_insert(0) += 1;
            }
        }
        edges
            .iter()
            .all(|(&(a, b), &count)| count == 1 && edges.get(&(b, a)) == Some(&1))
    }

    /// Buffer-layout checks required before the mesh can be indexed safely.
    pub fn validate_buffers(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.is_stride_valid() {
            errors.push(format!(
                "Position buffer length {} is not a multiple of 3",
                self.mesh.positions.len()
            ));
        }
        if !self.is_index_stride_valid() {
            errors.push(format!(
                "Index buffer length {} is not a multiple of 3",
                self.mesh.indices.len()
            ));
        }
        if !self.are_indices_in_range() {
            errors.push("Some indices are out of range".to_string());
        }
        if !self.normals_match_positions() {
            errors.push("Normal buffer length differs from position buffer".to_string());
        }
        errors
    }

    /// Run all integrity checks and return a list of failures.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = self.validate_buffers();
        if !self.are_normals_normalized(0.01) {
            errors.push("Some normals are not unit length".to_string());
        }
        errors
    }
}
