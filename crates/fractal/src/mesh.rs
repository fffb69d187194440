//! CPU-side mesh buffers and primitive generation

use std::collections::HashMap;

use glam::Vec3;

/// Indexed triangle mesh. Positions and normals are flat xyz triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    /// Same length as `positions` when present
    pub normals: Option<Vec<f32>>,
    pub indices: Vec<u32>,
}

/// Line segment list: every two points form one segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineData {
    pub positions: Vec<f32>,
}

impl LineData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty mesh that will carry normals
    pub fn with_normals() -> Self {
        Self {
            positions: Vec::new(),
            normals: Some(Vec::new()),
            indices: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(
            self.positions[i * 3],
            self.positions[i * 3 + 1],
            self.positions[i * 3 + 2],
        )
    }

    /// Append a vertex and return its index. The normal is dropped on meshes without normals.
    pub fn push_vertex(&mut self, p: Vec3, n: Vec3) -> u32 {
        let idx = self.vertex_count() as u32;
        self.positions.extend_from_slice(&[p.x, p.y, p.z]);
        if let Some(normals) = self.normals.as_mut() {
            normals.extend_from_slice(&[n.x, n.y, n.z]);
        }
        idx
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Area-weighted vertex normals from the triangle list
    pub fn compute_vertex_normals(&self) -> Vec<f32> {
        let mut acc = vec![Vec3::ZERO; self.vertex_count()];
        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.position(i0);
            let face = (self.position(i1) - p0).cross(self.position(i2) - p0);
            acc[i0] += face;
            acc[i1] += face;
            acc[i2] += face;
        }
        acc.into_iter()
            .flat_map(|n| {
                let n = n.normalize_or_zero();
                [n.x, n.y, n.z]
            })
            .collect()
    }

    /// Fill in normals if the mesh has none
    pub fn ensure_normals(&mut self) {
        if self.normals.is_none() {
            self.normals = Some(self.compute_vertex_normals());
        }
    }

    /// Merge vertices with bit-identical positions; normals are dropped.
    pub fn welded(&self) -> MeshData {
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::new();
        let mut remap = Vec::with_capacity(self.vertex_count());
        let mut positions = Vec::new();

        for i in 0..self.vertex_count() {
            let p = &self.positions[i * 3..i * 3 + 3];
            // -0.0 and 0.0 are the same point
            let key = [
                (p[0] + 0.0).to_bits(),
                (p[1] + 0.0).to_bits(),
                (p[2] + 0.0).to_bits(),
            ];
            let next = (positions.len() / 3) as u32;
            let idx = *lookup.entry(key).or_insert_with(|| {
                positions.extend_from_slice(p);
                next
            });
            remap.push(idx);
        }

        let indices = self.indices.iter().map(|&i| remap[i as usize]).collect();
        MeshData {
            positions,
            normals: None,
            indices,
        }
    }

    /// Split every triangle into its own vertices with a flat face normal
    pub fn flat_shaded(&self) -> MeshData {
        let mut out = MeshData::with_normals();
        out.positions.reserve(self.indices.len() * 3);
        out.indices.reserve(self.indices.len());

        for tri in self.indices.chunks_exact(3) {
            let p0 = self.position(tri[0] as usize);
            let p1 = self.position(tri[1] as usize);
            let p2 = self.position(tri[2] as usize);
            let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
            let a = out.push_vertex(p0, normal);
            let b = out.push_vertex(p1, normal);
            let c = out.push_vertex(p2, normal);
            out.push_triangle(a, b, c);
        }
        out
    }

    /// Scale then translate every position
    pub fn transformed(&self, scale: Vec3, offset: Vec3) -> MeshData {
        let positions = self
            .positions
            .chunks_exact(3)
            .flat_map(|p| {
                let v = Vec3::new(p[0], p[1], p[2]) * scale + offset;
                [v.x, v.y, v.z]
            })
            .collect();
        let normals = self.normals.as_ref().map(|normals| {
            // non-uniform scale: transform by the inverse-transpose (diagonal here)
            let inv = Vec3::ONE / scale;
            normals
                .chunks_exact(3)
                .flat_map(|n| {
                    let v = (Vec3::new(n[0], n[1], n[2]) * inv).normalize_or_zero();
                    [v.x, v.y, v.z]
                })
                .collect()
        });
        MeshData {
            positions,
            normals,
            indices: self.indices.clone(),
        }
    }

    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_positions(&self.positions)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        if positions.len() < 3 {
            return None;
        }
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in positions.chunks_exact(3) {
            let v = Vec3::new(p[0], p[1], p[2]);
            min = min.min(v);
            max = max.max(v);
        }
        Some(Self { min, max })
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

// ── Primitive generation ──

/// Axis-aligned cube centred on the origin, 4 vertices per face
pub fn cube(size: f32) -> MeshData {
    let h = size * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-h, -h, h), Vec3::new(h, -h, h), Vec3::new(h, h, h), Vec3::new(-h, h, h)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(h, -h, -h), Vec3::new(-h, -h, -h), Vec3::new(-h, h, -h), Vec3::new(h, h, -h)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(h, -h, h), Vec3::new(h, -h, -h), Vec3::new(h, h, -h), Vec3::new(h, h, h)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-h, -h, -h), Vec3::new(-h, -h, h), Vec3::new(-h, h, h), Vec3::new(-h, h, -h)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-h, h, h), Vec3::new(h, h, h), Vec3::new(h, h, -h), Vec3::new(-h, h, -h)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-h, -h, -h), Vec3::new(h, -h, -h), Vec3::new(h, -h, h), Vec3::new(-h, -h, h)], Vec3::NEG_Y),
    ];

    let mut mesh = MeshData::with_normals();
    for (quad, normal) in &faces {
        let base = mesh.vertex_count() as u32;
        for v in quad {
            mesh.push_vertex(*v, *normal);
        }
        mesh.push_triangle(base, base + 1, base + 2);
        mesh.push_triangle(base, base + 2, base + 3);
    }
    mesh
}

/// Square grid on the XZ plane, `divisions` cells per side
pub fn grid_lines(size: f32, divisions: u32) -> LineData {
    let half = size * 0.5;
    let step = size / divisions.max(1) as f32;
    let mut positions = Vec::with_capacity((divisions as usize + 1) * 12);

    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        positions.extend_from_slice(&[-half, 0.0, k, half, 0.0, k]);
        positions.extend_from_slice(&[k, 0.0, -half, k, 0.0, half]);
    }
    LineData { positions }
}
