//! Instance arena: many transforms sharing one template mesh

use std::sync::Arc;

use shared::{Branch, Transform};

use crate::mesh::MeshData;
use crate::scene::{Color, Material, Scene, SceneObject};

/// One placed copy of the template, in generation order
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRecord {
    pub transform: Transform,
    pub spin: [f64; 3],
    pub material: Material,
}

#[derive(Debug, Clone)]
pub struct InstanceArena {
    template: Arc<MeshData>,
    records: Vec<InstanceRecord>,
}

/// Resolve palette names; unknown entries fall back to white.
pub fn parse_palette(names: &[String]) -> Vec<Color> {
    names
        .iter()
        .map(|name| {
            Color::parse(name).unwrap_or_else(|| {
                tracing::warn!("palette: unknown colour '{}', using white", name);
                Color::WHITE
            })
        })
        .collect()
}

impl InstanceArena {
    /// Place the template at every branch, scaled by `size · scale_factor`.
    /// Colours cycle through `palette` by index.
    pub fn from_branches(
        template: Arc<MeshData>,
        branches: &[Branch],
        scale_factor: f64,
        spin: [f64; 3],
        palette: &[Color],
        wireframe: bool,
    ) -> Self {
        let records = branches
            .iter()
            .enumerate()
            .map(|(i, branch)| {
                let color = if palette.is_empty() {
                    Color::WHITE
                } else {
                    palette[i % palette.len()]
                };
                InstanceRecord {
                    transform: Transform::at(branch.position)
                        .with_uniform_scale(branch.size * scale_factor),
                    spin,
                    material: Material::standard(color).with_wireframe(wireframe),
                }
            })
            .collect();
        Self { template, records }
    }

    pub fn template(&self) -> &Arc<MeshData> {
        &self.template
    }

    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Group node holding one mesh object per record
    pub fn to_group(&self, name: &str, group_spin: [f64; 3]) -> SceneObject {
        let children = self
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                SceneObject::mesh(
                    format!("{}_{}", name, i),
                    Arc::clone(&self.template),
                    record.material.clone(),
                )
                .with_transform(record.transform.clone())
                .with_spin(record.spin)
            })
            .collect();
        SceneObject::group(name, children).with_spin(group_spin)
    }

    /// Swap the scene's group called `name` for this arena's contents
    pub fn apply_to_scene(&self, scene: &mut Scene, name: &str, group_spin: [f64; 3]) {
        tracing::debug!("instances: applying {} records to '{}'", self.len(), name);
        scene.replace(self.to_group(name, group_spin));
    }
}
