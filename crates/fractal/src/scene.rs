//! Render-scene data model consumed by the exporter

use std::sync::Arc;

use shared::{CameraSettings, Transform};

use crate::mesh::{LineData, MeshData};

/// Objects with this name are editor helpers and never exported
pub const HELPER_NAME: &str = "grid";

/// sRGB colour, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// CSS colour keyword or `#rrggbb`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            return u32::from_str_radix(hex, 16).ok().map(Self::from_hex);
        }
        let hex = match s.to_ascii_lowercase().as_str() {
            "white" => 0xffffff,
            "black" => 0x000000,
            "gray" | "grey" => 0x808080,
            "red" => 0xff0000,
            "blue" => 0x0000ff,
            "green" => 0x008000,
            "yellow" => 0xffff00,
            "orange" => 0xffa500,
            "purple" => 0x800080,
            _ => return None,
        };
        Some(Self::from_hex(hex))
    }

    /// Linear-light components, as glTF colour factors expect
    pub fn to_linear(self) -> [f32; 3] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shading {
    /// Lit, physically based
    #[default]
    Standard,
    /// Unlit
    Basic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub wireframe: bool,
    pub shading: Shading,
}

impl Material {
    pub fn standard(color: Color) -> Self {
        Self {
            color,
            wireframe: false,
            shading: Shading::Standard,
        }
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }
}

#[derive(Debug, Clone)]
pub enum ObjectKind {
    Group,
    Mesh {
        mesh: Arc<MeshData>,
        material: Material,
    },
    Lines {
        lines: Arc<LineData>,
        color: Color,
    },
    AmbientLight {
        color: Color,
        intensity: f32,
    },
    Camera(CameraSettings),
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub transform: Transform,
    /// Rotation added on every frame tick (radians)
    pub spin: [f64; 3],
    pub children: Vec<SceneObject>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::new(),
            spin: [0.0; 3],
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<SceneObject>) -> Self {
        Self {
            children,
            ..Self::new(name, ObjectKind::Group)
        }
    }

    pub fn mesh(name: impl Into<String>, mesh: Arc<MeshData>, material: Material) -> Self {
        Self::new(name, ObjectKind::Mesh { mesh, material })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_spin(mut self, spin: [f64; 3]) -> Self {
        self.spin = spin;
        self
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, ObjectKind::Mesh { .. })
    }

    fn find(&self, name: &str) -> Option<&SceneObject> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    fn count_meshes(&self) -> usize {
        usize::from(self.is_mesh()) + self.children.iter().map(|c| c.count_meshes()).sum::<usize>()
    }

    fn advance(&mut self) {
        for (r, s) in self.transform.rotation.iter_mut().zip(self.spin) {
            *r += s;
        }
        for child in &mut self.children {
            child.advance();
        }
    }
}

/// Ordered collection of top-level objects
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Depth-first lookup by name
    pub fn get_object_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find_map(|o| o.find(name))
    }

    /// Put `object` where the top-level object of the same name was, or append it
    pub fn replace(&mut self, object: SceneObject) {
        match self.objects.iter_mut().find(|o| o.name == object.name) {
            Some(slot) => *slot = object,
            None => self.objects.push(object),
        }
    }

    /// Detach every top-level object called `name`, remembering where each sat
    pub fn remove_by_name(&mut self, name: &str) -> Vec<(usize, SceneObject)> {
        let mut removed = Vec::new();
        let mut index = 0;
        let mut kept = Vec::with_capacity(self.objects.len());
        for object in self.objects.drain(..) {
            if object.name == name {
                removed.push((index, object));
            } else {
                kept.push(object);
            }
            index += 1;
        }
        self.objects = kept;
        removed
    }

    /// Re-insert objects taken by [`Scene::remove_by_name`] at their old slots
    pub fn restore(&mut self, removed: Vec<(usize, SceneObject)>) {
        for (index, object) in removed {
            let index = index.min(self.objects.len());
            self.objects.insert(index, object);
        }
    }

    /// Number of mesh objects anywhere in the tree
    pub fn mesh_count(&self) -> usize {
        self.objects.iter().map(|o| o.count_meshes()).sum()
    }

    /// One frame step: apply every object's spin
    pub fn tick(&mut self) {
        for object in &mut self.objects {
            object.advance();
        }
    }
}
