//! Data model shared between the generator library, the CLI and the wasm bindings.

use serde::{Deserialize, Serialize};

mod config;
mod params;

pub use config::*;
pub use params::*;

/// World-space coordinate (x, y, z)
pub type Position = [f64; 3];

/// One node of a branching tree: its edge length and where it sits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub size: f64,
    pub position: Position,
}

/// Object transformation. Rotation is XYZ Euler in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    pub fn at(position: Position) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    pub fn with_uniform_scale(mut self, scale: f64) -> Self {
        self.scale = [scale, scale, scale];
        self
    }

    pub fn is_identity(&self) -> bool {
        self.position == [0.0; 3] && self.rotation == [0.0; 3] && self.scale == [1.0; 3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_new_is_identity() {
        assert!(Transform::new().is_identity());
        assert!(Transform::default().is_identity());
    }

    #[test]
    fn test_transform_at_keeps_unit_scale() {
        let t = Transform::at([1.0, 2.0, 3.0]).with_uniform_scale(0.5);
        assert_eq!(t.position, [1.0, 2.0, 3.0]);
        assert_eq!(t.scale, [0.5, 0.5, 0.5]);
        assert!(!t.is_identity());
    }

    #[test]
    fn test_branch_serialization_roundtrip() {
        let branch = Branch {
            size: 14.142135623730951,
            position: [10.0, 10.0, 0.0],
        };
        let json = serde_json::to_string(&branch).unwrap();
        assert!(json.contains("\"size\""));
        let back: Branch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, branch);
    }
}
