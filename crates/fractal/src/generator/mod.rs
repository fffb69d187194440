//! Recursive branch generators.
//!
//! Every variant walks the same binary tree: each step scales the size by
//! [`FACTOR`] and fans out two children at `angle ± BRANCH_ANGLE`. Variants
//! differ only in what they emit per child.

mod sierpinski;
mod tree;

pub use sierpinski::sierpinski;
pub use tree::{generate_branches, generate_path_segments, generate_sphere_positions, PathSegment};

use shared::{Branch, GenerationParams, ParamsResult, Position};

/// Per-generation size ratio (0.5·√2)
pub const FACTOR: f64 = 0.5 * std::f64::consts::SQRT_2;
/// Angular offset of each child from its parent's heading
pub const BRANCH_ANGLE: f64 = std::f64::consts::FRAC_PI_4;
/// Sizes below this stop the recursion
pub const MIN_SIZE: f64 = 1.0;
/// Default z offset of sphere markers from the skeleton plane
pub const SPHERE_Z_OFFSET: f64 = 2.5;

/// One parent→child edge handed to the emitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub origin: Position,
    pub child: Position,
    pub size: f64,
    pub angle: f64,
}

fn offset(position: Position, distance: f64, angle: f64) -> Position {
    [
        position[0] + distance * angle.cos(),
        position[1] + distance * angle.sin(),
        position[2],
    ]
}

/// Walk the tree below `(size, position, angle)` and emit one item per child.
///
/// `level` counts generations already emitted; nothing is produced once it
/// reaches `iterations` or `size` drops below [`MIN_SIZE`]. Output order is
/// left child, right child, then the left subtree, then the right subtree.
pub fn grow<T, F>(
    iterations: u32,
    size: f64,
    position: Position,
    angle: f64,
    level: u32,
    emit: &F,
) -> Vec<T>
where
    F: Fn(&Step) -> T,
{
    if level >= iterations || size < MIN_SIZE {
        return Vec::new();
    }

    let next = size * FACTOR;
    let steps = [angle + BRANCH_ANGLE, angle - BRANCH_ANGLE].map(|a| Step {
        origin: position,
        child: offset(position, next, a),
        size: next,
        angle: a,
    });

    let mut out: Vec<T> = steps.iter().map(emit).collect();
    for step in &steps {
        out.extend(grow(iterations, step.size, step.child, step.angle, level + 1, emit));
    }
    out
}

/// Validated entry point for the tree family
#[derive(Debug, Clone, PartialEq)]
pub struct TreeGenerator {
    iterations: u32,
    size: f64,
    position: Position,
    angle: f64,
}

impl TreeGenerator {
    pub fn new(params: &GenerationParams) -> ParamsResult<Self> {
        params.validate()?;
        Ok(Self {
            iterations: params.iterations,
            size: params.size,
            position: params.position,
            angle: 0.0,
        })
    }

    /// Initial heading in radians (0 grows towards +x)
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn branches(&self) -> Vec<Branch> {
        generate_branches(self.iterations, self.size, self.position, self.angle, 0)
    }

    pub fn path_segments(&self) -> Vec<PathSegment> {
        generate_path_segments(self.iterations, self.size, self.position, self.angle, 0)
    }

    pub fn sphere_positions(&self, z_offset: f64) -> Vec<Position> {
        generate_sphere_positions(
            self.iterations,
            self.size,
            self.position,
            self.angle,
            0,
            z_offset,
        )
    }
}
