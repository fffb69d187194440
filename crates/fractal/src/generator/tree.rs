use kurbo::{Line, Point};
use shared::{Branch, Position};

use super::{grow, Step};

/// One skeleton edge in the XY plane
pub type PathSegment = Line;

/// Solid branch descriptors: size and centre of every child.
pub fn generate_branches(
    iterations: u32,
    size: f64,
    position: Position,
    angle: f64,
    level: u32,
) -> Vec<Branch> {
    grow(iterations, size, position, angle, level, &|s: &Step| Branch {
        size: s.size,
        position: s.child,
    })
}

/// Skeleton edges from each parent to its children, projected onto XY.
pub fn generate_path_segments(
    iterations: u32,
    size: f64,
    position: Position,
    angle: f64,
    level: u32,
) -> Vec<PathSegment> {
    grow(iterations, size, position, angle, level, &|s: &Step| {
        Line::new(
            Point::new(s.origin[0], s.origin[1]),
            Point::new(s.child[0], s.child[1]),
        )
    })
}

/// Sphere marker centres. Markers sit `z_offset` in front of the node they
/// annotate; the recursion itself stays on the skeleton plane.
pub fn generate_sphere_positions(
    iterations: u32,
    size: f64,
    position: Position,
    angle: f64,
    level: u32,
    z_offset: f64,
) -> Vec<Position> {
    grow(iterations, size, position, angle, level, &|s: &Step| {
        [s.child[0], s.child[1], s.child[2] + z_offset]
    })
}
