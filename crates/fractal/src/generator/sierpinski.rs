use shared::{Branch, Position};

/// Five-way subdivision: each step halves the size and moves to the top and
/// the four side-neighbours. Leaves carry the halved size of their last step.
pub fn sierpinski(size: f64, iterations: u32, position: Position) -> Vec<Branch> {
    let half = size / 2.0;
    if iterations == 0 {
        return vec![Branch {
            size: half,
            position,
        }];
    }

    let [x, y, z] = position;
    let offsets: [Position; 5] = [
        [x, y + half, z],
        [x + half, y, z],
        [x - half, y, z],
        [x, y, z + half],
        [x, y, z - half],
    ];

    offsets
        .iter()
        .flat_map(|p| sierpinski(half, iterations - 1, *p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_iterations_single_leaf() {
        let leaves = sierpinski(20.0, 0, [0.0, 12.0, 0.0]);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].size, 10.0);
        assert_eq!(leaves[0].position, [0.0, 12.0, 0.0]);
    }

    #[test]
    fn test_leaf_count_is_power_of_five() {
        for n in 0..5u32 {
            assert_eq!(sierpinski(64.0, n, [0.0; 3]).len(), 5usize.pow(n));
        }
    }

    #[test]
    fn test_first_subdivision_offsets() {
        let leaves = sierpinski(20.0, 1, [0.0, 0.0, 0.0]);
        let positions: Vec<Position> = leaves.iter().map(|b| b.position).collect();
        assert_eq!(
            positions,
            vec![
                [0.0, 10.0, 0.0],
                [10.0, 0.0, 0.0],
                [-10.0, 0.0, 0.0],
                [0.0, 0.0, 10.0],
                [0.0, 0.0, -10.0],
            ]
        );
        assert!(leaves.iter().all(|b| b.size == 5.0));
    }
}
