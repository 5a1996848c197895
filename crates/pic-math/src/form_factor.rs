//! Particle shape (form factor) functions.
//!
//! Weights are separable: the weight of stencil node `(i, j, k)` is
//! `c[0][i] * c[1][j] * c[2][k]`, and each axis row sums to one.

use pic_types::grid::InterpolationOrder;

/// Cloud-in-cell weights for nodes 0 and +1 at fractional offset `f`.
#[inline]
pub fn linear_weights(f: f64) -> [f64; 2] {
    [1.0 - f, f]
}

/// Triangular-shaped-cloud weights for nodes -1, 0, +1 at signed offset
/// `d` from the nearest node.
#[inline]
pub fn quadratic_weights(d: f64) -> [f64; 3] {
    let lo = 0.5 - d;
    let hi = 0.5 + d;
    [0.5 * lo * lo, 0.75 - d * d, 0.5 * hi * hi]
}

/// A shape function of fixed order, evaluated for one particle.
pub trait ShapeFunction: Copy + Default + Send + Sync + 'static {
    /// Anchor convention the grid index query must use.
    const ORDER: InterpolationOrder;
    /// Offset of the first stencil node from the anchor.
    const FIRST_NODE: isize;

    fn compute(offset: [f64; 3]) -> Self;

    fn axis_weights(&self, axis: usize) -> &[f64];

    /// Visit every stencil node with its offset from the anchor and its
    /// full 3D weight.
    fn for_each_node<F: FnMut([isize; 3], f64)>(&self, f: F);
}

#[inline]
fn visit_stencil<const W: usize, F: FnMut([isize; 3], f64)>(
    c: &[[f64; W]; 3],
    first: isize,
    mut f: F,
) {
    for i in 0..W {
        for j in 0..W {
            let wij = c[0][i] * c[1][j];
            for k in 0..W {
                f(
                    [first + i as isize, first + j as isize, first + k as isize],
                    wij * c[2][k],
                );
            }
        }
    }
}

/// Linear (CIC) shape function: 2 nodes per axis, 8 in total.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearShape {
    pub c: [[f64; 2]; 3],
}

impl ShapeFunction for LinearShape {
    const ORDER: InterpolationOrder = InterpolationOrder::Linear;
    const FIRST_NODE: isize = 0;

    fn compute(offset: [f64; 3]) -> Self {
        LinearShape {
            c: [
                linear_weights(offset[0]),
                linear_weights(offset[1]),
                linear_weights(offset[2]),
            ],
        }
    }

    fn axis_weights(&self, axis: usize) -> &[f64] {
        &self.c[axis]
    }

    fn for_each_node<F: FnMut([isize; 3], f64)>(&self, f: F) {
        visit_stencil(&self.c, Self::FIRST_NODE, f);
    }
}

/// Quadratic (TSC) shape function: 3 nodes per axis, 27 in total.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuadraticShape {
    pub c: [[f64; 3]; 3],
}

impl ShapeFunction for QuadraticShape {
    const ORDER: InterpolationOrder = InterpolationOrder::Quadratic;
    const FIRST_NODE: isize = -1;

    fn compute(offset: [f64; 3]) -> Self {
        QuadraticShape {
            c: [
                quadratic_weights(offset[0]),
                quadratic_weights(offset[1]),
                quadratic_weights(offset[2]),
            ],
        }
    }

    fn axis_weights(&self, axis: usize) -> &[f64] {
        &self.c[axis]
    }

    fn for_each_node<F: FnMut([isize; 3], f64)>(&self, f: F) {
        visit_stencil(&self.c, Self::FIRST_NODE, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_weights_endpoints() {
        assert_eq!(linear_weights(0.0), [1.0, 0.0]);
        let w = linear_weights(0.25);
        assert!((w[0] - 0.75).abs() < 1e-15);
        assert!((w[1] - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_quadratic_weights_centred() {
        let w = quadratic_weights(0.0);
        assert!((w[0] - 0.125).abs() < 1e-15);
        assert!((w[1] - 0.75).abs() < 1e-15);
        assert!((w[2] - 0.125).abs() < 1e-15);
    }

    #[test]
    fn test_quadratic_weights_at_cell_edge() {
        // At d = -0.5 the particle sits midway between nodes -1 and 0.
        let w = quadratic_weights(-0.5);
        assert!((w[0] - 0.5).abs() < 1e-15);
        assert!((w[1] - 0.5).abs() < 1e-15);
        assert!(w[2].abs() < 1e-15);
    }

    #[test]
    fn test_linear_stencil_has_eight_nodes_summing_to_one() {
        let shape = LinearShape::compute([0.3, 0.1, 0.4]);
        let mut count = 0;
        let mut total = 0.0;
        shape.for_each_node(|node, w| {
            assert!(node.iter().all(|&n| n == 0 || n == 1));
            count += 1;
            total += w;
        });
        assert_eq!(count, 8);
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_corner_weight_is_axis_product() {
        let shape = LinearShape::compute([0.3, 0.1, 0.4]);
        shape.for_each_node(|node, w| {
            if node == [1, 0, 1] {
                assert!((w - 0.3 * 0.9 * 0.4).abs() < 1e-15);
            }
        });
    }

    #[test]
    fn test_quadratic_stencil_has_twenty_seven_nodes() {
        let shape = QuadraticShape::compute([-0.2, 0.1, 0.4]);
        let mut count = 0;
        let mut total = 0.0;
        shape.for_each_node(|node, w| {
            assert!(node.iter().all(|&n| (-1..=1).contains(&n)));
            assert!(w >= 0.0);
            count += 1;
            total += w;
        });
        assert_eq!(count, 27);
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_orders_match_grid_convention() {
        assert_eq!(LinearShape::ORDER, InterpolationOrder::Linear);
        assert_eq!(QuadraticShape::ORDER, InterpolationOrder::Quadratic);
        assert_eq!(
            QuadraticShape::default().axis_weights(2).len(),
            InterpolationOrder::Quadratic.support_width()
        );
    }
}
