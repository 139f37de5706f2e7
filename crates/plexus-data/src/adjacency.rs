//! Symmetric adjacency normalization with self-loops.
//!
//! Computes `D^{-1/2} (A + I)ᵀ D^{-1/2}` as a dense matrix, the propagation
//! operator of Kipf & Welling GCNs. The full-batch generator performs the
//! equivalent normalization on its own tensors; this module is the
//! reference path for architectures that take the operator directly.

use crate::dataset::PageGraph;
use ndarray::{Array1, Array2, Axis};

/// Normalizes a page graph's adjacency.
pub fn normalize(graph: &PageGraph) -> Array2<f32> {
    normalize_matrix(graph.adjacency())
}

/// Normalizes any square binary adjacency matrix.
///
/// Steps: force the diagonal to 1 (`A + I - diag(A)`), take row sums as
/// degrees, and scale both sides by `D^{-1/2}`. A zero degree maps to a zero
/// scale factor instead of dividing by zero, so the operation is total.
pub fn normalize_matrix(mut a: Array2<f32>) -> Array2<f32> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols(), "adjacency must be square");

    for i in 0..n {
        a[[i, i]] = 1.0;
    }

    let degrees: Array1<f32> = a.sum_axis(Axis(1));
    let d_inv_sqrt: Array1<f32> = degrees.mapv(|d| if d > 0.0 { d.powf(-0.5) } else { 0.0 });

    let at = a.t();
    Array2::from_shape_fn((n, n), |(i, j)| d_inv_sqrt[i] * at[[i, j]] * d_inv_sqrt[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::PageGraph;

    fn path_graph(n: usize) -> PageGraph {
        let ids: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
        let edges: Vec<(String, String)> = (0..n - 1)
            .map(|i| (format!("p{i}"), format!("p{}", i + 1)))
            .collect();
        PageGraph::new(ids, &edges, None).unwrap()
    }

    #[test]
    fn test_normalized_is_symmetric_with_positive_diagonal() {
        let graph = path_graph(5);
        let norm = normalize(&graph);
        for i in 0..5 {
            assert!(norm[[i, i]] > 0.0, "diagonal entry {i} must be positive");
            for j in 0..5 {
                assert!((norm[[i, j]] - norm[[j, i]]).abs() < 1e-6);
                assert!(norm[[i, j]] >= 0.0);
            }
        }
    }

    #[test]
    fn test_all_isolated_nodes_do_not_divide_by_zero() {
        // A = I: ten nodes, each only self-adjacent. A + I keeps the
        // diagonal at 1, so the result is exactly the identity and every
        // off-diagonal term is a defined zero.
        let norm = normalize_matrix(Array2::eye(10));
        for i in 0..10 {
            for j in 0..10 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((norm[[i, j]] - expected).abs() < 1e-6);
                assert!(norm[[i, j]].is_finite());
            }
        }
    }

    #[test]
    fn test_two_node_edge_values() {
        // Two connected nodes: every entry of (A+I) is 1, degrees are 2,
        // so every normalized entry is 1/2.
        let ids = vec!["a".to_string(), "b".to_string()];
        let edges = vec![("a".to_string(), "b".to_string())];
        let graph = PageGraph::new(ids, &edges, None).unwrap();
        let norm = normalize(&graph);
        for i in 0..2 {
            for j in 0..2 {
                assert!((norm[[i, j]] - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_zero_row_guard() {
        // A hand-built matrix with a zeroed diagonal entry forced back to 1
        // still normalizes; a fully zero row cannot occur after self-loop
        // insertion but the guard keeps the helper total on raw input.
        let a = Array2::zeros((3, 3));
        let norm = normalize_matrix(a);
        assert!(norm.iter().all(|v| v.is_finite()));
    }
}
