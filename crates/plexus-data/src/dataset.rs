//! Page-page graph dataset.
//!
//! A dataset is an undirected, unweighted graph over pages plus a target
//! table mapping each page id to its categorical page type. Both are built
//! once and read-only afterwards. External string ids resolve to internal
//! positional indices ("ilocs") through an injective lookup.

use crate::PAGE_TYPES;
use ndarray::Array2;
use petgraph::graph::{NodeIndex, UnGraph};
use plexus_core::{PlexusError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::path::Path;

/// Undirected page graph with per-node feature rows.
///
/// Node ilocs are petgraph node indices, assigned in insertion order; the
/// feature matrix row `r` belongs to iloc `r`.
#[derive(Debug, Clone)]
pub struct PageGraph {
    graph: UnGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    features: Array2<f32>,
}

impl PageGraph {
    /// Builds a graph from page ids, an edge list over those ids, and an
    /// optional feature matrix (one row per id, in id order).
    ///
    /// Without features, identity features are synthesized so that every
    /// node is distinguishable by its own one-hot row.
    pub fn new(
        ids: Vec<String>,
        edges: &[(String, String)],
        features: Option<Array2<f32>>,
    ) -> Result<Self> {
        let mut graph = UnGraph::with_capacity(ids.len(), edges.len());
        let mut index = HashMap::with_capacity(ids.len());

        for id in ids {
            let node = graph.add_node(id.clone());
            if index.insert(id.clone(), node).is_some() {
                return Err(PlexusError::dataset(format!("duplicate page id '{id}'")));
            }
        }

        for (a, b) in edges {
            let na = *index
                .get(a)
                .ok_or_else(|| PlexusError::unknown_node(a.clone()))?;
            let nb = *index
                .get(b)
                .ok_or_else(|| PlexusError::unknown_node(b.clone()))?;
            graph.add_edge(na, nb, ());
        }

        let n = graph.node_count();
        let features = match features {
            Some(f) => {
                if f.nrows() != n {
                    return Err(PlexusError::dataset(format!(
                        "feature matrix has {} rows for {} nodes",
                        f.nrows(),
                        n
                    )));
                }
                f
            }
            None => Array2::eye(n),
        };

        Ok(Self {
            graph,
            index,
            features,
        })
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Feature dimension per node.
    pub fn feature_dim(&self) -> usize {
        self.features.ncols()
    }

    /// Positional index of an external id, if present.
    pub fn iloc(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|n| n.index())
    }

    /// External id at a positional index.
    pub fn id_at(&self, iloc: usize) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(iloc))
            .map(|s| s.as_str())
    }

    /// Ids in iloc order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|s| s.as_str())
    }

    /// Per-node feature matrix, row `r` = iloc `r`.
    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    /// Dense binary adjacency over ilocs (symmetric, no implicit self-loops).
    pub fn adjacency(&self) -> Array2<f32> {
        let n = self.node_count();
        let mut a = Array2::zeros((n, n));
        for edge in self.graph.edge_indices() {
            if let Some((s, t)) = self.graph.edge_endpoints(edge) {
                a[[s.index(), t.index()]] = 1.0;
                a[[t.index(), s.index()]] = 1.0;
            }
        }
        a
    }
}

/// Mapping from page id to its categorical page type.
#[derive(Debug, Clone, Default)]
pub struct TargetTable {
    ids: Vec<String>,
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl TargetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row. Duplicate ids break the injective id → row lookup
    /// and are rejected.
    pub fn push(&mut self, id: impl Into<String>, label: impl Into<String>) -> Result<()> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(PlexusError::dataset(format!(
                "duplicate target row for id '{id}'"
            )));
        }
        self.index.insert(id.clone(), self.ids.len());
        self.ids.push(id);
        self.labels.push(label.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row ids in insertion order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label of an id, if the id has a row.
    pub fn label_of(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(|&i| self.labels[i].as_str())
    }

    /// (id, label) at a row position.
    pub fn row(&self, i: usize) -> Option<(&str, &str)> {
        if i < self.ids.len() {
            Some((self.ids[i].as_str(), self.labels[i].as_str()))
        } else {
            None
        }
    }
}

/// A graph plus its target table.
#[derive(Debug, Clone)]
pub struct PageDataset {
    pub graph: PageGraph,
    pub targets: TargetTable,
}

impl PageDataset {
    /// Loads a dataset from CSV files.
    ///
    /// - `targets`: header `id,page_type`, one row per page; defines the
    ///   node set.
    /// - `edges`: header `id_1,id_2`; endpoints must appear in `targets`.
    /// - `features`: optional, header `id,f0,f1,...`; one row per page.
    pub fn from_csv(
        edges_path: impl AsRef<Path>,
        targets_path: impl AsRef<Path>,
        features_path: Option<&Path>,
    ) -> Result<Self> {
        let mut targets = TargetTable::new();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(targets_path.as_ref())?;
        for record in reader.records() {
            let record = record?;
            let id = record
                .get(0)
                .ok_or_else(|| PlexusError::dataset("target row missing id column"))?;
            let label = record
                .get(1)
                .ok_or_else(|| PlexusError::dataset("target row missing page_type column"))?;
            targets.push(id, label)?;
        }
        if targets.is_empty() {
            return Err(PlexusError::dataset("target table is empty"));
        }

        let mut edges = Vec::new();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(edges_path.as_ref())?;
        for record in reader.records() {
            let record = record?;
            let a = record
                .get(0)
                .ok_or_else(|| PlexusError::dataset("edge row missing id_1 column"))?;
            let b = record
                .get(1)
                .ok_or_else(|| PlexusError::dataset("edge row missing id_2 column"))?;
            edges.push((a.to_string(), b.to_string()));
        }

        let features = match features_path {
            Some(path) => Some(Self::read_features(path, &targets)?),
            None => None,
        };

        let graph = PageGraph::new(targets.ids().to_vec(), &edges, features)?;
        log::info!(
            "loaded dataset: {} pages, {} edges, {} feature dims",
            graph.node_count(),
            graph.edge_count(),
            graph.feature_dim()
        );
        Ok(Self { graph, targets })
    }

    fn read_features(path: &Path, targets: &TargetTable) -> Result<Array2<f32>> {
        let mut rows: HashMap<String, Vec<f32>> = HashMap::new();
        let mut dim = None;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        for record in reader.records() {
            let record = record?;
            let id = record
                .get(0)
                .ok_or_else(|| PlexusError::dataset("feature row missing id column"))?
                .to_string();
            let values: Vec<f32> = record
                .iter()
                .skip(1)
                .map(|v| {
                    v.parse::<f32>().map_err(|_| {
                        PlexusError::dataset(format!("non-numeric feature value '{v}' for '{id}'"))
                    })
                })
                .collect::<Result<_>>()?;
            match dim {
                None => dim = Some(values.len()),
                Some(d) if d != values.len() => {
                    return Err(PlexusError::dataset(format!(
                        "feature row for '{id}' has {} values, expected {d}",
                        values.len()
                    )));
                }
                _ => {}
            }
            rows.insert(id, values);
        }

        let dim = dim.ok_or_else(|| PlexusError::dataset("feature table is empty"))?;
        let mut features = Array2::zeros((targets.len(), dim));
        for (i, id) in targets.ids().iter().enumerate() {
            let row = rows
                .get(id)
                .ok_or_else(|| PlexusError::dataset(format!("no feature row for '{id}'")))?;
            for (j, v) in row.iter().enumerate() {
                features[[i, j]] = *v;
            }
        }
        Ok(features)
    }

    /// Generates a seeded planted-partition dataset.
    ///
    /// Nodes are assigned round-robin to `num_classes` page types; same-type
    /// pairs connect with probability `intra_p`, cross-type pairs with
    /// `inter_p`. Features are a noisy one-hot encoding of the type, so the
    /// classes are learnable from both structure and features.
    pub fn synthetic(
        num_classes: usize,
        nodes_per_class: usize,
        feature_dim: usize,
        intra_p: f64,
        inter_p: f64,
        seed: u64,
    ) -> Result<Self> {
        if num_classes == 0 || nodes_per_class == 0 {
            return Err(PlexusError::dataset(
                "synthetic dataset needs at least one class and one node",
            ));
        }
        if feature_dim < num_classes {
            return Err(PlexusError::dataset(format!(
                "feature_dim {feature_dim} must be >= num_classes {num_classes}"
            )));
        }

        let n = num_classes * nodes_per_class;
        let mut rng = StdRng::seed_from_u64(seed);

        let ids: Vec<String> = (0..n).map(|i| format!("page_{i:04}")).collect();
        let class_of = |i: usize| i % num_classes;

        let mut features = Array2::zeros((n, feature_dim));
        for i in 0..n {
            for j in 0..feature_dim {
                let mean = if j % num_classes == class_of(i) { 1.0 } else { 0.0 };
                features[[i, j]] = mean + (rng.random::<f32>() - 0.5) * 0.2;
            }
        }

        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let p = if class_of(i) == class_of(j) {
                    intra_p
                } else {
                    inter_p
                };
                if rng.random::<f64>() < p {
                    edges.push((ids[i].clone(), ids[j].clone()));
                }
            }
        }

        let mut targets = TargetTable::new();
        for (i, id) in ids.iter().enumerate() {
            targets.push(id.clone(), page_type_name(class_of(i)))?;
        }

        let graph = PageGraph::new(ids, &edges, Some(features))?;
        Ok(Self { graph, targets })
    }
}

/// Human-readable page-type label for a synthetic class index.
fn page_type_name(class: usize) -> String {
    PAGE_TYPES
        .get(class)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("type_{class}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_id_rejected() {
        let ids = vec!["a".to_string(), "a".to_string()];
        let err = PageGraph::new(ids, &[], None).unwrap_err();
        assert!(matches!(err, PlexusError::Dataset(_)));
    }

    #[test]
    fn test_unknown_edge_endpoint_rejected() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let edges = vec![("a".to_string(), "c".to_string())];
        let err = PageGraph::new(ids, &edges, None).unwrap_err();
        assert!(matches!(err, PlexusError::UnknownNode(_)));
    }

    #[test]
    fn test_identity_features_by_default() {
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let graph = PageGraph::new(ids, &[], None).unwrap();
        assert_eq!(graph.feature_dim(), 3);
        assert_eq!(graph.features()[[1, 1]], 1.0);
        assert_eq!(graph.features()[[1, 0]], 0.0);
    }

    #[test]
    fn test_adjacency_is_symmetric_binary() {
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let edges = vec![
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "c".to_string()),
        ];
        let graph = PageGraph::new(ids, &edges, None).unwrap();
        let a = graph.adjacency();
        assert_eq!(a[[0, 1]], 1.0);
        assert_eq!(a[[1, 0]], 1.0);
        assert_eq!(a[[0, 2]], 0.0);
        assert_eq!(a[[0, 0]], 0.0);
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let d1 = PageDataset::synthetic(3, 10, 8, 0.5, 0.05, 7).unwrap();
        let d2 = PageDataset::synthetic(3, 10, 8, 0.5, 0.05, 7).unwrap();
        assert_eq!(d1.graph.edge_count(), d2.graph.edge_count());
        assert_eq!(d1.graph.features(), d2.graph.features());
        assert_eq!(d1.targets.labels(), d2.targets.labels());
    }

    #[test]
    fn test_target_table_lookup() {
        let mut table = TargetTable::new();
        table.push("a", "tvshow").unwrap();
        table.push("b", "company").unwrap();
        assert_eq!(table.label_of("a"), Some("tvshow"));
        assert_eq!(table.label_of("z"), None);
        assert!(table.push("a", "government").is_err());
    }
}
