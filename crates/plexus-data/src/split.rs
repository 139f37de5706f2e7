//! Train/validation/test partitioning and one-hot label encoding.
//!
//! The sampler carves a fixed-size training subset out of the target table,
//! then a fixed-size validation subset out of the remainder; everything left
//! is test. The one-hot encoder is fit once on the full label domain before
//! splitting and shared by all three subsets, so target matrix widths always
//! agree regardless of which classes land in which subset.

use crate::dataset::TargetTable;
use ndarray::Array2;
use plexus_core::{PlexusError, Result, SplitConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

/// One-hot encoder over a fixed label vocabulary.
///
/// Class order is first-appearance order in the labels the encoder was fit
/// on, which makes encodings deterministic for a given table.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Fits the vocabulary on an ordered stream of labels.
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut classes = Vec::new();
        let mut index = HashMap::new();
        for label in labels {
            if !index.contains_key(label) {
                index.insert(label.to_string(), classes.len());
                classes.push(label.to_string());
            }
        }
        Self { classes, index }
    }

    /// Number of distinct classes.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Class names in encoding order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Column index of a label, if it is in the vocabulary.
    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Encodes labels as a one-hot matrix, one row per label.
    ///
    /// A label outside the fitted vocabulary is an error, never a silent
    /// zero row.
    pub fn transform<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> Result<Array2<f32>> {
        let labels: Vec<&str> = labels.into_iter().collect();
        let mut onehot = Array2::zeros((labels.len(), self.classes.len()));
        for (row, label) in labels.iter().enumerate() {
            let col = self.class_index(label).ok_or_else(|| {
                PlexusError::split(format!("label '{label}' not in encoder vocabulary"))
            })?;
            onehot[[row, col]] = 1.0;
        }
        Ok(onehot)
    }
}

/// One split subset: sampled ids plus their one-hot targets (row-aligned).
#[derive(Debug, Clone)]
pub struct Subset {
    pub ids: Vec<String>,
    pub targets: Array2<f32>,
}

impl Subset {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The three disjoint subsets plus the shared encoder that produced their
/// target matrices.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Subset,
    pub val: Subset,
    pub test: Subset,
    pub encoder: LabelEncoder,
}

/// Partitions the target table into train/val/test by seeded random
/// sampling.
///
/// Sizes are exactly (`train_size`, `val_size`, remainder); a table smaller
/// than `train_size + val_size` is an error. No stratification is applied.
pub fn split(table: &TargetTable, config: &SplitConfig, seed: u64) -> Result<Split> {
    let needed = config.train_size + config.val_size;
    if table.len() < needed {
        return Err(PlexusError::split(format!(
            "target table has {} rows, need at least {needed} for train+val quotas",
            table.len()
        )));
    }

    let encoder = LabelEncoder::fit(table.labels().iter().map(|s| s.as_str()));

    let mut order: Vec<usize> = (0..table.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let (train_rows, rest) = order.split_at(config.train_size);
    let (val_rows, test_rows) = rest.split_at(config.val_size);

    let subset = |rows: &[usize]| -> Result<Subset> {
        let ids: Vec<String> = rows.iter().map(|&i| table.ids()[i].clone()).collect();
        let targets = encoder.transform(rows.iter().map(|&i| table.labels()[i].as_str()))?;
        Ok(Subset { ids, targets })
    };

    let result = Split {
        train: subset(train_rows)?,
        val: subset(val_rows)?,
        test: subset(test_rows)?,
        encoder,
    };
    log::info!(
        "split target table: train={} val={} test={} ({} classes)",
        result.train.len(),
        result.val.len(),
        result.test.len(),
        result.encoder.num_classes()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn balanced_table(rows: usize, classes: usize) -> TargetTable {
        let mut table = TargetTable::new();
        for i in 0..rows {
            table
                .push(format!("page_{i:04}"), format!("type_{}", i % classes))
                .unwrap();
        }
        table
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        // 600 rows, 3 balanced classes: quotas give exactly 200/200/200.
        let table = balanced_table(600, 3);
        let config = SplitConfig::default();
        let s = split(&table, &config, 42).unwrap();

        assert_eq!(s.train.len(), 200);
        assert_eq!(s.val.len(), 200);
        assert_eq!(s.test.len(), 200);

        let train: HashSet<_> = s.train.ids.iter().collect();
        let val: HashSet<_> = s.val.ids.iter().collect();
        let test: HashSet<_> = s.test.ids.iter().collect();
        assert!(train.is_disjoint(&val));
        assert!(train.is_disjoint(&test));
        assert!(val.is_disjoint(&test));
    }

    #[test]
    fn test_shared_encoder_width() {
        // The shared vocabulary keeps all three target matrices at the full
        // class count even when a subset happens to miss a class.
        let table = balanced_table(600, 3);
        let s = split(&table, &SplitConfig::default(), 42).unwrap();
        assert_eq!(s.train.targets.ncols(), 3);
        assert_eq!(s.val.targets.ncols(), 3);
        assert_eq!(s.test.targets.ncols(), 3);
        // Each row is exactly one-hot.
        for row in s.train.targets.rows() {
            assert_eq!(row.sum(), 1.0);
        }
    }

    #[test]
    fn test_insufficient_rows_rejected() {
        let table = balanced_table(300, 3);
        let err = split(&table, &SplitConfig::default(), 42).unwrap_err();
        assert!(matches!(err, PlexusError::Split(_)));
    }

    #[test]
    fn test_split_is_seeded() {
        let table = balanced_table(450, 3);
        let a = split(&table, &SplitConfig::default(), 7).unwrap();
        let b = split(&table, &SplitConfig::default(), 7).unwrap();
        let c = split(&table, &SplitConfig::default(), 8).unwrap();
        assert_eq!(a.train.ids, b.train.ids);
        assert_ne!(a.train.ids, c.train.ids);
    }

    #[test]
    fn test_transform_rejects_unknown_label() {
        let encoder = LabelEncoder::fit(["tvshow", "company"]);
        assert_eq!(encoder.num_classes(), 2);
        assert!(encoder.transform(["politician"]).is_err());
    }

    #[test]
    fn test_encoder_order_is_first_appearance() {
        let encoder = LabelEncoder::fit(["b", "a", "b", "c"]);
        assert_eq!(encoder.classes(), &["b", "a", "c"]);
        assert_eq!(encoder.class_index("c"), Some(2));
    }
}
