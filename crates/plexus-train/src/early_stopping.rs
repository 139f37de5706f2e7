//! Early stopping on a monitored validation metric.
//!
//! Tracks the best value of a higher-is-better metric (validation accuracy
//! here), snapshots the model weights whenever it improves, and signals a
//! stop once the metric has gone `patience` consecutive epochs without
//! improvement. The best snapshot can then be restored into the live
//! parameter store.

use candle_core::Tensor;
use candle_nn::VarMap;
use plexus_core::Result;

pub struct EarlyStopping {
    patience: usize,
    best_value: f32,
    best_epoch: usize,
    stale_epochs: usize,
    snapshot: Option<Vec<(String, Tensor)>>,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_value: f32::NEG_INFINITY,
            best_epoch: 0,
            stale_epochs: 0,
            snapshot: None,
        }
    }

    pub fn patience(&self) -> usize {
        self.patience
    }

    /// (epoch, value) of the best observation so far.
    pub fn best(&self) -> Option<(usize, f32)> {
        self.snapshot.as_ref().map(|_| (self.best_epoch, self.best_value))
    }

    /// Records one epoch's metric. Returns `true` when training should stop.
    pub fn observe(&mut self, epoch: usize, value: f32, varmap: &VarMap) -> Result<bool> {
        if value > self.best_value {
            self.best_value = value;
            self.best_epoch = epoch;
            self.stale_epochs = 0;
            self.snapshot = Some(snapshot_weights(varmap)?);
            Ok(false)
        } else {
            self.stale_epochs += 1;
            Ok(self.stale_epochs >= self.patience)
        }
    }

    /// Copies the best-seen weights back into the parameter store. A no-op
    /// if nothing was ever observed.
    pub fn restore_best(&self, varmap: &VarMap) -> Result<()> {
        if let Some(snapshot) = &self.snapshot {
            let data = varmap.data().lock().unwrap();
            for (name, tensor) in snapshot {
                if let Some(var) = data.get(name) {
                    var.set(tensor)?;
                }
            }
        }
        Ok(())
    }
}

fn snapshot_weights(varmap: &VarMap) -> Result<Vec<(String, Tensor)>> {
    let data = varmap.data().lock().unwrap();
    let mut snapshot = Vec::with_capacity(data.len());
    for (name, var) in data.iter() {
        snapshot.push((name.clone(), var.as_tensor().copy()?));
    }
    Ok(snapshot)
}
