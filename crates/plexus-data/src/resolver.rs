//! External id → positional index resolution.

use crate::dataset::PageGraph;
use candle_core::{Device, Tensor};
use plexus_core::{PlexusError, Result};

/// Resolves external page ids to an index tensor of shape `(1, len(ids))`,
/// preserving input order.
///
/// An id absent from the graph is a lookup error; resolution never skips or
/// reorders entries.
pub fn node_indices<S: AsRef<str>>(
    graph: &PageGraph,
    ids: &[S],
    device: &Device,
) -> Result<Tensor> {
    let mut ilocs = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.as_ref();
        let iloc = graph
            .iloc(id)
            .ok_or_else(|| PlexusError::unknown_node(id))?;
        ilocs.push(iloc as u32);
    }
    let n = ilocs.len();
    Ok(Tensor::from_vec(ilocs, (1, n), device)?)
}
