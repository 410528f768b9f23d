//! Deduplication of merged torrent results by info_hash.

use std::collections::HashSet;

use super::TorrentResult;

/// Drop results whose info_hash was already seen.
///
/// The first occurrence wins and the relative order of survivors is kept,
/// so feeding provider lists in provider order gives the earlier provider
/// precedence.
pub fn dedup_by_info_hash(results: Vec<TorrentResult>) -> Vec<TorrentResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(results.len());
    results
        .into_iter()
        .filter(|r| seen.insert(r.info_hash.clone()))
        .collect()
}
