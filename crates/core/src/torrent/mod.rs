//! Torrent result model and the provider capability.
//!
//! A `TorrentProvider` answers "find torrents for this movie or episode";
//! the aggregator fans a query out across many of them. Parsing helpers
//! for info hashes, quality labels and magnet links live in `parse`.

mod dedup;
mod parse;
mod types;

pub use dedup::dedup_by_info_hash;
pub use parse::{
    build_magnet_url, info_hash_from_magnet, parse_info_hash, quality_from_name,
    resolution_from_name,
};
pub use types::*;
