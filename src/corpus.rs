use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};

/// Only files with exactly this suffix take part in a search.
pub const IMAGE_EXTENSION: &str = ".jpg";

pub fn is_candidate_name(name: &str) -> bool {
    name.ends_with(IMAGE_EXTENSION)
}

/// Lists the candidate images directly inside `dir`, sorted by file name.
/// Subdirectories are not descended into.
pub fn scan_dir(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let io_err = |source: std::io::Error| SearchError::Io { path: dir.to_path_buf(), source };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_dir() { continue; }
        let name = entry.file_name();
        match name.to_str() {
            Some(n) if is_candidate_name(n) => names.push(n.to_owned()),
            Some(_) => {}
            None => debug!("ignoring non UTF-8 file name {:?}", name),
        }
    }
    names.sort();
    debug!("found {} candidate images in {}", names.len(), dir.display());
    Ok(names.into_iter().map(|n| dir.join(n)).collect())
}

/// Splits `items` into at most `num_shards` contiguous, non-empty shards.
///
/// Each shard gets `len / shards` items and the last one also takes the
/// remainder. When there are fewer items than requested shards, one shard
/// per item is produced instead of empty shards.
pub fn shard<T>(items: Vec<T>, num_shards: usize) -> Result<Vec<Vec<T>>> {
    if num_shards == 0 {
        return Err(SearchError::InvalidConfig("shard count must be at least 1".into()));
    }
    let n = items.len();
    if n == 0 { return Ok(Vec::new()); }
    let shards = num_shards.min(n);
    let size = n / shards;

    let mut out = Vec::with_capacity(shards);
    let mut rest = items.into_iter();
    for i in 0..shards {
        let take = if i == shards - 1 { n - size * (shards - 1) } else { size };
        out.push(rest.by_ref().take(take).collect());
    }
    Ok(out)
}

/// Scans `dir` and shards its candidate images. An empty listing is an
/// error rather than an empty result.
pub fn shard_dir(dir: impl AsRef<Path>, num_shards: usize) -> Result<Vec<Vec<PathBuf>>> {
    let dir = dir.as_ref();
    let paths = scan_dir(dir)?;
    if paths.is_empty() {
        return Err(SearchError::EmptyCorpus { dir: dir.to_path_buf() });
    }
    shard(paths, num_shards)
}
