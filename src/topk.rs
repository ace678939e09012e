use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Result, SearchError};

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredCandidate {
    pub identifier: PathBuf,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new(identifier: impl Into<PathBuf>, score: f64) -> Self {
        Self { identifier: identifier.into(), score }
    }
}

/// Bounded list of the `k` best candidates, kept sorted by descending score.
///
/// Insertion is O(k): the candidate goes in front of the first entry with a
/// strictly lower score, so equal scores keep their arrival order.
#[derive(Clone, Debug)]
pub struct TopK {
    k: usize,
    entries: Vec<ScoredCandidate>,
}

impl TopK {
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(SearchError::InvalidConfig("top-k must be at least 1".into()));
        }
        Ok(Self { k, entries: Vec::with_capacity(k) })
    }

    /// Offers a candidate. Returns whether it was retained.
    pub fn offer(&mut self, candidate: ScoredCandidate) -> bool {
        let pos = self.entries.iter().position(|e| e.score < candidate.score);
        match pos {
            Some(i) => {
                if self.entries.len() == self.k { self.entries.pop(); }
                self.entries.insert(i, candidate);
                true
            }
            None if self.entries.len() < self.k => {
                self.entries.push(candidate);
                true
            }
            None => false,
        }
    }

    /// Lowest retained score once the list is full.
    pub fn threshold(&self) -> Option<f64> {
        if self.entries.len() == self.k { self.entries.last().map(|e| e.score) } else { None }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn as_slice(&self) -> &[ScoredCandidate] { &self.entries }

    pub fn into_vec(self) -> Vec<ScoredCandidate> { self.entries }
}

/// A `TopK` behind a shared handle for callers that insert from several
/// threads. The whole offer runs under the lock.
#[derive(Clone, Debug)]
pub struct SharedTopK {
    inner: Arc<Mutex<TopK>>,
}

impl SharedTopK {
    pub fn new(k: usize) -> Result<Self> {
        Ok(Self { inner: Arc::new(Mutex::new(TopK::new(k)?)) })
    }

    pub fn offer(&self, candidate: ScoredCandidate) -> bool {
        self.inner.lock().offer(candidate)
    }

    pub fn snapshot(&self) -> Vec<ScoredCandidate> {
        self.inner.lock().as_slice().to_vec()
    }
}
