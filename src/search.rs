use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::corpus;
use crate::error::{Result, SearchError};
use crate::histogram::{Depth, Histogram, DEFAULT_DEPTH};
use crate::similarity::similarity;
use crate::topk::{ScoredCandidate, TopK};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_WORKERS: usize = 16;

// Scored events buffered per shard on the fan-in channel.
const EVENTS_PER_SHARD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bits kept per color channel, 1..=8.
    pub depth: u8,
    /// Number of matches to report.
    pub top_k: usize,
    /// Upper bound on the number of shards processed in parallel.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { depth: DEFAULT_DEPTH, top_k: DEFAULT_TOP_K, workers: DEFAULT_WORKERS }
    }
}

/// Default configuration, optionally sizing the worker pool to the number
/// of logical CPUs.
pub fn default_config(auto_workers: bool) -> Config {
    let mut cfg = Config::default();
    if auto_workers { cfg.workers = num_cpus::get().max(1); }
    cfg
}

impl Config {
    pub fn validate(&self) -> Result<Depth> {
        let depth = Depth::new(self.depth)?;
        if self.top_k == 0 {
            return Err(SearchError::InvalidConfig("top_k must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(SearchError::InvalidConfig("workers must be at least 1".into()));
        }
        Ok(depth)
    }
}

/// Cooperative cancellation flag shared with a `Searcher`. Once set, the
/// searcher stops handing out new images and every search returns
/// `SearchError::Cancelled`.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self { Self::default() }

    pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst); }

    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// A corpus file excluded from scoring.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct SearchReport {
    pub query: PathBuf,
    /// Best matches, highest similarity first.
    pub matches: Vec<ScoredCandidate>,
    /// Number of corpus images that were scored.
    pub scored: usize,
    pub skipped: Vec<SkippedImage>,
    pub elapsed: Duration,
}

enum Extracted {
    Histogram(Histogram),
    Failed(SkippedImage),
}

enum ShardEvent {
    Scored(ScoredCandidate),
    Skipped(SkippedImage),
}

// Producers stop on either an external cancel or a fatal error raised by a
// sibling shard during the current run.
#[derive(Clone)]
struct StopSignal {
    external: CancelHandle,
    internal: CancelHandle,
}

impl StopSignal {
    fn is_set(&self) -> bool { self.external.is_cancelled() || self.internal.is_cancelled() }
}

pub struct Searcher {
    config: Config,
    depth: Depth,
    cancel: CancelHandle,
}

impl Searcher {
    pub fn new(config: Config) -> Result<Self> {
        let depth = config.validate()?;
        Ok(Self { config, depth, cancel: CancelHandle::new() })
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn cancel_handle(&self) -> CancelHandle { self.cancel.clone() }

    /// Ranks the `.jpg` images directly inside `corpus_dir` by similarity
    /// to `query`.
    pub fn search(&self, query: impl AsRef<Path>, corpus_dir: impl AsRef<Path>) -> Result<SearchReport> {
        let started = Instant::now();
        let query = query.as_ref();
        let corpus_dir = corpus_dir.as_ref();
        info!("Query image: {}", query.display());
        info!("Corpus directory: {}", corpus_dir.display());
        let query_hist = self.extract_query(query)?;
        let shards = corpus::shard_dir(corpus_dir, self.config.workers)?;
        self.run(query_hist, shards, started)
    }

    /// Ranks an explicit list of candidate images. An empty list yields an
    /// empty report.
    pub fn search_paths(&self, query: impl AsRef<Path>, candidates: Vec<PathBuf>) -> Result<SearchReport> {
        let started = Instant::now();
        let query = query.as_ref();
        info!("Query image: {}", query.display());
        let query_hist = self.extract_query(query)?;
        let shards = corpus::shard(candidates, self.config.workers)?;
        self.run(query_hist, shards, started)
    }

    fn extract_query(&self, query: &Path) -> Result<Histogram> {
        Histogram::extract(query, self.depth).map_err(|e| SearchError::QueryExtraction {
            path: query.to_path_buf(),
            source: Box::new(e),
        })
    }

    fn run(&self, query: Histogram, shards: Vec<Vec<PathBuf>>, started: Instant) -> Result<SearchReport> {
        let total: usize = shards.iter().map(Vec::len).sum();
        info!(
            "Scoring {} images in {} shards (depth={}, top_k={})",
            total,
            shards.len(),
            self.depth.bits(),
            self.config.top_k
        );

        let mut top = TopK::new(self.config.top_k)?;
        let query_path = query.identifier().to_path_buf();
        let query = Arc::new(query);
        let stop = StopSignal { external: self.cancel.clone(), internal: CancelHandle::new() };
        let (event_tx, event_rx) = bounded::<ShardEvent>(shards.len().max(1) * EVENTS_PER_SHARD);

        let mut producers = Vec::with_capacity(shards.len());
        let mut consumers = Vec::with_capacity(shards.len());
        for (shard_id, paths) in shards.into_iter().enumerate() {
            let (hist_tx, hist_rx) = shard_channel();
            let depth = self.depth;
            let stop_p = stop.clone();
            producers.push(thread::spawn(move || produce(shard_id, paths, depth, hist_tx, stop_p)));

            let query_c = Arc::clone(&query);
            let events = event_tx.clone();
            let stop_c = stop.clone();
            consumers.push(thread::spawn(move || consume(&query_c, hist_rx, events, stop_c)));
        }
        drop(event_tx);

        // Sole writer of the top-k list; ends once every consumer has hung up.
        let mut scored = 0usize;
        let mut skipped = Vec::new();
        for event in event_rx {
            match event {
                ShardEvent::Scored(candidate) => {
                    scored += 1;
                    top.offer(candidate);
                }
                ShardEvent::Skipped(image) => skipped.push(image),
            }
        }

        let mut fatal: Option<SearchError> = None;
        for (shard_id, handle) in consumers.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => { fatal.get_or_insert(e); }
                Err(_) => { fatal.get_or_insert(SearchError::WorkerPanicked(shard_id)); }
            }
        }
        for (shard_id, handle) in producers.into_iter().enumerate() {
            if handle.join().is_err() {
                fatal.get_or_insert(SearchError::WorkerPanicked(shard_id));
            }
        }
        if let Some(e) = fatal { return Err(e); }
        if self.cancel.is_cancelled() {
            warn!("Search cancelled after scoring {} images", scored);
            return Err(SearchError::Cancelled { scored });
        }

        let elapsed = started.elapsed();
        info!("Scored {} images, skipped {}, in {:?}", scored, skipped.len(), elapsed);
        Ok(SearchReport { query: query_path, matches: top.into_vec(), scored, skipped, elapsed })
    }
}

// Rendezvous channel: a producer hands over a histogram only when its
// consumer is ready, so at most two dense histograms exist per shard.
fn shard_channel() -> (Sender<Extracted>, Receiver<Extracted>) {
    bounded(0)
}

fn produce(shard_id: usize, paths: Vec<PathBuf>, depth: Depth, tx: Sender<Extracted>, stop: StopSignal) {
    debug!("shard {} started with {} images", shard_id, paths.len());
    for path in paths {
        if stop.is_set() {
            debug!("shard {} stopping early", shard_id);
            return;
        }
        let item = match Histogram::extract(&path, depth) {
            Ok(h) => Extracted::Histogram(h),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                Extracted::Failed(SkippedImage { path, reason: e.to_string() })
            }
        };
        if tx.send(item).is_err() { return; }
    }
    debug!("shard {} finished", shard_id);
}

fn consume(query: &Histogram, rx: Receiver<Extracted>, events: Sender<ShardEvent>, stop: StopSignal) -> Result<()> {
    for item in rx {
        let event = match item {
            Extracted::Histogram(h) => match similarity(query, &h) {
                Ok(score) => ShardEvent::Scored(ScoredCandidate::new(h.identifier(), score)),
                Err(e) => {
                    stop.internal.cancel();
                    return Err(e);
                }
            },
            Extracted::Failed(image) => ShardEvent::Skipped(image),
        };
        if events.send(event).is_err() { break; }
    }
    Ok(())
}
