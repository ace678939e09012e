use std::path::PathBuf;

/// Errors produced while extracting, scoring or searching histograms.
///
/// Per-candidate failures (`Io`, `Decode`, `EmptyImage`) only exclude the
/// affected file from a corpus search. Everything else aborts the search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {} has no pixels", path.display())]
    EmptyImage { path: PathBuf },

    /// Two histograms with different bin counts were compared. Only happens
    /// when histograms of different depths are mixed.
    #[error("histogram shape mismatch: expected {expected} bins, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("no .jpg images found in {}", dir.display())]
    EmptyCorpus { dir: PathBuf },

    #[error("query image {} could not be processed: {source}", path.display())]
    QueryExtraction {
        path: PathBuf,
        #[source]
        source: Box<SearchError>,
    },

    #[error("bin counts for {} must be finite and non-negative", path.display())]
    InvalidBinCounts { path: PathBuf },

    #[error("quantization depth must be within 1..=8, got {0}")]
    InvalidDepth(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("worker thread for shard {0} panicked")]
    WorkerPanicked(usize),

    #[error("search was cancelled after scoring {scored} images")]
    Cancelled { scored: usize },
}

impl SearchError {
    /// Whether this error should abort a whole search rather than skip a
    /// single corpus file.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SearchError::Io { .. } | SearchError::Decode { .. } | SearchError::EmptyImage { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
