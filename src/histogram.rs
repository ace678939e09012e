use image::{io::Reader as ImageReader, DynamicImage, GenericImageView};
use log::debug;
use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};

/// Channel samples are widened to 16 bits before quantization, so an 8-bit
/// sample `v` is seen as `v * 257`.
const NATIVE_CHANNEL_BITS: u32 = 16;

pub const MIN_DEPTH: u8 = 1;
pub const MAX_DEPTH: u8 = 8;
pub const DEFAULT_DEPTH: u8 = 3;

/// Widens 8-bit samples to the 16-bit range, `v * 257`.
#[inline]
fn widen([r, g, b]: [u8; 3]) -> [u16; 3] {
    [r as u16 * 257, g as u16 * 257, b as u16 * 257]
}

/// Quantization depth: bits kept per color channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Depth(u8);

impl Depth {
    pub fn new(bits: u8) -> Result<Self> {
        if (MIN_DEPTH..=MAX_DEPTH).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(SearchError::InvalidDepth(bits as u32))
        }
    }

    pub fn bits(self) -> u8 { self.0 }

    /// Number of histogram bins, `2^(3 * depth)`.
    pub fn bin_count(self) -> usize { 1usize << (3 * self.0 as usize) }

    /// Packs the reduced red, green and blue samples into one bin index,
    /// red being the most significant `depth` bits.
    #[inline]
    pub fn bin_index(self, red: u16, green: u16, blue: u16) -> usize {
        let shift = NATIVE_CHANNEL_BITS - self.0 as u32;
        let d = self.0 as usize;
        let r = (red >> shift) as usize;
        let g = (green >> shift) as usize;
        let b = (blue >> shift) as usize;
        (r << (2 * d)) | (g << d) | b
    }
}

impl Default for Depth {
    fn default() -> Self { Self(DEFAULT_DEPTH) }
}

/// Normalized color histogram of one image. Bins are non-negative and sum
/// to 1.0 up to rounding.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    identifier: PathBuf,
    depth: Depth,
    bins: Vec<f64>,
}

impl Histogram {
    /// Opens and decodes the image at `path` and builds its histogram.
    pub fn extract(path: impl AsRef<Path>, depth: Depth) -> Result<Self> {
        let path = path.as_ref();
        // Sniff the header so images without a matching extension still decode.
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| SearchError::Io { path: path.to_path_buf(), source })?;
        let img = reader
            .decode()
            .map_err(|source| SearchError::Decode { path: path.to_path_buf(), source })?;
        Self::from_image(path, &img, depth)
    }

    /// Builds the histogram of an already decoded image.
    pub fn from_image(identifier: impl Into<PathBuf>, img: &DynamicImage, depth: Depth) -> Result<Self> {
        let identifier = identifier.into();
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(SearchError::EmptyImage { path: identifier });
        }
        debug!("extracting {}x{} histogram for {} at depth {}", w, h, identifier.display(), depth.bits());

        let mut counts = vec![0.0f64; depth.bin_count()];
        let mut add = |[r, g, b]: [u16; 3]| counts[depth.bin_index(r, g, b)] += 1.0;
        let color = img.color();
        if color.bytes_per_pixel() > color.channel_count() {
            // 16-bit or float samples keep their full precision.
            img.to_rgb16().pixels().for_each(|p| add(p.0));
        } else if let Some(rgb) = img.as_rgb8() {
            rgb.pixels().for_each(|p| add(widen(p.0)));
        } else {
            img.to_rgb8().pixels().for_each(|p| add(widen(p.0)));
        }
        Self::from_counts(identifier, depth, counts)
    }

    /// Normalizes raw per-bin counts into a histogram.
    pub fn from_counts(identifier: impl Into<PathBuf>, depth: Depth, mut counts: Vec<f64>) -> Result<Self> {
        let identifier = identifier.into();
        if counts.len() != depth.bin_count() {
            return Err(SearchError::ShapeMismatch { expected: depth.bin_count(), actual: counts.len() });
        }
        if counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(SearchError::InvalidBinCounts { path: identifier });
        }
        let total: f64 = counts.iter().sum();
        if total == 0.0 {
            return Err(SearchError::EmptyImage { path: identifier });
        }
        for c in &mut counts { *c /= total; }
        Ok(Self { identifier, depth, bins: counts })
    }

    pub fn identifier(&self) -> &Path { &self.identifier }

    pub fn depth(&self) -> Depth { self.depth }

    pub fn bins(&self) -> &[f64] { &self.bins }

    pub fn len(&self) -> usize { self.bins.len() }

    pub fn is_empty(&self) -> bool { self.bins.is_empty() }
}
