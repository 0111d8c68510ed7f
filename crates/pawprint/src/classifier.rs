//! Heuristic dominant-color classification.
//!
//! Downsamples the image to a fixed grid, sorts every pixel into one of six
//! coarse buckets with ordered threshold predicates, and reports the winning
//! color bucket as a tag when it clearly dominates. This is deliberately not
//! image recognition; it only has to be right often enough to pick a caption
//! pool.

use image::{imageops::FilterType, DynamicImage};

/// Square resolution the image is resampled to before scanning.
const SAMPLE_SIZE: u32 = 120;

/// A color bucket must hold strictly more than this share of sampled pixels
/// to be reported as dominant.
const DOMINANCE_THRESHOLD_PCT: u64 = 5;

/// Pixel buckets, declared in tie-break priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorBucket {
    Orange,
    White,
    Black,
    Gray,
    Brown,
    Other,
}

impl ColorBucket {
    const COUNT: usize = 6;

    /// The color buckets eligible to win the vote. `Other` collects
    /// everything else and never becomes a tag.
    const COLORS: [ColorBucket; 5] = [
        ColorBucket::Orange,
        ColorBucket::White,
        ColorBucket::Black,
        ColorBucket::Gray,
        ColorBucket::Brown,
    ];

    /// Classify one pixel. Predicates are evaluated top to bottom and the
    /// first match wins, so the ordering is part of the contract.
    fn of_pixel(r: u8, g: u8, b: u8) -> Self {
        let (r, g, b) = (i16::from(r), i16::from(g), i16::from(b));
        if r > 150 && g < 130 && b < 120 {
            ColorBucket::Orange
        } else if r > 200 && g > 200 && b > 200 {
            ColorBucket::White
        } else if r < 60 && g < 60 && b < 60 {
            ColorBucket::Black
        } else if (r - g).abs() < 15 && (g - b).abs() < 15 && r > 100 && r < 200 {
            ColorBucket::Gray
        } else if r > 120 && g > 80 && b < 80 {
            ColorBucket::Brown
        } else {
            ColorBucket::Other
        }
    }

    fn tag(self) -> Option<&'static str> {
        match self {
            ColorBucket::Orange => Some("orange"),
            ColorBucket::White => Some("white"),
            ColorBucket::Black => Some("black"),
            ColorBucket::Gray => Some("gray"),
            ColorBucket::Brown => Some("brown"),
            ColorBucket::Other => None,
        }
    }
}

/// Classify the dominant color of an image.
///
/// Returns `None` when no color bucket's count exceeds the dominance share
/// of all sampled pixels, or when the image is empty. The vote runs over
/// the color buckets only; unmatched pixels enlarge the total without
/// voting, so a busy background cannot outvote an above-threshold fur
/// color. Ties between buckets break toward the earlier declaration
/// (orange, white, black, gray, brown).
pub fn dominant_color(img: &DynamicImage) -> Option<&'static str> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }

    // Triangle (bilinear) resampling averages neighborhoods, which damps
    // sensor noise before the per-pixel thresholds run.
    let sample = img
        .resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle)
        .to_rgb8();

    let mut counts = [0u64; ColorBucket::COUNT];
    for pixel in sample.pixels() {
        let [r, g, b] = pixel.0;
        counts[ColorBucket::of_pixel(r, g, b) as usize] += 1;
    }
    let total: u64 = counts.iter().sum();

    let mut winner = ColorBucket::Orange;
    let mut best = 0u64;
    for bucket in ColorBucket::COLORS {
        let count = counts[bucket as usize];
        if count > best {
            winner = bucket;
            best = count;
        }
    }

    if best * 100 <= total * DOMINANCE_THRESHOLD_PCT {
        tracing::debug!(
            "no dominant color: best bucket {winner:?} holds {best}/{total} sampled pixels"
        );
        return None;
    }

    let tag = winner.tag();
    tracing::debug!("dominant color: {tag:?} ({best}/{total} sampled pixels)");
    tag
}
