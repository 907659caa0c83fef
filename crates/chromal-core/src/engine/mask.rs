//! Neighbor-color masks: the message type of the coloring protocol.
//!
//! A mask is a set of colors known to be taken by already-colored neighbors,
//! encoded so that merging two masks is a plain bitwise OR. OR is associative
//! and commutative, which is what lets the aggregation layer combine messages
//! per destination in any order, pairwise or tree-shaped.
//!
//! Two representations are provided:
//!
//! - [`PackedColorMask`]: one `u64` word, `Copy`, for budgets up to
//!   [`PACKED_COLOR_LIMIT`]. This is the hot path.
//! - [`WideColorMask`]: a word vector for larger budgets, with word-wise OR
//!   and a first-non-full-word scan for the min-free query.
//!
//! [`MaskBackend`] selects between them; `Auto` resolves from the budget.

use smallvec::{smallvec, SmallVec};

use crate::engine::errors::ColorError;

/// A color index. Valid final colors for a run with budget `K` lie in `[0, K]`.
pub type Color = u64;

/// Highest color budget the packed single-word encoding can carry.
///
/// Bit `c` of the word marks color `c` as used, so a budget of `K` needs bit
/// indices up to `K` inclusive; one word holds bits `0..=63`.
pub const PACKED_COLOR_LIMIT: u64 = u64::BITS as u64 - 1;

/// Backend selector for the mask representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskBackend {
    /// Always use the packed single-word mask. Fails fast with
    /// [`ColorError::EncodingOverflow`] when the budget does not fit.
    Packed,
    /// Always use the word-vector mask.
    Wide,
    /// Pick packed when the budget fits, wide otherwise.
    #[default]
    Auto,
}

impl MaskBackend {
    /// Resolves `Auto` against a budget; validates explicit choices.
    pub fn resolve(self, budget: u64) -> Result<MaskBackend, ColorError> {
        match self {
            MaskBackend::Packed if budget > PACKED_COLOR_LIMIT => {
                Err(ColorError::EncodingOverflow {
                    budget,
                    limit: PACKED_COLOR_LIMIT,
                })
            }
            MaskBackend::Packed => Ok(MaskBackend::Packed),
            MaskBackend::Wide => Ok(MaskBackend::Wide),
            MaskBackend::Auto => Ok(if budget <= PACKED_COLOR_LIMIT {
                MaskBackend::Packed
            } else {
                MaskBackend::Wide
            }),
        }
    }
}

/// Common interface over the two mask representations.
///
/// The coloring rounds are generic over this trait; the public entry points
/// pick the implementation via [`MaskBackend`].
pub trait ColorMask: Clone + Send {
    /// The mask with no colors marked, sized for colors `0..=budget`.
    fn empty(budget: u64) -> Self;

    /// The mask with exactly `color` marked.
    ///
    /// Precondition: `color <= budget` (checked in debug builds). The engine
    /// only encodes final colors, which a validated budget keeps in range.
    fn single(budget: u64, color: Color) -> Self;

    /// Merges two masks. Associative and commutative.
    fn merge(self, other: Self) -> Self;

    /// The smallest color not marked in the mask, or `None` if every
    /// representable color is taken.
    ///
    /// With a validated budget `K = Δ + 1`, at most `Δ` colors are ever
    /// marked, so `None` here indicates a broken invariant upstream.
    fn min_free(&self) -> Option<Color>;
}

/// Single-word used-color set. Bit `c` set iff color `c` is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedColorMask(pub u64);

impl PackedColorMask {
    /// Encodes one color as its bit, failing fast when the color does not
    /// fit the word instead of silently wrapping.
    pub fn encode(color: Color) -> Result<PackedColorMask, ColorError> {
        if color > PACKED_COLOR_LIMIT {
            return Err(ColorError::EncodingOverflow {
                budget: color,
                limit: PACKED_COLOR_LIMIT,
            });
        }
        Ok(PackedColorMask(1u64 << color))
    }
}

impl ColorMask for PackedColorMask {
    fn empty(_budget: u64) -> Self {
        PackedColorMask(0)
    }

    fn single(budget: u64, color: Color) -> Self {
        debug_assert!(color <= budget && color <= PACKED_COLOR_LIMIT);
        PackedColorMask(1u64 << color)
    }

    fn merge(self, other: Self) -> Self {
        PackedColorMask(self.0 | other.0)
    }

    fn min_free(&self) -> Option<Color> {
        // Invert and take the lowest set bit; a full mask inverts to zero.
        let inv = !self.0;
        if inv == 0 {
            return None;
        }
        Some(inv.trailing_zeros() as Color)
    }
}

/// Word-vector used-color set for budgets past the packed limit.
///
/// Inline capacity of two words covers budgets up to 127 without a heap
/// allocation; larger budgets spill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideColorMask {
    words: SmallVec<[u64; 2]>,
}

impl WideColorMask {
    fn word_count(budget: u64) -> usize {
        (budget / u64::BITS as u64 + 1) as usize
    }
}

impl ColorMask for WideColorMask {
    fn empty(budget: u64) -> Self {
        WideColorMask {
            words: smallvec![0; Self::word_count(budget)],
        }
    }

    fn single(budget: u64, color: Color) -> Self {
        debug_assert!(color <= budget);
        let mut mask = Self::empty(budget);
        let word = (color / u64::BITS as u64) as usize;
        mask.words[word] |= 1u64 << (color % u64::BITS as u64);
        mask
    }

    fn merge(mut self, other: Self) -> Self {
        // Masks from one run share a word count; merging uneven masks keeps
        // the longer tail intact.
        if other.words.len() > self.words.len() {
            return other.merge(self);
        }
        for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
            *dst |= *src;
        }
        self
    }

    fn min_free(&self) -> Option<Color> {
        for (idx, &word) in self.words.iter().enumerate() {
            if word != u64::MAX {
                let bit = (!word).trailing_zeros() as u64;
                return Some(idx as u64 * u64::BITS as u64 + bit);
            }
        }
        None
    }
}
