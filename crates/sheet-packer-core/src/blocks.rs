//! Block preparation: frames become padded blocks, oversized ones are dropped,
//! and the rest are ordered for the growing packer.

use crate::config::{PackerConfig, SortCriterion};
use crate::model::Frame;
use std::cmp::Ordering;

/// A frame after padding and trim policy are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub key: String,
    /// Packed width: content + shape padding + 2 * inner padding.
    pub w: u32,
    /// Packed height: content + shape padding + 2 * inner padding.
    pub h: u32,
    pub content_w: u32,
    pub content_h: u32,
    pub trimmed: bool,
}

impl Block {
    pub fn from_frame(frame: &Frame, cfg: &PackerConfig) -> Self {
        let trimmed = cfg.trim && frame.is_trimmed();
        let (content_w, content_h) = match frame.trim {
            Some(t) if trimmed => (t.width, t.height),
            _ => (frame.width, frame.height),
        };
        let pad = cfg
            .shape_padding
            .saturating_add(cfg.inner_padding.saturating_mul(2));
        Self {
            key: frame.key.clone(),
            w: content_w.saturating_add(pad),
            h: content_h.saturating_add(pad),
            content_w,
            content_h,
            trimmed,
        }
    }

    /// True if the block plus the sheet border fits in `max_w x max_h`.
    pub fn fits_within(&self, border: u32, max_w: u32, max_h: u32) -> bool {
        let border2 = border.saturating_mul(2);
        self.w.saturating_add(border2) <= max_w && self.h.saturating_add(border2) <= max_h
    }
}

impl SortCriterion {
    /// Signed difference between `a` and `b`; positive means `b` sorts first.
    pub fn diff(self, a: &Block, b: &Block) -> i64 {
        let (aw, ah) = (a.w as i64, a.h as i64);
        let (bw, bh) = (b.w as i64, b.h as i64);
        match self {
            SortCriterion::Max => bw.max(bh) - aw.max(ah),
            SortCriterion::Min => bw.min(bh) - aw.min(ah),
            SortCriterion::Height => bh - ah,
            SortCriterion::Width => bw - aw,
        }
    }
}

/// Evaluates `criteria` in order and returns the first non-zero difference as an ordering.
pub fn compare_blocks(a: &Block, b: &Block, criteria: &[SortCriterion]) -> Ordering {
    criteria
        .iter()
        .map(|c| c.diff(a, b))
        .find(|&d| d != 0)
        .map_or(Ordering::Equal, |d| d.cmp(&0))
}

/// Converts frames into blocks, dropping those that cannot fit the sheet at all,
/// and sorts them. Returns the blocks in packing order.
pub fn prepare_blocks(frames: &[Frame], cfg: &PackerConfig) -> Vec<Block> {
    let border = cfg.border();
    let (max_w, max_h) = cfg.effective_max();
    let mut blocks: Vec<Block> = frames
        .iter()
        .map(|f| Block::from_frame(f, cfg))
        .filter(|b| b.fits_within(border, max_w, max_h))
        .collect();
    // stable: ties keep input order
    blocks.sort_by(|a, b| compare_blocks(a, b, &cfg.sort_criteria));
    blocks
}
