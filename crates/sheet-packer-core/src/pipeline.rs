use crate::blocks::prepare_blocks;
use crate::config::PackerConfig;
use crate::error::{Result, SheetPackerError};
use crate::model::{Frame, Placement, Sheet};
use crate::packer::{GrowLimits, GrowingPacker, next_pow2};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

#[instrument(skip_all, fields(frames = frames.len()))]
/// Packs `frames` into a single sheet using configuration `cfg`.
///
/// Notes:
/// - Frames are validated first; zero sizes, bad trim rectangles and duplicate keys are errors.
/// - Frames that cannot fit the maximum size are reported as `None`, not as errors.
/// - The result is deterministic for identical inputs.
pub fn pack_frames(frames: &[Frame], cfg: &PackerConfig) -> Result<Sheet> {
    cfg.validate()?;
    validate_frames(frames)?;

    let blocks = prepare_blocks(frames, cfg);
    let border = cfg.border();
    let (max_width, max_height) = cfg.effective_max();
    let mut packer = GrowingPacker::new(
        GrowLimits {
            max_width,
            max_height,
            border,
            shape_padding: cfg.shape_padding,
            power_of_two: cfg.power_of_two,
        },
        blocks.first().map(|b| (b.w, b.h)),
    );

    let offset = border + cfg.inner_padding;
    let mut placements: BTreeMap<String, Option<Placement>> =
        frames.iter().map(|f| (f.key.clone(), None)).collect();
    let mut extent_w = 0u32;
    let mut extent_h = 0u32;
    for block in &blocks {
        let Some(fit) = packer.pack(block.w, block.h) else {
            continue;
        };
        let placement = Placement {
            x: fit.x + offset,
            y: fit.y + offset,
            width: block.content_w,
            height: block.content_h,
            trimmed: block.trimmed,
        };
        extent_w = extent_w.max(placement.x + block.w);
        extent_h = extent_h.max(placement.y + block.h);
        placements.insert(block.key.clone(), Some(placement));
    }

    let (width, height) = compute_sheet_size(extent_w, extent_h, cfg);
    let sheet = Sheet {
        width,
        height,
        placements,
    };
    let rejected = sheet.rejected().len();
    debug!(
        blocks = blocks.len(),
        rejected,
        width,
        height,
        "packed sheet"
    );
    Ok(sheet)
}

/// Packs plain sizes. Inputs are (key, width, height); no trim info.
pub fn pack_sizes<K: Into<String>>(
    inputs: impl IntoIterator<Item = (K, u32, u32)>,
    cfg: &PackerConfig,
) -> Result<Sheet> {
    let frames: Vec<Frame> = inputs
        .into_iter()
        .map(|(k, w, h)| Frame::new(k, w, h))
        .collect();
    pack_frames(&frames, cfg)
}

/// Rejects inputs that would produce undefined geometry.
pub fn validate_frames(frames: &[Frame]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(frames.len());
    for f in frames {
        if !seen.insert(f.key.as_str()) {
            return Err(SheetPackerError::DuplicateKey(f.key.clone()));
        }
        if f.width == 0 || f.height == 0 {
            return Err(invalid(f, format!("size {}x{} is empty", f.width, f.height)));
        }
        if let Some(t) = f.trim {
            if t.width == 0 || t.height == 0 {
                return Err(invalid(
                    f,
                    format!("trim size {}x{} is empty", t.width, t.height),
                ));
            }
            let x2 = t.x as u64 + t.width as u64;
            let y2 = t.y as u64 + t.height as u64;
            if x2 > f.width as u64 || y2 > f.height as u64 {
                return Err(invalid(
                    f,
                    format!(
                        "trim rect {}x{}+{}+{} exceeds frame {}x{}",
                        t.width, t.height, t.x, t.y, f.width, f.height
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn invalid(f: &Frame, reason: String) -> SheetPackerError {
    SheetPackerError::InvalidFrame {
        key: f.key.clone(),
        reason,
    }
}

/// Final sheet dimensions from the packed extent.
/// Trailing shape padding is dropped and the border restored, then
/// power-of-two, square and fixed-size rules apply in that order.
pub fn compute_sheet_size(extent_w: u32, extent_h: u32, cfg: &PackerConfig) -> (u32, u32) {
    let border = cfg.border();
    let mut width = extent_w.saturating_add(border).saturating_sub(cfg.shape_padding);
    let mut height = extent_h.saturating_add(border).saturating_sub(cfg.shape_padding);
    if cfg.power_of_two {
        width = next_pow2(width).max(2);
        height = next_pow2(height).max(2);
    }
    if cfg.square {
        let m = width.max(height);
        width = m;
        height = m;
    }
    if let Some(w) = cfg.fixed_width.filter(|&w| w >= 1) {
        width = w;
    }
    if let Some(h) = cfg.fixed_height.filter(|&h| h >= 1) {
        height = h;
    }
    (width, height)
}
