//! Core library for packing sprite frames into a single sheet.
//!
//! - Algorithm: growing binary tree (root starts at the first block and grows right/down)
//! - Ordering: blocks sorted by a configurable criteria chain (max side, min side, height, width)
//! - Post-processing: power-of-two, square and fixed-size sheet dimensions
//! - Frames that do not fit are reported per key instead of failing the whole run.
//!
//! Quick example:
//! ```
//! use sheet_packer_core::{pack_sizes, PackerConfig};
//! # fn main() -> sheet_packer_core::Result<()> {
//! let cfg = PackerConfig::builder()
//!     .with_max_dimensions(256, 256)
//!     .shape_padding(0)
//!     .build();
//! let sheet = pack_sizes(vec![("a", 10, 10), ("b", 5, 5)], &cfg)?;
//! assert_eq!((sheet.width, sheet.height), (15, 10));
//! assert!(sheet.get("b").is_some());
//! # Ok(()) }
//! ```

pub mod blocks;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
#[cfg(feature = "image")]
pub mod trim;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use pipeline::*;
#[cfg(feature = "image")]
pub use trim::compute_trim;

/// Convenience prelude for common types and functions.
/// Importing `sheet_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::blocks::{Block, compare_blocks, prepare_blocks};
    pub use crate::config::{PackerConfig, PackerConfigBuilder, SortCriterion};
    pub use crate::export::{ExportOptions, to_json_hash};
    pub use crate::model::{Frame, PackStats, Placement, Rect, Sheet, TrimInfo};
    pub use crate::{pack_frames, pack_sizes};
}
