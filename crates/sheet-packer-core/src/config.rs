use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sort keys applied to blocks before packing.
/// Each key yields a signed difference; the first non-zero key decides the order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortCriterion {
    /// Larger `max(w, h)` first.
    Max,
    /// Larger `min(w, h)` first.
    Min,
    /// Taller first.
    Height,
    /// Wider first.
    Width,
}

impl FromStr for SortCriterion {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "max" | "maxside" => Ok(Self::Max),
            "min" | "minside" => Ok(Self::Min),
            "h" | "height" => Ok(Self::Height),
            "w" | "width" => Ok(Self::Width),
            _ => Err(()),
        }
    }
}

/// Default tie-break chain: max side, min side, height, width.
pub const MAX_SIDE_CRITERIA: [SortCriterion; 4] = [
    SortCriterion::Max,
    SortCriterion::Min,
    SortCriterion::Height,
    SortCriterion::Width,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackerConfig {
    /// Maximum sheet width in pixels.
    pub max_width: u32,
    /// Maximum sheet height in pixels.
    pub max_height: u32,
    /// Force the final sheet width. Also caps the width available while packing.
    #[serde(default)]
    pub fixed_width: Option<u32>,
    /// Force the final sheet height. Also caps the height available while packing.
    #[serde(default)]
    pub fixed_height: Option<u32>,

    /// Pixels around the whole sheet. Inner padding counts towards it.
    pub border_padding: u32,
    /// Pixels between neighbouring frames.
    pub shape_padding: u32,
    /// Pixels around every frame.
    pub inner_padding: u32,

    /// Pack the trimmed rectangle of frames that report one.
    pub trim: bool,
    /// Round sheet dimensions up to powers of two.
    pub power_of_two: bool,
    /// Force a square sheet (max(width, height)).
    pub square: bool,

    #[serde(default = "default_sort_criteria")]
    pub sort_criteria: Vec<SortCriterion>,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_width: 2048,
            max_height: 2048,
            fixed_width: None,
            fixed_height: None,
            border_padding: 0,
            shape_padding: 2,
            inner_padding: 0,
            trim: true,
            power_of_two: false,
            square: false,
            sort_criteria: default_sort_criteria(),
        }
    }
}

fn default_sort_criteria() -> Vec<SortCriterion> {
    MAX_SIDE_CRITERIA.to_vec()
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Maximum dimensions are zero
    /// - A fixed dimension is configured as zero
    /// - Border padding leaves no usable space inside the maximum size
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SheetPackerError;

        if self.max_width == 0 || self.max_height == 0 {
            return Err(SheetPackerError::InvalidDimensions {
                width: self.max_width,
                height: self.max_height,
            });
        }

        if self.fixed_width == Some(0) || self.fixed_height == Some(0) {
            return Err(SheetPackerError::InvalidConfig(format!(
                "fixed size must be positive, got {}x{}",
                fmt_fixed(self.fixed_width),
                fmt_fixed(self.fixed_height)
            )));
        }

        let total_border = self.border().saturating_mul(2);
        let (max_w, max_h) = self.effective_max();
        if total_border >= max_w || total_border >= max_h {
            return Err(SheetPackerError::InvalidConfig(format!(
                "border_padding ({}) * 2 leaves no usable space in {}x{}",
                self.border(),
                max_w,
                max_h
            )));
        }

        Ok(())
    }

    /// Border padding with inner padding already accounted for.
    pub fn border(&self) -> u32 {
        self.border_padding.saturating_sub(self.inner_padding)
    }

    /// Maximum sheet size used while packing: the fixed size wins where configured.
    pub fn effective_max(&self) -> (u32, u32) {
        let w = match self.fixed_width {
            Some(f) if f >= 1 => f.min(self.max_width),
            _ => self.max_width,
        };
        let h = match self.fixed_height {
            Some(f) if f >= 1 => f.min(self.max_height),
            _ => self.max_height,
        };
        (w, h)
    }
}

fn fmt_fixed(v: Option<u32>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn fixed_width(mut self, v: Option<u32>) -> Self {
        self.cfg.fixed_width = v;
        self
    }
    pub fn fixed_height(mut self, v: Option<u32>) -> Self {
        self.cfg.fixed_height = v;
        self
    }
    pub fn with_fixed_dimensions(self, w: u32, h: u32) -> Self {
        self.fixed_width(Some(w)).fixed_height(Some(h))
    }
    pub fn border_padding(mut self, v: u32) -> Self {
        self.cfg.border_padding = v;
        self
    }
    pub fn shape_padding(mut self, v: u32) -> Self {
        self.cfg.shape_padding = v;
        self
    }
    pub fn inner_padding(mut self, v: u32) -> Self {
        self.cfg.inner_padding = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.cfg.trim = v;
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.cfg.power_of_two = v;
        self
    }
    pub fn square(mut self, v: bool) -> Self {
        self.cfg.square = v;
        self
    }
    pub fn sort_criteria(mut self, v: Vec<SortCriterion>) -> Self {
        self.cfg.sort_criteria = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
