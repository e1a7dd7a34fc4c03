use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn x2(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn y2(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.x2() <= self.x2() && r.y2() <= self.y2()
    }
    /// Returns true if the two rectangles share any area. Empty rectangles never do.
    pub fn intersects(&self, r: &Rect) -> bool {
        if self.area() == 0 || r.area() == 0 {
            return false;
        }
        !(self.x >= r.x2() || r.x >= self.x2() || self.y >= r.y2() || r.y >= self.y2())
    }
}

/// Trimmed sub-rectangle of a frame (opaque content bounds).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrimInfo {
    /// True if the content bounds are smaller than the frame.
    pub trimmed: bool,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TrimInfo {
    /// Untrimmed info covering a whole `width x height` frame.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            trimmed: false,
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// An input rectangle to pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Frame {
    /// Unique key (e.g., filename or asset path).
    pub key: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, rename = "trimmedSize", alias = "trim")]
    pub trim: Option<TrimInfo>,
}

impl Frame {
    pub fn new(key: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            key: key.into(),
            width,
            height,
            trim: None,
        }
    }

    pub fn with_trim(mut self, trim: TrimInfo) -> Self {
        self.trim = Some(trim);
        self
    }

    /// True if the frame carries trim info that reports a trimmed rectangle.
    pub fn is_trimmed(&self) -> bool {
        self.trim.is_some_and(|t| t.trimmed)
    }

    /// Source sub-rectangle: the trim bounds when trimmed, the whole frame otherwise.
    pub fn source_rect(&self) -> Rect {
        match self.trim {
            Some(t) if t.trimmed => Rect::new(t.x, t.y, t.width, t.height),
            _ => Rect::new(0, 0, self.width, self.height),
        }
    }
}

/// Position of a packed frame within the sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    /// Packed content width (trimmed width when `trimmed`).
    pub width: u32,
    /// Packed content height (trimmed height when `trimmed`).
    pub height: u32,
    pub trimmed: bool,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Result of a pack call: sheet size and one entry per input frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sheet {
    pub width: u32,
    pub height: u32,
    /// `None` marks a frame that did not fit.
    pub placements: BTreeMap<String, Option<Placement>>,
}

impl Sheet {
    pub fn get(&self, key: &str) -> Option<&Placement> {
        self.placements.get(key).and_then(Option::as_ref)
    }

    /// Iterates placed frames in key order.
    pub fn placed(&self) -> impl Iterator<Item = (&str, &Placement)> {
        self.placements
            .iter()
            .filter_map(|(k, p)| p.as_ref().map(|p| (k.as_str(), p)))
    }

    /// Keys of frames that did not fit, in key order.
    pub fn rejected(&self) -> Vec<&str> {
        self.placements
            .iter()
            .filter(|(_, p)| p.is_none())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Computes packing statistics for this sheet.
    pub fn stats(&self) -> PackStats {
        let mut num_placed = 0;
        let mut num_trimmed = 0;
        let mut used_area = 0u64;
        for (_, p) in self.placed() {
            num_placed += 1;
            used_area += p.rect().area();
            if p.trimmed {
                num_trimmed += 1;
            }
        }
        let sheet_area = self.width as u64 * self.height as u64;
        let occupancy = if sheet_area > 0 {
            used_area as f64 / sheet_area as f64
        } else {
            0.0
        };
        PackStats {
            num_frames: self.placements.len(),
            num_placed,
            num_rejected: self.placements.len() - num_placed,
            num_trimmed,
            sheet_width: self.width,
            sheet_height: self.height,
            sheet_area,
            used_area,
            occupancy,
        }
    }
}

/// Statistics about sheet packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    /// Number of input frames.
    pub num_frames: usize,
    pub num_placed: usize,
    /// Frames that did not fit in the maximum sheet size.
    pub num_rejected: usize,
    pub num_trimmed: usize,
    pub sheet_width: u32,
    pub sheet_height: u32,
    pub sheet_area: u64,
    /// Sum of placed content areas.
    pub used_area: u64,
    /// used_area / sheet_area (0.0 to 1.0). Higher is better.
    pub occupancy: f64,
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Sheet: {}x{}, Frames: {}/{} placed, Occupancy: {:.2}%, Used Area: {} px², Trimmed: {}",
            self.sheet_width,
            self.sheet_height,
            self.num_placed,
            self.num_frames,
            self.occupancy * 100.0,
            self.used_area,
            self.num_trimmed,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.sheet_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.sheet_area > 0 {
            (self.wasted_area() as f64 / self.sheet_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
