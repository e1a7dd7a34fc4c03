use crate::model::{Frame, Rect, Sheet};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Naming and meta options for exported metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportOptions {
    /// Image file name recorded in `meta.image`.
    pub image: String,
    /// Prepended to every frame key.
    #[serde(default)]
    pub prefix: String,
    /// Strip the file extension from frame keys.
    #[serde(default)]
    pub drop_extension: bool,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            image: "sheet.png".into(),
            prefix: String::new(),
            drop_extension: false,
            scale: default_scale(),
        }
    }
}

fn default_scale() -> f32 {
    1.0
}

/// Frame name as written to metadata: extension optionally dropped, then prefixed.
pub fn export_name(key: &str, opts: &ExportOptions) -> String {
    let base = if opts.drop_extension {
        match key.rfind('.') {
            Some(i) => &key[..i],
            None => key,
        }
    } else {
        key
    };
    format!("{}{}", opts.prefix, base)
}

/// Flatten placed frames keyed by name (TexturePacker-like JSON hash).
/// Shape: `{ frames: { name: { frame, rotated, trimmed, spriteSourceSize, sourceSize } }, meta }`.
/// Frames without a placement are left out.
pub fn to_json_hash(frames: &[Frame], sheet: &Sheet, opts: &ExportOptions) -> Value {
    let mut out = serde_json::Map::new();
    for fr in frames {
        let Some(p) = sheet.get(&fr.key) else {
            continue;
        };
        let source = if p.trimmed {
            fr.source_rect()
        } else {
            Rect::new(0, 0, fr.width, fr.height)
        };
        out.insert(
            export_name(&fr.key, opts),
            json!({
                "frame": {"x": p.x, "y": p.y, "w": p.width, "h": p.height},
                "rotated": false,
                "trimmed": p.trimmed,
                "spriteSourceSize": {"x": source.x, "y": source.y, "w": source.w, "h": source.h},
                "sourceSize": {"w": fr.width, "h": fr.height},
            }),
        );
    }
    json!({
        "frames": out,
        "meta": {
            "app": "sheet-packer",
            "version": env!("CARGO_PKG_VERSION"),
            "image": opts.image,
            "format": "RGBA8888",
            "size": {"w": sheet.width, "h": sheet.height},
            "scale": opts.scale,
        }
    })
}
