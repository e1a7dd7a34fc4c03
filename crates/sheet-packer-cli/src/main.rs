use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::ImageReader;
use serde::Deserialize;
use sheet_packer_core::{
    compute_trim, pack_frames, to_json_hash, ExportOptions, Frame, PackerConfig, Sheet,
    SortCriterion,
};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "sheet-packer",
    about = "Pack sprite frames into a single sheet",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images or a frame manifest and write JSON metadata
    Pack(PackArgs),
    /// Simple timing bench (packs N times, prints time + occupancy)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Image file, image directory, or frame manifest (.json/.yaml)
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Sheet base name (metadata is written to name.json)
    #[arg(short, long, default_value = "sheet", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (present fields override command-line options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Max width
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    max_width: u32,
    /// Max height
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    max_height: u32,
    /// Fixed output width (also caps packing width)
    #[arg(long, help_heading = "Layout")]
    fixed_width: Option<u32>,
    /// Fixed output height (also caps packing height)
    #[arg(long, help_heading = "Layout")]
    fixed_height: Option<u32>,
    /// Resize sheet dims to power of two
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    pow2: bool,
    /// Force square sheet
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    square: bool,
    /// Sort criteria, comma separated: max,min,h,w (or "none")
    #[arg(long, default_value = "max,min,h,w", help_heading = "Layout")]
    sort_criteria: String,

    // Padding / Trim
    /// Border padding (around the whole sheet)
    #[arg(long, default_value_t = 0, help_heading = "Padding/Trim")]
    border_padding: u32,
    /// Padding between frames
    #[arg(long, default_value_t = 2, help_heading = "Padding/Trim")]
    shape_padding: u32,
    /// Padding around each frame
    #[arg(long, default_value_t = 0, help_heading = "Padding/Trim")]
    inner_padding: u32,
    /// Trim transparent borders
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Padding/Trim")]
    trim: bool,
    /// Pixels with alpha below this are transparent (minimum 1)
    #[arg(long, default_value_t = 1, help_heading = "Padding/Trim")]
    trim_threshold: u8,

    // Export
    /// Image file name recorded in meta.image (default: <name>.png)
    #[arg(long, help_heading = "Export")]
    image: Option<String>,
    /// Prefix prepended to every frame name
    #[arg(long, default_value = "", help_heading = "Export")]
    prefix: String,
    /// Drop file extensions from frame names
    #[arg(long, default_value_t = false, help_heading = "Export")]
    drop_ext: bool,
    /// Scale recorded in meta.scale
    #[arg(long, default_value_t = 1.0, help_heading = "Export")]
    scale: f32,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Image directory or frame manifest
    input: PathBuf,
    /// Max width
    #[arg(long, default_value_t = 4096)]
    max_width: u32,
    /// Max height
    #[arg(long, default_value_t = 4096)]
    max_height: u32,
    /// Resize sheet dims to power of two
    #[arg(long, default_value_t = false)]
    pow2: bool,
    /// Number of timed runs
    #[arg(long, default_value_t = 10)]
    runs: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let frames = load_frames(
        &cli.input,
        &cli.include,
        &cli.exclude,
        cfg.trim,
        cli.trim_threshold,
        show_progress,
    )?;
    info!(count = frames.len(), "loaded frames");

    let start = Instant::now();
    let sheet = pack_frames(&frames, &cfg)?;
    let dur = start.elapsed();
    report_rejected(&sheet);

    let stats = sheet.stats();
    info!(
        width = sheet.width,
        height = sheet.height,
        time = %fmt_dur(dur),
        "{}",
        stats.summary()
    );

    if cli.dry_run {
        return Ok(());
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;

    let opts = ExportOptions {
        image: cli
            .image
            .clone()
            .unwrap_or_else(|| format!("{}.png", cli.name)),
        prefix: cli.prefix.clone(),
        drop_extension: cli.drop_ext,
        scale: cli.scale,
    };
    let json = to_json_hash(&frames, &sheet, &opts);
    let json_path = cli.out_dir.join(format!("{}.json", cli.name));
    fs::write(&json_path, serde_json::to_vec_pretty(&json)?)
        .with_context(|| format!("write {}", json_path.display()))?;
    info!(?json_path, frames = stats.num_placed, "sheet metadata written");

    if let Some(stats_path) = &cli.export_stats {
        fs::write(stats_path, serde_json::to_vec_pretty(&stats)?)
            .with_context(|| format!("write {}", stats_path.display()))?;
        info!(?stats_path, "stats exported");
    }
    Ok(())
}

fn report_rejected(sheet: &Sheet) {
    let rejected = sheet.rejected();
    if rejected.is_empty() {
        return;
    }
    warn!(count = rejected.len(), "{} frames don't fit", rejected.len());
    for key in rejected {
        warn!(key = %key, "frame skipped");
    }
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(b.max_width, b.max_height)
        .pow2(b.pow2)
        .build();
    let frames = load_frames(&b.input, &[], &[], cfg.trim, 1, false)?;
    let runs = b.runs.max(1);
    let mut best = Duration::MAX;
    let mut total = Duration::ZERO;
    let mut sheet = None;
    for _ in 0..runs {
        let start = Instant::now();
        let s = pack_frames(&frames, &cfg)?;
        let dur = start.elapsed();
        best = best.min(dur);
        total += dur;
        sheet = Some(s);
    }
    let Some(sheet) = sheet else {
        anyhow::bail!("no bench runs");
    };
    let stats = sheet.stats();
    println!(
        "frames={} placed={} size={}x{} occupancy={:.2}% best={} avg={}",
        stats.num_frames,
        stats.num_placed,
        sheet.width,
        sheet.height,
        stats.occupancy * 100.0,
        fmt_dur(best),
        fmt_dur(total / runs)
    );
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn build_config(cli: &PackArgs) -> anyhow::Result<PackerConfig> {
    let cfg = PackerConfig {
        max_width: cli.max_width,
        max_height: cli.max_height,
        fixed_width: cli.fixed_width,
        fixed_height: cli.fixed_height,
        border_padding: cli.border_padding,
        shape_padding: cli.shape_padding,
        inner_padding: cli.inner_padding,
        trim: cli.trim,
        power_of_two: cli.pow2,
        square: cli.square,
        sort_criteria: parse_criteria(&cli.sort_criteria)?,
    };
    // Config file fields win over flags
    let Some(path) = &cli.config else {
        return Ok(cfg);
    };
    let file =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let y: YamlConfig = serde_yaml::from_str(&file)
        .with_context(|| format!("parse config {}", path.display()))?;
    y.into_packer_config(cfg)
}

fn parse_criteria(s: &str) -> anyhow::Result<Vec<SortCriterion>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<SortCriterion>()
                .map_err(|_| anyhow::anyhow!("unknown sort criterion: {}", part))
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlConfig {
    max_width: Option<u32>,
    max_height: Option<u32>,
    fixed_width: Option<u32>,
    fixed_height: Option<u32>,
    border_padding: Option<u32>,
    shape_padding: Option<u32>,
    inner_padding: Option<u32>,
    trim: Option<bool>,
    power_of_two: Option<bool>,
    square: Option<bool>,
    sort_criteria: Option<Vec<String>>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.max_width {
            cfg.max_width = v;
        }
        if let Some(v) = self.max_height {
            cfg.max_height = v;
        }
        if let Some(v) = self.fixed_width {
            cfg.fixed_width = Some(v);
        }
        if let Some(v) = self.fixed_height {
            cfg.fixed_height = Some(v);
        }
        if let Some(v) = self.border_padding {
            cfg.border_padding = v;
        }
        if let Some(v) = self.shape_padding {
            cfg.shape_padding = v;
        }
        if let Some(v) = self.inner_padding {
            cfg.inner_padding = v;
        }
        if let Some(v) = self.trim {
            cfg.trim = v;
        }
        if let Some(v) = self.power_of_two {
            cfg.power_of_two = v;
        }
        if let Some(v) = self.square {
            cfg.square = v;
        }
        if let Some(v) = self.sort_criteria {
            cfg.sort_criteria = parse_criteria(&v.join(","))?;
        }
        Ok(cfg)
    }
}

/// Frame manifest: either a bare list or `{ frames: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Manifest {
    List(Vec<Frame>),
    Object { frames: Vec<Frame> },
}

impl Manifest {
    fn into_frames(self) -> Vec<Frame> {
        match self {
            Manifest::List(frames) | Manifest::Object { frames } => frames,
        }
    }
}

fn is_manifest(p: &Path) -> bool {
    p.is_file()
        && matches!(
            p.extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_ascii_lowercase()),
            Some(ext) if matches!(ext.as_str(), "json" | "yaml" | "yml")
        )
}

fn load_manifest(p: &Path) -> anyhow::Result<Vec<Frame>> {
    let text = fs::read_to_string(p).with_context(|| format!("read manifest {}", p.display()))?;
    let is_json = p
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let manifest: Manifest = if is_json {
        serde_json::from_str(&text).with_context(|| format!("parse manifest {}", p.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("parse manifest {}", p.display()))?
    };
    Ok(manifest.into_frames())
}

fn load_frames(
    input: &Path,
    include: &[String],
    exclude: &[String],
    trim: bool,
    trim_threshold: u8,
    progress: bool,
) -> anyhow::Result<Vec<Frame>> {
    if is_manifest(input) {
        return load_manifest(input);
    }
    let paths = gather_paths(input, include, exclude)?;
    load_images_with_progress(input, &paths, trim, trim_threshold, progress)
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

/// Frame key: path relative to the input directory with `/` separators,
/// or the file name when the input is a single file.
fn frame_key(root: &Path, p: &Path) -> String {
    let rel = match p.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        _ => p.file_name().map(Path::new).unwrap_or(p),
    };
    rel.to_string_lossy().replace('\\', "/")
}

fn load_images_with_progress(
    root: &Path,
    paths: &[PathBuf],
    trim: bool,
    trim_threshold: u8,
    progress: bool,
) -> anyhow::Result<Vec<Frame>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_frame(root, p, trim, trim_threshold) {
            Ok(frame) => {
                debug!(key = %frame.key, w = frame.width, h = frame.height, trimmed = frame.is_trimmed(), "frame loaded");
                list.push(frame);
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_frame(root: &Path, p: &Path, trim: bool, trim_threshold: u8) -> anyhow::Result<Frame> {
    let key = frame_key(root, p);
    if !trim {
        let (w, h) = image::image_dimensions(p)?;
        return Ok(Frame::new(key, w, h));
    }
    let rgba = ImageReader::open(p)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok(Frame::new(key, w, h).with_trim(compute_trim(&rgba, trim_threshold)))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_list_parses() {
        assert_eq!(
            parse_criteria("max, min,h,w").expect("parse"),
            vec![
                SortCriterion::Max,
                SortCriterion::Min,
                SortCriterion::Height,
                SortCriterion::Width
            ]
        );
        assert!(parse_criteria("none").expect("parse").is_empty());
        assert!(parse_criteria("max,area").is_err());
    }

    #[test]
    fn yaml_fields_override_flags() {
        let y: YamlConfig = serde_yaml::from_str(
            "max_width: 512\nfixed_height: 300\npower_of_two: true\nsort_criteria: [h, w]\n",
        )
        .expect("yaml");
        let cfg = y
            .into_packer_config(PackerConfig::default())
            .expect("merge");
        assert_eq!(cfg.max_width, 512);
        assert_eq!(cfg.max_height, 2048);
        assert_eq!(cfg.fixed_height, Some(300));
        assert!(cfg.power_of_two);
        assert_eq!(
            cfg.sort_criteria,
            vec![SortCriterion::Height, SortCriterion::Width]
        );
    }

    #[test]
    fn manifest_accepts_list_and_object() {
        let list: Manifest = serde_json::from_str(
            r#"[{"key":"a.png","width":4,"height":5},
                {"key":"b.png","width":8,"height":8,
                 "trimmedSize":{"trimmed":true,"x":1,"y":1,"width":6,"height":6}}]"#,
        )
        .expect("list");
        let frames = list.into_frames();
        assert_eq!(frames.len(), 2);
        assert!(frames[1].is_trimmed());

        let obj: Manifest =
            serde_yaml::from_str("frames:\n  - key: c\n    width: 3\n    height: 3\n")
                .expect("object");
        assert_eq!(obj.into_frames()[0].key, "c");
    }

    #[test]
    fn keys_are_relative_with_forward_slashes() {
        let root = Path::new("assets");
        assert_eq!(
            frame_key(root, &root.join("walk").join("0001.png")),
            "walk/0001.png"
        );
        let single = Path::new("assets/hero.png");
        assert_eq!(frame_key(single, single), "hero.png");
    }
}
