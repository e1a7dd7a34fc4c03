use sheet_packer_core::prelude::*;

#[test]
fn test_pack_stats_basic() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(256, 256)
        .shape_padding(0)
        .build();
    let inputs: Vec<(String, u32, u32)> = (0..4).map(|i| (format!("tex_{}", i), 64, 64)).collect();
    let sheet = pack_sizes(inputs, &cfg).expect("packing should succeed");
    let stats = sheet.stats();

    assert_eq!(stats.num_frames, 4);
    assert_eq!(stats.num_placed, 4);
    assert_eq!(stats.num_rejected, 0);
    assert_eq!(stats.used_area, 4 * 64 * 64);
    // four equal squares grow into a 128x128 block
    assert_eq!((stats.sheet_width, stats.sheet_height), (128, 128));
    assert!((stats.occupancy - 1.0).abs() < 1e-9);
    assert_eq!(stats.wasted_area(), 0);
    assert_eq!(stats.num_trimmed, 0);
}

#[test]
fn test_pack_stats_counts_rejected_and_trimmed() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(64, 64)
        .shape_padding(0)
        .build();
    let frames = vec![
        Frame::new("a", 32, 32).with_trim(TrimInfo {
            trimmed: true,
            x: 0,
            y: 0,
            width: 16,
            height: 16,
        }),
        Frame::new("b", 100, 10),
        Frame::new("c", 16, 16),
    ];
    let stats = pack_frames(&frames, &cfg).expect("pack").stats();
    assert_eq!(stats.num_frames, 3);
    assert_eq!(stats.num_placed, 2);
    assert_eq!(stats.num_rejected, 1);
    assert_eq!(stats.num_trimmed, 1);
    assert_eq!(stats.used_area, 2 * 16 * 16);
}

#[test]
fn test_pack_stats_empty_sheet() {
    let stats = pack_frames(&[], &PackerConfig::default()).expect("pack").stats();
    assert_eq!(stats.sheet_area, 0);
    assert_eq!(stats.occupancy, 0.0);
    assert_eq!(stats.waste_percentage(), 0.0);
}

#[test]
fn test_stats_summary() {
    let cfg = PackerConfig::builder().shape_padding(0).build();
    let sheet = pack_sizes(vec![("a", 10, 10)], &cfg).expect("pack");
    let summary = sheet.stats().summary();
    assert!(summary.contains("Sheet: 10x10"));
    assert!(summary.contains("1/1 placed"));
    assert!(summary.contains("Occupancy: 100.00%"));
}
