use sheet_packer_core::error::SheetPackerError;
use sheet_packer_core::prelude::*;

#[test]
fn zero_max_width_is_rejected() {
    let cfg = PackerConfig {
        max_width: 0,
        max_height: 1024,
        ..Default::default()
    };
    match cfg.validate() {
        Err(SheetPackerError::InvalidDimensions { width, height }) => {
            assert_eq!(width, 0);
            assert_eq!(height, 1024);
        }
        other => panic!("Expected InvalidDimensions error, got {:?}", other),
    }
}

#[test]
fn zero_max_height_fails_pack() {
    let cfg = PackerConfig {
        max_height: 0,
        ..Default::default()
    };
    let result = pack_sizes(vec![("a", 1, 1)], &cfg);
    assert!(matches!(
        result,
        Err(SheetPackerError::InvalidDimensions { height: 0, .. })
    ));
}

#[test]
fn zero_fixed_size_is_rejected() {
    let cfg = PackerConfig::builder().fixed_height(Some(0)).build();
    match cfg.validate() {
        Err(SheetPackerError::InvalidConfig(msg)) => assert!(msg.contains("fixed")),
        other => panic!("Expected InvalidConfig error, got {:?}", other),
    }
}

#[test]
fn border_leaving_no_space_is_rejected() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(100, 100)
        .border_padding(50)
        .build();
    match cfg.validate() {
        Err(SheetPackerError::InvalidConfig(msg)) => assert!(msg.contains("border_padding")),
        other => panic!("Expected InvalidConfig error, got {:?}", other),
    }
    // inner padding counts towards the border
    let cfg = PackerConfig::builder()
        .with_max_dimensions(100, 100)
        .border_padding(50)
        .inner_padding(10)
        .build();
    assert!(cfg.validate().is_ok());
}

#[test]
fn default_config_is_valid() {
    assert!(PackerConfig::default().validate().is_ok());
}

#[test]
fn duplicate_keys_fail_before_packing() {
    let frames = vec![
        Frame::new("a", 4, 4),
        Frame::new("b", 4, 4),
        Frame::new("a", 8, 8),
    ];
    match pack_frames(&frames, &PackerConfig::default()) {
        Err(SheetPackerError::DuplicateKey(k)) => assert_eq!(k, "a"),
        other => panic!("Expected DuplicateKey error, got {:?}", other),
    }
}

#[test]
fn empty_frame_is_invalid() {
    let frames = vec![Frame::new("ok", 4, 4), Frame::new("flat", 4, 0)];
    match pack_frames(&frames, &PackerConfig::default()) {
        Err(SheetPackerError::InvalidFrame { key, reason }) => {
            assert_eq!(key, "flat");
            assert!(reason.contains("empty"));
        }
        other => panic!("Expected InvalidFrame error, got {:?}", other),
    }
}

#[test]
fn trim_outside_frame_is_invalid() {
    let frames = vec![Frame::new("t", 10, 10).with_trim(TrimInfo {
        trimmed: true,
        x: 6,
        y: 0,
        width: 5,
        height: 10,
    })];
    assert!(matches!(
        pack_frames(&frames, &PackerConfig::default()),
        Err(SheetPackerError::InvalidFrame { .. })
    ));

    let frames = vec![Frame::new("t", 10, 10).with_trim(TrimInfo {
        trimmed: true,
        x: 0,
        y: 0,
        width: 0,
        height: 3,
    })];
    assert!(matches!(
        pack_frames(&frames, &PackerConfig::default()),
        Err(SheetPackerError::InvalidFrame { .. })
    ));
}

#[test]
fn error_messages_name_the_frame() {
    let err = pack_sizes(vec![("hero.png", 0, 3)], &PackerConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "Invalid frame 'hero.png': size 0x3 is empty");
}

#[test]
fn config_round_trips_through_json() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(512, 256)
        .fixed_width(Some(300))
        .pow2(true)
        .sort_criteria(vec![SortCriterion::Height, SortCriterion::Width])
        .build();
    let text = serde_json::to_string(&cfg).expect("serialize");
    let back: PackerConfig = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, cfg);
}

#[test]
fn missing_optional_config_fields_use_defaults() {
    let text = r#"{
        "max_width": 256, "max_height": 256,
        "border_padding": 0, "shape_padding": 0, "inner_padding": 0,
        "trim": false, "power_of_two": false, "square": false
    }"#;
    let cfg: PackerConfig = serde_json::from_str(text).expect("deserialize");
    assert_eq!(cfg.fixed_width, None);
    assert_eq!(cfg.sort_criteria, sheet_packer_core::MAX_SIDE_CRITERIA.to_vec());
}
