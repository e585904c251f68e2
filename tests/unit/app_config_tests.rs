/*!
 * Tests for application configuration
 */

use anyhow::Result;
use subforge::app_config::{Config, LogLevel};
use subforge::formats::Format;

use crate::common;

#[test]
fn test_default_config_shouldHaveSensibleValues() {
    let config = Config::default();

    assert_eq!(config.default_format, Format::Srt);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.codecs.microdvd_frame_rate, 23.976);
    assert_eq!(config.codecs.sami_last_cue_duration_ms, 3000);
    assert_eq!(config.transforms.max_gap_seconds, 0.25);
    assert_eq!(config.transforms.merge_min_chars, 40);
    assert_eq!(config.validation.max_cps, 25.0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_fromFile_withEmptyObject_shouldUseDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "subforge.json", "{}")?;

    let config = Config::from_file(&path)?;

    assert_eq!(config, Config::default());
    Ok(())
}

#[test]
fn test_config_fromFile_withOverrides_shouldApplyThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let json = r#"{
        "default_format": "ass",
        "transforms": { "split_max_chars": 32 },
        "validation": { "max_cps": 17.0, "check_overlaps": false },
        "history_limit": 0,
        "log_level": "warn"
    }"#;
    let path = common::create_test_file(temp_dir.path(), "subforge.json", json)?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.default_format, Format::Ass);
    assert_eq!(config.transforms.split_max_chars, 32);
    assert_eq!(config.transforms.merge_min_chars, 40);
    assert_eq!(config.validation.max_cps, 17.0);
    assert!(!config.validation.check_overlaps);
    assert_eq!(config.history_limit, 0);
    assert_eq!(config.log_level, LogLevel::Warn);
    Ok(())
}

#[test]
fn test_config_fromFile_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "subforge.json", "{ not json")?;

    assert!(Config::from_file(&path).is_err());
    assert!(Config::from_file(temp_dir.path().join("missing.json")).is_err());
    Ok(())
}

#[test]
fn test_config_validate_withNegativeGap_shouldFail() {
    let mut config = Config::default();
    config.transforms.max_gap_seconds = -0.1;
    assert!(config.validate().is_err());
}
