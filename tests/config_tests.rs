//! Configuration Tests
//!
//! Tests for:
//! - TerrainConfig defaults
//! - Partial JSON overrides
//! - Rejection of out-of-domain values

use bokeh_terrain::renderer::{PowerMode, RendererConfig};
use bokeh_terrain::{TerrainConfig, TerrainVariant};

#[test]
fn defaults_validate() {
    let config = TerrainConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.clear_color, [0x11, 0x11, 0x11]);
    assert_eq!(config.terrain.variant, TerrainVariant::DepthSynchronized);
    assert_eq!(config.texture.lines_count, 5);
    assert_eq!(config.renderer, RendererConfig::default());
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let config = TerrainConfig::from_json_str(
        r#"{
            "terrain": { "elevation": 1.5, "variant": "additive" },
            "bokeh": { "maxblur": 0.01 },
            "renderer": { "power": "low_power" }
        }"#,
    )
    .unwrap();

    assert_eq!(config.terrain.elevation, 1.5);
    assert_eq!(config.terrain.variant, TerrainVariant::Additive);
    assert_eq!(config.terrain.texture_frequency, 10.0);
    assert_eq!(config.bokeh.maxblur, 0.01);
    assert_eq!(config.bokeh.focus, 1.0);
    assert_eq!(config.renderer.power, PowerMode::LowPower);
    assert!(config.renderer.vsync);
    assert_eq!(config.texture, TerrainConfig::default().texture);
}

#[test]
fn empty_object_is_the_default() {
    assert_eq!(TerrainConfig::from_json_str("{}").unwrap(), TerrainConfig::default());
}

#[test]
fn out_of_domain_values_are_rejected() {
    for json in [
        r#"{ "texture": { "lines_count": 0 } }"#,
        r#"{ "texture": { "small_line_alpha": 2.0 } }"#,
        r#"{ "terrain": { "segments": 0 } }"#,
        r#"{ "bokeh": { "aperture": -0.5 } }"#,
        r#"{ "camera": { "near": 10.0, "far": 1.0 } }"#,
    ] {
        assert!(TerrainConfig::from_json_str(json).is_err(), "{json}");
    }
}

#[test]
fn malformed_json_is_an_error() {
    assert!(TerrainConfig::from_json_str("{ \"terrain\": ").is_err());
    assert!(TerrainConfig::from_json_str(r#"{ "terrain": { "variant": "glowing" } }"#).is_err());
}

#[test]
fn serialized_config_reads_back_unchanged() {
    let mut config = TerrainConfig::default();
    config.terrain.segments = 64;
    config.bokeh.focus = 2.5;

    let json = config.to_json_string().unwrap();
    assert_eq!(TerrainConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn missing_file_is_an_io_error() {
    let result = TerrainConfig::from_json_file("/nonexistent/terrain.json");
    assert!(matches!(result, Err(bokeh_terrain::BokehError::IoError(_))));
}
