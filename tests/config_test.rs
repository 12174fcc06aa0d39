use tabletop_bridge::{ConversionConfig, resources::assets::AssetOverrides};

mod common;

#[test]
fn defaults_keep_colliders_solid() {
    let config = ConversionConfig::default();
    assert!(!config.locked_terrain_character_passable);
    assert!(!config.table_character_passable);
    assert_eq!(config.min_font_size, 4.0);
}

#[test]
fn partial_toml_falls_back_to_defaults() {
    let config =
        ConversionConfig::from_toml_str("locked_terrain_character_passable = true\n").unwrap();
    assert!(config.locked_terrain_character_passable);
    assert!(!config.table_character_passable);
    assert_eq!(config.min_font_size, 4.0);
}

#[test]
fn invalid_toml_is_reported() {
    let err = ConversionConfig::from_toml_str("min_font_size = \"big\"").unwrap_err();
    assert!(format!("{err:#}").contains("invalid conversion config"));
}

#[test]
fn asset_overrides_load_from_toml() {
    let overrides: AssetOverrides = toml::from_str(
        r#"
        [aspect_ratios]
        "./a.png" = 1.5

        [blend_modes]
        "./a.png" = "Alpha"

        [shared_textures]
        "b.png" = "remote-7"
        "#,
    )
    .unwrap();
    assert_eq!(overrides.aspect_ratios.get("./a.png"), Some(&1.5));
    assert_eq!(overrides.shared_textures.get("b.png").map(String::as_str), Some("remote-7"));
    assert!(overrides.textures.is_empty());
}
