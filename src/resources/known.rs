//! Curated metadata for images that ship with the tabletop application.
//!
//! Built-in images are referenced by fixed identifiers, so their aspect ratio,
//! blend mode and texture location are known without probing. Anything under
//! a known asset directory but missing from the exact table falls back to the
//! prefix table for its blend mode.

use once_cell::sync::Lazy;

use crate::resources::assets::{AssetSourceKind, AssetTier, BlendMode, FilterMode, ImageAssetInfo};

/// Where built-in images are served from on the target platform.
pub const BUILTIN_ASSET_BASE: &str = "builtin://tabletop/";

const TRUMP_ASPECT: f32 = 1.4;
const TRUMP_SUITS: [&str; 4] = ["c", "d", "h", "s"];
const DICE_KINDS: [(u32, &str); 6] = [
    (4, "4_dice"),
    (6, "6_dice"),
    (8, "8_dice"),
    (10, "10_dice"),
    (12, "12_dice"),
    (20, "20_dice"),
];

/// Exact identifiers of built-in images.
pub(crate) static KNOWN_IMAGES: Lazy<AssetTier> = Lazy::new(|| {
    let mut tier = AssetTier::default();
    let mut add = |identifier: &str,
                   path: &str,
                   aspect: f32,
                   blend: BlendMode,
                   filter: FilterMode| {
        tier.merge(
            identifier,
            ImageAssetInfo {
                texture: Some(format!("{BUILTIN_ASSET_BASE}{path}")),
                aspect_ratio: Some(aspect),
                blend_mode: Some(blend),
                filter_mode: Some(filter),
                source_kind: Some(AssetSourceKind::BuiltIn),
            },
        );
    };

    add(
        "testTableBackgroundImage_image",
        "images/BG10a_80.jpg",
        0.75,
        BlendMode::Opaque,
        FilterMode::Bilinear,
    );
    add(
        "testCharacter_1_image",
        "images/mon_052.gif",
        1.0,
        BlendMode::Cutout,
        FilterMode::Point,
    );
    add(
        "none_icon",
        "images/ic_account_circle_black_24dp_2x.png",
        1.0,
        BlendMode::Alpha,
        FilterMode::Bilinear,
    );
    add(
        "stand_no_image",
        "images/white.png",
        1.0,
        BlendMode::Opaque,
        FilterMode::Bilinear,
    );

    for suit in TRUMP_SUITS {
        for rank in 1..=13 {
            let path = format!("images/trump/{suit}{rank:02}.gif");
            add(
                &format!("./assets/{path}"),
                &path,
                TRUMP_ASPECT,
                BlendMode::Opaque,
                FilterMode::Bilinear,
            );
        }
    }
    for file in ["x01", "x02", "z01", "z02"] {
        let path = format!("images/trump/{file}.gif");
        add(
            &format!("./assets/{path}"),
            &path,
            TRUMP_ASPECT,
            BlendMode::Opaque,
            FilterMode::Bilinear,
        );
    }

    for (faces, dir) in DICE_KINDS {
        for face in 1..=faces {
            let path = format!("images/dice/{dir}/{dir}[{face}].png");
            add(
                &format!("./assets/{path}"),
                &path,
                1.0,
                BlendMode::Cutout,
                FilterMode::Bilinear,
            );
        }
    }

    tier
});

/// Blend modes by asset path prefix, longest prefix first.
pub(crate) static PREFIX_BLEND_MODES: Lazy<Vec<(&'static str, BlendMode)>> = Lazy::new(|| {
    let mut table = vec![
        ("./assets/images/trump/", BlendMode::Opaque),
        ("./assets/images/dice/", BlendMode::Cutout),
        ("./assets/images/", BlendMode::Cutout),
    ];
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
});

/// Blend mode implied by the asset path of `key`, if any prefix matches.
pub(crate) fn prefix_blend_mode(key: &str) -> Option<BlendMode> {
    PREFIX_BLEND_MODES
        .iter()
        .find(|(prefix, _)| key.starts_with(prefix))
        .map(|(_, mode)| *mode)
}
