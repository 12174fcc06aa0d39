//! Image metadata resolution.
//!
//! The same image is named differently by the document (`./assets/a.png`),
//! by the archive it ships in (`a.png`, `images\a.png`) and sometimes by an
//! external URL. [`lookup_keys`] expands an identifier into every spelling we
//! have seen, and [`AssetContext`] merges metadata from several tiers:
//!
//! 1. caller overrides
//! 2. curated built-in table ([`crate::resources::known`])
//! 3. per-file probes ([`crate::resources::probe`])
//! 4. asset path prefixes
//! 5. type defaults
//!
//! A lookup never fails; a miss just falls through to the next tier.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::resources::known::{KNOWN_IMAGES, prefix_blend_mode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    Opaque,
    Cutout,
    Alpha,
}

impl BlendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlendMode::Opaque => "Opaque",
            BlendMode::Cutout => "Cutout",
            BlendMode::Alpha => "Alpha",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMode {
    Point,
    #[default]
    Bilinear,
    Trilinear,
    Anisotropic,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Point => "Point",
            FilterMode::Bilinear => "Bilinear",
            FilterMode::Trilinear => "Trilinear",
            FilterMode::Anisotropic => "Anisotropic",
        }
    }
}

/// Where an image's bytes come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetSourceKind {
    BuiltIn,
    Archive,
    Url,
    Override,
}

/// Metadata for one image. Every field is optional; tiers fill what they know.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAssetInfo {
    /// Texture value the target platform loads (URL or asset URI).
    pub texture: Option<String>,
    /// Height divided by width.
    pub aspect_ratio: Option<f32>,
    pub blend_mode: Option<BlendMode>,
    pub filter_mode: Option<FilterMode>,
    pub source_kind: Option<AssetSourceKind>,
}

impl ImageAssetInfo {
    fn overwrite_with(&mut self, other: &ImageAssetInfo) {
        if other.texture.is_some() {
            self.texture = other.texture.clone();
        }
        if other.aspect_ratio.is_some() {
            self.aspect_ratio = other.aspect_ratio;
        }
        if other.blend_mode.is_some() {
            self.blend_mode = other.blend_mode;
        }
        if other.filter_mode.is_some() {
            self.filter_mode = other.filter_mode;
        }
        if other.source_kind.is_some() {
            self.source_kind = other.source_kind;
        }
    }

    fn fill_missing(&mut self, other: &ImageAssetInfo) {
        self.texture = self.texture.take().or_else(|| other.texture.clone());
        self.aspect_ratio = self.aspect_ratio.or(other.aspect_ratio);
        self.blend_mode = self.blend_mode.or(other.blend_mode);
        self.filter_mode = self.filter_mode.or(other.filter_mode);
        self.source_kind = self.source_kind.or(other.source_kind);
    }
}

/// Expand an identifier into every key it might be stored under, most
/// specific first: raw, slash-normalized, with and without `./`, bare file
/// name, file name without extension. For absolute URLs the same set is
/// derived from the URL path as well.
pub fn lookup_keys(identifier: &str) -> Vec<String> {
    let (mut keys, names) = key_forms(identifier);
    keys.extend(names);
    keys
}

/// [`lookup_keys`] split into path spellings of the image itself and the
/// file-name keys it shares with any image of the same name.
fn key_forms(identifier: &str) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    let mut names = Vec::new();
    let mut push = |keys: &mut Vec<String>, key: String| {
        if !key.is_empty() && seen.insert(key.clone()) {
            keys.push(key);
        }
    };

    push(&mut paths, identifier.to_string());
    let path = match url_path(identifier) {
        Some(path) => {
            push(&mut paths, path.clone());
            path
        }
        None => identifier.to_string(),
    };

    let normalized = path.replace('\\', "/");
    push(&mut paths, normalized.clone());
    let stripped = normalized
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string();
    push(&mut paths, stripped.clone());
    push(&mut paths, format!("./{stripped}"));

    let file_name = stripped.rsplit('/').next().unwrap_or(&stripped).to_string();
    push(&mut names, file_name.clone());
    if let Some((stem, _)) = file_name.rsplit_once('.') {
        push(&mut names, stem.to_string());
    }
    (paths, names)
}

/// `true` for `http://` and `https://` identifiers.
pub fn is_absolute_url(identifier: &str) -> bool {
    let lower = identifier.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Path component of an absolute URL, without query or fragment.
fn url_path(identifier: &str) -> Option<String> {
    if !is_absolute_url(identifier) {
        return None;
    }
    let (_, rest) = identifier.split_once("://")?;
    let path = rest.find('/').map(|i| &rest[i..]).unwrap_or("/");
    let path = path.split(['?', '#']).next().unwrap_or(path);
    Some(path.to_string())
}

/// Metadata of one tier. Path spellings of a registered identifier are
/// kept apart from its file-name keys, which other images may share.
#[derive(Clone, Debug, Default)]
pub struct AssetTier {
    exact: HashMap<String, ImageAssetInfo>,
    derived: HashMap<String, ImageAssetInfo>,
}

impl AssetTier {
    /// Record `info` for `identifier`. Path spellings are overwritten;
    /// file-name keys only have their gaps filled so another image with the
    /// same file name does not clobber them.
    pub fn merge(&mut self, identifier: &str, info: ImageAssetInfo) {
        let (paths, names) = key_forms(identifier);
        for key in paths {
            self.exact.entry(key).or_default().overwrite_with(&info);
        }
        for key in names {
            self.derived.entry(key).or_default().fill_missing(&info);
        }
    }

    fn get(&self, key: &str, exact: bool) -> Option<&ImageAssetInfo> {
        if exact { self.exact.get(key) } else { self.derived.get(key) }
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

/// First value `pick` yields across `tiers`, given in precedence order.
///
/// Every key is tried against the path spellings of all tiers before any
/// file-name key is, so a file-name match in a higher tier never shadows an
/// exact match in a lower one. Within each pass the more specific key wins
/// and tier order breaks ties.
fn find_in_tiers<T>(
    tiers: &[&AssetTier],
    identifier: &str,
    pick: impl Fn(&ImageAssetInfo) -> Option<T>,
) -> Option<T> {
    let keys = lookup_keys(identifier);
    [true, false].into_iter().find_map(|exact| {
        keys.iter().find_map(|key| {
            tiers
                .iter()
                .filter_map(|tier| tier.get(key, exact))
                .find_map(&pick)
        })
    })
}

/// Caller-supplied override maps, keyed by image identifier.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AssetOverrides {
    pub textures: HashMap<String, String>,
    pub aspect_ratios: HashMap<String, f32>,
    pub blend_modes: HashMap<String, BlendMode>,
    pub filter_modes: HashMap<String, FilterMode>,
    /// Images already uploaded as shared textures: identifier -> remote id.
    pub shared_textures: HashMap<String, String>,
}

/// Result of probing one image.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeResult {
    pub aspect_ratio: f32,
    pub blend_mode: BlendMode,
    /// Texture value for the probed bytes, when the source can provide one.
    pub location: Option<String>,
    pub source_kind: AssetSourceKind,
}

/// Merged view of every metadata tier.
#[derive(Debug, Default)]
pub struct AssetContext {
    overrides: AssetTier,
    probed: AssetTier,
    /// Remote texture ids, stored as the `texture` of each entry.
    shared_textures: AssetTier,
}

impl AssetContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(mut self, overrides: AssetOverrides) -> Self {
        self.apply_overrides(overrides);
        self
    }

    pub fn apply_overrides(&mut self, overrides: AssetOverrides) {
        for (identifier, texture) in overrides.textures {
            self.set_texture_override(&identifier, texture);
        }
        for (identifier, aspect) in overrides.aspect_ratios {
            self.set_aspect_ratio_override(&identifier, aspect);
        }
        for (identifier, mode) in overrides.blend_modes {
            self.set_blend_mode_override(&identifier, mode);
        }
        for (identifier, mode) in overrides.filter_modes {
            self.overrides.merge(
                &identifier,
                ImageAssetInfo {
                    filter_mode: Some(mode),
                    ..Default::default()
                },
            );
        }
        for (identifier, id) in overrides.shared_textures {
            self.set_shared_texture(&identifier, id);
        }
    }

    pub fn set_texture_override(&mut self, identifier: &str, texture: String) {
        self.overrides.merge(
            identifier,
            ImageAssetInfo {
                texture: Some(texture),
                source_kind: Some(AssetSourceKind::Override),
                ..Default::default()
            },
        );
    }

    pub fn set_aspect_ratio_override(&mut self, identifier: &str, aspect_ratio: f32) {
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            log::warn!("Ignoring aspect ratio override {aspect_ratio} for {identifier}.");
            return;
        }
        self.overrides.merge(
            identifier,
            ImageAssetInfo {
                aspect_ratio: Some(aspect_ratio),
                ..Default::default()
            },
        );
    }

    pub fn set_blend_mode_override(&mut self, identifier: &str, blend_mode: BlendMode) {
        self.overrides.merge(
            identifier,
            ImageAssetInfo {
                blend_mode: Some(blend_mode),
                ..Default::default()
            },
        );
    }

    /// Register a texture that already exists remotely. References to this
    /// image use `remote_id` directly instead of a shared texture definition.
    pub fn set_shared_texture(&mut self, identifier: &str, remote_id: String) {
        self.shared_textures.merge(
            identifier,
            ImageAssetInfo {
                texture: Some(remote_id),
                ..Default::default()
            },
        );
    }

    pub fn record_probe(&mut self, identifier: &str, probe: ProbeResult) {
        self.probed.merge(
            identifier,
            ImageAssetInfo {
                texture: probe.location,
                aspect_ratio: Some(probe.aspect_ratio),
                blend_mode: Some(probe.blend_mode),
                filter_mode: None,
                source_kind: Some(probe.source_kind),
            },
        );
    }

    fn resolve<T>(
        &self,
        identifier: &str,
        pick: impl Fn(&ImageAssetInfo) -> Option<T>,
    ) -> Option<T> {
        find_in_tiers(&[&self.overrides, &*KNOWN_IMAGES, &self.probed], identifier, pick)
    }

    /// Aspect ratio from overrides, built-ins or probes; `None` if unknown.
    pub fn known_aspect_ratio(&self, identifier: &str) -> Option<f32> {
        self.resolve(identifier, |info| info.aspect_ratio)
    }

    /// Aspect ratio (height / width), 1:1 when unknown.
    pub fn aspect_ratio(&self, identifier: &str) -> f32 {
        self.known_aspect_ratio(identifier).unwrap_or(1.0)
    }

    /// Blend mode; `default` is the call site's choice when nothing matches.
    pub fn blend_mode(&self, identifier: &str, default: BlendMode) -> BlendMode {
        self.resolve(identifier, |info| info.blend_mode)
            .or_else(|| {
                lookup_keys(identifier)
                    .iter()
                    .find_map(|key| prefix_blend_mode(key))
            })
            .unwrap_or(default)
    }

    pub fn filter_mode(&self, identifier: &str) -> FilterMode {
        self.resolve(identifier, |info| info.filter_mode)
            .unwrap_or_default()
    }

    /// Texture value the platform should load for `identifier`. Absolute URLs
    /// resolve to themselves when no tier knows better.
    pub fn texture_value(&self, identifier: &str) -> Option<String> {
        self.resolve(identifier, |info| info.texture.clone())
            .or_else(|| is_absolute_url(identifier).then(|| identifier.to_string()))
    }

    pub fn source_kind(&self, identifier: &str) -> Option<AssetSourceKind> {
        self.resolve(identifier, |info| info.source_kind).or_else(|| {
            is_absolute_url(identifier).then_some(AssetSourceKind::Url)
        })
    }

    /// Pre-resolved remote texture id, if the caller registered one.
    pub fn shared_texture_id(&self, identifier: &str) -> Option<String> {
        find_in_tiers(&[&self.shared_textures], identifier, |info| info.texture.clone())
    }

    /// Merged metadata, as the converters see it.
    pub fn info(&self, identifier: &str) -> ImageAssetInfo {
        ImageAssetInfo {
            texture: self.texture_value(identifier),
            aspect_ratio: self.known_aspect_ratio(identifier),
            blend_mode: self.resolve(identifier, |info| info.blend_mode),
            filter_mode: self.resolve(identifier, |info| info.filter_mode),
            source_kind: self.source_kind(identifier),
        }
    }

    /// `true` when probing could not add anything the higher tiers lack.
    pub fn is_fully_resolved(&self, identifier: &str) -> bool {
        self.resolve(identifier, |info| info.aspect_ratio).is_some()
            && self.resolve(identifier, |info| info.blend_mode).is_some()
            && self.resolve(identifier, |info| info.texture.clone()).is_some()
    }
}
