//! Per-file image probes.
//!
//! A probe fetches the bytes of one image, decodes them and derives the aspect
//! ratio and a blend mode from the alpha channel. Probes for distinct
//! identifiers run concurrently and independently: a failed probe is logged
//! and the identifier keeps whatever lower tier applies.

use std::path::{Component as PathComponent, Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use futures::future::join_all;
use image::{DynamicImage, GenericImageView};

use crate::resources::assets::{
    AssetContext, AssetSourceKind, BlendMode, ProbeResult, is_absolute_url, lookup_keys,
};

/// Raw bytes of one image plus the texture value they are reachable under.
#[derive(Clone, Debug)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub location: Option<String>,
    pub source_kind: AssetSourceKind,
}

/// Something that can hand out image bytes by identifier: an extracted
/// archive, an HTTP client, an in-memory map in tests.
#[allow(async_fn_in_trait)]
pub trait ImageSource {
    async fn fetch(&self, identifier: &str) -> anyhow::Result<FetchedImage>;
}

/// Images stored in an extracted archive directory.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Relative paths worth trying for `identifier`, most specific first.
    fn candidates(&self, identifier: &str) -> Vec<PathBuf> {
        lookup_keys(identifier)
            .into_iter()
            .map(PathBuf::from)
            .filter(|path| is_contained(path))
            .map(|path| self.root.join(path))
            .collect()
    }
}

/// Reject absolute paths and parent traversal.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, PathComponent::Normal(_) | PathComponent::CurDir))
}

impl ImageSource for DirectorySource {
    async fn fetch(&self, identifier: &str) -> anyhow::Result<FetchedImage> {
        if is_absolute_url(identifier) {
            bail!("{identifier} is a remote image, not part of the archive");
        }
        for candidate in self.candidates(identifier) {
            match tokio::fs::metadata(&candidate).await {
                Ok(meta) if meta.is_file() => {
                    let bytes = tokio::fs::read(&candidate)
                        .await
                        .with_context(|| format!("reading {}", candidate.display()))?;
                    return Ok(FetchedImage {
                        bytes,
                        location: Some(format!("file://{}", candidate.display())),
                        source_kind: AssetSourceKind::Archive,
                    });
                }
                _ => continue,
            }
        }
        Err(anyhow!(
            "no file for {identifier} under {}",
            self.root.display()
        ))
    }
}

/// Decode `bytes` and derive aspect ratio and blend mode.
pub fn analyze_image(bytes: &[u8]) -> anyhow::Result<(f32, BlendMode)> {
    let image = image::load_from_memory(bytes).context("undecodable image")?;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        bail!("image has no pixels ({width}x{height})");
    }
    Ok((height as f32 / width as f32, blend_mode_of(&image)))
}

/// Opaque without alpha; Cutout when alpha is only ever 0 or 255; Alpha otherwise.
fn blend_mode_of(image: &DynamicImage) -> BlendMode {
    if !image.color().has_alpha() {
        return BlendMode::Opaque;
    }
    let mut has_holes = false;
    for pixel in image.to_rgba8().pixels() {
        match pixel.0[3] {
            255 => {}
            0 => has_holes = true,
            _ => return BlendMode::Alpha,
        }
    }
    if has_holes {
        BlendMode::Cutout
    } else {
        BlendMode::Opaque
    }
}

async fn probe_one<S: ImageSource>(source: &S, identifier: &str) -> anyhow::Result<ProbeResult> {
    let fetched = source.fetch(identifier).await?;
    let (aspect_ratio, blend_mode) = analyze_image(&fetched.bytes)?;
    Ok(ProbeResult {
        aspect_ratio,
        blend_mode,
        location: fetched.location,
        source_kind: fetched.source_kind,
    })
}

/// Probe every distinct identifier concurrently. Results come back in input
/// order; each is independent of the others.
pub async fn probe_images<S: ImageSource>(
    source: &S,
    identifiers: &[String],
) -> Vec<(String, anyhow::Result<ProbeResult>)> {
    let mut unique: Vec<&String> = Vec::new();
    for identifier in identifiers {
        if !unique.contains(&identifier) {
            unique.push(identifier);
        }
    }
    let results = join_all(unique.iter().map(|id| probe_one(source, id))).await;
    unique.into_iter().cloned().zip(results).collect()
}

/// Probe whatever the higher tiers cannot fully describe and record the
/// successes. Returns the number of identifiers that were resolved.
pub async fn probe_into<S: ImageSource>(
    ctx: &mut AssetContext,
    source: &S,
    identifiers: &[String],
) -> usize {
    let pending: Vec<String> = identifiers
        .iter()
        .filter(|id| !ctx.is_fully_resolved(id))
        .cloned()
        .collect();
    log::debug!("Probing {} of {} images.", pending.len(), identifiers.len());

    let mut resolved = 0;
    for (identifier, result) in probe_images(source, &pending).await {
        match result {
            Ok(probe) => {
                ctx.record_probe(&identifier, probe);
                resolved += 1;
            }
            Err(e) => log::warn!("Image {identifier} could not be probed, using fallbacks: {e:#}"),
        }
    }
    resolved
}
