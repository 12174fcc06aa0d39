//! End-to-end conversion: probe, convert, deduplicate, materialize.

use crate::{
    assembly::assemble,
    config::ConversionConfig,
    context::ConversionContext,
    data_structures::{scene_graph::SceneNode, source::SourceDocument},
    dedup::{SharedAssets, deduplicate_materials, deduplicate_meshes, resolve_placeholders},
    materialize::{MaterializeReport, Materializer, Progress, SceneApi},
    resources::{
        assets::{AssetContext, AssetOverrides},
        probe::{ImageSource, probe_into},
        texture::import_textures,
    },
};

/// A converted document: one tree per top-level object, with meshes and
/// materials pulled out into shared definitions.
#[derive(Clone, Debug, Default)]
pub struct ConvertedScene {
    pub roots: Vec<SceneNode>,
    pub shared: SharedAssets,
}

impl ConvertedScene {
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(SceneNode::node_count).sum()
    }
}

/// Build the asset context for `document`: caller overrides first, then
/// probing whatever the overrides and built-ins leave open.
pub async fn prepare_assets<S: ImageSource>(
    document: &SourceDocument,
    overrides: AssetOverrides,
    source: &S,
) -> AssetContext {
    let mut assets = AssetContext::new().with_overrides(overrides);
    let identifiers = document.image_identifiers();
    let probed = probe_into(&mut assets, source, &identifiers).await;
    log::info!("Resolved {probed} of {} image(s) by probing.", identifiers.len());
    assets
}

/// Convert `document` into scene trees with shared meshes, materials and textures.
pub fn convert_scene(
    document: &SourceDocument,
    assets: &AssetContext,
    config: &ConversionConfig,
) -> ConvertedScene {
    let textures = import_textures(assets, &document.image_identifiers());
    let mut roots = {
        let ctx = ConversionContext::new(assets, &textures, config, &document.terrain_extensions);
        assemble(&document.objects, &ctx)
    };
    let meshes = deduplicate_meshes(&mut roots);
    let materials = deduplicate_materials(&mut roots);
    let scene = ConvertedScene {
        roots,
        shared: SharedAssets {
            meshes,
            materials,
            textures: textures.definitions,
        },
    };
    log::info!(
        "Converted {} object(s) into {} node(s), {} mesh(es), {} material(s), {} texture(s).",
        scene.roots.len(),
        scene.node_count(),
        scene.shared.meshes.len(),
        scene.shared.materials.len(),
        scene.shared.textures.len()
    );
    scene
}

/// Materialize `scene` under the node `root_id`.
///
/// Shared definitions are created first and every placeholder is resolved
/// before the first object is replayed. An object that still references a
/// shared asset which could not be created is reported as failed and never
/// sent; the other objects are replayed as usual. Per-object failures are
/// reported, not returned.
pub async fn materialize_scene<A: SceneApi>(
    api: &mut A,
    root_id: &str,
    mut scene: ConvertedScene,
    progress: impl FnMut(&Progress),
) -> anyhow::Result<MaterializeReport> {
    let mut materializer = Materializer::new(api, root_id);
    let refs = materializer.create_shared_definitions(&mut scene.shared).await?;
    if let Err(e) = resolve_placeholders(&mut scene.roots, &refs) {
        log::error!("{e}");
    }
    let report = materializer.materialize_roots(&scene.roots, progress).await;
    log::info!(
        "Materialized {} object(s) ({} node(s)), {} failure(s).",
        report.created_objects,
        report.created_nodes,
        report.failures.len()
    );
    Ok(report)
}
