//! Conversion context shared by every converter.
//!
//! Bundles the read-only inputs a converter may consult (resolved image
//! metadata, imported textures, settings, terrain extensions) together with the
//! id allocator, so converter signatures stay small.

use crate::{
    config::ConversionConfig,
    data_structures::{
        scene_graph::{Component, IdAllocator, SceneNode},
        source::{ImageRef, TerrainExtensionTable},
    },
    resources::{
        assets::{AssetContext, BlendMode},
        texture::TextureImport,
    },
};

#[derive(Debug)]
pub struct ConversionContext<'a> {
    pub assets: &'a AssetContext,
    pub textures: &'a TextureImport,
    pub config: &'a ConversionConfig,
    pub terrain_extensions: &'a TerrainExtensionTable,
    ids: IdAllocator,
}

impl<'a> ConversionContext<'a> {
    pub fn new(
        assets: &'a AssetContext,
        textures: &'a TextureImport,
        config: &'a ConversionConfig,
        terrain_extensions: &'a TerrainExtensionTable,
    ) -> Self {
        Self {
            assets,
            textures,
            config,
            terrain_extensions,
            ids: IdAllocator::new(),
        }
    }

    /// A fresh node with a unique id.
    pub fn node(&self, name: impl Into<String>) -> SceneNode {
        SceneNode::new(self.ids.node_id(), name)
    }

    /// A fresh component with a unique id.
    pub fn component(&self, component_type: &str) -> Component {
        Component::new(self.ids.component_id(), component_type)
    }

    /// Aspect ratio of `image`, 1:1 when missing or unresolved.
    pub fn aspect_ratio(&self, image: Option<&ImageRef>) -> f32 {
        image.map_or(1.0, |image| self.assets.aspect_ratio(&image.identifier))
    }

    /// Aspect ratio of `image` only if some tier actually resolved it.
    pub fn known_aspect_ratio(&self, image: Option<&ImageRef>) -> Option<f32> {
        image.and_then(|image| self.assets.known_aspect_ratio(&image.identifier))
    }

    pub fn blend_mode(&self, image: Option<&ImageRef>, default: BlendMode) -> BlendMode {
        image.map_or(default, |image| self.assets.blend_mode(&image.identifier, default))
    }

    /// Shared texture reference (id or placeholder) for `image`.
    pub fn texture_reference(&self, image: Option<&ImageRef>) -> Option<String> {
        image.and_then(|image| self.textures.reference(self.assets, &image.identifier))
    }
}
