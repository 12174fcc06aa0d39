//! Texture import with deduplication.
//!
//! Every referenced image with a resolvable texture value becomes one
//! `StaticTexture2D` shared definition. Images that resolve to the same texture
//! value and filter mode share a definition, so an image referenced under
//! three different spellings is uploaded once.

use std::collections::HashMap;

use crate::{
    data_structures::scene_graph::{Component, FieldValue},
    dedup::{SharedDefinitionTable, SharedKind, placeholder},
    resources::assets::AssetContext,
};

pub const TEXTURE_TYPE: &str = "StaticTexture2D";

/// Texture definitions plus the signature each imported identifier maps to.
#[derive(Clone, Debug, Default)]
pub struct TextureImport {
    pub definitions: SharedDefinitionTable,
    by_identifier: HashMap<String, String>,
}

impl TextureImport {
    /// Signature of the texture imported for `identifier`.
    pub fn signature(&self, identifier: &str) -> Option<&str> {
        self.by_identifier.get(identifier).map(String::as_str)
    }

    /// Texture reference for `identifier`.
    ///
    /// A texture the caller registered as already uploaded always wins;
    /// otherwise the imported definition is referenced by placeholder.
    pub fn reference(&self, ctx: &AssetContext, identifier: &str) -> Option<String> {
        if let Some(id) = ctx.shared_texture_id(identifier) {
            return Some(id);
        }
        self.signature(identifier)
            .map(|signature| placeholder(SharedKind::Texture, signature))
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }
}

fn display_name(identifier: &str) -> String {
    identifier
        .replace('\\', "/")
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(identifier)
        .to_string()
}

/// Build texture definitions for `identifiers`. Identifiers with a
/// pre-resolved shared texture, or without any texture value, are skipped.
pub fn import_textures(ctx: &AssetContext, identifiers: &[String]) -> TextureImport {
    let mut import = TextureImport::default();
    for identifier in identifiers {
        if import.by_identifier.contains_key(identifier)
            || ctx.shared_texture_id(identifier).is_some()
        {
            continue;
        }
        let Some(url) = ctx.texture_value(identifier) else {
            log::warn!("No texture source for image {identifier}; it will render untextured.");
            continue;
        };
        // component ids are irrelevant for signatures
        let texture = Component::new(String::new(), TEXTURE_TYPE)
            .with("URL", FieldValue::Text(url))
            .with("FilterMode", FieldValue::Enum(ctx.filter_mode(identifier).as_str().to_string()));
        let signature = import
            .definitions
            .insert_component(&texture, display_name(identifier));
        import.by_identifier.insert(identifier.clone(), signature);
    }
    log::info!(
        "Imported {} image(s) as {} texture(s).",
        import.by_identifier.len(),
        import.definitions.len()
    );
    import
}
