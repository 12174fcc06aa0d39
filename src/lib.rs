//! tabletop-bridge
//!
//! Converts a 2D tabletop scene (characters, cards, dice, terrain, tables,
//! masks and notes laid out on a flat board) into a component-based 3D scene
//! graph, and replays that graph against a remote scene-editing API. Shared
//! meshes, materials and textures are created once and referenced everywhere.
//!
//! High-level modules
//! - `mapping`: pure coordinate and size mapping between board and scene
//! - `resources`: image metadata resolution, probing and texture import
//! - `converters`: one converter per source object kind
//! - `assembly`: applies the converters across the source forest
//! - `dedup`: shared mesh/material extraction and placeholder resolution
//! - `materialize`: sequential replay against a [`SceneApi`]
//! - `pipeline`: end-to-end glue
//!

pub mod assembly;
pub mod config;
pub mod context;
pub mod converters;
pub mod data_structures;
pub mod dedup;
pub mod error;
pub mod mapping;
pub mod materialize;
pub mod pipeline;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::{Vector2, Vector3};
pub use config::ConversionConfig;
pub use data_structures::{
    instance::Transform,
    scene_graph::{Component, FieldValue, SceneNode},
    source::{SourceDocument, SourceObject},
};
pub use error::{ConversionError, MaterializeError};
pub use materialize::{MaterializeFailure, MaterializeReport, SceneApi};
pub use pipeline::{ConvertedScene, convert_scene, materialize_scene, prepare_assets};
pub use resources::assets::{AssetContext, AssetOverrides, BlendMode};
