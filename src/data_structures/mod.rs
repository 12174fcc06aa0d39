//! Data structures shared across the conversion pipeline.
//!
//! - `source` holds the typed tabletop objects handed over by the document parser
//! - `instance` holds center-anchored node transforms
//! - `scene_graph` holds scene nodes, components and field values

pub mod instance;
pub mod scene_graph;
pub mod source;
