//! Asset resolution: image metadata, probing and texture import.
//!
//! - `assets` merges image metadata from overrides, built-ins, probes and prefixes
//! - `known` holds the curated built-in image tables
//! - `probe` fetches and decodes images concurrently
//! - `texture` turns resolved images into deduplicated texture definitions

pub mod assets;
pub mod known;
pub mod probe;
pub mod texture;
