//! Error types of the conversion core.
//!
//! Asset resolution never fails (it degrades to fallbacks), so only two
//! classes remain: contract violations during conversion, and remote failures
//! while materializing.

use thiserror::Error;

/// A placeholder that survived resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedPlaceholder {
    pub kind: String,
    pub signature: String,
    /// Nodes that still reference the signature.
    pub node_ids: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{} shared asset reference(s) were never created: {}", .0.len(), describe(.0))]
    UnresolvedPlaceholders(Vec<UnresolvedPlaceholder>),
}

fn describe(unresolved: &[UnresolvedPlaceholder]) -> String {
    unresolved
        .iter()
        .map(|u| format!("{}:{} ({} node(s))", u.kind, u.signature, u.node_ids.len()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("failed to create container `{name}`: {message}")]
    Container { name: String, message: String },
}
