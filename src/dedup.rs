//! Shared asset deduplication.
//!
//! Converters give every visual its own mesh and material components. Before
//! materializing, two passes pull those components out of the tree:
//!
//! 1. every mesh (material) component is reduced to a canonical signature,
//!    removed from its node, and each reference to it in the same node is
//!    rewritten to a placeholder `shared-ref://<kind>/<signature>`
//! 2. once the shared definitions exist remotely, [`resolve_placeholders`]
//!    swaps every placeholder for the created id
//!
//! One [`SharedDefinition`] is recorded per distinct signature, so identical
//! meshes and materials are created once however many nodes use them.
//! Textures are deduplicated earlier, at import time
//! ([`crate::resources::texture`]), but share the placeholder scheme.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    data_structures::scene_graph::{Component, FieldValue, SceneNode},
    error::{ConversionError, UnresolvedPlaceholder},
};

pub const PLACEHOLDER_PREFIX: &str = "shared-ref://";

/// Component types that describe meshes.
pub const MESH_TYPES: [&str; 2] = ["QuadMesh", "TriangleMesh"];
/// Component types that describe materials.
pub const MATERIAL_TYPES: [&str; 1] = ["UnlitMaterial"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SharedKind {
    Mesh,
    Material,
    Texture,
}

impl SharedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharedKind::Mesh => "mesh",
            SharedKind::Material => "material",
            SharedKind::Texture => "texture",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "mesh" => Some(SharedKind::Mesh),
            "material" => Some(SharedKind::Material),
            "texture" => Some(SharedKind::Texture),
            _ => None,
        }
    }
}

pub fn placeholder(kind: SharedKind, signature: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{}/{signature}", kind.as_str())
}

pub fn is_placeholder(value: &str) -> bool {
    value.starts_with(PLACEHOLDER_PREFIX)
}

/// Split a placeholder into kind and signature.
pub fn parse_placeholder(value: &str) -> Option<(SharedKind, &str)> {
    let rest = value.strip_prefix(PLACEHOLDER_PREFIX)?;
    let (kind, signature) = rest.split_once('/')?;
    Some((SharedKind::parse(kind)?, signature))
}

/// Canonical text form of a float; `-0` and `0` compare equal.
fn canonical_float(v: f32) -> String {
    format!("{:.5}", v + 0.0)
}

fn canonical_floats(vs: &[f32]) -> String {
    vs.iter()
        .map(|v| canonical_float(*v))
        .collect::<Vec<_>>()
        .join(",")
}

fn canonical_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(v) => v.to_string(),
        FieldValue::Int(v) => v.to_string(),
        FieldValue::Float(v) => canonical_float(*v),
        FieldValue::Float2(v) => canonical_floats(v),
        FieldValue::Float3(v) => canonical_floats(v),
        FieldValue::Color(v) => canonical_floats(v),
        FieldValue::Text(v) => format!("{v:?}"),
        FieldValue::Enum(v) => v.clone(),
        FieldValue::Reference(v) => format!("@{v}"),
        FieldValue::ReferenceList(vs) => format!("[{}]", vs.join(",")),
    }
}

/// Signature of a component: its type and every field, in field-name order.
pub fn component_signature(component: &Component) -> String {
    signature_of(&component.component_type, &component.fields)
}

fn signature_of(component_type: &str, fields: &BTreeMap<String, FieldValue>) -> String {
    let body = fields
        .iter()
        .map(|(name, value)| format!("{name}={}", canonical_value(value)))
        .collect::<Vec<_>>()
        .join(";");
    format!("{component_type}{{{body}}}")
}

/// One shared mesh, material or texture, created once remotely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SharedDefinition {
    pub signature: String,
    pub name: String,
    pub component_type: String,
    pub fields: BTreeMap<String, FieldValue>,
}

/// Definitions by signature, in first-seen order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SharedDefinitionTable {
    order: Vec<String>,
    definitions: HashMap<String, SharedDefinition>,
}

impl SharedDefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `component` unless its signature is already known. Returns the signature.
    pub fn insert_component(&mut self, component: &Component, name: impl Into<String>) -> String {
        let signature = component_signature(component);
        if !self.definitions.contains_key(&signature) {
            self.order.push(signature.clone());
            self.definitions.insert(
                signature.clone(),
                SharedDefinition {
                    signature: signature.clone(),
                    name: name.into(),
                    component_type: component.component_type.clone(),
                    fields: component.fields.clone(),
                },
            );
        }
        signature
    }

    pub fn get(&self, signature: &str) -> Option<&SharedDefinition> {
        self.definitions.get(signature)
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.definitions.contains_key(signature)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedDefinition> {
        self.order.iter().filter_map(|sig| self.definitions.get(sig))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve placeholders inside the definitions themselves (materials
    /// referencing textures). The signatures stay as they were recorded.
    pub fn resolve_references(&mut self, refs: &SharedRefs) -> Result<(), ConversionError> {
        let mut unresolved = Unresolved::default();
        for signature in &self.order {
            if let Some(definition) = self.definitions.get_mut(signature) {
                for value in definition.fields.values_mut() {
                    resolve_value(value, refs, signature, &mut unresolved);
                }
            }
        }
        unresolved.into_result()
    }
}

/// All shared definitions of one conversion.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SharedAssets {
    pub meshes: SharedDefinitionTable,
    pub materials: SharedDefinitionTable,
    pub textures: SharedDefinitionTable,
}

impl SharedAssets {
    pub fn table(&self, kind: SharedKind) -> &SharedDefinitionTable {
        match kind {
            SharedKind::Mesh => &self.meshes,
            SharedKind::Material => &self.materials,
            SharedKind::Texture => &self.textures,
        }
    }
}

/// Signature -> created remote id, per kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedRefs {
    pub meshes: HashMap<String, String>,
    pub materials: HashMap<String, String>,
    pub textures: HashMap<String, String>,
}

impl SharedRefs {
    pub fn get(&self, kind: SharedKind, signature: &str) -> Option<&str> {
        let map = match kind {
            SharedKind::Mesh => &self.meshes,
            SharedKind::Material => &self.materials,
            SharedKind::Texture => &self.textures,
        };
        map.get(signature).map(String::as_str)
    }

    pub fn insert(&mut self, kind: SharedKind, signature: String, id: String) {
        let map = match kind {
            SharedKind::Mesh => &mut self.meshes,
            SharedKind::Material => &mut self.materials,
            SharedKind::Texture => &mut self.textures,
        };
        map.insert(signature, id);
    }
}

/// Pull every mesh component out of the tree into a shared table.
pub fn deduplicate_meshes(roots: &mut [SceneNode]) -> SharedDefinitionTable {
    deduplicate(roots, SharedKind::Mesh, &MESH_TYPES)
}

/// Pull every material component out of the tree into a shared table.
pub fn deduplicate_materials(roots: &mut [SceneNode]) -> SharedDefinitionTable {
    deduplicate(roots, SharedKind::Material, &MATERIAL_TYPES)
}

fn deduplicate(roots: &mut [SceneNode], kind: SharedKind, types: &[&str]) -> SharedDefinitionTable {
    let mut table = SharedDefinitionTable::new();
    for root in roots.iter_mut() {
        root.visit_mut(&mut |node| extract_shared(node, kind, types, &mut table));
    }
    log::debug!("Deduplicated {} {} signature(s).", table.len(), kind.as_str());
    table
}

fn extract_shared(
    node: &mut SceneNode,
    kind: SharedKind,
    types: &[&str],
    table: &mut SharedDefinitionTable,
) {
    let mut rewrites: HashMap<String, String> = HashMap::new();
    let node_name = node.name.clone();
    node.components.retain(|component| {
        if !types.contains(&component.component_type.as_str()) {
            return true;
        }
        let name = format!("{} {}", node_name, component.component_type);
        let signature = table.insert_component(component, name);
        rewrites.insert(component.id.clone(), placeholder(kind, &signature));
        false
    });
    if rewrites.is_empty() {
        return;
    }
    for component in node.components.iter_mut() {
        for value in component.fields.values_mut() {
            value.rewrite_references(&mut |target| {
                if let Some(replacement) = rewrites.get(target.as_str()) {
                    *target = replacement.clone();
                }
            });
        }
    }
}

#[derive(Default)]
struct Unresolved {
    by_signature: BTreeMap<(String, String), Vec<String>>,
}

impl Unresolved {
    fn record(&mut self, kind: &str, signature: &str, owner: &str) {
        let owners = self
            .by_signature
            .entry((kind.to_string(), signature.to_string()))
            .or_default();
        if !owners.iter().any(|o| o == owner) {
            owners.push(owner.to_string());
        }
    }

    fn into_list(self) -> Vec<UnresolvedPlaceholder> {
        self.by_signature
            .into_iter()
            .map(|((kind, signature), node_ids)| UnresolvedPlaceholder {
                kind,
                signature,
                node_ids,
            })
            .collect()
    }

    fn into_result(self) -> Result<(), ConversionError> {
        let list = self.into_list();
        if list.is_empty() {
            Ok(())
        } else {
            Err(ConversionError::UnresolvedPlaceholders(list))
        }
    }
}

fn resolve_value(
    value: &mut FieldValue,
    refs: &SharedRefs,
    owner: &str,
    unresolved: &mut Unresolved,
) {
    value.rewrite_references(&mut |target| {
        if !is_placeholder(target) {
            return;
        }
        match parse_placeholder(target) {
            Some((kind, signature)) => match refs.get(kind, signature) {
                Some(id) => *target = id.to_string(),
                None => unresolved.record(kind.as_str(), signature, owner),
            },
            None => unresolved.record("unknown", target, owner),
        }
    });
}

/// Replace every placeholder in the tree with its created id.
///
/// Placeholders without a created definition are left in place and reported
/// together; the tree must not be materialized in that case.
pub fn resolve_placeholders(
    roots: &mut [SceneNode],
    refs: &SharedRefs,
) -> Result<(), ConversionError> {
    let mut unresolved = Unresolved::default();
    for root in roots.iter_mut() {
        root.visit_mut(&mut |node| {
            let owner = node.id.clone();
            for component in node.components.iter_mut() {
                for value in component.fields.values_mut() {
                    resolve_value(value, refs, &owner, &mut unresolved);
                }
            }
        });
    }
    unresolved.into_result()
}

/// Every placeholder still present in the tree, grouped by signature.
pub fn find_placeholders(roots: &[SceneNode]) -> Vec<UnresolvedPlaceholder> {
    let mut found = Unresolved::default();
    for root in roots {
        root.visit(&mut |node| {
            for component in &node.components {
                for value in component.fields.values() {
                    for target in value.references() {
                        if !is_placeholder(target) {
                            continue;
                        }
                        match parse_placeholder(target) {
                            Some((kind, signature)) => {
                                found.record(kind.as_str(), signature, &node.id)
                            }
                            None => found.record("unknown", target, &node.id),
                        }
                    }
                }
            }
        });
    }
    found.into_list()
}
