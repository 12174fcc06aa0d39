//! Scene graph produced by the converters.
//!
//! A [`SceneNode`] owns a center-anchored [`Transform`], an ordered list of
//! [`Component`]s and an ordered list of children. Components are typed field
//! bags; reference fields point at other components either by a literal id or,
//! until shared assets are resolved, by a placeholder string (see
//! [`crate::dedup`]).

use std::{cell::Cell, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::data_structures::{instance::Transform, source::SourceKind};

/// A self-describing component field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Color([f32; 4]),
    Text(String),
    Enum(String),
    Reference(String),
    ReferenceList(Vec<String>),
}

impl FieldValue {
    /// List values are sent in a second phase after the component exists.
    pub fn is_list(&self) -> bool {
        matches!(self, FieldValue::ReferenceList(_))
    }

    pub fn as_reference(&self) -> Option<&str> {
        match self {
            FieldValue::Reference(target) => Some(target),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float2(&self) -> Option<[f32; 2]> {
        match self {
            FieldValue::Float2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float3(&self) -> Option<[f32; 3]> {
        match self {
            FieldValue::Float3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            FieldValue::Color(v) => Some(*v),
            _ => None,
        }
    }

    /// Every reference target held by this value.
    pub fn references(&self) -> Vec<&str> {
        match self {
            FieldValue::Reference(target) => vec![target.as_str()],
            FieldValue::ReferenceList(targets) => targets.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Apply `rewrite` to every reference target held by this value.
    pub fn rewrite_references(&mut self, rewrite: &mut dyn FnMut(&mut String)) {
        match self {
            FieldValue::Reference(target) => rewrite(target),
            FieldValue::ReferenceList(targets) => targets.iter_mut().for_each(|t| rewrite(t)),
            _ => {}
        }
    }
}

/// Typed bundle of fields attached to a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub component_type: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Component {
    pub fn new(id: String, component_type: &str) -> Self {
        Self {
            id,
            component_type: component_type.to_string(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: &str, value: FieldValue) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    pub fn field(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Scalar fields and list fields, split for the two-phase create.
    pub fn split_fields(&self) -> (BTreeMap<String, FieldValue>, Vec<(String, Vec<String>)>) {
        split_fields(&self.fields)
    }
}

/// Scalar fields and list fields of a field bag, list fields in name order.
pub fn split_fields(
    fields: &BTreeMap<String, FieldValue>,
) -> (BTreeMap<String, FieldValue>, Vec<(String, Vec<String>)>) {
    let mut scalars = BTreeMap::new();
    let mut lists = Vec::new();
    for (name, value) in fields {
        match value {
            FieldValue::ReferenceList(items) => lists.push((name.clone(), items.clone())),
            other => {
                scalars.insert(name.clone(), other.clone());
            }
        }
    }
    (scalars, lists)
}

/// One addressable node (a "slot") in the target scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: String,
    pub name: String,
    pub transform: Transform,
    pub active: bool,
    pub tag: Option<String>,
    pub source_kind: Option<SourceKind>,
    pub components: Vec<Component>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(id: String, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transform: Transform::new(),
            active: true,
            tag: None,
            source_kind: None,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Attach `component` and return its id.
    pub fn add_component(&mut self, component: Component) -> String {
        let id = component.id.clone();
        self.components.push(component);
        id
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn get_children(&self) -> &Vec<SceneNode> {
        &self.children
    }

    pub fn find_child(&self, name: &str) -> Option<&SceneNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn components_of_type<'a, 'b>(
        &'a self,
        component_type: &'b str,
    ) -> impl Iterator<Item = &'a Component> + use<'a, 'b> {
        self.components
            .iter()
            .filter(move |component| component.component_type == component_type)
    }

    pub fn component_of_type(&self, component_type: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|component| component.component_type == component_type)
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|component| component.id == id)
    }

    /// Visit this node and all descendants, parents first.
    pub fn visit<'a>(&'a self, visitor: &mut dyn FnMut(&'a SceneNode)) {
        visitor(self);
        for child in &self.children {
            child.visit(visitor);
        }
    }

    /// Mutable variant of [`visit`](Self::visit).
    pub fn visit_mut(&mut self, visitor: &mut dyn FnMut(&mut SceneNode)) {
        visitor(self);
        for child in self.children.iter_mut() {
            child.visit_mut(visitor);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

/// Hands out node and component ids that are unique for one conversion run,
/// regardless of what identifiers the source used.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: Cell<u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_id(&self) -> String {
        format!("node-{:06}", self.bump())
    }

    pub fn component_id(&self) -> String {
        format!("component-{:06}", self.bump())
    }

    fn bump(&self) -> u64 {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }
}
