#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};

use anyhow::bail;
use tabletop_bridge::{
    config::ConversionConfig,
    context::ConversionContext,
    data_structures::{
        scene_graph::{Component, FieldValue, SceneNode},
        source::{
            CardObject, CardStackObject, CharacterObject, DiceSymbolObject, ObjectBase,
            TableMaskObject, TableObject, TerrainExtensionTable, TerrainMode, TerrainObject,
            TextNoteObject,
        },
    },
    materialize::SceneApi,
    resources::{
        assets::AssetContext,
        texture::{TextureImport, import_textures},
    },
};

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Everything a converter needs, owned, so tests can borrow a context from it.
pub(crate) struct Fixture {
    pub assets: AssetContext,
    pub textures: TextureImport,
    pub config: ConversionConfig,
    pub extensions: TerrainExtensionTable,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_assets(AssetContext::new())
    }

    pub fn with_assets(assets: AssetContext) -> Self {
        init_logging();
        Self {
            assets,
            textures: TextureImport::default(),
            config: ConversionConfig::default(),
            extensions: TerrainExtensionTable::new(),
        }
    }

    /// Import textures for `identifiers` so materials reference them.
    pub fn import(mut self, identifiers: &[&str]) -> Self {
        let identifiers: Vec<String> = identifiers.iter().map(|s| s.to_string()).collect();
        self.textures = import_textures(&self.assets, &identifiers);
        self
    }

    pub fn ctx(&self) -> ConversionContext<'_> {
        ConversionContext::new(&self.assets, &self.textures, &self.config, &self.extensions)
    }
}

pub(crate) fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

pub(crate) fn assert_vec3(actual: [f32; 3], expected: [f32; 3]) {
    assert!(
        actual.iter().zip(expected.iter()).all(|(a, b)| close(*a, *b)),
        "expected {expected:?}, got {actual:?}"
    );
}

pub(crate) fn field<'a>(component: &'a Component, name: &str) -> &'a FieldValue {
    component
        .field(name)
        .unwrap_or_else(|| panic!("{} has no field {name}", component.component_type))
}

pub(crate) fn component<'a>(node: &'a SceneNode, component_type: &str) -> &'a Component {
    node.component_of_type(component_type)
        .unwrap_or_else(|| panic!("{} has no {component_type}", node.name))
}

pub(crate) fn child<'a>(node: &'a SceneNode, name: &str) -> &'a SceneNode {
    node.find_child(name)
        .unwrap_or_else(|| panic!("{} has no child {name}", node.name))
}

pub(crate) fn child_names(node: &SceneNode) -> Vec<&str> {
    node.children.iter().map(|child| child.name.as_str()).collect()
}

pub(crate) fn mesh_type(node: &SceneNode) -> Option<&str> {
    node.components
        .iter()
        .map(|c| c.component_type.as_str())
        .find(|t| *t == "QuadMesh" || *t == "TriangleMesh")
}

// Source builders

pub(crate) fn character(name: &str, size: f32, location: Option<&str>) -> CharacterObject {
    CharacterObject {
        base: ObjectBase::new(format!("id-{name}"), name, 100.0, 200.0),
        size,
        rotation: 0.0,
        location_tag: location.map(str::to_string),
    }
}

pub(crate) fn card(name: &str, size: f32, face_up: bool) -> CardObject {
    CardObject {
        base: ObjectBase::new(format!("id-{name}"), name, 0.0, 0.0),
        size,
        face_up,
        rotation: 0.0,
    }
}

pub(crate) fn card_stack(name: &str, cards: Vec<CardObject>) -> CardStackObject {
    CardStackObject {
        base: ObjectBase::new(format!("id-{name}"), name, 0.0, 0.0),
        rotation: 0.0,
        cards,
    }
}

pub(crate) fn dice(name: &str, size: f32, face: &str) -> DiceSymbolObject {
    DiceSymbolObject {
        base: ObjectBase::new(format!("id-{name}"), name, 0.0, 0.0),
        size,
        face: face.to_string(),
        rotation: 0.0,
    }
}

pub(crate) fn terrain(name: &str, width: f32, height: f32, depth: f32) -> TerrainObject {
    TerrainObject {
        base: ObjectBase::new(format!("id-{name}"), name, 0.0, 0.0),
        width,
        height,
        depth,
        mode: TerrainMode::All,
        rotation: 0.0,
        locked: false,
    }
}

pub(crate) fn table(name: &str, width: f32, height: f32) -> TableObject {
    TableObject {
        base: ObjectBase::new(format!("id-{name}"), name, 0.0, 0.0),
        width,
        height,
        children: Vec::new(),
    }
}

pub(crate) fn table_mask(name: &str, width: f32, height: f32, opacity: f32) -> TableMaskObject {
    TableMaskObject {
        base: ObjectBase::new(format!("id-{name}"), name, 0.0, 0.0),
        width,
        height,
        opacity,
        locked: false,
    }
}

pub(crate) fn text_note(name: &str, font_size: f32) -> TextNoteObject {
    TextNoteObject {
        base: ObjectBase::new(format!("id-{name}"), name, 0.0, 0.0),
        width: 4.0,
        height: 2.0,
        font_size,
        title: "Title".to_string(),
        text: "Body".to_string(),
    }
}

// Recording scene

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    CreateNode {
        id: String,
        parent_id: String,
        name: String,
        position: [f32; 3],
        scale: Option<[f32; 3]>,
        tag: Option<String>,
    },
    SetRotation {
        node_id: String,
        rotation: [f32; 3],
    },
    SetActive {
        node_id: String,
        active: bool,
    },
    CreateComponent {
        id: String,
        node_id: String,
        component_type: String,
        fields: BTreeMap<String, FieldValue>,
    },
    AppendList {
        component_id: String,
        field: String,
        elements: Vec<String>,
    },
}

/// In-memory [`SceneApi`] that records every call and can be told to fail.
#[derive(Debug, Default)]
pub(crate) struct RecordingScene {
    pub calls: Vec<Call>,
    next_id: u64,
    pub fail_node_names: HashSet<String>,
    pub fail_component_types: HashSet<String>,
    /// Answer list appends without any element ids.
    pub drop_list_elements: bool,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_node(mut self, name: &str) -> Self {
        self.fail_node_names.insert(name.to_string());
        self
    }

    pub fn failing_component(mut self, component_type: &str) -> Self {
        self.fail_component_types.insert(component_type.to_string());
        self
    }

    pub fn dropping_list_elements(mut self) -> Self {
        self.drop_list_elements = true;
        self
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Id of the node created with `name`, first match.
    pub fn node_id(&self, name: &str) -> Option<&str> {
        self.calls.iter().find_map(|call| match call {
            Call::CreateNode { id, name: n, .. } if n == name => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.calls.iter().find_map(|call| match call {
            Call::CreateNode { parent_id, name: n, .. } if n == name => Some(parent_id.as_str()),
            _ => None,
        })
    }

    pub fn created_node_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::CreateNode { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn rotations(&self) -> Vec<(&str, [f32; 3])> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetRotation { node_id, rotation } => Some((node_id.as_str(), *rotation)),
                _ => None,
            })
            .collect()
    }

    pub fn components(&self) -> Vec<(&str, &str, &BTreeMap<String, FieldValue>)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::CreateComponent { id, component_type, fields, .. } => {
                    Some((id.as_str(), component_type.as_str(), fields))
                }
                _ => None,
            })
            .collect()
    }
}

impl SceneApi for RecordingScene {
    async fn create_node(
        &mut self,
        parent_id: &str,
        name: &str,
        position: [f32; 3],
        scale: Option<[f32; 3]>,
        tag: Option<&str>,
    ) -> anyhow::Result<String> {
        if self.fail_node_names.contains(name) {
            bail!("create_node rejected for {name}");
        }
        let id = self.id("slot");
        self.calls.push(Call::CreateNode {
            id: id.clone(),
            parent_id: parent_id.to_string(),
            name: name.to_string(),
            position,
            scale,
            tag: tag.map(str::to_string),
        });
        Ok(id)
    }

    async fn set_rotation(&mut self, node_id: &str, euler_degrees: [f32; 3]) -> anyhow::Result<()> {
        self.calls.push(Call::SetRotation {
            node_id: node_id.to_string(),
            rotation: euler_degrees,
        });
        Ok(())
    }

    async fn set_active(&mut self, node_id: &str, active: bool) -> anyhow::Result<()> {
        self.calls.push(Call::SetActive {
            node_id: node_id.to_string(),
            active,
        });
        Ok(())
    }

    async fn create_component(
        &mut self,
        node_id: &str,
        component_type: &str,
        fields: &BTreeMap<String, FieldValue>,
    ) -> anyhow::Result<String> {
        if self.fail_component_types.contains(component_type) {
            bail!("create_component rejected for {component_type}");
        }
        if fields.values().any(FieldValue::is_list) {
            bail!("list fields must be appended, not set on creation");
        }
        let id = self.id("component");
        self.calls.push(Call::CreateComponent {
            id: id.clone(),
            node_id: node_id.to_string(),
            component_type: component_type.to_string(),
            fields: fields.clone(),
        });
        Ok(id)
    }

    async fn append_list_field_elements(
        &mut self,
        component_id: &str,
        field: &str,
        elements: &[String],
    ) -> anyhow::Result<Vec<String>> {
        let ids: Vec<String> = if self.drop_list_elements {
            Vec::new()
        } else {
            elements.iter().map(|_| self.id("element")).collect()
        };
        self.calls.push(Call::AppendList {
            component_id: component_id.to_string(),
            field: field.to_string(),
            elements: elements.to_vec(),
        });
        Ok(ids)
    }
}
