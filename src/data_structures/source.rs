//! Typed tabletop source objects.
//!
//! The document parser hands over a forest of [`SourceObject`]s plus a side
//! table of terrain slope extensions. Every object shares an [`ObjectBase`];
//! the kind-specific geometry lives in the variant payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Edge/corner-anchored position on the table, in source units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcePoint {
    pub x: f32,
    pub y: f32,
}

/// Reference to an image by identifier, with the label the source gave it
/// (`front`, `back`, `wall`, `floor`, a dice face name, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub identifier: String,
    pub label: String,
}

impl ImageRef {
    pub fn new(identifier: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            label: label.into(),
        }
    }
}

/// Fields every source object carries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectBase {
    pub identifier: String,
    pub name: String,
    pub location: SourcePoint,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

impl ObjectBase {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            location: SourcePoint { x, y },
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, identifier: impl Into<String>, label: impl Into<String>) -> Self {
        self.images.push(ImageRef::new(identifier, label));
        self
    }

    /// First image whose label matches `label`.
    pub fn image_labeled(&self, label: &str) -> Option<&ImageRef> {
        self.images.iter().find(|image| image.label == label)
    }

    /// First image, whatever its label.
    pub fn main_image(&self) -> Option<&ImageRef> {
        self.images.first()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterObject {
    pub base: ObjectBase,
    pub size: f32,
    #[serde(default)]
    pub rotation: f32,
    /// Where the character lives (`table`, `graveyard`, ...). Used for inventory grouping.
    #[serde(default)]
    pub location_tag: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardObject {
    pub base: ObjectBase,
    pub size: f32,
    pub face_up: bool,
    #[serde(default)]
    pub rotation: f32,
}

impl CardObject {
    pub const FRONT: &'static str = "front";
    pub const BACK: &'static str = "back";

    pub fn front(&self) -> Option<&ImageRef> {
        self.base.image_labeled(Self::FRONT)
    }

    pub fn back(&self) -> Option<&ImageRef> {
        self.base.image_labeled(Self::BACK)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardStackObject {
    pub base: ObjectBase,
    #[serde(default)]
    pub rotation: f32,
    /// Cards in source order.
    pub cards: Vec<CardObject>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiceSymbolObject {
    pub base: ObjectBase,
    pub size: f32,
    /// Label of the face currently shown.
    pub face: String,
    #[serde(default)]
    pub rotation: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainMode {
    /// Floor and walls are shown.
    #[default]
    All,
    /// Only the floor is shown; the origin sits on the top surface.
    NoWalls,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainObject {
    pub base: ObjectBase,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    #[serde(default)]
    pub mode: TerrainMode,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub locked: bool,
}

impl TerrainObject {
    pub const WALL: &'static str = "wall";
    pub const FLOOR: &'static str = "floor";
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableObject {
    pub base: ObjectBase,
    pub width: f32,
    pub height: f32,
    /// Objects placed on this table (terrain, masks, ...).
    #[serde(default)]
    pub children: Vec<SourceObject>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableMaskObject {
    pub base: ObjectBase,
    pub width: f32,
    pub height: f32,
    /// Opacity in percent.
    pub opacity: f32,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextNoteObject {
    pub base: ObjectBase,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// One tabletop object, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceObject {
    Character(CharacterObject),
    Card(CardObject),
    CardStack(CardStackObject),
    DiceSymbol(DiceSymbolObject),
    Terrain(TerrainObject),
    Table(TableObject),
    TableMask(TableMaskObject),
    TextNote(TextNoteObject),
}

/// Kind tag carried over to scene nodes for grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Character,
    Card,
    CardStack,
    DiceSymbol,
    Terrain,
    Table,
    TableMask,
    TextNote,
}

impl SourceObject {
    pub fn base(&self) -> &ObjectBase {
        match self {
            SourceObject::Character(o) => &o.base,
            SourceObject::Card(o) => &o.base,
            SourceObject::CardStack(o) => &o.base,
            SourceObject::DiceSymbol(o) => &o.base,
            SourceObject::Terrain(o) => &o.base,
            SourceObject::Table(o) => &o.base,
            SourceObject::TableMask(o) => &o.base,
            SourceObject::TextNote(o) => &o.base,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceObject::Character(_) => SourceKind::Character,
            SourceObject::Card(_) => SourceKind::Card,
            SourceObject::CardStack(_) => SourceKind::CardStack,
            SourceObject::DiceSymbol(_) => SourceKind::DiceSymbol,
            SourceObject::Terrain(_) => SourceKind::Terrain,
            SourceObject::Table(_) => SourceKind::Table,
            SourceObject::TableMask(_) => SourceKind::TableMask,
            SourceObject::TextNote(_) => SourceKind::TextNote,
        }
    }

    /// Every image identifier referenced by this object and its descendants.
    pub fn image_identifiers(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .base()
            .images
            .iter()
            .map(|image| image.identifier.as_str())
            .collect();
        match self {
            SourceObject::CardStack(stack) => {
                for card in &stack.cards {
                    out.extend(card.base.images.iter().map(|image| image.identifier.as_str()));
                }
            }
            SourceObject::Table(table) => {
                for child in &table.children {
                    out.extend(child.image_identifiers());
                }
            }
            _ => {}
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlopeDirection {
    Top,
    Bottom,
    Left,
    Right,
}

/// Out-of-band terrain data the source format cannot carry inline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainExtension {
    /// Vertical offset in grid cells.
    #[serde(default)]
    pub altitude: f32,
    #[serde(default)]
    pub slope: bool,
    pub direction: SlopeDirection,
}

impl Default for TerrainExtension {
    fn default() -> Self {
        Self {
            altitude: 0.0,
            slope: false,
            direction: SlopeDirection::Top,
        }
    }
}

/// Terrain extensions keyed by the composite identity of the terrain they
/// belong to. Identifiers alone are not unique in the source.
#[derive(Clone, Debug, Default)]
pub struct TerrainExtensionTable {
    entries: HashMap<String, TerrainExtension>,
}

impl TerrainExtensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, terrain: &TerrainObject, extension: TerrainExtension) {
        self.entries.insert(Self::key(terrain), extension);
    }

    pub fn get(&self, terrain: &TerrainObject) -> Option<&TerrainExtension> {
        self.entries.get(&Self::key(terrain))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Composite identity: id, name, position, dimensions, mode, rotation.
    /// Floats are rounded so that values parsed twice from text still match.
    fn key(terrain: &TerrainObject) -> String {
        let base = &terrain.base;
        format!(
            "{}|{}|{:.3}|{:.3}|{:.3}|{:.3}|{:.3}|{:?}|{:.3}",
            base.identifier,
            base.name,
            base.location.x,
            base.location.y,
            terrain.width,
            terrain.height,
            terrain.depth,
            terrain.mode,
            terrain.rotation,
        )
    }
}

/// The parsed document: top-level objects and the terrain side table.
#[derive(Clone, Debug, Default)]
pub struct SourceDocument {
    pub objects: Vec<SourceObject>,
    pub terrain_extensions: TerrainExtensionTable,
}

impl SourceDocument {
    /// Every distinct image identifier in the document, in first-seen order.
    pub fn image_identifiers(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.objects
            .iter()
            .flat_map(|object| object.image_identifiers())
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect()
    }
}
