//! Tree assembly: dispatch every source object to its converter.

use cgmath::Vector3;

use crate::{
    context::ConversionContext,
    converters::{
        card::convert_card, card_stack::convert_card_stack, character::convert_character,
        dice::convert_dice, table::convert_table, table_mask::convert_table_mask,
        terrain::convert_terrain, text_note::convert_text_note,
    },
    data_structures::{scene_graph::SceneNode, source::SourceObject},
    mapping::to_center_position,
};

/// Scene position of an object's source anchor, relative to its parent.
pub fn source_position(object: &SourceObject) -> Vector3<f32> {
    let location = object.base().location;
    to_center_position(location.x, location.y)
}

/// Convert one object (and, for tables, everything on it).
pub fn convert_object(
    object: &SourceObject,
    position: Vector3<f32>,
    ctx: &ConversionContext,
) -> SceneNode {
    match object {
        SourceObject::Character(character) => convert_character(character, position, ctx),
        SourceObject::Card(card) => convert_card(card, position, ctx),
        SourceObject::CardStack(stack) => convert_card_stack(stack, position, ctx),
        SourceObject::DiceSymbol(dice) => convert_dice(dice, position, ctx),
        SourceObject::Terrain(terrain) => {
            convert_terrain(terrain, position, ctx, ctx.terrain_extensions.get(terrain))
        }
        SourceObject::Table(table) => convert_table(table, position, ctx),
        SourceObject::TableMask(mask) => convert_table_mask(mask, position, ctx),
        SourceObject::TextNote(note) => convert_text_note(note, position, ctx),
    }
}

/// Convert a forest of top-level objects, preserving order.
pub fn assemble(objects: &[SourceObject], ctx: &ConversionContext) -> Vec<SceneNode> {
    objects
        .iter()
        .map(|object| {
            let node = convert_object(object, source_position(object), ctx);
            log::debug!(
                "Converted {:?} {} into {} node(s).",
                object.kind(),
                object.base().identifier,
                node.node_count()
            );
            node
        })
        .collect()
}
