//! Card stacks (decks, discard piles).

use cgmath::Vector3;

use crate::{
    context::ConversionContext,
    converters::{
        COLLIDER_THICKNESS, add_box_collider, add_grabbable,
        card::{CARD_LIFT, build_card},
        display_name,
    },
    data_structures::{
        instance::Transform,
        scene_graph::SceneNode,
        source::{CardStackObject, SourceKind},
    },
    mapping::edge_to_center,
};

/// Vertical spacing between two cards of a stack.
pub const STACK_LAYER_OFFSET: f32 = 0.0005;

/// Convert a stack into a container of card children.
///
/// The source lists the top card last, so children are emitted in reverse
/// and child `i` rests `i` layers above the container. The stack collider
/// takes its footprint from the first emitted card and grows with the pile.
pub fn convert_card_stack(
    stack: &CardStackObject,
    position: Vector3<f32>,
    ctx: &ConversionContext,
) -> SceneNode {
    let mut node = ctx.node(display_name(&stack.base.name, "Card Stack"));
    node.source_kind = Some(SourceKind::CardStack);

    let mut footprint = None;
    for (layer, card) in stack.cards.iter().rev().enumerate() {
        let (mut child, size) = build_card(card, ctx);
        let lift = CARD_LIFT + layer as f32 * STACK_LAYER_OFFSET;
        child.transform.position = Vector3::new(0.0, lift, 0.0);
        footprint.get_or_insert((size.width, size.visible_height));
        node.add_child(child);
    }
    let (width, height) = footprint.unwrap_or((1.0, 1.0));
    if stack.cards.is_empty() {
        log::debug!("Card stack {} is empty.", stack.base.identifier);
    }

    node.transform = Transform::from(edge_to_center(position, width, height))
        .with_rotation(0.0, stack.rotation, 0.0);

    let thickness = CARD_LIFT + stack.cards.len() as f32 * STACK_LAYER_OFFSET + COLLIDER_THICKNESS;
    add_box_collider(
        &mut node,
        ctx,
        [width, thickness, height],
        [0.0, thickness / 2.0, 0.0],
        false,
    );
    add_grabbable(&mut node, ctx);
    node
}
