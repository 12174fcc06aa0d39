//! Playing cards.
//!
//! A card is a flat, two-faced object lying on the table. Each face is its
//! own single-sided quad, back to back, so the visible side depends only on
//! how the card node is tilted.

use cgmath::Vector3;

use crate::{
    context::ConversionContext,
    converters::{
        COLLIDER_THICKNESS, Surface, add_box_collider, add_grabbable, add_quad_visual,
        display_name,
    },
    data_structures::{
        instance::Transform,
        scene_graph::SceneNode,
        source::{CardObject, SourceKind},
    },
    mapping::{edge_to_center, to_uniform_scale},
    resources::assets::BlendMode,
};

/// Lift above the table so a card never z-fights with the surface.
pub const CARD_LIFT: f32 = 0.001;

/// Resolved card dimensions in scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardSize {
    pub width: f32,
    pub front_height: f32,
    pub back_height: f32,
    /// Height of the face currently looking up.
    pub visible_height: f32,
}

impl CardSize {
    /// Each face uses its own aspect ratio. When the visible face has no
    /// usable image the other face's aspect is borrowed, then 1:1.
    pub fn measure(card: &CardObject, ctx: &ConversionContext) -> Self {
        let width = to_uniform_scale(card.size);
        let front = ctx.known_aspect_ratio(card.front());
        let back = ctx.known_aspect_ratio(card.back());
        let (visible, hidden) = if card.face_up { (front, back) } else { (back, front) };
        let visible_aspect = visible.or(hidden).unwrap_or(1.0);
        let hidden_aspect = hidden.unwrap_or(1.0);
        let (front_aspect, back_aspect) = if card.face_up {
            (visible_aspect, hidden_aspect)
        } else {
            (hidden_aspect, visible_aspect)
        };
        Self {
            width,
            front_height: width * front_aspect,
            back_height: width * back_aspect,
            visible_height: width * visible_aspect,
        }
    }
}

/// Tilt about `x` that lays the card flat with the right face up.
pub fn face_tilt(face_up: bool) -> f32 {
    if face_up { 90.0 } else { -90.0 }
}

/// Card node at the origin: tilted, with both faces and a thin collider.
/// Placement and the grab handle are up to the caller.
pub(crate) fn build_card(card: &CardObject, ctx: &ConversionContext) -> (SceneNode, CardSize) {
    let size = CardSize::measure(card, ctx);

    let mut node = ctx.node(display_name(&card.base.name, "Card"));
    node.source_kind = Some(SourceKind::Card);
    node.transform = Transform::new().with_rotation(face_tilt(card.face_up), 0.0, 0.0);

    let mut front = ctx.node("Front");
    add_quad_visual(
        &mut front,
        ctx,
        [size.width, size.front_height],
        &Surface::textured(ctx, card.front(), BlendMode::Opaque),
    );
    node.add_child(front);

    let mut back = ctx.node("Back");
    back.transform = Transform::new().with_rotation(0.0, 180.0, 0.0);
    add_quad_visual(
        &mut back,
        ctx,
        [size.width, size.back_height],
        &Surface::textured(ctx, card.back(), BlendMode::Opaque),
    );
    node.add_child(back);

    add_box_collider(
        &mut node,
        ctx,
        [size.width, size.visible_height, COLLIDER_THICKNESS],
        [0.0, 0.0, 0.0],
        false,
    );
    (node, size)
}

/// Convert a loose card lying on the table.
pub fn convert_card(
    card: &CardObject,
    position: Vector3<f32>,
    ctx: &ConversionContext,
) -> SceneNode {
    let (mut node, size) = build_card(card, ctx);
    let center = edge_to_center(position, size.width, size.visible_height);
    node.transform = Transform::from(center + Vector3::new(0.0, CARD_LIFT, 0.0))
        .with_rotation(face_tilt(card.face_up), card.rotation, 0.0);
    add_grabbable(&mut node, ctx);
    node
}
