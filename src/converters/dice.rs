//! Dice symbols: one upright child per face, only the current one active.

use cgmath::Vector3;

use crate::{
    context::ConversionContext,
    converters::{Surface, add_box_collider, add_grabbable, add_quad_visual, display_name},
    data_structures::{
        instance::Transform,
        scene_graph::SceneNode,
        source::{DiceSymbolObject, SourceKind},
    },
    mapping::{edge_to_center, to_uniform_scale},
    resources::assets::BlendMode,
};

/// Convert a dice symbol.
///
/// All faces share the dice width; each face keeps its own height. Faces are
/// bottom-aligned against the tallest one, so child `y` is
/// `max/2 - (max - own)/2`.
pub fn convert_dice(
    dice: &DiceSymbolObject,
    position: Vector3<f32>,
    ctx: &ConversionContext,
) -> SceneNode {
    let width = to_uniform_scale(dice.size);
    let faces: Vec<_> = dice
        .base
        .images
        .iter()
        .map(|image| (image, width * ctx.aspect_ratio(Some(image))))
        .collect();
    let max_height = faces.iter().map(|(_, h)| *h).fold(0.0, f32::max);

    let mut node = ctx.node(display_name(&dice.base.name, "Dice"));
    node.source_kind = Some(SourceKind::DiceSymbol);
    node.transform = Transform::from(edge_to_center(position, width, width))
        .with_rotation(0.0, dice.rotation, 0.0);

    if !faces.iter().any(|(image, _)| image.label == dice.face) {
        log::warn!("Dice {} shows unknown face {:?}.", dice.base.identifier, dice.face);
    }
    for (image, height) in faces {
        let mut child = ctx.node(image.label.clone());
        let y = max_height / 2.0 - (max_height - height) / 2.0;
        child.transform = Transform::from(Vector3::new(0.0, y, 0.0));
        child.active = image.label == dice.face;
        add_quad_visual(
            &mut child,
            ctx,
            [width, height],
            &Surface::textured(ctx, Some(image), BlendMode::Cutout).dual_sided(),
        );
        node.add_child(child);
    }

    let collider_height = if max_height > 0.0 { max_height } else { width };
    add_box_collider(
        &mut node,
        ctx,
        [width, collider_height, width],
        [0.0, collider_height / 2.0, 0.0],
        false,
    );
    add_grabbable(&mut node, ctx);
    node
}
