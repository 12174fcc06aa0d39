//! Character standees.

use cgmath::Vector3;

use crate::{
    context::ConversionContext,
    converters::{Surface, add_box_collider, add_grabbable, add_quad_visual, display_name},
    data_structures::{
        instance::Transform,
        scene_graph::SceneNode,
        source::{CharacterObject, SourceKind},
    },
    mapping::{edge_to_center, to_uniform_scale},
    resources::assets::BlendMode,
};

/// Convert a character into an upright, dual-sided standee.
///
/// The node sits on the ground at the center of the character's square
/// footprint. The visual child is lifted by half its height so the image
/// stands on the table instead of sinking into it. Height follows the image
/// aspect ratio (1:1 when unknown). The location tag is carried on the node
/// for inventory grouping.
pub fn convert_character(
    character: &CharacterObject,
    position: Vector3<f32>,
    ctx: &ConversionContext,
) -> SceneNode {
    let image = character.base.main_image();
    let width = to_uniform_scale(character.size);
    let height = width * ctx.aspect_ratio(image);

    let mut node = ctx.node(display_name(&character.base.name, "Character"));
    node.source_kind = Some(SourceKind::Character);
    node.tag = character.location_tag.clone();
    node.transform = Transform::from(edge_to_center(position, width, width))
        .with_rotation(0.0, character.rotation, 0.0);

    let mut visual = ctx.node("Image");
    visual.transform = Transform::from(Vector3::new(0.0, height / 2.0, 0.0));
    add_quad_visual(
        &mut visual,
        ctx,
        [width, height],
        &Surface::textured(ctx, image, BlendMode::Cutout).dual_sided(),
    );
    node.add_child(visual);

    add_box_collider(&mut node, ctx, [width, height, width], [0.0, height / 2.0, 0.0], false);
    add_grabbable(&mut node, ctx);
    node
}
