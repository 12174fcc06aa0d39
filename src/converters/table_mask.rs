//! Table masks: translucent overlays hiding part of the map.

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
        source::{SourceKind, TableMaskObject},
    },
    mapping::{edge_to_center, to_uniform_scale},
    resources::assets::BlendMode,
};

/// Lift above the table surface.
pub const MASK_LIFT: f32 = 0.002;

/// Tint of a mask: white over an image, black otherwise, with the opacity
/// percentage as alpha.
pub fn mask_color(has_image: bool, opacity: f32) -> [f32; 4] {
    let level = if has_image { 1.0 } else { 0.0 };
    [level, level, level, (opacity / 100.0).clamp(0.0, 1.0)]
}

pub fn convert_table_mask(
    mask: &TableMaskObject,
    position: Vector3<f32>,
    ctx: &ConversionContext,
) -> SceneNode {
    let width = to_uniform_scale(mask.width);
    let height = to_uniform_scale(mask.height);
    let image = mask.base.main_image();

    let mut node = ctx.node(display_name(&mask.base.name, "Table Mask"));
    node.source_kind = Some(SourceKind::TableMask);
    let center = edge_to_center(position, width, height) + Vector3::new(0.0, MASK_LIFT, 0.0);
    node.transform = Transform::from(center).with_rotation(90.0, 0.0, 0.0);

    let surface = Surface {
        image,
        blend_mode: BlendMode::Alpha,
        tint: Some(mask_color(image.is_some(), mask.opacity)),
        dual_sided: true,
    };
    add_quad_visual(&mut node, ctx, [width, height], &surface);
    add_box_collider(&mut node, ctx, [width, height, COLLIDER_THICKNESS], [0.0, 0.0, 0.0], false);
    if !mask.locked {
        add_grabbable(&mut node, ctx);
    }
    node
}
