//! Game tables.

use cgmath::Vector3;

use crate::{
    assembly::{convert_object, source_position},
    context::ConversionContext,
    converters::{COLLIDER_THICKNESS, Surface, add_box_collider, add_quad_visual, display_name},
    data_structures::{
        instance::Transform,
        scene_graph::SceneNode,
        source::{SourceKind, TableObject},
    },
    mapping::to_uniform_scale,
    resources::assets::BlendMode,
};

/// Convert a table and everything placed on it.
///
/// The container stays axis-aligned at the table corner so children keep
/// table-relative positions. The surface is a rotated child carrying the
/// dual-sided quad and a collider just below it.
pub fn convert_table(
    table: &TableObject,
    position: Vector3<f32>,
    ctx: &ConversionContext,
) -> SceneNode {
    let width = to_uniform_scale(table.width);
    let height = to_uniform_scale(table.height);

    let mut node = ctx.node(display_name(&table.base.name, "Table"));
    node.source_kind = Some(SourceKind::Table);
    node.transform = Transform::from(position);

    let mut surface = ctx.node("Surface");
    surface.transform = Transform::from(Vector3::new(width / 2.0, 0.0, -height / 2.0))
        .with_rotation(90.0, 0.0, 0.0);
    add_quad_visual(
        &mut surface,
        ctx,
        [width, height],
        &Surface::textured(ctx, table.base.main_image(), BlendMode::Opaque).dual_sided(),
    );
    // local +z points down once the surface is laid flat
    add_box_collider(
        &mut surface,
        ctx,
        [width, height, COLLIDER_THICKNESS],
        [0.0, 0.0, COLLIDER_THICKNESS / 2.0],
        ctx.config.table_character_passable,
    );
    node.add_child(surface);

    for child in &table.children {
        node.add_child(convert_object(child, source_position(child), ctx));
    }
    node
}
