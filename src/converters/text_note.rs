//! Text notes: a bounded text renderer lying on the table.

use cgmath::Vector3;

use crate::{
    context::ConversionContext,
    converters::{COLLIDER_THICKNESS, add_box_collider, add_grabbable, display_name},
    data_structures::{
        instance::Transform,
        scene_graph::{FieldValue, SceneNode},
        source::{SourceKind, TextNoteObject},
    },
    mapping::{POSITION_SCALE, edge_to_center, to_uniform_scale},
};

/// Lift above the table surface.
pub const NOTE_LIFT: f32 = 0.001;

const TEXT_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Title and body joined the way the note displays them.
pub fn note_text(note: &TextNoteObject) -> String {
    match (note.title.trim().is_empty(), note.text.is_empty()) {
        (true, _) => note.text.clone(),
        (false, true) => note.title.clone(),
        (false, false) => format!("{}\n{}", note.title, note.text),
    }
}

pub fn convert_text_note(
    note: &TextNoteObject,
    position: Vector3<f32>,
    ctx: &ConversionContext,
) -> SceneNode {
    let width = to_uniform_scale(note.width);
    let height = to_uniform_scale(note.height);
    let font_size = note.font_size.max(ctx.config.min_font_size);

    let mut node = ctx.node(display_name(&note.base.name, "Text Note"));
    node.source_kind = Some(SourceKind::TextNote);
    let center = edge_to_center(position, width, height) + Vector3::new(0.0, NOTE_LIFT, 0.0);
    node.transform = Transform::from(center).with_rotation(90.0, 0.0, 0.0);

    node.add_component(
        ctx.component("TextRenderer")
            .with("Text", FieldValue::Text(note_text(note)))
            .with("Size", FieldValue::Float(font_size * POSITION_SCALE))
            .with("Bounded", FieldValue::Bool(true))
            .with("BoundsSize", FieldValue::Float2([width, height]))
            .with("Color", FieldValue::Color(TEXT_COLOR)),
    );
    add_box_collider(&mut node, ctx, [width, height, COLLIDER_THICKNESS], [0.0, 0.0, 0.0], false);
    add_grabbable(&mut node, ctx);
    node
}
