//! Per-kind object converters.
//!
//! Every converter turns one source object into a center-anchored scene node
//! subtree. They share a small vocabulary of building blocks defined here:
//!
//! - a *visual* is a mesh, an `UnlitMaterial` and a `MeshRenderer` referencing both
//! - every node gets a bounding collider
//! - a `Grabbable` is added unless the object is locked
//!
//! Meshes and materials are created per visual; [`crate::dedup`] later folds
//! identical ones into shared definitions.

pub mod card;
pub mod card_stack;
pub mod character;
pub mod dice;
pub mod table;
pub mod table_mask;
pub mod terrain;
pub mod text_note;

use crate::{
    context::ConversionContext,
    data_structures::{
        scene_graph::{Component, FieldValue, SceneNode},
        source::ImageRef,
    },
    resources::assets::BlendMode,
};

/// Thickness of colliders around flat objects.
pub const COLLIDER_THICKNESS: f32 = 0.01;

/// How a visual is shaded.
#[derive(Clone, Debug)]
pub struct Surface<'i> {
    pub image: Option<&'i ImageRef>,
    pub blend_mode: BlendMode,
    pub tint: Option<[f32; 4]>,
    pub dual_sided: bool,
}

impl<'i> Surface<'i> {
    /// Textured surface whose blend mode comes from the image metadata,
    /// `default` when nothing is known.
    pub fn textured(
        ctx: &ConversionContext,
        image: Option<&'i ImageRef>,
        default: BlendMode,
    ) -> Self {
        Self {
            image,
            blend_mode: ctx.blend_mode(image, default),
            tint: None,
            dual_sided: false,
        }
    }

    pub fn dual_sided(mut self) -> Self {
        self.dual_sided = true;
        self
    }
}

fn material(ctx: &ConversionContext, surface: &Surface) -> Component {
    let culling = if surface.dual_sided { "Off" } else { "Back" };
    let mut material = ctx
        .component("UnlitMaterial")
        .with("BlendMode", FieldValue::Enum(surface.blend_mode.as_str().to_string()))
        .with("Culling", FieldValue::Enum(culling.to_string()));
    if let Some(tint) = surface.tint {
        material = material.with("TintColor", FieldValue::Color(tint));
    }
    if let Some(texture) = ctx.texture_reference(surface.image) {
        material = material.with("Texture", FieldValue::Reference(texture));
    }
    material
}

fn add_visual(node: &mut SceneNode, ctx: &ConversionContext, mesh: Component, surface: &Surface) {
    let material = material(ctx, surface);
    let renderer = ctx
        .component("MeshRenderer")
        .with("Mesh", FieldValue::Reference(mesh.id.clone()))
        .with("Materials", FieldValue::ReferenceList(vec![material.id.clone()]));
    node.add_component(mesh);
    node.add_component(material);
    node.add_component(renderer);
}

/// Attach a `width` x `height` quad visual to `node`.
pub fn add_quad_visual(
    node: &mut SceneNode,
    ctx: &ConversionContext,
    size: [f32; 2],
    surface: &Surface,
) {
    let mesh = ctx
        .component("QuadMesh")
        .with("Size", FieldValue::Float2(size))
        .with("DualSided", FieldValue::Bool(surface.dual_sided));
    add_visual(node, ctx, mesh, surface);
}

/// Attach a triangle visual with vertices in node-local coordinates.
pub fn add_triangle_visual(
    node: &mut SceneNode,
    ctx: &ConversionContext,
    vertices: [[f32; 3]; 3],
    surface: &Surface,
) {
    let mesh = ctx
        .component("TriangleMesh")
        .with("Vertex0", FieldValue::Float3(vertices[0]))
        .with("Vertex1", FieldValue::Float3(vertices[1]))
        .with("Vertex2", FieldValue::Float3(vertices[2]))
        .with("DualSided", FieldValue::Bool(surface.dual_sided));
    add_visual(node, ctx, mesh, surface);
}

pub fn add_box_collider(
    node: &mut SceneNode,
    ctx: &ConversionContext,
    size: [f32; 3],
    offset: [f32; 3],
    character_passable: bool,
) {
    node.add_component(
        ctx.component("BoxCollider")
            .with("Size", FieldValue::Float3(size))
            .with("Offset", FieldValue::Float3(offset))
            .with("CharacterCollider", FieldValue::Bool(!character_passable)),
    );
}

pub fn add_triangle_collider(
    node: &mut SceneNode,
    ctx: &ConversionContext,
    vertices: [[f32; 3]; 3],
    character_passable: bool,
) {
    node.add_component(
        ctx.component("TriangleCollider")
            .with("A", FieldValue::Float3(vertices[0]))
            .with("B", FieldValue::Float3(vertices[1]))
            .with("C", FieldValue::Float3(vertices[2]))
            .with("CharacterCollider", FieldValue::Bool(!character_passable)),
    );
}

pub fn add_grabbable(node: &mut SceneNode, ctx: &ConversionContext) {
    node.add_component(ctx.component("Grabbable").with("Scalable", FieldValue::Bool(true)));
}

/// Display name for a converted object; empty source names fall back to `fallback`.
pub fn display_name(name: &str, fallback: &str) -> String {
    if name.trim().is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}
