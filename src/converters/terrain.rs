//! Terrain blocks: a floor, a ceiling and up to four walls, optionally sloped.
//!
//! Faces are quads placed around the node origin. A face is omitted when one
//! of the extents defining it is zero, so a zero-height terrain degenerates
//! to a floor and a ceiling. Sloped terrain tilts the top face 45° towards
//! the raised side, removes the wall on the low side and turns the two
//! neighbouring walls into triangles.

use std::f32::consts::SQRT_2;

use cgmath::Vector3;

use crate::{
    context::ConversionContext,
    converters::{
        COLLIDER_THICKNESS, Surface, add_box_collider, add_grabbable, add_quad_visual,
        add_triangle_collider, add_triangle_visual, display_name,
    },
    data_structures::{
        instance::Transform,
        scene_graph::SceneNode,
        source::{SlopeDirection, SourceKind, TerrainExtension, TerrainMode, TerrainObject},
    },
    mapping::{edge_to_center, to_uniform_scale},
    resources::assets::BlendMode,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Front,
    Back,
    Left,
    Right,
}

impl Side {
    const ALL: [Side; 4] = [Side::Front, Side::Back, Side::Left, Side::Right];

    fn name(self) -> &'static str {
        match self {
            Side::Front => "Front",
            Side::Back => "Back",
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }

    /// Wall on the low side of a slope, which has no height left.
    fn low_side_of(direction: SlopeDirection) -> Side {
        match direction {
            SlopeDirection::Top => Side::Front,
            SlopeDirection::Bottom => Side::Back,
            SlopeDirection::Left => Side::Right,
            SlopeDirection::Right => Side::Left,
        }
    }

    /// Walls that run along a slope and become triangles.
    fn is_flank_of(self, direction: SlopeDirection) -> bool {
        match direction {
            SlopeDirection::Top | SlopeDirection::Bottom => {
                matches!(self, Side::Left | Side::Right)
            }
            SlopeDirection::Left | SlopeDirection::Right => {
                matches!(self, Side::Front | Side::Back)
            }
        }
    }
}

/// Terrain extents in scene units.
#[derive(Clone, Copy, Debug)]
struct Extents {
    width: f32,
    height: f32,
    depth: f32,
}

impl Extents {
    /// Quad placement for an upright wall centered at `wall_y`.
    fn wall(&self, side: Side, wall_y: f32) -> (Vector3<f32>, [f32; 3], [f32; 2]) {
        let (w, h, d) = (self.width, self.height, self.depth);
        match side {
            Side::Front => (Vector3::new(0.0, wall_y, -d / 2.0), [0.0, 0.0, 0.0], [w, h]),
            Side::Back => (Vector3::new(0.0, wall_y, d / 2.0), [0.0, 180.0, 0.0], [w, h]),
            Side::Left => (Vector3::new(-w / 2.0, wall_y, 0.0), [0.0, 90.0, 0.0], [d, h]),
            Side::Right => (Vector3::new(w / 2.0, wall_y, 0.0), [0.0, -90.0, 0.0], [d, h]),
        }
    }

    fn has_wall(&self, side: Side) -> bool {
        let horizontal = match side {
            Side::Front | Side::Back => self.width,
            Side::Left | Side::Right => self.depth,
        };
        horizontal > 0.0 && self.height > 0.0
    }

    /// Rotation and size of the tilted top face.
    fn slope_top(&self, direction: SlopeDirection) -> ([f32; 3], [f32; 2]) {
        let (w, d) = (self.width, self.depth);
        match direction {
            SlopeDirection::Top => ([45.0, 0.0, 0.0], [w, d * SQRT_2]),
            SlopeDirection::Bottom => ([45.0, 180.0, 0.0], [w, d * SQRT_2]),
            SlopeDirection::Right => ([45.0, 90.0, 90.0], [w * SQRT_2, d]),
            SlopeDirection::Left => ([45.0, -90.0, 90.0], [w * SQRT_2, d]),
        }
    }

    /// Triangle filling the flank wall `side` under a slope rising towards
    /// `direction`, in node-local coordinates around a center at `wall_y`.
    fn flank_triangle(&self, side: Side, direction: SlopeDirection, wall_y: f32) -> [[f32; 3]; 3] {
        let (hw, hh, hd) = (self.width / 2.0, self.height / 2.0, self.depth / 2.0);
        let (low, high) = (wall_y - hh, wall_y + hh);
        match side {
            Side::Left | Side::Right => {
                let x = if side == Side::Left { -hw } else { hw };
                let raised_z = if direction == SlopeDirection::Bottom { -hd } else { hd };
                [[x, low, -hd], [x, low, hd], [x, high, raised_z]]
            }
            Side::Front | Side::Back => {
                let z = if side == Side::Front { -hd } else { hd };
                let raised_x = if direction == SlopeDirection::Left { -hw } else { hw };
                [[-hw, low, z], [hw, low, z], [raised_x, high, z]]
            }
        }
    }
}

/// Vertical layout of a terrain relative to its node origin.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Anchoring {
    node_y: f32,
    top_y: f32,
    bottom_y: f32,
}

impl Anchoring {
    fn new(mode: TerrainMode, sloped: bool, altitude: f32, height: f32) -> Self {
        let half = height / 2.0;
        match (mode, sloped) {
            (TerrainMode::All, false) => Self {
                node_y: altitude + half,
                top_y: half,
                bottom_y: -half,
            },
            (TerrainMode::All, true) => Self {
                node_y: altitude + half,
                top_y: 0.0,
                bottom_y: -half,
            },
            // origin on the top surface
            (TerrainMode::NoWalls, false) => Self {
                node_y: altitude + height,
                top_y: 0.0,
                bottom_y: -height,
            },
            // a slope passes through the box center, so the origin drops by half the height
            (TerrainMode::NoWalls, true) => Self {
                node_y: altitude + half,
                top_y: 0.0,
                bottom_y: -half,
            },
        }
    }

    /// Center of the wall band relative to the node.
    fn wall_y(&self, height: f32) -> f32 {
        self.bottom_y + height / 2.0
    }
}

fn face(
    ctx: &ConversionContext,
    name: &str,
    transform: Transform,
    size: [f32; 2],
    surface: &Surface,
) -> SceneNode {
    let mut node = ctx.node(name);
    node.transform = transform;
    add_quad_visual(&mut node, ctx, size, surface);
    node
}

/// Convert a terrain block. `extension` carries altitude and slope, when
/// the document has one for this terrain.
pub fn convert_terrain(
    terrain: &TerrainObject,
    position: Vector3<f32>,
    ctx: &ConversionContext,
    extension: Option<&TerrainExtension>,
) -> SceneNode {
    let extension = extension.copied().unwrap_or_default();
    let extents = Extents {
        width: to_uniform_scale(terrain.width),
        height: to_uniform_scale(terrain.height),
        depth: to_uniform_scale(terrain.depth),
    };
    let sloped = extension.slope;
    let anchoring = Anchoring::new(
        terrain.mode,
        sloped,
        to_uniform_scale(extension.altitude),
        extents.height,
    );
    let wall_y = anchoring.wall_y(extents.height);
    let passable = terrain.locked && ctx.config.locked_terrain_character_passable;

    let floor_image = terrain.base.image_labeled(TerrainObject::FLOOR);
    let wall_image = terrain.base.image_labeled(TerrainObject::WALL);
    let floor = Surface::textured(ctx, floor_image, BlendMode::Opaque);
    let wall = Surface::textured(ctx, wall_image, BlendMode::Opaque);

    let mut node = ctx.node(display_name(&terrain.base.name, "Terrain"));
    node.source_kind = Some(SourceKind::Terrain);
    let mut center = edge_to_center(position, extents.width, extents.depth);
    center.y += anchoring.node_y;
    node.transform = Transform::from(center).with_rotation(0.0, terrain.rotation, 0.0);

    if extents.width > 0.0 && extents.depth > 0.0 {
        let top_position = Vector3::new(0.0, anchoring.top_y, 0.0);
        let (rotation, size) = if sloped {
            extents.slope_top(extension.direction)
        } else {
            ([90.0, 0.0, 0.0], [extents.width, extents.depth])
        };
        let mut top = face(
            ctx,
            "Top",
            Transform::from(top_position).with_rotation(rotation[0], rotation[1], rotation[2]),
            size,
            &floor,
        );
        if sloped {
            // walkable ramp surface, just under the visual
            add_box_collider(
                &mut top,
                ctx,
                [size[0], size[1], COLLIDER_THICKNESS],
                [0.0, 0.0, COLLIDER_THICKNESS / 2.0],
                passable,
            );
        }
        node.add_child(top);

        node.add_child(face(
            ctx,
            "Bottom",
            Transform::from(Vector3::new(0.0, anchoring.bottom_y, 0.0))
                .with_rotation(-90.0, 0.0, 0.0),
            [extents.width, extents.depth],
            &floor,
        ));
    }

    if terrain.mode == TerrainMode::All {
        for side in Side::ALL {
            if !extents.has_wall(side) {
                continue;
            }
            if sloped && side == Side::low_side_of(extension.direction) {
                continue;
            }
            if sloped && side.is_flank_of(extension.direction) {
                let vertices = extents.flank_triangle(side, extension.direction, wall_y);
                let mut triangle = ctx.node(side.name());
                add_triangle_visual(&mut triangle, ctx, vertices, &wall.clone().dual_sided());
                add_triangle_collider(&mut triangle, ctx, vertices, passable);
                node.add_child(triangle);
                continue;
            }
            let (position, rotation, size) = extents.wall(side, wall_y);
            node.add_child(face(
                ctx,
                side.name(),
                Transform::from(position).with_rotation(rotation[0], rotation[1], rotation[2]),
                size,
                &wall,
            ));
        }
    }

    add_box_collider(
        &mut node,
        ctx,
        [
            extents.width,
            extents.height.max(COLLIDER_THICKNESS),
            extents.depth,
        ],
        [0.0, wall_y, 0.0],
        passable,
    );
    if !terrain.locked {
        add_grabbable(&mut node, ctx);
    }
    node
}

