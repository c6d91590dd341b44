/// Block kinds and their render/opacity capabilities.
/// A closed enum dispatched with `match` keeps the per-cell loop free of
/// virtual calls.
use crate::geometry::{Cuboid, Direction, FaceUvs};
use crate::rendering::texture::{TextureAtlas, TILE_SIZE};
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WoolColor {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    LightGray,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

impl WoolColor {
    pub const ALL: [WoolColor; 16] = [
        WoolColor::White,
        WoolColor::Orange,
        WoolColor::Magenta,
        WoolColor::LightBlue,
        WoolColor::Yellow,
        WoolColor::Lime,
        WoolColor::Pink,
        WoolColor::Gray,
        WoolColor::LightGray,
        WoolColor::Cyan,
        WoolColor::Purple,
        WoolColor::Blue,
        WoolColor::Brown,
        WoolColor::Green,
        WoolColor::Red,
        WoolColor::Black,
    ];

    pub const fn rgb(self) -> [u8; 3] {
        match self {
            WoolColor::White => [255, 255, 255],
            WoolColor::Orange => [216, 127, 51],
            WoolColor::Magenta => [178, 76, 216],
            WoolColor::LightBlue => [102, 153, 216],
            WoolColor::Yellow => [229, 229, 51],
            WoolColor::Lime => [127, 204, 25],
            WoolColor::Pink => [242, 127, 165],
            WoolColor::Gray => [76, 76, 76],
            WoolColor::LightGray => [153, 153, 153],
            WoolColor::Cyan => [76, 127, 153],
            WoolColor::Purple => [127, 63, 178],
            WoolColor::Blue => [51, 76, 178],
            WoolColor::Brown => [102, 76, 51],
            WoolColor::Green => [102, 127, 51],
            WoolColor::Red => [153, 51, 51],
            WoolColor::Black => [25, 25, 25],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            WoolColor::White => "white",
            WoolColor::Orange => "orange",
            WoolColor::Magenta => "magenta",
            WoolColor::LightBlue => "light_blue",
            WoolColor::Yellow => "yellow",
            WoolColor::Lime => "lime",
            WoolColor::Pink => "pink",
            WoolColor::Gray => "gray",
            WoolColor::LightGray => "light_gray",
            WoolColor::Cyan => "cyan",
            WoolColor::Purple => "purple",
            WoolColor::Blue => "blue",
            WoolColor::Brown => "brown",
            WoolColor::Green => "green",
            WoolColor::Red => "red",
            WoolColor::Black => "black",
        }
    }

    /// Atlas key, e.g. `light_blue_wool`.
    pub fn texture_name(self) -> String {
        format!("{}_wool", self.name())
    }

    /// Next colour in palette order, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for WoolColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Block {
    #[default]
    Air,
    Wool(WoolColor),
    RedstoneBlock,
    RedstoneLamp {
        lit: bool,
    },
    RedstoneTorch {
        lit: bool,
    },
    /// `facing` is the direction the handle points away from its mount.
    Lever {
        facing: Direction,
        on: bool,
    },
}

const STICK_COLOR: [u8; 3] = [160, 127, 81];

/// Cuboid bounds given in sixteenths of a block.
fn sixteenths(min: [f32; 3], max: [f32; 3]) -> (Vec3, Vec3) {
    (Vec3::from(min) / 16.0, Vec3::from(max) / 16.0)
}

impl Block {
    #[inline]
    pub fn is_air(self) -> bool {
        matches!(self, Block::Air)
    }

    /// Whether this block fully covers its face towards `direction`.
    #[inline]
    pub fn is_opaque(self, _direction: Direction) -> bool {
        match self {
            Block::Wool(_) | Block::RedstoneBlock | Block::RedstoneLamp { .. } => true,
            Block::Air | Block::RedstoneTorch { .. } | Block::Lever { .. } => false,
        }
    }

    pub fn name(self) -> String {
        match self {
            Block::Air => "air".into(),
            Block::Wool(color) => color.texture_name(),
            Block::RedstoneBlock => "redstone_block".into(),
            Block::RedstoneLamp { lit } => format!("redstone_lamp (lit: {lit})"),
            Block::RedstoneTorch { lit } => format!("redstone_torch (lit: {lit})"),
            Block::Lever { facing, on } => format!("lever (facing: {facing}, on: {on})"),
        }
    }

    /// Geometry in block-local coordinates (`[0, 1]` on every axis).
    /// Air has none.
    pub fn cuboids(self, atlas: &TextureAtlas) -> Vec<Cuboid> {
        match self {
            Block::Air => Vec::new(),
            Block::Wool(color) => vec![Cuboid::unit(
                color.rgb(),
                FaceUvs::single(atlas.region_or_missing(&color.texture_name())),
            )],
            Block::RedstoneBlock => vec![Cuboid::unit(
                [255, 0, 0],
                FaceUvs::single(atlas.region_or_missing("redstone_block")),
            )],
            Block::RedstoneLamp { lit } => {
                let (color, texture) = if lit {
                    ([219, 171, 115], "redstone_lamp_on")
                } else {
                    ([95, 59, 34], "redstone_lamp")
                };
                vec![Cuboid::unit(
                    color,
                    FaceUvs::single(atlas.region_or_missing(texture)),
                )]
            }
            Block::RedstoneTorch { lit } => {
                let texture = if lit {
                    "redstone_torch"
                } else {
                    "redstone_torch_off"
                };
                let (min, max) = sixteenths([7.0, 0.0, 7.0], [9.0, 10.0, 9.0]);
                let uvs = FaceUvs::sub_rect(
                    atlas.region_or_missing(texture),
                    7.0,
                    6.0,
                    2.0,
                    10.0,
                    TILE_SIZE as f32,
                );
                vec![Cuboid::axis_aligned(min, max, STICK_COLOR, uvs)]
            }
            Block::Lever { facing, on } => lever_cuboids(facing, on, atlas),
        }
    }
}

fn lever_cuboids(facing: Direction, on: bool, atlas: &TextureAtlas) -> Vec<Cuboid> {
    let (base_min, base_max) = sixteenths([5.0, 0.0, 4.0], [11.0, 3.0, 12.0]);
    let base = Cuboid::axis_aligned(
        base_min,
        base_max,
        [100, 100, 100],
        FaceUvs::single(atlas.region_or_missing("stone")),
    );

    let (stick_min, stick_max) = sixteenths([7.0, 3.0, 7.0], [9.0, 11.0, 9.0]);
    let tilt = if on { FRAC_PI_4 } else { -FRAC_PI_4 };
    let stick = Cuboid::axis_aligned(
        stick_min,
        stick_max,
        STICK_COLOR,
        FaceUvs::single(atlas.region_or_missing("oak_planks")),
    )
    .rotated_about(Vec3::new(0.5, 3.0 / 16.0, 0.5), Vec3::new(tilt, 0.0, 0.0));

    // Built standing on the floor with the handle towards +Y; turn the
    // whole lever so +Y maps onto `facing`.
    let turn = match facing {
        Direction::Up => Vec3::ZERO,
        Direction::Down => Vec3::new(0.0, 0.0, PI),
        Direction::Back => Vec3::new(FRAC_PI_2, 0.0, 0.0),
        Direction::Front => Vec3::new(-FRAC_PI_2, 0.0, 0.0),
        Direction::Right => Vec3::new(0.0, 0.0, -FRAC_PI_2),
        Direction::Left => Vec3::new(0.0, 0.0, FRAC_PI_2),
    };
    let center = Vec3::splat(0.5);

    vec![
        base.rotated_about(center, turn),
        stick.rotated_about(center, turn),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Direction::Up)]
    #[test_case(Direction::Down)]
    #[test_case(Direction::Left)]
    #[test_case(Direction::Right)]
    #[test_case(Direction::Front)]
    #[test_case(Direction::Back)]
    fn lever_base_sits_against_the_opposite_face(facing: Direction) {
        let atlas = TextureAtlas::procedural();
        let parts = Block::Lever { facing, on: true }.cuboids(&atlas);
        assert_eq!(parts.len(), 2);

        // The base centre lies on the mount side, the handle tip further out.
        let axis = facing.to_vec3();
        let base_offset = (parts[0].center() - Vec3::splat(0.5)).dot(axis);
        let stick_offset = (parts[1].center() - Vec3::splat(0.5)).dot(axis);
        assert!(base_offset < -0.3, "{facing}: {base_offset}");
        assert!(stick_offset > base_offset);

        for part in &parts {
            for v in part.vertices {
                assert!(v.min_element() > -0.01 && v.max_element() < 1.01, "{facing}: {v}");
            }
        }
    }

    #[test]
    fn only_full_blocks_are_opaque() {
        for d in Direction::ALL {
            assert!(Block::Wool(WoolColor::Red).is_opaque(d));
            assert!(Block::RedstoneLamp { lit: false }.is_opaque(d));
            assert!(!Block::RedstoneTorch { lit: true }.is_opaque(d));
            assert!(!Block::Air.is_opaque(d));
        }
    }

    #[test]
    fn air_has_no_geometry_and_wool_uses_its_texture() {
        let atlas = TextureAtlas::procedural();
        assert!(Block::Air.cuboids(&atlas).is_empty());

        let wool = Block::Wool(WoolColor::LightBlue).cuboids(&atlas);
        let region = atlas.lookup("light_blue_wool").unwrap();
        assert_eq!(wool[0].uvs, FaceUvs::single(region));
        assert_eq!(wool[0].color, [102, 153, 216]);
    }

    #[test]
    fn wool_palette_cycles() {
        let mut color = WoolColor::White;
        for _ in 0..16 {
            color = color.next();
        }
        assert_eq!(color, WoolColor::White);
    }
}
