/// Block grid consumed by the renderer and the ray caster.
/// The renderer only sees the [`BlockSource`] capability; [`World`] is the
/// dense 16x16x16 grid the viewer edits.
pub mod block;
pub mod snapshot;

pub use block::{Block, WoolColor};
pub use snapshot::WorldBuffers;

use crate::geometry::{Cuboid, Direction};
use crate::rendering::texture::TextureAtlas;
use glam::IVec3;
use noise::{NoiseFn, Perlin};

/// Cells per axis.
pub const GRID_SIZE: i32 = 16;
pub const GRID_VOLUME: usize = (GRID_SIZE * GRID_SIZE * GRID_SIZE) as usize;

/// What the renderer and picker need to know about each cell.
pub trait BlockSource {
    /// Block-local geometry of `cell` (`[0, 1]` coordinates). Empty when
    /// there is nothing to draw.
    fn cell_geometry(&self, cell: IVec3, atlas: &TextureAtlas) -> Vec<Cuboid>;

    /// Whether `cell` fully covers its face towards `direction`.
    fn is_opaque(&self, cell: IVec3, direction: Direction) -> bool;

    /// Whether `cell` holds anything a ray can hit.
    fn is_occupied(&self, cell: IVec3) -> bool;

    /// Exclusive upper corner of the cell range starting at the origin.
    fn extent(&self) -> IVec3 {
        IVec3::splat(GRID_SIZE)
    }

    /// Short label for HUD output.
    fn describe(&self, _cell: IVec3) -> Option<String> {
        None
    }
}

/// Height-field terrain parameters, in the style of the Perlin terrain used
/// for chunk generation.
#[derive(Debug, Clone)]
pub struct TerrainConfig {
    pub seed: u32,
    /// Noise frequency per cell
    pub scale: f64,
    /// Mean surface height in cells
    pub base_height: f64,
    /// Height variation in cells
    pub amplitude: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 0.12,
            base_height: 4.0,
            amplitude: 4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct World {
    blocks: Vec<Block>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Empty grid.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::Air; GRID_VOLUME],
        }
    }

    #[inline]
    pub fn in_bounds(cell: IVec3) -> bool {
        cell.cmpge(IVec3::ZERO).all() && cell.cmplt(IVec3::splat(GRID_SIZE)).all()
    }

    #[inline]
    fn index(cell: IVec3) -> usize {
        (cell.z * GRID_SIZE * GRID_SIZE + cell.y * GRID_SIZE + cell.x) as usize
    }

    /// Block at `cell`; everything outside the grid is air.
    #[inline]
    pub fn get(&self, cell: IVec3) -> Block {
        if Self::in_bounds(cell) {
            self.blocks[Self::index(cell)]
        } else {
            Block::Air
        }
    }

    /// Returns false (and changes nothing) when `cell` is outside the grid.
    pub fn set(&mut self, cell: IVec3, block: Block) -> bool {
        if !Self::in_bounds(cell) {
            return false;
        }
        self.blocks[Self::index(cell)] = block;
        true
    }

    /// Fill the inclusive box `min..=max`, clipped to the grid.
    pub fn fill(&mut self, min: IVec3, max: IVec3, block: Block) {
        let lo = min.max(IVec3::ZERO);
        let hi = max.min(IVec3::splat(GRID_SIZE - 1));
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    self.set(IVec3::new(x, y, z), block);
                }
            }
        }
    }

    /// Non-air cells in scan order (x fastest, then y, then z).
    pub fn occupied(&self) -> impl Iterator<Item = (IVec3, Block)> + '_ {
        self.blocks.iter().enumerate().filter_map(|(i, block)| {
            if block.is_air() {
                return None;
            }
            let i = i as i32;
            let cell = IVec3::new(
                i % GRID_SIZE,
                (i / GRID_SIZE) % GRID_SIZE,
                i / (GRID_SIZE * GRID_SIZE),
            );
            Some((cell, *block))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }

    /// Small showcase scene in front of the default camera: a floor, a few
    /// wool pillars and one of each redstone component.
    pub fn demo() -> Self {
        let mut world = Self::new();

        world.fill(IVec3::new(0, 0, 0), IVec3::new(15, 0, 15), Block::Wool(WoolColor::LightGray));

        let mut color = WoolColor::White;
        for (i, x) in (1..15).step_by(3).enumerate() {
            let height = 1 + (i as i32 % 3);
            world.fill(IVec3::new(x, 1, 10), IVec3::new(x, height, 10), Block::Wool(color));
            color = color.next();
        }

        world.set(IVec3::new(2, 1, 3), Block::RedstoneBlock);
        world.set(IVec3::new(2, 2, 3), Block::RedstoneTorch { lit: true });
        world.set(IVec3::new(4, 1, 3), Block::RedstoneLamp { lit: true });
        world.set(IVec3::new(5, 1, 3), Block::RedstoneLamp { lit: false });
        world.set(IVec3::new(4, 2, 3), Block::Lever { facing: Direction::Up, on: true });
        world.set(IVec3::new(6, 1, 3), Block::Wool(WoolColor::Blue));
        world.set(IVec3::new(6, 1, 2), Block::Lever { facing: Direction::Front, on: false });
        world.set(IVec3::new(7, 1, 3), Block::RedstoneTorch { lit: false });

        world
    }

    pub fn generate_terrain(seed: u32) -> Self {
        Self::generate_terrain_with(&TerrainConfig {
            seed,
            ..TerrainConfig::default()
        })
    }

    /// Perlin height field: lime on top, brown below, gray underneath.
    pub fn generate_terrain_with(config: &TerrainConfig) -> Self {
        let perlin = Perlin::new(config.seed);
        let mut world = Self::new();

        for z in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let height = Self::sample_terrain_height(&perlin, config, x, z);
                for y in 0..=height {
                    let block = if y == height {
                        Block::Wool(WoolColor::Lime)
                    } else if y > height - 3 {
                        Block::Wool(WoolColor::Brown)
                    } else {
                        Block::Wool(WoolColor::Gray)
                    };
                    world.set(IVec3::new(x, y, z), block);
                }
            }
        }

        world
    }

    fn sample_terrain_height(perlin: &Perlin, config: &TerrainConfig, x: i32, z: i32) -> i32 {
        // Offset off the integer lattice, where Perlin noise is always zero.
        let noise_value = perlin.get([
            (x as f64 + 0.37) * config.scale,
            (z as f64 + 0.61) * config.scale,
        ]);
        let height = config.base_height + noise_value * config.amplitude;
        (height.round() as i32).clamp(0, GRID_SIZE - 1)
    }
}

impl BlockSource for World {
    fn cell_geometry(&self, cell: IVec3, atlas: &TextureAtlas) -> Vec<Cuboid> {
        self.get(cell).cuboids(atlas)
    }

    #[inline]
    fn is_opaque(&self, cell: IVec3, direction: Direction) -> bool {
        self.get(cell).is_opaque(direction)
    }

    #[inline]
    fn is_occupied(&self, cell: IVec3) -> bool {
        !self.get(cell).is_air()
    }

    fn describe(&self, cell: IVec3) -> Option<String> {
        Some(self.get(cell).name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_outside_grid_is_rejected() {
        let mut world = World::new();
        assert!(!world.set(IVec3::new(16, 0, 0), Block::RedstoneBlock));
        assert!(!world.set(IVec3::new(0, -1, 0), Block::RedstoneBlock));
        assert_eq!(world.occupied_count(), 0);
        assert_eq!(world.get(IVec3::new(-3, 40, 2)), Block::Air);
    }

    #[test]
    fn occupied_reports_cell_coordinates() {
        let mut world = World::new();
        let cell = IVec3::new(3, 7, 11);
        world.set(cell, Block::RedstoneBlock);
        let found: Vec<_> = world.occupied().collect();
        assert_eq!(found, vec![(cell, Block::RedstoneBlock)]);
    }

    #[test]
    fn terrain_is_deterministic_and_grounded() {
        let a = World::generate_terrain(7);
        let b = World::generate_terrain(7);
        assert_eq!(a, b);
        for z in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                assert!(a.is_occupied(IVec3::new(x, 0, z)));
            }
        }
    }

    #[test]
    fn demo_has_every_block_kind() {
        let world = World::demo();
        let blocks: Vec<Block> = world.occupied().map(|(_, b)| b).collect();
        assert!(blocks.iter().any(|b| matches!(b, Block::Wool(_))));
        assert!(blocks.contains(&Block::RedstoneBlock));
        assert!(blocks.iter().any(|b| matches!(b, Block::RedstoneLamp { .. })));
        assert!(blocks.iter().any(|b| matches!(b, Block::RedstoneTorch { .. })));
        assert!(blocks.iter().any(|b| matches!(b, Block::Lever { .. })));
    }
}
