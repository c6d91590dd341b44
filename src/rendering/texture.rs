/// Texture atlas: one packed ARGB image plus a name -> region table.
/// Block UVs are stored atlas-normalized and converted to atlas pixels only
/// when a face is handed to the rasterizer.
use crate::error::{Error, Result};
use crate::world::block::WoolColor;
use std::collections::HashMap;

/// Edge length of every built-in procedural tile.
pub const TILE_SIZE: usize = 16;

/// Name of the checkerboard tile used when a lookup fails.
pub const MISSING_TEXTURE: &str = "missing";

/// Normalized rectangle inside the atlas image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasRegion {
    pub u: f32,
    pub v: f32,
    pub width: f32,
    pub height: f32,
}

impl AtlasRegion {
    /// The whole atlas image.
    pub const FULL: AtlasRegion = AtlasRegion {
        u: 0.0,
        v: 0.0,
        width: 1.0,
        height: 1.0,
    };
}

#[inline(always)]
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline(always)]
pub const fn unpack_rgb(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

pub struct TextureAtlas {
    pub width: usize,
    pub height: usize,
    pixels: Vec<u32>,
    regions: HashMap<String, AtlasRegion>,
}

impl TextureAtlas {
    /// Wrap an already packed image. `pixels` is row-major ARGB.
    pub fn from_image(
        width: usize,
        height: usize,
        pixels: Vec<u32>,
        regions: HashMap<String, AtlasRegion>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyAtlas);
        }
        let expected = width * height;
        if pixels.len() != expected {
            return Err(Error::ImageSizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            regions,
        })
    }

    /// Pack square `tile_size` tiles row-major into a grid of
    /// `ceil(sqrt(n))` columns.
    pub fn pack(tile_size: usize, tiles: Vec<(String, Vec<u32>)>) -> Result<Self> {
        if tiles.is_empty() || tile_size == 0 {
            return Err(Error::EmptyAtlas);
        }

        let tile_pixels = tile_size * tile_size;
        for (name, pixels) in &tiles {
            if pixels.len() != tile_pixels {
                return Err(Error::TileSizeMismatch {
                    name: name.clone(),
                    expected: tile_pixels,
                    actual: pixels.len(),
                });
            }
        }

        let count = tiles.len();
        let columns = (count as f64).sqrt().ceil() as usize;
        let rows = count.div_ceil(columns);
        let width = columns * tile_size;
        let height = rows * tile_size;

        let mut image = vec![0xFF00_0000; width * height];
        let mut regions = HashMap::with_capacity(count);

        for (i, (name, pixels)) in tiles.into_iter().enumerate() {
            let x0 = (i % columns) * tile_size;
            let y0 = (i / columns) * tile_size;

            for (row, src) in pixels.chunks_exact(tile_size).enumerate() {
                let start = (y0 + row) * width + x0;
                image[start..start + tile_size].copy_from_slice(src);
            }

            regions.insert(
                name,
                AtlasRegion {
                    u: x0 as f32 / width as f32,
                    v: y0 as f32 / height as f32,
                    width: tile_size as f32 / width as f32,
                    height: tile_size as f32 / height as f32,
                },
            );
        }

        Self::from_image(width, height, image, regions)
    }

    /// Every built-in block texture, generated deterministically.
    pub fn procedural() -> Self {
        let mut tiles: Vec<(String, Vec<u32>)> = WoolColor::ALL
            .iter()
            .map(|color| (color.texture_name(), wool_tile(color.rgb())))
            .collect();

        tiles.push(("redstone_block".into(), redstone_block_tile()));
        tiles.push(("redstone_lamp".into(), lamp_tile(false)));
        tiles.push(("redstone_lamp_on".into(), lamp_tile(true)));
        tiles.push(("redstone_torch".into(), torch_tile(true)));
        tiles.push(("redstone_torch_off".into(), torch_tile(false)));
        tiles.push(("oak_planks".into(), planks_tile()));
        tiles.push(("stone".into(), noise_tile([125, 125, 125], 24, 0x5709e)));
        tiles.push((MISSING_TEXTURE.into(), checkerboard_tile([248, 0, 248], [0, 0, 0], 4)));

        // Tiles are all generated at TILE_SIZE, so packing cannot fail.
        match Self::pack(TILE_SIZE, tiles) {
            Ok(atlas) => atlas,
            Err(err) => unreachable!("procedural atlas: {err}"),
        }
    }

    #[inline]
    pub fn lookup(&self, name: &str) -> Option<AtlasRegion> {
        self.regions.get(name).copied()
    }

    /// Region for `name`, or the checkerboard tile when it is not present.
    pub fn region_or_missing(&self, name: &str) -> AtlasRegion {
        match self.lookup(name) {
            Some(region) => region,
            None => {
                log::trace!("texture `{name}` not in atlas, using `{MISSING_TEXTURE}`");
                self.lookup(MISSING_TEXTURE).unwrap_or(AtlasRegion::FULL)
            }
        }
    }

    /// ARGB texel at integer atlas coordinates, clamped to the image.
    #[inline]
    pub fn pixel_at(&self, x: i32, y: i32) -> u32 {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.pixels[y * self.width + x]
    }

    /// Nearest-texel sample at fractional atlas pixel coordinates.
    #[inline]
    pub fn sample(&self, u_px: f32, v_px: f32) -> u32 {
        // NaN casts to 0, infinities saturate; pixel_at clamps either way.
        self.pixel_at(u_px.floor() as i32, v_px.floor() as i32)
    }
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self::procedural()
    }
}

// Deterministic LCG so generated tiles are identical across runs.
struct Lcg(u32);

impl Lcg {
    #[inline]
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1103515245).wrapping_add(12345);
        self.0 >> 16
    }

    /// Signed jitter in `[-amount, amount]`.
    #[inline]
    fn jitter(&mut self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        (self.next() % (2 * amount as u32 + 1)) as i32 - amount
    }
}

fn offset(rgb: [u8; 3], delta: i32) -> u32 {
    let ch = |c: u8| (c as i32 + delta).clamp(0, 255) as u8;
    pack_rgb(ch(rgb[0]), ch(rgb[1]), ch(rgb[2]))
}

fn noise_tile(base: [u8; 3], amount: i32, seed: u32) -> Vec<u32> {
    let mut rng = Lcg(seed);
    (0..TILE_SIZE * TILE_SIZE)
        .map(|_| offset(base, rng.jitter(amount)))
        .collect()
}

fn checkerboard_tile(a: [u8; 3], b: [u8; 3], cell: usize) -> Vec<u32> {
    let mut tile = Vec::with_capacity(TILE_SIZE * TILE_SIZE);
    for y in 0..TILE_SIZE {
        for x in 0..TILE_SIZE {
            let even = ((x / cell) + (y / cell)) % 2 == 0;
            let c = if even { a } else { b };
            tile.push(pack_rgb(c[0], c[1], c[2]));
        }
    }
    tile
}

fn wool_tile(rgb: [u8; 3]) -> Vec<u32> {
    let seed = 12345 ^ ((rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32);
    let mut tile = noise_tile(rgb, 10, seed);
    // Darker one-pixel border, like a stitched edge.
    for y in 0..TILE_SIZE {
        for x in 0..TILE_SIZE {
            if x == 0 || y == 0 || x == TILE_SIZE - 1 || y == TILE_SIZE - 1 {
                tile[y * TILE_SIZE + x] = offset(rgb, -30);
            }
        }
    }
    tile
}

fn redstone_block_tile() -> Vec<u32> {
    let mut rng = Lcg(0x2ed5);
    (0..TILE_SIZE * TILE_SIZE)
        .map(|_| {
            if rng.next() % 7 == 0 {
                pack_rgb(120, 0, 0)
            } else {
                offset([220, 20, 10], rng.jitter(20))
            }
        })
        .collect()
}

fn lamp_tile(lit: bool) -> Vec<u32> {
    let (frame, glow) = if lit {
        ([150, 100, 60], [219, 171, 115])
    } else {
        ([60, 36, 20], [95, 59, 34])
    };
    let mut rng = Lcg(if lit { 0x1a4f } else { 0x1a40 });
    let mut tile = Vec::with_capacity(TILE_SIZE * TILE_SIZE);
    for y in 0..TILE_SIZE {
        for x in 0..TILE_SIZE {
            let on_grid = x % 5 == 0 || y % 5 == 0;
            let c = if on_grid { frame } else { glow };
            tile.push(offset(c, rng.jitter(12)));
        }
    }
    tile
}

/// Torch texture: the stick occupies columns 7..9, rows 6..16 with the
/// flame head in rows 6..8, matching the sub-rectangle torches sample.
fn torch_tile(lit: bool) -> Vec<u32> {
    let head = if lit { [255, 40, 20] } else { [90, 20, 15] };
    let stick = [160, 127, 81];
    let mut tile = vec![pack_rgb(40, 40, 40); TILE_SIZE * TILE_SIZE];
    for y in 6..TILE_SIZE {
        for x in 7..9 {
            let c = if y < 8 { head } else { stick };
            tile[y * TILE_SIZE + x] = pack_rgb(c[0], c[1], c[2]);
        }
    }
    tile
}

fn planks_tile() -> Vec<u32> {
    let mut rng = Lcg(0x0a6);
    let mut tile = Vec::with_capacity(TILE_SIZE * TILE_SIZE);
    for y in 0..TILE_SIZE {
        for _ in 0..TILE_SIZE {
            let seam = y % 4 == 3;
            let c = if seam { [110, 85, 50] } else { [162, 130, 78] };
            tile.push(offset(c, rng.jitter(8)));
        }
    }
    tile
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(color: u32) -> Vec<u32> {
        vec![color; 4]
    }

    #[test]
    fn pack_places_tiles_in_square_grid() {
        let tiles = (0..5)
            .map(|i| (format!("t{i}"), solid(pack_rgb(i as u8, 0, 0))))
            .collect();
        let atlas = TextureAtlas::pack(2, tiles).unwrap();

        // ceil(sqrt(5)) = 3 columns, 2 rows
        assert_eq!((atlas.width, atlas.height), (6, 4));

        let r4 = atlas.lookup("t4").unwrap();
        assert_eq!(r4, AtlasRegion { u: 2.0 / 6.0, v: 0.5, width: 2.0 / 6.0, height: 0.5 });
        assert_eq!(atlas.pixel_at(2, 2), pack_rgb(4, 0, 0));
        assert_eq!(atlas.pixel_at(5, 1), pack_rgb(2, 0, 0));
    }

    #[test]
    fn pack_rejects_bad_input() {
        assert_eq!(TextureAtlas::pack(2, Vec::new()).err(), Some(Error::EmptyAtlas));

        let err = TextureAtlas::pack(2, vec![("bad".into(), vec![0; 3])]).err();
        assert_eq!(
            err,
            Some(Error::TileSizeMismatch { name: "bad".into(), expected: 4, actual: 3 })
        );
    }

    #[test]
    fn from_image_checks_pixel_count() {
        let err = TextureAtlas::from_image(4, 4, vec![0; 15], HashMap::new()).err();
        assert!(matches!(err, Some(Error::ImageSizeMismatch { expected: 16, actual: 15, .. })));
    }

    #[test]
    fn sampling_clamps_to_image() {
        let atlas = TextureAtlas::pack(2, vec![("a".into(), vec![1, 2, 3, 4])]).unwrap();
        assert_eq!(atlas.sample(-5.0, -5.0), 1);
        assert_eq!(atlas.sample(100.0, 100.0), 4);
        assert_eq!(atlas.sample(1.99, 0.2), 2);
        assert_eq!(atlas.sample(f32::NAN, 1.0), 3);
    }

    #[test]
    fn procedural_atlas_has_block_textures() {
        let atlas = TextureAtlas::procedural();
        for color in WoolColor::ALL {
            assert!(atlas.lookup(&color.texture_name()).is_some());
        }
        for name in ["redstone_block", "redstone_torch", "redstone_torch_off", "oak_planks", "stone"] {
            assert!(atlas.lookup(name).is_some(), "{name} missing");
        }
        assert_eq!(atlas.region_or_missing("nope"), atlas.lookup(MISSING_TEXTURE).unwrap());
    }
}
