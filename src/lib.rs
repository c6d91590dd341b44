pub mod camera;
pub mod error;
pub mod geometry;
pub mod perf;
pub mod raycast;
pub mod rendering;
/// Block Grid Renderer - GPU-free software renderer for a 16x16x16 block grid
/// Camera, scanline rasterizer, cuboid/scene renderer and DDA block picking
pub mod world;

pub use camera::{Camera, CameraController};
pub use error::{Error, Result};
pub use geometry::{Cuboid, Direction, Face, FaceSet, FaceUvs, PixelPoint, RotateExt, SUBPIXEL_BITS, SUBPIXEL_SCALE};
pub use perf::{PerfStats, PerfTimer};
pub use raycast::{cast_ray, dda_points, pick, pick_from_camera, pick_through_pixel, Selection};
pub use rendering::{
    draw_cuboid, draw_cuboid_wireframe, render_frame, render_once, visible_faces, AtlasRegion,
    CuboidStats, FrameSink, FrameStats, Framebuffer, Rasterizer, RenderConfig, ScanOrder, ShadingConfig,
    TextureAtlas,
};
pub use world::{Block, BlockSource, TerrainConfig, World, WorldBuffers, WoolColor, GRID_SIZE};
