pub mod cuboid;
pub mod framebuffer;
pub mod hud;
/// Software rasterization pipeline
/// Framebuffer, texture atlas and shading feed the scanline rasterizer;
/// the cuboid and scene renderers sit on top of it
pub mod rasterizer;
pub mod scene;
pub mod shading;
pub mod texture;

pub use cuboid::{draw_cuboid, draw_cuboid_wireframe, visible_faces, CuboidStats};
pub use framebuffer::Framebuffer;
pub use rasterizer::Rasterizer;
pub use scene::{render_frame, render_once, FrameSink, FrameStats, RenderConfig, ScanOrder};
pub use shading::ShadingConfig;
pub use texture::{AtlasRegion, TextureAtlas};
