/// Main application entry point
/// Handles window creation, input, and render loop
use blockgrid_renderer::*;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

type WindowSurface = softbuffer::Surface<Arc<Window>, Arc<Window>>;

/// Presents finished frames on the window's softbuffer surface.
struct SurfaceSink<'a> {
    surface: &'a mut WindowSurface,
}

impl FrameSink for SurfaceSink<'_> {
    fn deliver(&mut self, color: &[u32], width: usize, height: usize) {
        let (Some(w), Some(h)) = (NonZeroU32::new(width as u32), NonZeroU32::new(height as u32)) else {
            return;
        };
        if let Err(err) = self.surface.resize(w, h) {
            log::error!("surface resize failed: {err}");
            return;
        }
        let mut buffer = match self.surface.buffer_mut() {
            Ok(buffer) => buffer,
            Err(err) => {
                log::error!("surface buffer unavailable: {err}");
                return;
            }
        };
        buffer.copy_from_slice(color);
        if let Err(err) = buffer.present() {
            log::error!("present failed: {err}");
        }
    }
}

/// `--terrain [seed]` starts from generated terrain instead of the demo scene.
fn initial_world() -> World {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--terrain") => {
            let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
            log::info!("generating terrain with seed {seed}");
            World::generate_terrain(seed)
        }
        _ => World::demo(),
    }
}

fn toggle(flag: &mut bool, label: &str) {
    *flag = !*flag;
    log::info!("{label}: {}", if *flag { "ON" } else { "OFF" });
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("=== Block Grid Renderer ===");
    log::info!("WASD move, Space/Shift up/down, mouse look (click to capture)");
    log::info!("Left click place, right click remove, C cycle colour");
    log::info!("O occlusion culling, P perspective correction, H HUD, F3 profiling, ESC release/exit");

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Block Grid Renderer")
            .with_inner_size(winit::dpi::LogicalSize::new(960, 720))
            .build(&event_loop)?,
    );

    // Initialize software rendering context
    let context = softbuffer::Context::new(window.clone())?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())?;

    let window_size = window.inner_size();
    let mut framebuffer = Framebuffer::try_new(
        (window_size.width as usize).max(1),
        (window_size.height as usize).max(1),
    )?;

    let mut camera = Camera::looking_at_grid(framebuffer.width, framebuffer.height);
    let mut camera_controller = CameraController::new();

    let atlas = TextureAtlas::procedural();
    let mut buffers = WorldBuffers::new(initial_world());
    let mut config = RenderConfig {
        draw_hud: true,
        ..RenderConfig::default()
    };
    let mut place_color = WoolColor::White;

    // Timing
    let mut last_frame = Instant::now();
    let mut fps_timer = Instant::now();
    let mut perf_stats = PerfStats::new();

    // Mouse state
    let mut mouse_captured = false;
    let mut last_mouse_pos: Option<(f64, f64)> = None;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => {
                    let (w, h) = (new_size.width as usize, new_size.height as usize);
                    if w > 0 && h > 0 {
                        framebuffer.resize(w, h);
                        camera.set_aspect_ratio(w, h);
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let pressed = event.state == ElementState::Pressed;

                    if let PhysicalKey::Code(keycode) = event.physical_key {
                        match keycode {
                            KeyCode::KeyW => camera_controller.forward_pressed = pressed,
                            KeyCode::KeyS => camera_controller.backward_pressed = pressed,
                            KeyCode::KeyA => camera_controller.left_pressed = pressed,
                            KeyCode::KeyD => camera_controller.right_pressed = pressed,
                            KeyCode::Space => camera_controller.up_pressed = pressed,
                            KeyCode::ShiftLeft => camera_controller.down_pressed = pressed,
                            KeyCode::KeyO if pressed => {
                                toggle(&mut config.occlusion_culling, "Occlusion culling")
                            }
                            KeyCode::KeyP if pressed => {
                                toggle(&mut config.perspective_correct, "Perspective correction")
                            }
                            KeyCode::KeyH if pressed => toggle(&mut config.draw_hud, "HUD"),
                            KeyCode::F3 if pressed => toggle(&mut config.profile, "Profiling"),
                            KeyCode::KeyC if pressed => {
                                place_color = place_color.next();
                                log::info!("Placing {place_color} wool");
                            }
                            KeyCode::Escape if pressed => {
                                if mouse_captured {
                                    mouse_captured = false;
                                    last_mouse_pos = None;
                                    window.set_cursor_visible(true);
                                } else {
                                    elwt.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    if state != ElementState::Pressed {
                        return;
                    }
                    if !mouse_captured {
                        if button == MouseButton::Left {
                            mouse_captured = true;
                            window.set_cursor_visible(false);
                        }
                        return;
                    }

                    let selection =
                        pick_from_camera(&*buffers.current(), &camera, config.pick_distance);
                    match (button, selection) {
                        (MouseButton::Left, Some(Selection { previous: Some(cell), .. })) => {
                            if buffers.next_mut().set(cell, Block::Wool(place_color)) {
                                log::debug!("placed {place_color} wool at {cell}");
                            }
                        }
                        (MouseButton::Right, Some(Selection { selected, .. })) => {
                            buffers.next_mut().set(selected, Block::Air);
                            log::debug!("removed block at {selected}");
                        }
                        _ => {}
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    if mouse_captured {
                        if let Some(last_pos) = last_mouse_pos {
                            let delta_x = position.x - last_pos.0;
                            let delta_y = position.y - last_pos.1;
                            camera_controller.mouse_moved(&mut camera, delta_x as f32, delta_y as f32);
                        }
                        last_mouse_pos = Some((position.x, position.y));
                    }
                }
                WindowEvent::RedrawRequested => {
                    // Calculate delta time
                    let now = Instant::now();
                    let dt = (now - last_frame).as_secs_f32();
                    last_frame = now;

                    camera_controller.update_camera(&mut camera, dt);

                    // Edits from input become visible only between frames.
                    buffers.publish();
                    let world = buffers.current();

                    let mut sink = SurfaceSink {
                        surface: &mut surface,
                    };
                    render_once(&*world, &camera, &mut framebuffer, &atlas, &config, &mut sink);

                    perf_stats.record(now.elapsed());
                    if fps_timer.elapsed().as_secs() >= 1 {
                        perf_stats.log_and_reset();
                        fps_timer = Instant::now();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
