// main.rs: window, event loop and the mounted view tree

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // no console window in release builds

mod app;
mod camera;
mod cli;
mod config;
mod display;
mod error;
mod input;
mod listeners;
mod loader;
mod mesh;
mod overlay;
mod panorama;
mod render_loop;
mod renderer;
mod scene;
mod state;
mod texture;
mod ui;

use anyhow::Context;
use app::{Feed, Stage, View, Viewport};
use clap::Parser;
use cli::{Args, ViewKind};
use config::ViewerConfig;
use display::DisplayView;
use input::InputTranslator;
use overlay::OverlayView;
use panorama::PanoramaView;
use render_loop::RenderLoop;
use renderer::Renderer;

use std::sync::Arc;
use std::time::Instant;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = ViewerConfig::load(args.config.as_deref())?;
    if let Some(path) = &args.panorama {
        config.panorama.asset = path.clone();
    }

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("panomask")
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;

    let views: Vec<Box<dyn View>> = match args.view {
        ViewKind::Tool => vec![
            Box::new(OverlayView::new(config.overlay.clone())),
            Box::new(PanoramaView::new(config.panorama.clone())),
        ],
        ViewKind::Display => vec![Box::new(DisplayView::new(
            config.display.clone(),
            config.panorama.asset.clone(),
        ))],
    };
    let size = window.inner_size();
    let mut stage = Stage::new(
        views,
        Viewport::new(size.width, size.height),
        renderer.max_texture_dimension(),
    );
    stage.mount();
    log::debug!("{} listeners registered", stage.listeners().len());
    if let Some(path) = args.image {
        stage.request(Feed::Image, path);
    }
    if let Some(path) = args.mask {
        stage.request(Feed::Mask, path);
    }

    let mut input = InputTranslator::new(&config.input);
    let mut render_loop = RenderLoop::new(Instant::now());
    if !stage.viewport().is_empty() {
        render_loop.start(Instant::now());
    }
    let mut ui_state = ui::UiState::default();
    let mut exiting = false;

    log::info!("{:?} view running", args.view);

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::WindowEvent { event, .. } => {
                // egui sees every event first
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);

                match &event {
                    WindowEvent::CloseRequested => {
                        shutdown(&mut stage, &mut render_loop);
                        exiting = true;
                    }
                    WindowEvent::Resized(new_size) => {
                        resize(&mut renderer, &mut stage, &mut render_loop, &mut input, *new_size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        resize(&mut renderer, &mut stage, &mut render_loop, &mut input, **new_inner_size);
                    }
                    _ if response.consumed => {}

                    WindowEvent::KeyboardInput { input: key, .. } if key.state == ElementState::Pressed => {
                        match key.virtual_keycode {
                            Some(VirtualKeyCode::O) => {
                                if let Some(path) = ui::pick_image("Open panorama") {
                                    stage.open_panorama(&path);
                                }
                            }
                            Some(VirtualKeyCode::R) => reset_view(&mut stage),
                            Some(VirtualKeyCode::F11) => toggle_fullscreen(&window, &mut ui_state),
                            _ => {}
                        }
                    }

                    WindowEvent::DroppedFile(path) => {
                        log::info!("opening dropped panorama {:?}", path);
                        stage.open_panorama(path);
                    }

                    _ => {
                        for e in input.translate(&event, Instant::now()) {
                            stage.dispatch(&e);
                        }
                    }
                }
            }

            Event::RedrawRequested(_) => {
                if !render_loop.tick(Instant::now()) {
                    return;
                }

                stage.update();
                renderer.sync_scene(stage.scene_mut());

                let status = ui::Status {
                    loading: stage.is_loading(),
                    look: stage.scene().map(|s| (s.orientation.longitude(), s.orientation.latitude())),
                    fov_deg: stage.scene().map(|s| s.camera.fov_deg),
                    texture: stage.scene().and_then(|s| s.texture()).map(|t| t.dimensions()),
                    paints: stage.paint_count(),
                    point: stage.state().clicks().get().and_then(|c| c.first().copied()),
                    fps: render_loop.fps(),
                };

                let mut actions = ui::UiActions::default();
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    stage.ui(ctx);
                    actions = ui::draw(ctx, &mut ui_state, &status);
                });

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory");
                        shutdown(&mut stage, &mut render_loop);
                        exiting = true;
                    }
                    Err(e) => log::warn!("render error: {:?}", e),
                }

                if let Some(path) = actions.open_panorama {
                    stage.open_panorama(&path);
                }
                if let Some(path) = actions.open_image {
                    stage.request(Feed::Image, path);
                }
                if let Some(path) = actions.open_mask {
                    stage.request(Feed::Mask, path);
                }
                if actions.clear_mask {
                    stage.state_mut().set_mask(None);
                }
                if actions.reset_view {
                    reset_view(&mut stage);
                }
                if actions.toggle_fullscreen {
                    toggle_fullscreen(&window, &mut ui_state);
                }
                if actions.exit {
                    shutdown(&mut stage, &mut render_loop);
                    exiting = true;
                }
            }

            Event::MainEventsCleared => {
                if render_loop.is_running() {
                    window.request_redraw();
                }
            }

            _ => {}
        }

        *control_flow = if exiting {
            ControlFlow::Exit
        } else {
            render_loop.control_flow()
        };
    })
}

/// Surface, stage and loop follow the window size; a minimised window stops drawing.
fn resize(
    renderer: &mut Renderer,
    stage: &mut Stage,
    render_loop: &mut RenderLoop,
    input: &mut InputTranslator,
    size: winit::dpi::PhysicalSize<u32>,
) {
    renderer.resize(size);
    let event = input.resized(size.width, size.height);
    stage.dispatch(&event);

    if stage.viewport().is_empty() {
        render_loop.stop();
    } else {
        render_loop.start(Instant::now());
    }
}

fn shutdown(stage: &mut Stage, render_loop: &mut RenderLoop) {
    if stage.is_mounted() {
        stage.unmount();
    }
    render_loop.stop();
}

fn reset_view(stage: &mut Stage) {
    if let Some(scene) = stage.scene_mut() {
        scene.orientation.reset();
        log::debug!("view reset");
    }
}

fn toggle_fullscreen(window: &Window, ui_state: &mut ui::UiState) {
    ui_state.is_fullscreen = !ui_state.is_fullscreen;
    if ui_state.is_fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}
