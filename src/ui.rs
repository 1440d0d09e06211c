// ui.rs: menu bar and status bar drawn over the views

use crate::state::{Click, ClickLabel};
use std::path::PathBuf;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Toggles owned by the chrome itself.
#[derive(Debug, Default)]
pub struct UiState {
    pub show_fps: bool,
    pub is_fullscreen: bool,
}

/// What the status bar shows this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Status {
    pub loading: bool,
    /// (longitude, latitude) when a panorama scene is mounted.
    pub look: Option<(f32, f32)>,
    pub fov_deg: Option<f32>,
    pub texture: Option<(u32, u32)>,
    /// Last point the overlay recorded, in image pixels.
    pub point: Option<Click>,
    pub paints: u64,
    pub fps: f32,
}

/// Requests collected from the menus, applied by the event loop after the frame.
#[derive(Debug, Default, PartialEq)]
pub struct UiActions {
    pub open_panorama: Option<PathBuf>,
    pub open_image: Option<PathBuf>,
    pub open_mask: Option<PathBuf>,
    pub clear_mask: bool,
    pub reset_view: bool,
    pub toggle_fullscreen: bool,
    pub exit: bool,
}

pub fn pick_image(title: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

pub fn draw(ctx: &egui::Context, state: &mut UiState, status: &Status) -> UiActions {
    let mut actions = UiActions::default();

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open panorama…").clicked() {
                    ui.close_menu();
                    actions.open_panorama = pick_image("Open panorama");
                }
                if ui.button("Open image…").clicked() {
                    ui.close_menu();
                    actions.open_image = pick_image("Open image");
                }
                if ui.button("Open mask…").clicked() {
                    ui.close_menu();
                    actions.open_mask = pick_image("Open mask");
                }
                if ui.button("Clear mask").clicked() {
                    ui.close_menu();
                    actions.clear_mask = true;
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    ui.close_menu();
                    actions.exit = true;
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Reset view").clicked() {
                    actions.reset_view = true;
                    ui.close_menu();
                }

                let fullscreen = if state.is_fullscreen {
                    "Exit fullscreen"
                } else {
                    "Fullscreen"
                };
                if ui.button(fullscreen).clicked() {
                    actions.toggle_fullscreen = true;
                    ui.close_menu();
                }

                ui.separator();
                if ui.checkbox(&mut state.show_fps, "Show FPS").clicked() {
                    ui.close_menu();
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if status.loading {
                ui.label(egui::RichText::new("Loading…").color(egui::Color32::YELLOW));
                ui.label("|");
            }

            if let Some((lon, lat)) = status.look {
                ui.label(format!("Lon: {:.1}°", lon));
                ui.label("|");
                ui.label(format!("Lat: {:.1}°", lat));
                ui.label("|");
            }
            if let Some(fov) = status.fov_deg {
                ui.label(format!("FOV: {:.1}°", fov));
                ui.label("|");
            }
            if let Some((w, h)) = status.texture {
                ui.label(format!("{}×{}", w, h));
                ui.label("|");
            }
            ui.label(format!("Paints: {}", status.paints));

            if let Some(click) = status.point {
                let sign = match click.label {
                    ClickLabel::Positive => '+',
                    ClickLabel::Negative => '-',
                };
                ui.label("|");
                ui.label(format!("Point: {:.0}, {:.0} ({})", click.x, click.y, sign));
            }

            if state.show_fps {
                ui.label("|");
                ui.label(
                    egui::RichText::new(format!("FPS: {:.1}", status.fps))
                        .color(egui::Color32::GREEN),
                );
            }
        });
    });

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_frame_requests_nothing() {
        let ctx = egui::Context::default();
        let mut state = UiState::default();
        let status = Status {
            loading: true,
            look: Some((12.0, -3.0)),
            fov_deg: Some(75.0),
            texture: Some((4096, 2048)),
            point: Some(Click {
                x: 10.0,
                y: 20.0,
                label: ClickLabel::Negative,
            }),
            paints: 2,
            fps: 60.0,
        };

        let mut actions = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = Some(draw(ctx, &mut state, &status));
        });
        assert_eq!(actions, Some(UiActions::default()));
        assert!(!state.show_fps);
    }
}
