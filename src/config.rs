// config.rs: viewer.json settings, every field optional

use crate::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub panorama: PanoramaConfig,
    pub display: DisplayConfig,
    pub overlay: OverlayConfig,
    pub input: InputConfig,
}

/// Camera and sphere geometry shared by both panorama views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub sphere_radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub look_distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanoramaConfig {
    pub asset: PathBuf,
    pub scene: SceneConfig,
    /// Negative x turns the sphere inside out.
    pub sphere_scale: [f32; 3],
    /// Degrees per pixel of pointer travel.
    pub drag_scale: f32,
    pub max_latitude: f32,
    pub brush: BrushConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub size: u32,
    pub color: [u8; 3],
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub scene: SceneConfig,
    pub sphere_scale: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub highlight: [u8; 3],
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub double_click_ms: u64,
    pub double_click_slop_px: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 1.0,
            far: 1000.0,
            sphere_radius: 500.0,
            width_segments: 60,
            height_segments: 40,
            look_distance: 500.0,
        }
    }
}

impl Default for PanoramaConfig {
    fn default() -> Self {
        Self {
            asset: PathBuf::from("assets").join("data").join("room.jpg"),
            scene: SceneConfig::default(),
            sphere_scale: [-0.6, 0.6, 0.6],
            drag_scale: 0.1,
            max_latitude: crate::camera::MAX_LATITUDE,
            brush: BrushConfig::default(),
        }
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: 20,
            color: [255, 0, 0],
            opacity: 0.5,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            sphere_scale: [-1.0, 1.0, 1.0],
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            highlight: [255, 0, 0],
            opacity: 0.4,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            double_click_ms: 500,
            double_click_slop_px: 4.0,
        }
    }
}

impl ViewerConfig {
    const FILE_NAME: &'static str = "viewer.json";

    /// Load from an explicit path, or search next to the executable and then
    /// in the working directory. No file found means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::find(),
        };

        let Some(path) = path else {
            log::info!("no {} found, using defaults", Self::FILE_NAME);
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ViewerError::Open {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ViewerError::Config {
            path: path.clone(),
            source,
        })?;
        log::info!("loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    fn find() -> Option<PathBuf> {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let p = dir.join(Self::FILE_NAME);
                if p.exists() {
                    return Some(p);
                }
            }
        }

        let p = PathBuf::from(Self::FILE_NAME);
        if p.exists() {
            return Some(p);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_constants() {
        let c = ViewerConfig::default();
        assert_eq!(c.panorama.scene.fov_deg, 75.0);
        assert_eq!(c.panorama.sphere_scale, [-0.6, 0.6, 0.6]);
        assert_eq!(c.display.sphere_scale, [-1.0, 1.0, 1.0]);
        assert_eq!(c.panorama.drag_scale, 0.1);
        assert_eq!(c.panorama.max_latitude, 85.0);
        assert_eq!(c.panorama.brush.size, 20);
        assert_eq!(c.overlay.highlight, [255, 0, 0]);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let c = ViewerConfig::parse(r#"{ "panorama": { "drag_scale": 0.25, "scene": { "fov_deg": 90 } } }"#)
            .unwrap();
        assert_eq!(c.panorama.drag_scale, 0.25);
        assert_eq!(c.panorama.scene.fov_deg, 90.0);
        assert_eq!(c.panorama.scene.width_segments, 60);
        assert_eq!(c.panorama.sphere_scale, [-0.6, 0.6, 0.6]);
        assert_eq!(c.panorama.max_latitude, 85.0);
        assert_eq!(c.input.double_click_ms, 500);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = std::env::temp_dir().join(format!("panomask-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("viewer.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ViewerConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ViewerError::Config { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_explicit_file_is_an_open_error() {
        let err = ViewerConfig::load(Some(Path::new("/definitely/not/here/viewer.json"))).unwrap_err();
        assert!(matches!(err, ViewerError::Open { .. }));
    }
}
