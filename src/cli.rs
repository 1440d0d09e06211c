// cli.rs: command-line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which view tree the entry point mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewKind {
    /// Flat mask overlay plus the paintable panorama
    Tool,
    /// Display-only panorama
    Display,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Segmentation mask overlay and panorama painter", long_about = None)]
pub struct Args {
    /// View tree to mount
    #[arg(long, value_enum, default_value_t = ViewKind::Tool)]
    pub view: ViewKind,

    /// Panorama image projected onto the sphere (overrides viewer.json)
    #[arg(long)]
    pub panorama: Option<PathBuf>,

    /// Source image for the flat overlay
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Mask bitmap for the flat overlay
    #[arg(long)]
    pub mask: Option<PathBuf>,

    /// Path to viewer.json
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_tool_view() {
        let args = Args::parse_from(["panomask"]);
        assert_eq!(args.view, ViewKind::Tool);
        assert!(args.panorama.is_none());
    }

    #[test]
    fn parses_display_view_with_paths() {
        let args = Args::parse_from([
            "panomask",
            "--view",
            "display",
            "--panorama",
            "room.jpg",
            "--mask",
            "m.png",
        ]);
        assert_eq!(args.view, ViewKind::Display);
        assert_eq!(args.panorama, Some(PathBuf::from("room.jpg")));
        assert_eq!(args.mask, Some(PathBuf::from("m.png")));
    }
}
