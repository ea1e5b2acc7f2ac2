//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Reorder request: move the image at `from` to `to` (zero-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSpec {
    pub from: usize,
    pub to: usize,
}

/// Preview viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Parser)]
#[command(name = "stacksmith", version, about = "Stack photos into one tall composite")]
pub struct Cli {
    /// Images to stack, top first.
    pub images: Vec<PathBuf>,

    /// Drop payload: `{paths with spaces}` or whitespace-separated paths.
    #[arg(long)]
    pub drop: Option<String>,

    /// Pick images with a file dialog.
    #[arg(long)]
    pub pick_images: bool,

    /// Export width in pixels.
    #[arg(long, allow_hyphen_values = true)]
    pub width: Option<String>,

    /// Gap between images in pixels.
    #[arg(long, allow_hyphen_values = true)]
    pub spacing: Option<String>,

    /// Height of the band below the last image.
    #[arg(long = "bottom", allow_hyphen_values = true)]
    pub bottom_margin: Option<String>,

    /// Canvas background: light (white) or dark (black).
    #[arg(long)]
    pub background: Option<String>,

    /// Logo drawn in the bottom band.
    #[arg(long, conflicts_with = "no_logo")]
    pub logo: Option<PathBuf>,

    /// Pick the logo with a file dialog.
    #[arg(long, conflicts_with_all = ["logo", "no_logo"])]
    pub pick_logo: bool,

    /// Stop drawing the remembered logo.
    #[arg(long)]
    pub no_logo: bool,

    /// Logo width as a percentage of the canvas width (5-80).
    #[arg(long)]
    pub logo_scale: Option<i32>,

    /// Horizontal logo offset in export pixels (-500..500).
    #[arg(long, allow_negative_numbers = true)]
    pub logo_offset_x: Option<i32>,

    /// Vertical logo offset in export pixels (-500..500).
    #[arg(long, allow_negative_numbers = true)]
    pub logo_offset_y: Option<i32>,

    /// Reset logo scale and offsets.
    #[arg(long)]
    pub reset_logo: bool,

    /// Print remembered logos that still exist, most recent first.
    #[arg(long)]
    pub list_logos: bool,

    /// Drag the image at position FROM to position TO (1-based). Repeatable.
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    pub moves: Vec<MoveSpec>,

    /// Preview viewport used for dragging and `--preview`.
    #[arg(long, value_name = "WxH", default_value = "520x1000", value_parser = parse_viewport)]
    pub viewport: ViewportSize,

    /// Write a PNG snapshot of the preview.
    #[arg(long)]
    pub preview: Option<PathBuf>,

    /// Export the composite as JPEG.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Choose the export path with a file dialog.
    #[arg(long, conflicts_with = "output")]
    pub choose_output: bool,

    /// Settings file (defaults to the documents directory).
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Do not write settings on exit.
    #[arg(long)]
    pub no_save_settings: bool,
}

impl Cli {
    /// Whether any layout parameter was given.
    pub fn has_param_overrides(&self) -> bool {
        self.width.is_some()
            || self.spacing.is_some()
            || self.bottom_margin.is_some()
            || self.background.is_some()
    }

    /// Whether any logo adjustment was given.
    pub fn has_logo_adjustments(&self) -> bool {
        self.logo_scale.is_some() || self.logo_offset_x.is_some() || self.logo_offset_y.is_some()
    }
}

fn parse_position(value: &str) -> Result<usize, String> {
    let position: usize = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid position {value:?}"))?;
    position
        .checked_sub(1)
        .ok_or_else(|| "positions start at 1".to_string())
}

fn parse_move(value: &str) -> Result<MoveSpec, String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got {value:?}"))?;
    Ok(MoveSpec {
        from: parse_position(from)?,
        to: parse_position(to)?,
    })
}

fn parse_viewport(value: &str) -> Result<ViewportSize, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {value:?}"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| format!("invalid viewport size {value:?}"))
    };
    Ok(ViewportSize {
        width: parse(w)?,
        height: parse(h)?,
    })
}
