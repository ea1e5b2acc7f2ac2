//! User-adjustable layout parameters.

use crate::layout::{LayoutError, LayoutResult};
use serde::{Deserialize, Serialize};

/// Default export width in pixels.
pub const DEFAULT_TARGET_WIDTH: u32 = 2000;
/// Default vertical gap between images.
pub const DEFAULT_SPACING: u32 = 20;
/// Default height of the band below the last image.
pub const DEFAULT_BOTTOM_MARGIN: u32 = 250;

/// Canvas background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Background {
    #[default]
    #[serde(alias = "White")]
    Light,
    #[serde(alias = "Black")]
    Dark,
}

impl Background {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Background::Light => [255, 255, 255],
            Background::Dark => [0, 0, 0],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Background::Light => "Light",
            Background::Dark => "Dark",
        }
    }

    /// Parse a background name. Accepts light/white and dark/black in any case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" | "white" => Some(Background::Light),
            "dark" | "black" => Some(Background::Dark),
            _ => None,
        }
    }
}

/// Validated layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutParameters {
    /// Export width of every image, in pixels.
    pub target_width: u32,
    /// Vertical gap between consecutive images.
    pub spacing: u32,
    /// Height of the reserved band below the last image.
    pub bottom_margin: u32,
    pub background: Background,
}

impl Default for LayoutParameters {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            spacing: DEFAULT_SPACING,
            bottom_margin: DEFAULT_BOTTOM_MARGIN,
            background: Background::default(),
        }
    }
}

impl LayoutParameters {
    pub fn new(target_width: u32, spacing: u32, bottom_margin: u32, background: Background) -> Self {
        Self {
            target_width,
            spacing,
            bottom_margin,
            background,
        }
    }

    /// Check invariants that the type alone cannot express.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.target_width == 0 {
            return Err(LayoutError::InvalidWidth(0));
        }
        Ok(())
    }

    /// Parse raw text inputs into parameters.
    pub fn parse(inputs: &ParamInputs) -> LayoutResult<Self> {
        let width = parse_integer("width", &inputs.width)?;
        if width <= 0 {
            return Err(LayoutError::InvalidWidth(width));
        }
        let spacing = parse_integer("spacing", &inputs.spacing)?;
        if spacing < 0 {
            return Err(LayoutError::NegativeSpacing(spacing));
        }
        let bottom_margin = parse_integer("bottom margin", &inputs.bottom_margin)?;
        if bottom_margin < 0 {
            return Err(LayoutError::NegativeMargin(bottom_margin));
        }
        let background = Background::parse(&inputs.background)
            .ok_or_else(|| LayoutError::UnknownBackground(inputs.background.clone()))?;

        Ok(Self {
            target_width: to_u32("width", width)?,
            spacing: to_u32("spacing", spacing)?,
            bottom_margin: to_u32("bottom margin", bottom_margin)?,
            background,
        })
    }

    /// Render the parameters back into editable text.
    pub fn to_inputs(&self) -> ParamInputs {
        ParamInputs {
            width: self.target_width.to_string(),
            spacing: self.spacing.to_string(),
            bottom_margin: self.bottom_margin.to_string(),
            background: self.background.name().to_string(),
        }
    }
}

/// Unvalidated parameter text as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamInputs {
    pub width: String,
    pub spacing: String,
    pub bottom_margin: String,
    pub background: String,
}

fn parse_integer(field: &'static str, value: &str) -> LayoutResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| LayoutError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn to_u32(field: &'static str, value: i64) -> LayoutResult<u32> {
    u32::try_from(value).map_err(|_| LayoutError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
