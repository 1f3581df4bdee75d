use serde::{Deserialize, Serialize};

use crate::error::WhiteboardError;

/// Widest brush the clients can produce.
pub const MAX_WIDTH: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn scaled(self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// CSS hex color as sent by the clients (`#rgb`, `#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into RGBA components.
    pub fn to_rgba(&self) -> Result<(u8, u8, u8, u8), WhiteboardError> {
        let invalid = || WhiteboardError::InvalidAction(format!("Invalid color: {}", self.0));

        let hex = self.0.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    out[i] = v * 17;
                }
                Ok((out[0], out[1], out[2], 255))
            }
            6 => Ok((
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Ok((
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    Pencil,
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeTool {
    Rectangle,
    Ellipse,
}

/// One atomic edit to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawingAction {
    Stroke {
        tool: StrokeTool,
        points: Vec<Point>,
        color: Color,
        width: f64,
    },
    Shape {
        tool: ShapeTool,
        origin: Point,
        corner: Point,
        color: Color,
        width: f64,
    },
    /// Full-surface background wash.
    Fill { color: Color },
}

impl DrawingAction {
    pub fn stroke(tool: StrokeTool, points: Vec<Point>, color: &str, width: f64) -> Self {
        DrawingAction::Stroke {
            tool,
            points,
            color: Color::new(color),
            width,
        }
    }

    pub fn shape(tool: ShapeTool, origin: Point, corner: Point, color: &str, width: f64) -> Self {
        DrawingAction::Shape {
            tool,
            origin,
            corner,
            color: Color::new(color),
            width,
        }
    }

    pub fn fill(color: &str) -> Self {
        DrawingAction::Fill {
            color: Color::new(color),
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, DrawingAction::Fill { .. })
    }

    pub fn color(&self) -> &Color {
        match self {
            DrawingAction::Stroke { color, .. }
            | DrawingAction::Shape { color, .. }
            | DrawingAction::Fill { color } => color,
        }
    }

    /// Reject actions that cannot be replayed.
    pub fn validate(&self) -> Result<(), WhiteboardError> {
        self.color().to_rgba()?;

        match self {
            DrawingAction::Stroke { points, width, .. } => {
                validate_width(*width)?;
                if points.is_empty() {
                    return Err(WhiteboardError::InvalidAction("Stroke has no points".into()));
                }
                if !points.iter().all(Point::is_finite) {
                    return Err(WhiteboardError::InvalidAction("Non-finite coordinate".into()));
                }
            }
            DrawingAction::Shape {
                origin,
                corner,
                width,
                ..
            } => {
                validate_width(*width)?;
                if !origin.is_finite() || !corner.is_finite() {
                    return Err(WhiteboardError::InvalidAction("Non-finite coordinate".into()));
                }
            }
            DrawingAction::Fill { .. } => {}
        }
        Ok(())
    }

    /// Copy of this action mapped onto a surface scaled by `(sx, sy)`.
    ///
    /// Widths shrink a little more than the coordinates so thumbnails stay legible.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        let scale_width = |w: f64| (w * sx.min(sy) * 0.7).max(0.5);

        match self {
            DrawingAction::Stroke {
                tool,
                points,
                color,
                width,
            } => DrawingAction::Stroke {
                tool: *tool,
                points: points.iter().map(|p| p.scaled(sx, sy)).collect(),
                color: color.clone(),
                width: scale_width(*width),
            },
            DrawingAction::Shape {
                tool,
                origin,
                corner,
                color,
                width,
            } => DrawingAction::Shape {
                tool: *tool,
                origin: origin.scaled(sx, sy),
                corner: corner.scaled(sx, sy),
                color: color.clone(),
                width: scale_width(*width),
            },
            DrawingAction::Fill { color } => DrawingAction::Fill {
                color: color.clone(),
            },
        }
    }
}

fn validate_width(width: f64) -> Result<(), WhiteboardError> {
    if width.is_nan() || !(0.0..=MAX_WIDTH).contains(&width) {
        return Err(WhiteboardError::InvalidAction(format!(
            "Width out of range: {}",
            width
        )));
    }
    Ok(())
}
