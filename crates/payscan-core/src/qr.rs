//! QR rendering with a centered logo
//!
//! [`render`] returns the finished canvas, so the logo is composited strictly
//! after drawing completes. A logo that cannot be loaded is skipped and the
//! code is still produced.

use std::path::Path;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrcodegen::{QrCode, QrCodeEcc};

use crate::{Error, Result};

/// QR error-correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    Low,
    Medium,
    Quartile,
    #[default]
    High,
}

impl From<ErrorCorrection> for QrCodeEcc {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => QrCodeEcc::Low,
            ErrorCorrection::Medium => QrCodeEcc::Medium,
            ErrorCorrection::Quartile => QrCodeEcc::Quartile,
            ErrorCorrection::High => QrCodeEcc::High,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(ErrorCorrection::Low),
            "M" | "MEDIUM" => Ok(ErrorCorrection::Medium),
            "Q" | "QUARTILE" => Ok(ErrorCorrection::Quartile),
            "H" | "HIGH" => Ok(ErrorCorrection::High),
            other => Err(format!("unknown error-correction level {:?}", other)),
        }
    }
}

/// Canvas layout and colours
#[derive(Debug, Clone, PartialEq)]
pub struct QrStyle {
    /// Target canvas side in pixels
    pub size: u32,
    /// Module colour
    pub dark: Rgba<u8>,
    /// Background colour
    pub light: Rgba<u8>,
    pub ecc: ErrorCorrection,
    /// Quiet zone width in modules
    pub border: u32,
}

impl Default for QrStyle {
    // light modules on the app's dark background
    fn default() -> Self {
        Self {
            size: 300,
            dark: Rgba([0xff, 0xff, 0xff, 0xff]),
            light: Rgba([0x0f, 0x11, 0x17, 0xff]),
            ecc: ErrorCorrection::High,
            border: 2,
        }
    }
}

/// How the logo sits on the code
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    /// Logo side as a fraction of the canvas width
    pub relative_size: f32,
    pub opacity: f32,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            relative_size: 0.22,
            opacity: 0.95,
        }
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
pub fn parse_hex_color(text: &str) -> Result<Rgba<u8>> {
    let hex = text.trim().trim_start_matches('#');
    let invalid = || Error::Render(format!("invalid colour {:?}", text));

    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

    let alpha = if hex.len() == 8 { channel(6)? } else { 0xff };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Largest canvas side `render` will allocate, in pixels
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// Encode `text` and paint it onto a square canvas.
///
/// Modules are scaled by a whole number of pixels and centered; the canvas
/// is `style.size` wide unless the code needs more than one pixel per module
/// at that size. Canvases wider than [`MAX_CANVAS_SIDE`] are rejected.
pub fn render(text: &str, style: &QrStyle) -> Result<RgbaImage> {
    if style.size > MAX_CANVAS_SIDE {
        return Err(oversized(style.size));
    }
    let code = QrCode::encode_text(text, style.ecc.into())
        .map_err(|e| Error::Render(format!("cannot encode {} bytes: {}", text.len(), e)))?;

    let size = code.size() as u32;
    let modules = style
        .border
        .checked_mul(2)
        .and_then(|quiet| quiet.checked_add(size))
        .filter(|&m| m <= MAX_CANVAS_SIDE)
        .ok_or_else(|| Error::Render(format!("quiet zone of {} modules is too wide", style.border)))?;
    let scale = (style.size / modules).max(1);
    let side = (modules * scale).max(style.size);
    if side > MAX_CANVAS_SIDE {
        return Err(oversized(side));
    }
    let offset = (side - modules * scale) / 2 + style.border * scale;

    let mut canvas = RgbaImage::from_pixel(side, side, style.light);
    for my in 0..size {
        for mx in 0..size {
            if !code.get_module(mx as i32, my as i32) {
                continue;
            }
            let (x0, y0) = (offset + mx * scale, offset + my * scale);
            for y in y0..y0 + scale {
                for x in x0..x0 + scale {
                    canvas.put_pixel(x, y, style.dark);
                }
            }
        }
    }

    tracing::debug!(version_size = size, scale, side, "qr rendered");
    Ok(canvas)
}

fn oversized(side: u32) -> Error {
    Error::Render(format!(
        "canvas of {} px exceeds the {} px limit",
        side, MAX_CANVAS_SIDE
    ))
}

/// Scale the logo to a centered square and alpha-blend it onto the canvas.
pub fn composite_logo(canvas: &mut RgbaImage, logo: &DynamicImage, overlay: &Overlay) {
    let side = (canvas.width() as f32 * overlay.relative_size.clamp(0.0, 1.0)).round() as u32;
    if side == 0 {
        return;
    }

    let mut scaled = imageops::resize(&logo.to_rgba8(), side, side, FilterType::Triangle);
    let opacity = overlay.opacity.clamp(0.0, 1.0);
    for pixel in scaled.pixels_mut() {
        pixel.0[3] = (pixel.0[3] as f32 * opacity).round() as u8;
    }

    let x = canvas.width().saturating_sub(side) / 2;
    let y = canvas.height().saturating_sub(side) / 2;
    imageops::overlay(canvas, &scaled, x as i64, y as i64);
}

/// Load a logo image; failures are logged and yield `None`.
pub fn load_logo(path: &Path) -> Option<DynamicImage> {
    match image::open(path) {
        Ok(logo) => Some(logo),
        Err(e) => {
            tracing::warn!("logo {} not used: {}", path.display(), e);
            None
        }
    }
}

/// Render, then composite the logo when one is given.
pub fn render_with_logo(
    text: &str,
    style: &QrStyle,
    logo: Option<&DynamicImage>,
    overlay: &Overlay,
) -> Result<RgbaImage> {
    let mut canvas = render(text, style)?;
    if let Some(logo) = logo {
        composite_logo(&mut canvas, logo, overlay);
    }
    Ok(canvas)
}

/// Write the canvas as PNG
pub fn save_png(canvas: &RgbaImage, path: &Path) -> Result<()> {
    canvas
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::Render(format!("cannot write {}: {}", path.display(), e)))
}
