// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! A small immediate style 2d drawing context.
//!
//! Drawing calls are recorded as a display list of [`DrawOp`] so layouts can
//! be inspected (and compared) without touching pixels. [`Canvas::rasterize`]
//! turns the list into an rgba bitmap on the cpu. Text is drawn with the
//! given [`TextRenderer`], or with the font bundled in the crate when none is
//! given.
//!
//! Like a browser canvas, `set_scale` multiplies every coordinate recorded
//! after it, which is how the 600x800 card layout lands on a 1200x1600
//! texture.

use crate::color::{ColorGradient, Fraction, Rgba};
use crate::error::ExportError;
use crate::util::clamp;
use fontdue::{Font, FontSettings};
use image::RgbaImage;
use lazy_static::lazy_static;
use log::error;
use std::fs;

/// DejaVu Sans Mono, see assets/fonts/LICENSE
pub const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

lazy_static! {
    static ref BUNDLED_TEXT: Option<TextRenderer> =
        match TextRenderer::from_bytes(BUNDLED_FONT, "DejaVuSansMono.ttf") {
            Ok(t) => Some(t),
            Err(e) => {
                error!("bundled font unusable: {}", e);
                None
            }
        };
}

pub type Point = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    /// two stop linear gradient from (x0, y0) to (x1, y1)
    Linear {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        from: Rgba,
        to: Rgba,
    },
}

impl Paint {
    fn scaled(&self, s: f64) -> Paint {
        match self {
            Paint::Solid(c) => Paint::Solid(*c),
            Paint::Linear {
                x0,
                y0,
                x1,
                y1,
                from,
                to,
            } => Paint::Linear {
                x0: x0 * s,
                y0: y0 * s,
                x1: x1 * s,
                y1: y1 * s,
                from: *from,
                to: *to,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub align: TextAlign,
    pub color: Rgba,
}

impl TextStyle {
    pub fn new(size: f64, color: Rgba) -> Self {
        Self {
            size,
            bold: false,
            align: TextAlign::Left,
            color,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub text: String,
    pub x: f64,
    /// baseline
    pub y: f64,
    pub style: TextStyle,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        paint: Paint,
        alpha: f64,
    },
    Stroke {
        points: Vec<Point>,
        closed: bool,
        color: Rgba,
        width: f64,
        alpha: f64,
    },
    FillPolygon {
        points: Vec<Point>,
        color: Rgba,
        alpha: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        color: Rgba,
        width: f64,
        alpha: f64,
    },
    Text(TextOp),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    scale: f64,
    alpha: f64,
    ops: Vec<DrawOp>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            alpha: 1.0,
            ops: vec![],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// global alpha applied to subsequent ops
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = clamp(0.0, 1.0, alpha);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn find_text(&self, text: &str) -> Option<&TextOp> {
        self.texts().find(|t| t.text == text)
    }

    fn pt(&self, p: Point) -> Point {
        (p.0 * self.scale, p.1 * self.scale)
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint) {
        let s = self.scale;
        self.ops.push(DrawOp::FillRect {
            x: x * s,
            y: y * s,
            w: w * s,
            h: h * s,
            paint: paint.scaled(s),
            alpha: self.alpha,
        });
    }

    pub fn fill_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) {
        let s = self.scale;
        self.ops.push(DrawOp::Text(TextOp {
            text: text.to_string(),
            x: x * s,
            y: y * s,
            style: TextStyle {
                size: style.size * s,
                ..style
            },
            alpha: self.alpha,
        }));
    }

    pub fn stroke_path(&mut self, points: &[Point], closed: bool, color: Rgba, width: f64) {
        let points = points.iter().map(|p| self.pt(*p)).collect();
        self.ops.push(DrawOp::Stroke {
            points,
            closed,
            color,
            width: width * self.scale,
            alpha: self.alpha,
        });
    }

    pub fn line(&mut self, from: Point, to: Point, color: Rgba, width: f64) {
        self.stroke_path(&[from, to], false, color, width);
    }

    pub fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
        let points = points.iter().map(|p| self.pt(*p)).collect();
        self.ops.push(DrawOp::FillPolygon {
            points,
            color,
            alpha: self.alpha,
        });
    }

    pub fn stroke_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba, width: f64) {
        let s = self.scale;
        self.ops.push(DrawOp::Circle {
            cx: cx * s,
            cy: cy * s,
            r: r * s,
            color,
            width: width * s,
            alpha: self.alpha,
        });
    }

    /// Draw the recorded ops onto a transparent bitmap of the canvas size.
    /// `None` draws text with the bundled font.
    pub fn rasterize(&self, text: Option<&TextRenderer>) -> RgbaImage {
        let text = text.or_else(|| TextRenderer::bundled());
        let mut r = Raster {
            img: RgbaImage::new(self.width, self.height),
        };
        for op in &self.ops {
            match op {
                DrawOp::FillRect {
                    x,
                    y,
                    w,
                    h,
                    paint,
                    alpha,
                } => r.fill_rect(*x, *y, *w, *h, paint, *alpha),
                DrawOp::Stroke {
                    points,
                    closed,
                    color,
                    width,
                    alpha,
                } => {
                    for seg in points.windows(2) {
                        r.segment(seg[0], seg[1], *color, *width, *alpha);
                    }
                    if *closed && points.len() > 2 {
                        r.segment(points[points.len() - 1], points[0], *color, *width, *alpha);
                    }
                }
                DrawOp::FillPolygon {
                    points,
                    color,
                    alpha,
                } => r.polygon(points, *color, *alpha),
                DrawOp::Circle {
                    cx,
                    cy,
                    r: radius,
                    color,
                    width,
                    alpha,
                } => r.circle(*cx, *cy, *radius, *color, *width, *alpha),
                DrawOp::Text(t) => {
                    if let Some(tr) = text {
                        tr.draw(&mut r, t);
                    }
                }
            }
        }
        r.img
    }
}

struct Raster {
    img: RgbaImage,
}

impl Raster {
    fn blend(&mut self, x: i64, y: i64, c: Rgba, coverage: f64) {
        if x < 0 || y < 0 || x >= self.img.width() as i64 || y >= self.img.height() as i64 {
            return;
        }
        if coverage <= 0.0 {
            return;
        }
        let px = self.img.get_pixel_mut(x as u32, y as u32);
        let out = Rgba::from_u8(px.0).blend(c, coverage);
        px.0 = out.to_u8();
    }

    fn clip_x(&self, v: f64) -> i64 {
        clamp(0.0, self.img.width() as f64, v) as i64
    }

    fn clip_y(&self, v: f64) -> i64 {
        clamp(0.0, self.img.height() as f64, v) as i64
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: &Paint, alpha: f64) {
        let (xa, xb) = if w < 0.0 { (x + w, x) } else { (x, x + w) };
        let (ya, yb) = if h < 0.0 { (y + h, y) } else { (y, y + h) };
        let (x0, x1) = (self.clip_x(xa.round()), self.clip_x(xb.round()));
        let (y0, y1) = (self.clip_y(ya.round()), self.clip_y(yb.round()));
        match paint {
            Paint::Solid(c) => {
                for py in y0..y1 {
                    for px in x0..x1 {
                        self.blend(px, py, *c, alpha);
                    }
                }
            }
            Paint::Linear {
                x0: gx0,
                y0: gy0,
                x1: gx1,
                y1: gy1,
                from,
                to,
            } => {
                let g = ColorGradient::two(*from, *to);
                let (dx, dy) = (gx1 - gx0, gy1 - gy0);
                let len2 = dx * dx + dy * dy;
                for py in y0..y1 {
                    for px in x0..x1 {
                        let t = if len2 > 0.0 {
                            ((px as f64 + 0.5 - gx0) * dx + (py as f64 + 0.5 - gy0) * dy) / len2
                        } else {
                            0.0
                        };
                        if let Some(c) = g.sample(Fraction::from(t)) {
                            self.blend(px, py, c, alpha);
                        }
                    }
                }
            }
        }
    }

    fn segment(&mut self, a: Point, b: Point, c: Rgba, width: f64, alpha: f64) {
        let hw = (width / 2.0).max(0.5);
        let x0 = self.clip_x(a.0.min(b.0) - hw - 1.0);
        let x1 = self.clip_x(a.0.max(b.0) + hw + 2.0);
        let y0 = self.clip_y(a.1.min(b.1) - hw - 1.0);
        let y1 = self.clip_y(a.1.max(b.1) + hw + 2.0);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len2 = dx * dx + dy * dy;
        for py in y0..y1 {
            for px in x0..x1 {
                let (cx, cy) = (px as f64 + 0.5, py as f64 + 0.5);
                let t = if len2 > 0.0 {
                    clamp(0.0, 1.0, ((cx - a.0) * dx + (cy - a.1) * dy) / len2)
                } else {
                    0.0
                };
                let (nx, ny) = (a.0 + t * dx - cx, a.1 + t * dy - cy);
                let d = (nx * nx + ny * ny).sqrt();
                let cov = clamp(0.0, 1.0, hw + 0.5 - d);
                self.blend(px, py, c, cov * alpha);
            }
        }
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, c: Rgba, width: f64, alpha: f64) {
        let hw = (width / 2.0).max(0.5);
        let ext = r + hw + 1.0;
        let (x0, x1) = (self.clip_x(cx - ext), self.clip_x(cx + ext + 1.0));
        let (y0, y1) = (self.clip_y(cy - ext), self.clip_y(cy + ext + 1.0));
        for py in y0..y1 {
            for px in x0..x1 {
                let (dx, dy) = (px as f64 + 0.5 - cx, py as f64 + 0.5 - cy);
                let d = ((dx * dx + dy * dy).sqrt() - r).abs();
                self.blend(px, py, c, clamp(0.0, 1.0, hw + 0.5 - d) * alpha);
            }
        }
    }

    fn polygon(&mut self, points: &[Point], c: Rgba, alpha: f64) {
        if points.len() < 3 {
            return;
        }
        let minx = points.iter().map(|p| p.0).fold(f64::MAX, f64::min);
        let maxx = points.iter().map(|p| p.0).fold(f64::MIN, f64::max);
        let miny = points.iter().map(|p| p.1).fold(f64::MAX, f64::min);
        let maxy = points.iter().map(|p| p.1).fold(f64::MIN, f64::max);
        let (x0, x1) = (self.clip_x(minx.floor()), self.clip_x(maxx.ceil() + 1.0));
        let (y0, y1) = (self.clip_y(miny.floor()), self.clip_y(maxy.ceil() + 1.0));
        for py in y0..y1 {
            for px in x0..x1 {
                if point_in_polygon((px as f64 + 0.5, py as f64 + 0.5), points) {
                    self.blend(px, py, c, alpha);
                }
            }
        }
    }
}

/// even-odd rule
fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if (a.1 > p.1) != (b.1 > p.1) && p.0 < (b.0 - a.0) * (p.1 - a.1) / (b.1 - a.1) + a.0 {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Draws text ops with a single outline font. Bold is a one pixel
/// double strike.
pub struct TextRenderer {
    font: Font,
}

impl TextRenderer {
    pub fn from_bytes(data: &[u8], name: &str) -> Result<Self, ExportError> {
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|reason| {
            ExportError::Font {
                path: name.to_string(),
                reason: reason.to_string(),
            }
        })?;
        Ok(Self { font })
    }

    pub fn from_file(path: &str) -> Result<Self, ExportError> {
        let data = fs::read(path)?;
        Self::from_bytes(&data, path)
    }

    /// renderer of the font compiled into the crate
    pub fn bundled() -> Option<&'static TextRenderer> {
        BUNDLED_TEXT.as_ref()
    }

    /// advance width of a string at the given pixel size
    pub fn measure(&self, text: &str, size: f64) -> f64 {
        text.chars()
            .map(|ch| self.font.metrics(ch, size as f32).advance_width as f64)
            .sum()
    }

    fn draw(&self, r: &mut Raster, t: &TextOp) {
        let width = self.measure(&t.text, t.style.size);
        let mut pen = match t.style.align {
            TextAlign::Left => t.x,
            TextAlign::Center => t.x - width / 2.0,
            TextAlign::Right => t.x - width,
        };
        let strikes: &[i64] = if t.style.bold { &[0, 1] } else { &[0] };
        for ch in t.text.chars() {
            let (m, bitmap) = self.font.rasterize(ch, t.style.size as f32);
            let gx = pen.round() as i64 + m.xmin as i64;
            let gy = t.y.round() as i64 - m.height as i64 - m.ymin as i64;
            for row in 0..m.height {
                for col in 0..m.width {
                    let cov = bitmap[row * m.width + col] as f64 / 255.0;
                    for dx in strikes {
                        r.blend(gx + col as i64 + dx, gy + row as i64, t.style.color, cov * t.alpha);
                    }
                }
            }
            pen += m.advance_width as f64;
        }
    }
}
