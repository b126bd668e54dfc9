// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Colors used by the card: css `hsl(h,s%,l%)` strings from the gradient
//! palette, converted to srgb for the rasterizer and the shader uniforms.
//!
//! ColorSpace range:
//!   sRGB r: 0.0 - 1.0 g: 0.0 - 1.0 b: 0.0 - 1.0
//!   HSLA h: 0.0 - 360.0 (degrees) s: 0.0 - 1.0 l: 0.0 - 1.0 a: 0.0 - 1.0

use crate::util::clamp;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

lazy_static! {
    static ref HSL_RE: Regex =
        Regex::new(r"hsl\((\d+),\s*(\d+)%?,\s*(\d+)%?\)").expect("static hsl regex");
}

/// fallback when a color string cannot be parsed: h=0 s=0 l=0.5 (mid gray)
pub const FALLBACK_HSL: ColorData = ColorData {
    v: [0.0, 0.0, 0.5, 1.0],
};

#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorData {
    pub v: [f64; 4],
}

impl fmt::Debug for ColorData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:8.3} {:8.3} {:8.3} {:8.3}",
            self.v[0], self.v[1], self.v[2], self.v[3]
        )
    }
}

#[inline(always)]
pub fn hsla_to_srgba(hsla: ColorData) -> ColorData {
    let (h, s, l, a) = (mod_positive(hsla.v[0], 360.0), hsla.v[1], hsla.v[2], hsla.v[3]);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    ColorData {
        v: [r + m, g + m, b + m, a],
    }
}

#[inline(always)]
pub fn srgba_to_hsla(srgba: ColorData) -> ColorData {
    let (r, g, b, a) = (srgba.v[0], srgba.v[1], srgba.v[2], srgba.v[3]);

    let max = r.max(g.max(b));
    let min = r.min(g.min(b));
    let delta = max - min;

    let l = (max + min) / 2.0;
    let s = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * l - 1.0).abs())
    };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    ColorData {
        v: [mod_positive(h, 360.0), s, l, a],
    }
}

pub fn mod_positive(x: f64, y: f64) -> f64 {
    (x % y + y) % y
}

/// Parse `hsl(261,85%,50%)` into hsla data. None if the string does not match.
pub fn parse_hsl(css: &str) -> Option<ColorData> {
    let caps = HSL_RE.captures(css)?;
    let num = |i: usize| -> Option<f64> { caps.get(i)?.as_str().parse::<f64>().ok() };
    Some(ColorData {
        v: [num(1)?, num(2)? / 100.0, num(3)? / 100.0, 1.0],
    })
}

/// An srgba color, components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hsla(hsla: ColorData) -> Self {
        let c = hsla_to_srgba(hsla);
        Self::new(c.v[0], c.v[1], c.v[2], c.v[3])
    }

    /// Parse a css hsl string, unparsable strings give mid gray.
    pub fn from_css(css: &str) -> Self {
        Self::from_hsla(parse_hsl(css).unwrap_or(FALLBACK_HSL))
    }

    /// Build from h in degrees, s and l in percent.
    pub fn hsl(h: f64, s: f64, l: f64) -> Self {
        Self::from_hsla(ColorData {
            v: [h, s / 100.0, l / 100.0, 1.0],
        })
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    pub fn to_hsla(self) -> ColorData {
        srgba_to_hsla(ColorData {
            v: [self.r, self.g, self.b, self.a],
        })
    }

    pub fn to_u8(self) -> [u8; 4] {
        let q = |x: f64| (255.0 * clamp(0.0, 1.0, x)).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn from_u8(p: [u8; 4]) -> Self {
        Self::new(
            p[0] as f64 / 255.0,
            p[1] as f64 / 255.0,
            p[2] as f64 / 255.0,
            p[3] as f64 / 255.0,
        )
    }

    /// 0xRRGGBB, used for the card edge material
    pub fn to_hex(self) -> u32 {
        let [r, g, b, _] = self.to_u8();
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }

    pub fn to_rgb_f32(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = clamp(0.0, 1.0, t);
        Rgba::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// source-over compositing of `src` (with extra opacity) on top of self
    pub fn blend(self, src: Rgba, opacity: f64) -> Rgba {
        let sa = clamp(0.0, 1.0, src.a * opacity);
        let da = self.a;
        let oa = sa + da * (1.0 - sa);
        if oa <= 0.0 {
            return Rgba::new(0.0, 0.0, 0.0, 0.0);
        }
        let ch = |s: f64, d: f64| (s * sa + d * da * (1.0 - sa)) / oa;
        Rgba::new(ch(src.r, self.r), ch(src.g, self.g), ch(src.b, self.b), oa)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Fraction {
    f: f64,
}

impl Fraction {
    pub fn from(s: f64) -> Self {
        Fraction {
            f: clamp(0.0, 1.0, s),
        }
    }

    pub fn value(self) -> f64 {
        self.f
    }
}

#[derive(Debug, Clone)]
struct ColorStop {
    color: Rgba,
    position: Fraction,
}

/// Linear gradient sampled in srgb, like a canvas linear gradient.
#[derive(Debug, Clone)]
pub struct ColorGradient {
    color_stops: Vec<ColorStop>,
}

impl ColorGradient {
    pub fn empty() -> Self {
        Self {
            color_stops: Vec::new(),
        }
    }

    pub fn two(from: Rgba, to: Rgba) -> Self {
        let mut g = Self::empty();
        g.add_stop(from, Fraction::from(0.0))
            .add_stop(to, Fraction::from(1.0));
        g
    }

    pub fn add_stop(&mut self, color: Rgba, position: Fraction) -> &mut Self {
        #![allow(clippy::float_cmp)]
        let same_position = self
            .color_stops
            .iter_mut()
            .find(|c| position.value() == c.position.value());

        match same_position {
            Some(color_stop) => color_stop.color = color,
            None => {
                let next_index = self
                    .color_stops
                    .iter()
                    .position(|c| position.value() < c.position.value());

                let index = next_index.unwrap_or(self.color_stops.len());
                self.color_stops.insert(index, ColorStop { color, position });
            }
        };

        self
    }

    pub fn sample(&self, position: Fraction) -> Option<Rgba> {
        if self.color_stops.len() < 2 {
            return None;
        }

        let left_stop = self
            .color_stops
            .iter()
            .rev()
            .find(|c| position.value() >= c.position.value());

        let right_stop = self
            .color_stops
            .iter()
            .find(|c| position.value() <= c.position.value());

        match (left_stop, right_stop) {
            (Some(l), Some(r)) => {
                let span = r.position.value() - l.position.value();
                match span.partial_cmp(&0.0) {
                    Some(Ordering::Greater) => {
                        let t = (position.value() - l.position.value()) / span;
                        Some(l.color.lerp(r.color, t))
                    }
                    _ => Some(l.color),
                }
            }
            (Some(l), None) => Some(l.color),
            (None, Some(r)) => Some(r.color),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn parse_palette_color() {
        let c = parse_hsl("hsl(261,85%,50%)").unwrap();
        assert!(close(c.v[0], 261.0));
        assert!(close(c.v[1], 0.85));
        assert!(close(c.v[2], 0.5));
        assert!(parse_hsl("#ff00ff").is_none());
    }

    #[test]
    fn unparsable_is_gray() {
        let c = Rgba::from_css("not a color");
        assert!(close(c.r, 0.5) && close(c.g, 0.5) && close(c.b, 0.5));
    }

    #[test]
    fn hsl_primaries() {
        let red = Rgba::hsl(0.0, 100.0, 50.0);
        assert_eq!(red.to_u8(), [255, 0, 0, 255]);
        let blue = Rgba::hsl(240.0, 100.0, 50.0);
        assert_eq!(blue.to_hex(), 0x0000ff);
    }

    #[test]
    fn hsl_round_trip_keeps_hue() {
        let c = Rgba::from_css("hsl(199,95%,60%)");
        let back = c.to_hsla();
        assert!((back.v[0] - 199.0).abs() < 0.5);
        assert!((back.v[2] - 0.6).abs() < 0.01);
    }

    #[test]
    fn gradient_midpoint() {
        let g = ColorGradient::two(Rgba::new(0.0, 0.0, 0.0, 1.0), Rgba::new(1.0, 1.0, 1.0, 1.0));
        let m = g.sample(Fraction::from(0.5)).unwrap();
        assert!(close(m.r, 0.5));
        assert!(ColorGradient::empty().sample(Fraction::from(0.5)).is_none());
    }

    #[test]
    fn blend_opacity() {
        let base = Rgba::new(0.0, 0.0, 0.0, 1.0);
        let out = base.blend(Rgba::new(1.0, 1.0, 1.0, 1.0), 0.25);
        assert!(close(out.r, 0.25));
        assert!(close(out.a, 1.0));
    }
}
