// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Front and back layouts of a credential card, drawn in a 600x800 card
//! coordinate system. Everything decorative that looks random (redaction
//! bar widths, the qr placeholder, the circuit overlay) is seeded from the
//! name hash, so every viewer of a card sees the same picture.

use super::canvas::{Canvas, Paint, Point, TextAlign, TextStyle};
use crate::card::{country_flag, hash_str, truncate_name, CardData, Locale, NAME_MAX_COLUMNS, STAT_AXES};
use crate::color::Rgba;
use crate::util::RandLCG;
use std::f64::consts::PI;

pub const CARD_CANVAS_WIDTH: u32 = 600;
pub const CARD_CANVAS_HEIGHT: u32 = 800;

const W: f64 = CARD_CANVAS_WIDTH as f64;
const H: f64 = CARD_CANVAS_HEIGHT as f64;

pub const FOOTER_TEXT: &str = "SPECHACK 2026";
pub const WATERMARK_TEXT: &str = "SPECHACK 2026 // 404 TECH FOUND";

pub const CIRCUIT_GRID: f64 = 60.0;
pub const CIRCUIT_ALPHA: f64 = 0.12;

const REDACT_Y: [f64; 4] = [110.0, 140.0, 170.0, 200.0];
const REDACT_WIDTHS: [f64; 4] = [320.0, 250.0, 380.0, 200.0];

pub const QR_SIZE: f64 = 80.0;
pub const QR_CELLS: usize = 10;
const QR_Y: f64 = 620.0;

pub const RADAR_CENTER_Y: f64 = 420.0;
pub const RADAR_RADIUS: f64 = 120.0;

fn bg() -> Rgba {
    Rgba::hsl(240.0, 10.0, 7.0)
}

fn gray(l: f64) -> Rgba {
    Rgba::hsl(240.0, 5.0, l)
}

/// dark background plus the card gradient at the given opacity
fn draw_background(c: &mut Canvas, card: &CardData, x1: f64, y1: f64, opacity: f64) {
    c.fill_rect(0.0, 0.0, W, H, Paint::Solid(bg()));
    c.set_alpha(opacity);
    c.fill_rect(
        0.0,
        0.0,
        W,
        H,
        Paint::Linear {
            x0: 0.0,
            y0: 0.0,
            x1,
            y1,
            from: Rgba::from_css(&card.gradient.from),
            to: Rgba::from_css(&card.gradient.to),
        },
    );
    c.set_alpha(1.0);
}

/// Front face: logo, agent number, name, city, track badge and builder class.
pub fn draw_card_front(c: &mut Canvas, card: &CardData, locale: Locale) {
    let rad = card.gradient.angle as f64 * PI / 180.0;
    draw_background(c, card, W * rad.cos(), H * rad.sin(), 0.15);

    c.fill_text("404 TF", 40.0, 60.0, TextStyle::new(28.0, gray(90.0)).bold());
    c.fill_text(
        &format!("#{}", card.agent_number),
        W - 40.0,
        60.0,
        TextStyle::new(20.0, gray(64.0)).align(TextAlign::Right),
    );
    c.fill_text("AGENT", 40.0, 120.0, TextStyle::new(14.0, gray(64.0)));
    c.fill_text(
        &truncate_name(&card.name, NAME_MAX_COLUMNS).to_uppercase(),
        40.0,
        180.0,
        TextStyle::new(40.0, gray(90.0)).bold(),
    );
    c.fill_text(
        &format!("{} {}", country_flag(&card.city), card.city),
        40.0,
        220.0,
        TextStyle::new(20.0, gray(60.0)),
    );
    c.fill_text(card.track.badge(), 40.0, 260.0, TextStyle::new(14.0, gray(64.0)));
    c.fill_text("BUILDER CLASS", 40.0, 340.0, TextStyle::new(14.0, gray(64.0)));
    c.fill_text(
        &card.builder_class.name.to_uppercase(),
        40.0,
        390.0,
        TextStyle::new(32.0, gray(90.0)).bold(),
    );
    c.fill_text(
        card.builder_class.desc.get(locale),
        40.0,
        430.0,
        TextStyle::new(18.0, gray(60.0)),
    );
    c.fill_text(FOOTER_TEXT, 40.0, H - 40.0, TextStyle::new(16.0, gray(56.0)));
}

/// Widths of the four redaction bars, 320/250/380/200 jittered by ±30.
pub fn redaction_widths(name: &str) -> [f64; 4] {
    let mut out = [0.0; 4];
    for (i, w) in out.iter_mut().enumerate() {
        let seed = hash_str(&format!("{}{}", name, i));
        *w = REDACT_WIDTHS[i] + (seed % 60) as f64 - 30.0;
    }
    out
}

/// Filled cells of the 10x10 qr placeholder, row major.
pub fn qr_cells(name: &str) -> [[bool; QR_CELLS]; QR_CELLS] {
    let mut lcg = RandLCG::new(hash_str(&format!("{}qr", name)));
    let mut cells = [[false; QR_CELLS]; QR_CELLS];
    for row in cells.iter_mut() {
        for cell in row.iter_mut() {
            *cell = lcg.rand() % 3 != 0;
        }
    }
    cells
}

fn radar_angle(i: usize, n: usize) -> f64 {
    i as f64 * (PI * 2.0 / n as f64) - PI / 2.0
}

fn radar_point(cx: f64, cy: f64, r: f64, i: usize, n: usize) -> Point {
    let a = radar_angle(i, n);
    (cx + a.cos() * r, cy + a.sin() * r)
}

/// Hexagonal radar chart: three grid rings, axes, the stat polygon and labels.
pub fn draw_radar_chart(c: &mut Canvas, cx: f64, cy: f64, radius: f64, stats: &[f64], color: Rgba) {
    let n = stats.len();
    if n == 0 {
        return;
    }
    let grid = gray(25.0);
    for ring in 1..=3 {
        let r = radius * ring as f64 / 3.0;
        let pts: Vec<Point> = (0..n).map(|i| radar_point(cx, cy, r, i, n)).collect();
        c.stroke_path(&pts, true, grid, 1.0);
    }
    for i in 0..n {
        c.line((cx, cy), radar_point(cx, cy, radius, i, n), grid, 1.0);
    }

    let poly: Vec<Point> = stats
        .iter()
        .enumerate()
        .map(|(i, s)| radar_point(cx, cy, radius * s, i, n))
        .collect();
    c.set_alpha(0.25);
    c.fill_polygon(&poly, color);
    c.set_alpha(0.8);
    c.stroke_path(&poly, true, color, 2.0);
    c.set_alpha(1.0);

    let label = TextStyle::new(13.0, gray(64.0)).align(TextAlign::Center);
    for (i, axis) in STAT_AXES.iter().enumerate().take(n) {
        let (x, y) = radar_point(cx, cy, radius + 20.0, i, n);
        c.fill_text(axis, x, y + 4.0, label);
    }
}

/// Back face: classified header, redactions, dossier line, radar chart of
/// the class stats, qr placeholder and watermark.
pub fn draw_card_back(c: &mut Canvas, card: &CardData, _locale: Locale) {
    draw_background(c, card, W, H, 0.08);

    c.fill_text(
        "CLASSIFIED",
        W / 2.0,
        60.0,
        TextStyle::new(36.0, Rgba::hsl(0.0, 70.0, 50.0))
            .bold()
            .align(TextAlign::Center),
    );
    c.line((40.0, 75.0), (W - 40.0, 75.0), Rgba::hsl(0.0, 70.0, 40.0), 2.0);

    for (y, w) in REDACT_Y.iter().zip(redaction_widths(&card.name)) {
        c.fill_rect(40.0, y - 14.0, w, 18.0, Paint::Solid(gray(18.0)));
    }

    c.fill_text(
        &format!("DOSSIER: {}", card.agent_number),
        40.0,
        260.0,
        TextStyle::new(14.0, gray(56.0)),
    );

    draw_radar_chart(
        c,
        W / 2.0,
        RADAR_CENTER_Y,
        RADAR_RADIUS,
        &card.builder_class.stats(),
        Rgba::from_css(&card.gradient.from),
    );

    c.fill_text(
        &card.builder_class.name.to_uppercase(),
        W / 2.0,
        580.0,
        TextStyle::new(20.0, gray(70.0)).bold().align(TextAlign::Center),
    );

    let cell = QR_SIZE / QR_CELLS as f64;
    let qx = W / 2.0 - QR_SIZE / 2.0;
    for (row, cols) in qr_cells(&card.name).iter().enumerate() {
        for (col, filled) in cols.iter().enumerate() {
            if *filled {
                c.fill_rect(
                    qx + col as f64 * cell,
                    QR_Y + row as f64 * cell,
                    cell - 1.0,
                    cell - 1.0,
                    Paint::Solid(gray(30.0)),
                );
            }
        }
    }

    c.fill_text(
        WATERMARK_TEXT,
        W / 2.0,
        H - 30.0,
        TextStyle::new(14.0, gray(25.0)).align(TextAlign::Center),
    );
}

#[derive(Debug, Clone, PartialEq)]
pub enum CircuitShape {
    Line(Point, Point),
    Elbow(Point, Point, Point),
    Node(Point),
}

/// Shapes of the circuit overlay for a w x h surface. One shape per grid
/// cell at most, about 30% of the cells are used.
pub fn circuit_shapes(w: f64, h: f64, seed: u32) -> Vec<CircuitShape> {
    let mut lcg = RandLCG::new(seed);
    let mut shapes = vec![];
    let mut x = 0.0;
    while x < w {
        let mut y = 0.0;
        while y < h {
            if lcg.unit() <= 0.3 {
                let kind = lcg.unit();
                let shape = if kind < 0.4 {
                    CircuitShape::Line((x, y), (x + CIRCUIT_GRID * (0.5 + lcg.unit() * 0.5), y))
                } else if kind < 0.7 {
                    let hx = x + CIRCUIT_GRID * 0.5;
                    CircuitShape::Elbow((x, y), (hx, y), (hx, y + CIRCUIT_GRID * 0.5))
                } else {
                    CircuitShape::Node((x, y))
                };
                shapes.push(shape);
            }
            y += CIRCUIT_GRID;
        }
        x += CIRCUIT_GRID;
    }
    shapes
}

/// Faint circuit board overlay, drawn in surface coordinates.
pub fn draw_circuit_pattern(c: &mut Canvas, w: f64, h: f64, seed: u32) {
    let color = Rgba::hsl(199.0, 95.0, 60.0);
    c.set_alpha(CIRCUIT_ALPHA);
    for s in circuit_shapes(w, h, seed) {
        match s {
            CircuitShape::Line(a, b) => c.line(a, b, color, 1.0),
            CircuitShape::Elbow(a, b, d) => c.stroke_path(&[a, b, d], false, color, 1.0),
            CircuitShape::Node((x, y)) => c.stroke_circle(x, y, 3.0, color, 1.0),
        }
    }
    c.set_alpha(1.0);
}
