// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! The 2d card, shown whenever a 3d context is not available. It carries the
//! same identity content as the 3d front face so nobody gets a lesser card.

use super::canvas::{Canvas, Paint, TextStyle};
use crate::card::{country_flag, CardData, Locale, Track};
use crate::color::Rgba;
use keyframe::{
    ease,
    functions::{EaseInOut, EaseOut},
};
use std::f64::consts::PI;

pub const FLAT_WIDTH: u32 = 240;
pub const FLAT_HEIGHT: u32 = 320;
pub const FLAT_FOOTER: &str = "404 SPECHACK · JUNE 19-28, 2026";

/// seconds the card takes to settle
pub const CARD_ENTRANCE: f64 = 0.8;
pub const ACTIONS_DELAY: f64 = 0.6;
pub const ACTIONS_ENTRANCE: f64 = 0.5;

/// Pose of the flat card and its action row while they appear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatEntrance {
    pub card_opacity: f64,
    pub card_scale: f64,
    /// degrees around the vertical axis
    pub card_turn: f64,
    pub actions_opacity: f64,
    /// px below the resting position
    pub actions_offset: f64,
}

impl FlatEntrance {
    /// Pose `t` seconds after the flat card was mounted.
    pub fn at(t: f64) -> Self {
        let pc = t / CARD_ENTRANCE;
        let pa = (t - ACTIONS_DELAY) / ACTIONS_ENTRANCE;
        Self {
            card_opacity: ease(EaseOut, 0.0, 1.0, pc),
            card_scale: ease(EaseOut, 0.8, 1.0, pc),
            card_turn: ease(EaseOut, -15.0, 0.0, pc),
            actions_opacity: ease(EaseInOut, 0.0, 1.0, pa),
            actions_offset: ease(EaseInOut, 20.0, 0.0, pa),
        }
    }

    pub fn is_settled(t: f64) -> bool {
        t >= CARD_ENTRANCE.max(ACTIONS_DELAY + ACTIONS_ENTRANCE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatCard {
    card: CardData,
    locale: Locale,
}

impl FlatCard {
    pub fn new(card: &CardData, locale: Locale) -> Self {
        Self {
            card: card.clone(),
            locale,
        }
    }

    pub fn card(&self) -> &CardData {
        &self.card
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn track_label(&self) -> &'static str {
        match self.card.track {
            Track::Virtual => "VIRTUAL 🌐",
            Track::Hub => "HUB 📍",
        }
    }

    pub fn city_line(&self) -> String {
        format!("{} {}", self.card.display_city(), country_flag(&self.card.city))
    }

    /// Text lines top to bottom.
    pub fn lines(&self) -> Vec<String> {
        vec![
            "SPECHACK".to_string(),
            self.card.agent_number.clone(),
            self.card.name.clone(),
            self.city_line(),
            self.track_label().to_string(),
            self.card.builder_class.name.clone(),
            self.card.builder_class.desc.get(self.locale).to_string(),
            FLAT_FOOTER.to_string(),
        ]
    }

    pub fn draw(&self, c: &mut Canvas) {
        let (w, h) = (FLAT_WIDTH as f64, FLAT_HEIGHT as f64);
        let from = Rgba::from_css(&self.card.gradient.from);
        let to = Rgba::from_css(&self.card.gradient.to);
        let rad = self.card.gradient.angle as f64 * PI / 180.0;

        c.fill_rect(0.0, 0.0, w, h, Paint::Solid(Rgba::hsl(240.0, 10.0, 7.0)));
        // css "#rrggbb15" suffix, about 8% alpha
        c.set_alpha(0x15 as f64 / 255.0);
        c.fill_rect(
            0.0,
            0.0,
            w,
            h,
            Paint::Linear {
                x0: w / 2.0 - rad.sin() * w / 2.0,
                y0: h / 2.0 + rad.cos() * h / 2.0,
                x1: w / 2.0 + rad.sin() * w / 2.0,
                y1: h / 2.0 - rad.cos() * h / 2.0,
                from,
                to,
            },
        );
        c.set_alpha(1.0);
        c.fill_rect(
            20.0,
            16.0,
            w - 40.0,
            2.0,
            Paint::Linear {
                x0: 20.0,
                y0: 0.0,
                x1: w - 20.0,
                y1: 0.0,
                from,
                to,
            },
        );

        let white = Rgba::new(1.0, 1.0, 1.0, 1.0);
        let track_color = match self.card.track {
            Track::Virtual => Rgba::hsl(199.0, 95.0, 60.0),
            Track::Hub => Rgba::hsl(142.0, 71.0, 45.0),
        };
        let lines = self.lines();
        let styles = [
            (44.0, TextStyle::new(10.0, white.with_alpha(0.4)).bold()),
            (70.0, TextStyle::new(18.0, from).bold()),
            (98.0, TextStyle::new(20.0, white).bold()),
            (122.0, TextStyle::new(12.0, white.with_alpha(0.6))),
            (146.0, TextStyle::new(10.0, track_color).bold()),
            (200.0, TextStyle::new(14.0, to).bold()),
            (220.0, TextStyle::new(10.0, white.with_alpha(0.5))),
            (h - 16.0, TextStyle::new(8.0, white.with_alpha(0.25))),
        ];
        for (text, (y, style)) in lines.iter().zip(styles) {
            c.fill_text(text, 20.0, y, style);
        }
        c.fill_rect(20.0, 172.0, w - 40.0, 1.0, Paint::Solid(white.with_alpha(0.1)));
    }

    pub fn to_canvas(&self) -> Canvas {
        let mut c = Canvas::new(FLAT_WIDTH, FLAT_HEIGHT);
        self.draw(&mut c);
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::generate_deterministic_card;

    #[test]
    fn flat_lines() {
        let card = generate_deterministic_card("luz");
        let flat = FlatCard::new(&card, Locale::En);
        let lines = flat.lines();
        assert_eq!(lines[1], card.agent_number);
        assert_eq!(lines[3], "Virtual 🌐");
        assert_eq!(lines[4], "VIRTUAL 🌐");
        let canvas = flat.to_canvas();
        assert_eq!(canvas.texts().count(), lines.len());
    }

    #[test]
    fn entrance_eases_in_card_then_actions() {
        let start = FlatEntrance::at(0.0);
        assert_eq!((start.card_opacity, start.card_scale, start.card_turn), (0.0, 0.8, -15.0));
        assert_eq!((start.actions_opacity, start.actions_offset), (0.0, 20.0));

        // ease out: past the linear midpoint at half time
        let mid = FlatEntrance::at(CARD_ENTRANCE / 2.0);
        assert!(mid.card_opacity > 0.5 && mid.card_opacity < 1.0);
        assert_eq!(mid.actions_opacity, 0.0);

        let end = FlatEntrance::at(5.0);
        assert!((end.card_opacity - 1.0).abs() < 1e-9);
        assert!((end.card_scale - 1.0).abs() < 1e-9);
        assert!(end.card_turn.abs() < 1e-9);
        assert!((end.actions_opacity - 1.0).abs() < 1e-9);
        assert!(end.actions_offset.abs() < 1e-9);
        assert!(!FlatEntrance::is_settled(1.0));
        assert!(FlatEntrance::is_settled(1.1));
    }
}
