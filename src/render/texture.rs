// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Offscreen face textures of the 3d card.
//!
//! The front texture is the card layout drawn at twice the card canvas size
//! with the circuit overlay on top. While the reveal is in signal-lock it
//! shows a "searching" agent number that changes `GLITCH_FPS` times per
//! second. The CardData itself is never touched, the glitch only lives in
//! the displayed display list.

use super::canvas::{Canvas, Paint, TextAlign, TextRenderer, TextStyle};
use super::card_face::{
    draw_card_back, draw_card_front, draw_circuit_pattern, CARD_CANVAS_WIDTH,
};
use crate::card::{format_agent_number, hash_str, CardData, Locale};
use crate::color::Rgba;
use crate::reveal::RevealPhase;
use crate::util::Rand;
use image::RgbaImage;
use log::debug;

pub const TEXTURE_WIDTH: u32 = 1200;
pub const TEXTURE_HEIGHT: u32 = 1600;
pub const GLITCH_FPS: f64 = 10.0;

const TW: f64 = TEXTURE_WIDTH as f64;
const TH: f64 = TEXTURE_HEIGHT as f64;

fn texture_scale() -> f64 {
    TW / CARD_CANVAS_WIDTH as f64
}

pub struct CardFaceTexture {
    card: CardData,
    locale: Locale,
    base: Canvas,
    shown: Canvas,
    glitch: Option<String>,
    last_glitch: f64,
    needs_update: bool,
    rng: Rand,
}

impl CardFaceTexture {
    pub fn new(card: &CardData, locale: Locale) -> Self {
        Self::with_rng(card, locale, Rand::from_now())
    }

    pub fn with_rng(card: &CardData, locale: Locale, rng: Rand) -> Self {
        let base = Self::compose(card, locale);
        Self {
            card: card.clone(),
            locale,
            shown: base.clone(),
            base,
            glitch: None,
            last_glitch: 0.0,
            needs_update: true,
            rng,
        }
    }

    fn compose(card: &CardData, locale: Locale) -> Canvas {
        let mut c = Canvas::new(TEXTURE_WIDTH, TEXTURE_HEIGHT);
        c.set_scale(texture_scale());
        draw_card_front(&mut c, card, locale);
        c.set_scale(1.0);
        draw_circuit_pattern(&mut c, TW, TH, hash_str(&card.name));
        c
    }

    /// Per frame update with the scene clock in seconds. Returns true when
    /// the displayed texture changed.
    pub fn update(&mut self, phase: RevealPhase, now: f64) -> bool {
        if phase != RevealPhase::SignalLock {
            if self.glitch.take().is_some() {
                self.shown = self.base.clone();
                self.needs_update = true;
                debug!("face texture restored for {}", self.card.agent_number);
                return true;
            }
            return false;
        }
        if now - self.last_glitch < 1.0 / GLITCH_FPS {
            return false;
        }
        self.last_glitch = now;

        let fake = format_agent_number(self.rng.index(10000) as u32);
        let mut c = self.base.clone();
        c.fill_rect(
            TW - 280.0,
            10.0,
            260.0,
            80.0,
            Paint::Solid(Rgba::hsl(240.0, 10.0, 7.0)),
        );
        c.fill_text(
            &format!("#{}", fake),
            TW - 80.0,
            120.0,
            TextStyle::new(40.0, Rgba::hsl(240.0, 5.0, 50.0)).align(TextAlign::Right),
        );
        self.shown = c;
        self.glitch = Some(fake);
        self.needs_update = true;
        true
    }

    pub fn card(&self) -> &CardData {
        &self.card
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// the display list currently shown on the card
    pub fn canvas(&self) -> &Canvas {
        &self.shown
    }

    /// the true face, without glitch
    pub fn base(&self) -> &Canvas {
        &self.base
    }

    pub fn glitch_number(&self) -> Option<&str> {
        self.glitch.as_deref()
    }

    pub fn is_glitched(&self) -> bool {
        self.glitch.is_some()
    }

    /// gpu upload flag, cleared on read
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    pub fn rasterize(&self, text: Option<&TextRenderer>) -> RgbaImage {
        self.shown.rasterize(text)
    }
}

pub struct CardBackTexture {
    canvas: Canvas,
}

impl CardBackTexture {
    pub fn new(card: &CardData, locale: Locale) -> Self {
        let mut canvas = Canvas::new(TEXTURE_WIDTH, TEXTURE_HEIGHT);
        canvas.set_scale(texture_scale());
        draw_card_back(&mut canvas, card, locale);
        Self { canvas }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn rasterize(&self, text: Option<&TextRenderer>) -> RgbaImage {
        self.canvas.rasterize(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::generate_deterministic_card;

    fn face() -> (CardData, CardFaceTexture) {
        let card = generate_deterministic_card("rosa diaz");
        let mut rng = Rand::new();
        rng.srand(11);
        let tex = CardFaceTexture::with_rng(&card, Locale::Es, rng);
        (card, tex)
    }

    #[test]
    fn face_is_twice_the_card_layout() {
        let (card, tex) = face();
        let t = tex.canvas().find_text(&format!("#{}", card.agent_number)).unwrap();
        assert_eq!((t.x, t.y), (TW - 80.0, 120.0));
        assert_eq!(t.style.size, 40.0);
    }

    #[test]
    fn glitch_rate_limited_to_ten_fps() {
        let (_, mut tex) = face();
        assert!(!tex.update(RevealPhase::SignalLock, 0.05));
        assert!(tex.update(RevealPhase::SignalLock, 0.1));
        assert!(tex.is_glitched());
        assert!(!tex.update(RevealPhase::SignalLock, 0.15));
        assert!(tex.update(RevealPhase::SignalLock, 0.21));
        let n = tex.glitch_number().unwrap().to_string();
        assert!(n.starts_with("SPEC-") && n.len() == 9);
        assert!(tex.canvas().find_text(&format!("#{}", n)).is_some());
    }

    #[test]
    fn leaving_signal_lock_restores_true_face() {
        let (card, mut tex) = face();
        let snapshot = card.clone();
        for i in 1..15 {
            tex.update(RevealPhase::SignalLock, i as f64 * 0.1);
        }
        assert_ne!(tex.canvas(), tex.base());
        assert!(tex.update(RevealPhase::Materialize, 1.5));
        assert_eq!(tex.canvas(), tex.base());
        assert!(!tex.is_glitched());
        assert_eq!(tex.card(), &snapshot);
        // no more glitching afterwards
        assert!(!tex.update(RevealPhase::Interactive, 5.0));
    }

    #[test]
    fn needs_update_is_one_shot() {
        let (_, mut tex) = face();
        assert!(tex.take_needs_update());
        assert!(!tex.take_needs_update());
        tex.update(RevealPhase::SignalLock, 0.2);
        assert!(tex.take_needs_update());
    }

    #[test]
    fn back_texture_scaled() {
        let card = generate_deterministic_card("rosa diaz");
        let back = CardBackTexture::new(&card, Locale::En);
        let t = back.canvas().find_text("CLASSIFIED").unwrap();
        assert_eq!((t.x, t.y), (TW / 2.0, 120.0));
    }
}
