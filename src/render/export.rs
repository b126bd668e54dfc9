// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Card download: the 600x800 card canvas encoded as png.

use super::canvas::{Canvas, TextRenderer};
use super::card_face::{draw_card_back, draw_card_front, CARD_CANVAS_HEIGHT, CARD_CANVAS_WIDTH};
use crate::card::{CardData, Locale};
use crate::error::ExportError;
use crate::share::export_file_name;
use image::{ImageFormat, RgbaImage};
use log::info;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardSide {
    #[default]
    Front,
    Back,
}

pub fn card_canvas(card: &CardData, locale: Locale, side: CardSide) -> Canvas {
    let mut c = Canvas::new(CARD_CANVAS_WIDTH, CARD_CANVAS_HEIGHT);
    match side {
        CardSide::Front => draw_card_front(&mut c, card, locale),
        CardSide::Back => draw_card_back(&mut c, card, locale),
    }
    c
}

pub fn render_card_image(
    card: &CardData,
    locale: Locale,
    side: CardSide,
    text: Option<&TextRenderer>,
) -> RgbaImage {
    card_canvas(card, locale, side).rasterize(text)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// file name of a side, the front keeps the plain download name
pub fn side_file_name(card: &CardData, side: CardSide) -> String {
    let name = export_file_name(card);
    match side {
        CardSide::Front => name,
        CardSide::Back => name.replacen(".png", "-back.png", 1),
    }
}

/// Write the card png into `dir` and return its path. `None` uses the
/// bundled font; a card without its text is never written.
pub fn export_card(
    card: &CardData,
    locale: Locale,
    side: CardSide,
    dir: &Path,
    text: Option<&TextRenderer>,
) -> Result<PathBuf, ExportError> {
    let text = text
        .or_else(|| TextRenderer::bundled())
        .ok_or(ExportError::NoFont)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(side_file_name(card, side));
    let bytes = encode_png(&render_card_image(card, locale, side, Some(text)))?;
    fs::write(&path, bytes)?;
    info!("exported {:?}", path);
    Ok(path)
}
