// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! # Render module
//!
//! Card bitmaps are produced on the cpu, whatever shows them afterwards.
//!
//! ## Submodules
//! - `canvas`: display list drawing context and rasterizer
//! - `card_face`: front and back layouts in card coordinates
//! - `texture`: 2x face textures for the 3d card, with the signal-lock glitch
//! - `flat`: the 2d fallback card
//! - `export`: png download

pub mod canvas;
pub mod card_face;
pub mod export;
pub mod flat;
pub mod texture;

pub use canvas::{Canvas, DrawOp, Paint, TextAlign, TextOp, TextRenderer, TextStyle};
pub use card_face::{CARD_CANVAS_HEIGHT, CARD_CANVAS_WIDTH};
pub use export::{export_card, render_card_image, CardSide};
pub use flat::{FlatCard, FlatEntrance};
pub use texture::{CardBackTexture, CardFaceTexture, GLITCH_FPS, TEXTURE_HEIGHT, TEXTURE_WIDTH};
