// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! SpecHack is the engine behind the hackathon agent credential cards.
//! It turns a display name (or a registration) into a fully specified visual
//! identity, rasterizes that identity onto an offscreen card bitmap and drives
//! the 3d reveal of the card: a phased animation, a rigid body the user can
//! drag and flick, gyroscope tilt and an iridescent scan-line shader.
//!
//! Data only flows one way:
//!
//! name / registration → card generator → CardData → reveal engine (3d or 2d)
//! → share / download actions
//!
//! When no 3d context can be created the very same CardData is shown by the
//! flat 2d renderer, which is a first class path rather than an error page.
//!
//! Modules card, color, util and share are pure and have no side effects.
//! registration, storage and analytics are the collaborator boundaries
//! (persistence keyed by email, the last generated card, event capture).

/// framerate of the reveal loop, the phase clock advances once per frame
pub const REVEAL_FRAME: u32 = 60;

/// card generator: hash, gradients, builder classes, agent numbers
pub mod card;

/// hsl parsing, srgb conversion and linear color gradients
pub mod color;

/// crate wide configuration loaded from spechack.toml
pub mod config;

/// decorative scene effects: particle stream, holo ring, radar ping
pub mod effect;

/// error enums of every collaborator boundary
pub mod error;

/// input events delivered to the reveal scene
pub mod event;

/// log
pub mod log;

/// drag / flick interaction and gyroscope tilt
pub mod drag;
pub mod gyro;

/// rigid body used by the credential card
pub mod physics;

/// Render module.
/// canvas: a small 2d drawing context recording draw ops, rasterized onto an rgba bitmap.
/// card_face: front and back face layouts of a credential card.
/// texture: offscreen face textures with the signal-lock glitch path.
/// flat: the 2d fallback view.
/// export: png download.
pub mod render;

/// reveal phase state machine
pub mod reveal;

/// 3d scene composition, rendering backends and the 2d fallback switch
pub mod scene;

/// iridescent reveal material: wgsl source, typed uniforms, cpu reference shading
pub mod shader;

/// challenge links, social share urls and challenge page resolution
pub mod share;

/// registration and ambassador submissions against a persistence store
pub mod registration;

/// local persistence of the last generated card
pub mod storage;

/// analytics client injected into the registration flow
pub mod analytics;

/// common tools: rng, paths
pub mod util;
