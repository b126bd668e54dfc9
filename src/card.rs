// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Card defines CardData, the canonical visual identity of a participant,
//! and the deterministic generator that derives one from a display name.
//!
//! A card is either
//! - deterministic: a pure function of the (capitalized) name, used for challenge
//!   previews before anyone registered, or
//! - registered: agent number assigned by the store, builder class picked at random
//!   at registration time, gradient still derived from the name.
//!
//! Both shapes are identical once built, the reveal engine never asks where a
//! card came from.

use serde::{Deserialize, Serialize};
use std::fmt;

mod class;
pub use class::*;

mod generator;
pub use generator::*;

/// city sentinel of the virtual track
pub const VIRTUAL_CITY: &str = "Virtual";

/// Locales the site is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "es" => Some(Locale::Es),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Participation track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    #[default]
    Virtual,
    Hub,
}

impl Track {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "virtual" => Some(Track::Virtual),
            "hub" => Some(Track::Hub),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Virtual => "virtual",
            Track::Hub => "hub",
        }
    }

    /// badge printed on the card face
    pub fn badge(&self) -> &'static str {
        match self {
            Track::Virtual => "VIRTUAL PARTICIPANT",
            Track::Hub => "HUB PARTICIPANT",
        }
    }
}

/// Two palette colors and an angle in degrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gradient {
    pub from: String,
    pub to: String,
    pub angle: u32,
}

impl Gradient {
    /// json form stored alongside a registration
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

/// The canonical visual identity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    pub agent_number: String,
    pub name: String,
    pub city: String,
    pub track: Track,
    pub builder_class: BuilderClass,
    pub gradient: Gradient,
}

impl CardData {
    /// agent number without the `SPEC-` prefix, None for malformed numbers
    pub fn agent_serial(&self) -> Option<u32> {
        parse_agent_number(&self.agent_number)
    }

    pub fn display_city(&self) -> &str {
        if self.city.trim().is_empty() {
            VIRTUAL_CITY
        } else {
            &self.city
        }
    }
}
