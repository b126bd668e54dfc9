// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Challenge links and social share urls.
//!
//! A challenge link points at `/{locale}/c/{slug}` where slug is the first
//! word of the sharer's name. Opening it shows a preview card generated
//! deterministically from that slug, next to the visitor's own stored card
//! if there is one.

use crate::card::{generate_deterministic_card, CardData, Locale};
use crate::storage::CardStorage;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

lazy_static! {
    static ref LETTER: Regex = Regex::new(r"\p{L}").expect("static letter regex");
}

pub const TWEET_TEMPLATE_EN: &str =
    "I just got my SpecHack 2026 credential: %agent% · %cls%. Think you can out-build me? %link%";
pub const TWEET_TEMPLATE_ES: &str =
    "Ya tengo mi credencial de SpecHack 2026: %agent% · %cls%. ¿Te atreves a superarme? %link%";

/// Percent encoding with the same unreserved set as ecmascript
/// encodeURIComponent: `A-Z a-z 0-9 - _ . ! ~ * ' ( )` stay as they are.
pub fn encode_uri_component(s: &str) -> String {
    urlencoding::encode(s)
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
}

pub fn build_challenge_link(name: &str, origin: &str, locale: Locale) -> String {
    let first = name.split(' ').next().unwrap_or_default();
    format!(
        "{}/{}/c/{}",
        origin.trim_end_matches('/'),
        locale,
        encode_uri_component(&first.to_lowercase())
    )
}

pub fn build_tweet_url(text: &str) -> String {
    format!(
        "https://twitter.com/intent/tweet?text={}",
        encode_uri_component(text)
    )
}

pub fn build_whatsapp_url(text: &str) -> String {
    format!("https://wa.me/?text={}", encode_uri_component(text))
}

pub fn build_linkedin_url(url: &str) -> String {
    format!(
        "https://www.linkedin.com/sharing/share-offsite/?url={}",
        encode_uri_component(url)
    )
}

pub fn tweet_template(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => TWEET_TEMPLATE_ES,
        Locale::En => TWEET_TEMPLATE_EN,
    }
}

/// Fill a tweet template. Each placeholder is replaced once, at its first
/// occurrence.
pub fn tweet_text(template: &str, card: &CardData, link: &str) -> String {
    template
        .replacen("%agent%", &card.agent_number, 1)
        .replacen("%cls%", &card.builder_class.name, 1)
        .replacen("%link%", link, 1)
}

/// WhatsApp invite. The site sends the english invite in both locales.
pub fn whatsapp_text(_locale: Locale, link: &str) -> String {
    format!("Join me at SpecHack 2026! {}", link)
}

/// download name of the card png
pub fn export_file_name(card: &CardData) -> String {
    format!("spechack-agent-{}.png", card.agent_number)
}

/// Share and download actions offered under a revealed card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardActions {
    card: CardData,
    locale: Locale,
    origin: String,
}

impl CardActions {
    pub fn new(card: &CardData, locale: Locale, origin: &str) -> Self {
        Self {
            card: card.clone(),
            locale,
            origin: origin.to_string(),
        }
    }

    /// also what "copy link" puts on the clipboard
    pub fn challenge_link(&self) -> String {
        build_challenge_link(&self.card.name, &self.origin, self.locale)
    }

    pub fn tweet_url(&self) -> String {
        self.tweet_url_with(tweet_template(self.locale))
    }

    pub fn tweet_url_with(&self, template: &str) -> String {
        build_tweet_url(&tweet_text(template, &self.card, &self.challenge_link()))
    }

    pub fn whatsapp_url(&self) -> String {
        build_whatsapp_url(&whatsapp_text(self.locale, &self.challenge_link()))
    }

    pub fn linkedin_url(&self) -> String {
        build_linkedin_url(&self.challenge_link())
    }

    pub fn download_name(&self) -> String {
        export_file_name(&self.card)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChallengePage {
    /// decoded name with the first letter uppercased, used for titles
    pub display_name: String,
    /// preview card of the challenger
    pub challenger: CardData,
    /// visitor's own persisted card, if any
    pub returning: Option<CardData>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChallengeResolution {
    Redirect(String),
    Preview(ChallengePage),
}

fn upper_first(s: &str) -> String {
    let mut cs = s.chars();
    match cs.next() {
        Some(c) => c.to_uppercase().chain(cs).collect(),
        None => String::new(),
    }
}

/// Resolve the raw (still percent encoded) path segment of a challenge page.
/// Names without any letter, and segments that do not decode, send the
/// visitor back to the locale home.
pub fn resolve_challenge(
    locale: Locale,
    raw_segment: &str,
    storage: &CardStorage,
) -> ChallengeResolution {
    let decoded = match urlencoding::decode(raw_segment) {
        Ok(d) => d.into_owned(),
        Err(e) => {
            debug!("challenge segment {:?} not decodable: {}", raw_segment, e);
            return ChallengeResolution::Redirect(format!("/{}", locale));
        }
    };
    if !LETTER.is_match(decoded.trim()) {
        info!("challenge {:?} has no letter, redirecting", decoded);
        return ChallengeResolution::Redirect(format!("/{}", locale));
    }
    ChallengeResolution::Preview(ChallengePage {
        display_name: upper_first(&decoded),
        challenger: generate_deterministic_card(&decoded),
        returning: storage.load(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{BuilderClass, Gradient, Track};
    use tempfile::tempdir;

    fn card() -> CardData {
        CardData {
            agent_number: "SPEC-0042".into(),
            name: "María José".into(),
            city: "Bogotá".into(),
            track: Track::Hub,
            builder_class: BuilderClass {
                name: "The Architect".into(),
                desc: Default::default(),
            },
            gradient: Gradient {
                from: "hsl(250,80%,60%)".into(),
                to: "hsl(330,85%,55%)".into(),
                angle: 135,
            },
        }
    }

    #[test]
    fn challenge_link_uses_first_word() {
        assert_eq!(
            build_challenge_link("María José", "https://spechack.404tf.com", Locale::Es),
            "https://spechack.404tf.com/es/c/mar%C3%ADa"
        );
        assert_eq!(
            build_challenge_link("O'Neil Smith", "http://x/", Locale::En),
            "http://x/en/c/o'neil"
        );
    }

    #[test]
    fn share_urls_are_encoded() {
        assert_eq!(
            build_whatsapp_url(&whatsapp_text(Locale::Es, "http://x/es/c/a")),
            "https://wa.me/?text=Join%20me%20at%20SpecHack%202026!%20http%3A%2F%2Fx%2Fes%2Fc%2Fa"
        );
        assert_eq!(
            build_linkedin_url("http://x/en/c/a"),
            "https://www.linkedin.com/sharing/share-offsite/?url=http%3A%2F%2Fx%2Fen%2Fc%2Fa"
        );
        assert!(build_tweet_url("a&b").ends_with("?text=a%26b"));
    }

    #[test]
    fn tweet_placeholders_replaced_once() {
        let t = tweet_text("%agent% %agent% %cls% %link%", &card(), "L");
        assert_eq!(t, "SPEC-0042 %agent% The Architect L");
    }

    #[test]
    fn actions_share_one_link() {
        let a = CardActions::new(&card(), Locale::En, "https://s.test");
        let link = a.challenge_link();
        assert!(a.whatsapp_url().ends_with(&encode_uri_component(&link)));
        assert!(a.tweet_url().contains("SPEC-0042"));
        assert_eq!(a.download_name(), "spechack-agent-SPEC-0042.png");
    }

    #[test]
    fn challenge_without_letters_redirects() {
        let dir = tempdir().unwrap();
        let storage = CardStorage::open(dir.path().join("ls.json"));
        for raw in ["1234", "%20%20", "%F0%9F%9A%80", "%E0%A4%A"] {
            assert_eq!(
                resolve_challenge(Locale::En, raw, &storage),
                ChallengeResolution::Redirect("/en".into())
            );
        }
    }

    #[test]
    fn challenge_preview_prefers_stored_identity() {
        let dir = tempdir().unwrap();
        let mut storage = CardStorage::open(dir.path().join("ls.json"));
        match resolve_challenge(Locale::Es, "mar%C3%ADa", &storage) {
            ChallengeResolution::Preview(p) => {
                assert_eq!(p.display_name, "María");
                assert_eq!(p.challenger, generate_deterministic_card("maría"));
                assert!(p.returning.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
        storage.save(&card()).unwrap();
        match resolve_challenge(Locale::Es, "ana", &storage) {
            ChallengeResolution::Preview(p) => assert_eq!(p.returning, Some(card())),
            other => panic!("unexpected {:?}", other),
        }
    }
}
