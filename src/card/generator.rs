// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Pure functions from a display name to card attributes. Shared links
//! depend on these staying bit-for-bit stable: the hash is computed over
//! UTF-16 code units with 32 bit wrapping arithmetic.

use super::{BuilderClass, CardData, Gradient, Track, BUILDER_CLASSES, VIRTUAL_CITY};
use crate::util::Rand;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub const AGENT_PREFIX: &str = "SPEC-";

/// default number of display columns a name may take on the card face
pub const NAME_MAX_COLUMNS: usize = 20;

/// (from, to) pairs a card gradient is picked from
pub const GRADIENT_COMBOS: [(&str, &str); 8] = [
    ("hsl(261,85%,50%)", "hsl(199,95%,60%)"),
    ("hsl(261,85%,50%)", "hsl(330,80%,55%)"),
    ("hsl(199,95%,60%)", "hsl(142,71%,45%)"),
    ("hsl(330,80%,55%)", "hsl(40,95%,60%)"),
    ("hsl(142,71%,45%)", "hsl(261,85%,50%)"),
    ("hsl(40,95%,60%)", "hsl(199,95%,60%)"),
    ("hsl(261,85%,40%)", "hsl(199,95%,40%)"),
    ("hsl(330,80%,45%)", "hsl(142,71%,35%)"),
];

/// Rolling hash `h = h * 31 + unit`, wrapping at 32 bits, absolute value.
/// `i32::MIN` has no positive counterpart in 32 bits and maps to 2^31.
pub fn hash_str(s: &str) -> u32 {
    let mut h: i32 = 0;
    for unit in s.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32);
    }
    h.unsigned_abs()
}

pub fn generate_card_gradient(name: &str) -> Gradient {
    let h = hash_str(name);
    let (from, to) = GRADIENT_COMBOS[(h % GRADIENT_COMBOS.len() as u32) as usize];
    Gradient {
        from: from.to_string(),
        to: to.to_string(),
        angle: 120 + h % 120,
    }
}

pub fn deterministic_builder_class(name: &str) -> BuilderClass {
    let h = hash_str(name);
    (&BUILDER_CLASSES[(h % BUILDER_CLASSES.len() as u32) as usize]).into()
}

/// Uniform pick, only for new registrations.
pub fn random_builder_class(rng: &mut Rand) -> BuilderClass {
    (&BUILDER_CLASSES[rng.index(BUILDER_CLASSES.len())]).into()
}

pub fn format_agent_number(serial: u32) -> String {
    format!("{}{:04}", AGENT_PREFIX, serial)
}

/// `SPEC-0042` → 42
pub fn parse_agent_number(s: &str) -> Option<u32> {
    let digits = s.strip_prefix(AGENT_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Preview number in SPEC-1000 ..= SPEC-9999.
pub fn deterministic_agent_number(name: &str) -> String {
    format_agent_number(hash_str(name) % 9000 + 1000)
}

/// Uppercase the first character of every space separated word, the rest
/// is kept as typed.
pub fn capitalize_words(name: &str) -> String {
    name.trim()
        .split(' ')
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(c) => c.to_uppercase().chain(cs).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// The preview card of a name that has not registered.
pub fn generate_deterministic_card(name: &str) -> CardData {
    let name = capitalize_words(name);
    CardData {
        agent_number: deterministic_agent_number(&name),
        builder_class: deterministic_builder_class(&name),
        gradient: generate_card_gradient(&name),
        city: VIRTUAL_CITY.to_string(),
        track: Track::Virtual,
        name,
    }
}

/// Cut a name to `max` display columns on grapheme boundaries, marking the
/// cut with `…` (which takes one of the columns).
pub fn truncate_name(name: &str, max: usize) -> String {
    if name.width() <= max {
        return name.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for g in name.graphemes(true) {
        let w = g.width();
        if used + w > max - 1 {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out.truncate(out.trim_end().len());
    out.push('…');
    out
}

const CITY_COUNTRIES: &[(&str, &str)] = &[
    ("ciudad de mexico", "MX"),
    ("ciudad de méxico", "MX"),
    ("cdmx", "MX"),
    ("mexico city", "MX"),
    ("guadalajara", "MX"),
    ("monterrey", "MX"),
    ("bogota", "CO"),
    ("bogotá", "CO"),
    ("medellin", "CO"),
    ("medellín", "CO"),
    ("buenos aires", "AR"),
    ("cordoba", "AR"),
    ("córdoba", "AR"),
    ("santiago", "CL"),
    ("lima", "PE"),
    ("quito", "EC"),
    ("caracas", "VE"),
    ("montevideo", "UY"),
    ("san jose", "CR"),
    ("san josé", "CR"),
    ("panama", "PA"),
    ("panamá", "PA"),
    ("sao paulo", "BR"),
    ("são paulo", "BR"),
    ("madrid", "ES"),
    ("barcelona", "ES"),
    ("san francisco", "US"),
    ("new york", "US"),
    ("miami", "US"),
    ("london", "GB"),
];

/// regional indicator pair of an ISO 3166 alpha-2 code
fn flag_of(code: &str) -> String {
    code.chars()
        .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32).wrapping_sub('A' as u32)))
        .collect()
}

/// Flag emoji shown next to the city. Virtual and unknown cities get a globe.
pub fn country_flag(city: &str) -> String {
    let key = city.trim().to_lowercase();
    CITY_COUNTRIES
        .iter()
        .find(|(c, _)| *c == key)
        .map(|(_, code)| flag_of(code))
        .unwrap_or_else(|| "🌐".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_reference_values() {
        assert_eq!(hash_str(""), 0);
        assert_eq!(hash_str("a"), 97);
        // 97*31 + 98
        assert_eq!(hash_str("ab"), 3105);
        // "polygenelubricants" hashes to i32::MIN in the java string hash
        assert_eq!(hash_str("polygenelubricants"), 1u32 << 31);
    }

    #[test]
    fn hash_uses_utf16_units() {
        // one code unit per bmp char, a surrogate pair above it
        assert_eq!(hash_str("é"), 0xe9);
        let h = hash_str("😀");
        assert_eq!(h, 0xD83Du32 * 31 + 0xDE00);
    }

    #[test]
    fn gradient_is_deterministic_and_bounded() {
        for name in ["Alex Chen", "María José", "", "x", "Agent Smith"] {
            let a = generate_card_gradient(name);
            assert_eq!(a, generate_card_gradient(name));
            assert!((120..240).contains(&a.angle));
            assert!(GRADIENT_COMBOS
                .iter()
                .any(|(f, t)| *f == a.from && *t == a.to));
        }
        let empty = generate_card_gradient("");
        assert_eq!(empty.from, GRADIENT_COMBOS[0].0);
        assert_eq!(empty.angle, 120);
    }

    #[test]
    fn agent_number_range() {
        for name in ["Alex", "Bea", "Carlos Ruiz", "", "polygenelubricants"] {
            let n = deterministic_agent_number(name);
            let serial = parse_agent_number(&n).unwrap();
            assert!((1000..=9999).contains(&serial), "{}", n);
        }
        assert_eq!(deterministic_agent_number(""), "SPEC-1000");
        assert_eq!(format_agent_number(7), "SPEC-0007");
        assert_eq!(parse_agent_number("SPEC-"), None);
        assert_eq!(parse_agent_number("SPEC-12a"), None);
    }

    #[test]
    fn deterministic_card_hashes_capitalized_name() {
        let a = generate_deterministic_card("alex chen");
        let b = generate_deterministic_card("Alex Chen");
        assert_eq!(a, b);
        assert_eq!(a.name, "Alex Chen");
        assert_eq!(a.agent_number, deterministic_agent_number("Alex Chen"));
        assert_eq!(a.builder_class, deterministic_builder_class("Alex Chen"));
        assert_eq!(a.track, Track::Virtual);
    }

    #[test]
    fn capitalize_keeps_rest() {
        assert_eq!(capitalize_words("  mcDonald o'neil "), "McDonald O'neil");
        assert_eq!(capitalize_words("élan"), "Élan");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn random_class_comes_from_table() {
        let mut rng = Rand::new();
        rng.srand(3);
        for _ in 0..32 {
            let bc = random_builder_class(&mut rng);
            assert!(BUILDER_CLASSES.iter().any(|d| d.name == bc.name));
        }
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_name("Short", 20), "Short");
        let t = truncate_name("Maximiliano Hernández Villalobos", 20);
        assert!(t.ends_with('…'));
        assert!(t.width() <= 20);
        // wide chars count two columns
        let cjk = truncate_name("山田太郎山田太郎山田太郎", 10);
        assert!(cjk.width() <= 10);
        assert_eq!(truncate_name("abc", 0), "");
    }

    #[test]
    fn flags() {
        assert_eq!(country_flag("Bogotá"), "🇨🇴");
        assert_eq!(country_flag(" madrid "), "🇪🇸");
        assert_eq!(country_flag("Virtual"), "🌐");
        assert_eq!(country_flag("Atlantis"), "🌐");
    }
}
