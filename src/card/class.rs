// SpecHack
// copyright zipxing@hotmail.com 2022～2025

use super::Locale;
use serde::{Deserialize, Serialize};

/// names of the six radar chart axes, in drawing order
pub const STAT_AXES: [&str; 6] = [
    "CREATIVITY",
    "SPEED",
    "DEBUGGING",
    "ARCHITECTURE",
    "RESILIENCE",
    "INNOVATION",
];

/// stat vector of classes that are not in the table
pub const DEFAULT_STATS: [f64; 6] = [0.5; 6];

/// Static definition of one builder class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDef {
    pub name: &'static str,
    pub desc_es: &'static str,
    pub desc_en: &'static str,
    pub stats: [f64; 6],
}

/// The fixed, ordered class table. Order matters: indexes are derived from
/// name hashes and must stay stable for previously shared links.
pub const BUILDER_CLASSES: [ClassDef; 6] = [
    ClassDef {
        name: "The Architect",
        desc_es: "Planifica todo, ejecuta impecable",
        desc_en: "Plans everything, executes flawlessly",
        stats: [0.6, 0.5, 0.7, 1.0, 0.8, 0.5],
    },
    ClassDef {
        name: "The Prototyper",
        desc_es: "Construye rápido, itera más rápido",
        desc_en: "Builds fast, iterates faster",
        stats: [0.8, 1.0, 0.4, 0.5, 0.6, 0.9],
    },
    ClassDef {
        name: "The Full-Stack Maverick",
        desc_es: "Front, back, infra, todo",
        desc_en: "Front, back, infra, all of it",
        stats: [0.7, 0.7, 0.7, 0.8, 0.7, 0.7],
    },
    ClassDef {
        name: "The Mad Scientist",
        desc_es: "Experimentos que nadie pidió, pero todos necesitan",
        desc_en: "Experiments nobody asked for, but everyone needs",
        stats: [1.0, 0.6, 0.5, 0.4, 0.5, 1.0],
    },
    ClassDef {
        name: "The Systems Thinker",
        desc_es: "Ve el panorama completo, construye la base",
        desc_en: "Sees the big picture, builds the foundation",
        stats: [0.5, 0.4, 0.8, 1.0, 0.9, 0.6],
    },
    ClassDef {
        name: "The Debug Whisperer",
        desc_es: "Encuentra bugs antes de que existan",
        desc_en: "Finds bugs before they exist",
        stats: [0.5, 0.5, 1.0, 0.7, 0.9, 0.6],
    },
];

/// Bilingual class description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ClassDesc {
    pub es: String,
    pub en: String,
}

impl ClassDesc {
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Es => &self.es,
            Locale::En => &self.en,
        }
    }
}

/// Builder class as carried by a card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuilderClass {
    pub name: String,
    pub desc: ClassDesc,
}

impl BuilderClass {
    /// decorative radar stats, flat 0.5 for unknown names
    pub fn stats(&self) -> [f64; 6] {
        find_class_def(&self.name)
            .map(|d| d.stats)
            .unwrap_or(DEFAULT_STATS)
    }
}

impl From<&ClassDef> for BuilderClass {
    fn from(d: &ClassDef) -> Self {
        BuilderClass {
            name: d.name.to_string(),
            desc: ClassDesc {
                es: d.desc_es.to_string(),
                en: d.desc_en.to_string(),
            },
        }
    }
}

pub fn find_class_def(name: &str) -> Option<&'static ClassDef> {
    BUILDER_CLASSES.iter().find(|d| d.name == name)
}

/// Look a persisted class name up. Unknown names keep the name and get empty
/// descriptions, the same shape an old record without a class produces.
pub fn find_builder_class(name: &str) -> BuilderClass {
    match find_class_def(name) {
        Some(d) => d.into(),
        None => BuilderClass {
            name: name.to_string(),
            desc: ClassDesc::default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_are_unit_range() {
        for d in BUILDER_CLASSES.iter() {
            assert!(d.stats.iter().all(|s| (0.0..=1.0).contains(s)), "{}", d.name);
        }
    }

    #[test]
    fn unknown_class_falls_back() {
        let bc = find_builder_class("The Intern");
        assert_eq!(bc.name, "The Intern");
        assert_eq!(bc.desc, ClassDesc::default());
        assert_eq!(bc.stats(), DEFAULT_STATS);
    }

    #[test]
    fn known_class_has_both_languages() {
        let bc = find_builder_class("The Prototyper");
        assert_eq!(bc.desc.get(Locale::En), "Builds fast, iterates faster");
        assert_eq!(bc.desc.get(Locale::Es), "Construye rápido, itera más rápido");
        assert_eq!(bc.stats()[1], 1.0);
    }
}
