// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Local persistence of the last generated card.
//!
//! A small string key/value file shaped like browser local storage. Only
//! the `spechack_card` key is used by the crate, holding the json of the
//! visitor's own CardData. Reading is forgiving: a missing file, an
//! unreadable file or a value that is not a card all load as "no card".

use crate::card::CardData;
use crate::error::StoreError;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CARD_KEY: &str = "spechack_card";

#[derive(Debug, Clone)]
pub struct CardStorage {
    path: PathBuf,
}

impl CardStorage {
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(_) => return BTreeMap::new(),
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("local storage {:?} unreadable: {}", self.path, e);
            BTreeMap::new()
        })
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    pub fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = self.read_all();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    pub fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        let mut items = self.read_all();
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    /// The stored card, None when absent or malformed.
    pub fn load(&self) -> Option<CardData> {
        let raw = self.get_item(CARD_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(card) => Some(card),
            Err(e) => {
                debug!("stored card ignored: {}", e);
                None
            }
        }
    }

    pub fn save(&mut self, card: &CardData) -> Result<(), StoreError> {
        let raw = serde_json::to_string(card)?;
        self.set_item(CARD_KEY, &raw)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.remove_item(CARD_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::generate_deterministic_card;
    use tempfile::tempdir;

    #[test]
    fn save_load_clear() {
        let dir = tempdir().unwrap();
        let mut s = CardStorage::open(dir.path().join("nested").join("ls.json"));
        assert!(s.load().is_none());
        let card = generate_deterministic_card("ada lovelace");
        s.save(&card).unwrap();
        assert_eq!(s.load(), Some(card.clone()));

        let other = generate_deterministic_card("grace hopper");
        s.save(&other).unwrap();
        assert_eq!(s.load(), Some(other));

        s.set_item("theme", "dark").unwrap();
        s.clear().unwrap();
        assert!(s.load().is_none());
        assert_eq!(s.get_item("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn malformed_data_loads_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ls.json");
        fs::write(&path, "not json").unwrap();
        let mut s = CardStorage::open(&path);
        assert!(s.load().is_none());

        s.set_item(CARD_KEY, r#"{"agentNumber":"SPEC-1000"}"#).unwrap();
        assert!(s.load().is_none());
    }
}
