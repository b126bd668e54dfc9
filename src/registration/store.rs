// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Participant and ambassador persistence.
//!
//! Participants are unique by email and receive a sequential agent serial
//! from the store, starting at 1. The json stores rewrite their whole file
//! through a temp file and a rename on every insert, holding an exclusive
//! lock on a `.lock` file next to it for the whole read-modify-write, so
//! several processes can share one store.

use crate::card::{Locale, Track};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub agent_number: u32,
    pub name: String,
    pub email: String,
    pub city: String,
    pub track: Track,
    pub builder_class: String,
    /// json of the card gradient
    pub gradient_data: String,
    pub locale: Locale,
    pub created_at: DateTime<Utc>,
}

/// A participant before the store numbered it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewParticipant {
    pub name: String,
    pub email: String,
    pub city: String,
    pub track: Track,
    pub builder_class: String,
    pub gradient_data: String,
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbassadorRecord {
    pub name: String,
    pub email: String,
    pub city: String,
    pub community: String,
    pub locale: Locale,
    pub created_at: DateTime<Utc>,
}

pub trait ParticipantStore {
    fn find_by_email(&self, email: &str) -> Result<Option<ParticipantRecord>, StoreError>;

    /// Number and persist a participant. Fails with DuplicateEmail when the
    /// email is already on file.
    fn insert(&mut self, p: NewParticipant) -> Result<ParticipantRecord, StoreError>;
}

pub trait AmbassadorStore {
    fn insert_ambassador(&mut self, a: AmbassadorRecord) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticipantTable {
    pub last_serial: u32,
    pub participants: Vec<ParticipantRecord>,
}

impl ParticipantTable {
    fn find(&self, email: &str) -> Option<&ParticipantRecord> {
        self.participants.iter().find(|p| p.email == email)
    }

    fn insert(&mut self, p: NewParticipant) -> Result<ParticipantRecord, StoreError> {
        if self.find(&p.email).is_some() {
            return Err(StoreError::DuplicateEmail(p.email));
        }
        let serial = self
            .last_serial
            .checked_add(1)
            .ok_or(StoreError::AgentNumbersExhausted(self.last_serial))?;
        let rec = ParticipantRecord {
            agent_number: serial,
            name: p.name,
            email: p.email,
            city: p.city,
            track: p.track,
            builder_class: p.builder_class,
            gradient_data: p.gradient_data,
            locale: p.locale,
            created_at: Utc::now(),
        };
        self.last_serial = serial;
        self.participants.push(rec.clone());
        Ok(rec)
    }
}

/// Volatile store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub table: ParticipantTable,
    pub ambassadors: Vec<AmbassadorRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParticipantStore for MemoryStore {
    fn find_by_email(&self, email: &str) -> Result<Option<ParticipantRecord>, StoreError> {
        Ok(self.table.find(email).cloned())
    }

    fn insert(&mut self, p: NewParticipant) -> Result<ParticipantRecord, StoreError> {
        self.table.insert(p)
    }
}

impl AmbassadorStore for MemoryStore {
    fn insert_ambassador(&mut self, a: AmbassadorRecord) -> Result<(), StoreError> {
        self.ambassadors.push(a);
        Ok(())
    }
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

/// Exclusive lock of a store file, released when dropped.
fn lock_store(path: &Path) -> Result<File, StoreError> {
    ensure_parent(path)?;
    let f = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path.with_extension("lock"))?;
    f.lock()?;
    Ok(f)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Participants in a json file. A missing file is an empty table, a file
/// that does not parse is an error and is never overwritten.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn table(&self) -> Result<ParticipantTable, StoreError> {
        read_json(&self.path)
    }
}

impl ParticipantStore for JsonFileStore {
    fn find_by_email(&self, email: &str) -> Result<Option<ParticipantRecord>, StoreError> {
        Ok(self.table()?.find(email).cloned())
    }

    fn insert(&mut self, p: NewParticipant) -> Result<ParticipantRecord, StoreError> {
        let _lock = lock_store(&self.path)?;
        let mut table = self.table()?;
        let rec = table.insert(p)?;
        write_json(&self.path, &table)?;
        info!("participant {} stored in {:?}", rec.agent_number, self.path);
        Ok(rec)
    }
}

/// Ambassador applications in a json file, one array.
#[derive(Debug, Clone)]
pub struct JsonAmbassadorStore {
    path: PathBuf,
}

impl JsonAmbassadorStore {
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn all(&self) -> Result<Vec<AmbassadorRecord>, StoreError> {
        read_json(&self.path)
    }
}

impl AmbassadorStore for JsonAmbassadorStore {
    fn insert_ambassador(&mut self, a: AmbassadorRecord) -> Result<(), StoreError> {
        let _lock = lock_store(&self.path)?;
        let mut all = self.all()?;
        all.push(a);
        write_json(&self.path, &all)
    }
}
