// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Registration and ambassador submissions.
//!
//! A registration is keyed by email. Submitting an email that is already on
//! file hands back the stored identity untouched, so resubmitting never
//! renumbers anybody or rolls a new builder class. A new email gets the
//! next serial from the store, a random class and the gradient of its name.
//!
//! Both flows answer with a message string the form understands:
//! registration uses validation / existing / created / server_error,
//! ambassador applications use validation / success / error.

use crate::analytics::AnalyticsClient;
use crate::card::{
    find_builder_class, format_agent_number, generate_card_gradient, random_builder_class,
    BuilderClass, CardData, ClassDesc, Gradient, Locale, Track,
};
use crate::storage::CardStorage;
use crate::util::Rand;
use chrono::Utc;
use lazy_static::lazy_static;
use log::{error, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod store;
pub use store::*;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
            .expect("static email regex");
}

pub const MSG_VALIDATION: &str = "validation";
pub const MSG_EXISTING: &str = "existing";
pub const MSG_CREATED: &str = "created";
pub const MSG_SERVER_ERROR: &str = "server_error";
pub const MSG_SUCCESS: &str = "success";
pub const MSG_ERROR: &str = "error";

/// field name → messages, in field name order
pub type FieldErrors = BTreeMap<String, Vec<String>>;

fn add_error(errors: &mut FieldErrors, field: &str, msg: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(msg.to_string());
}

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL.is_match(email)
}

/// Lengths count utf-16 code units, like the browser form does.
fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn check_name(errors: &mut FieldErrors, name: &str) {
    if text_len(name) < 2 {
        add_error(errors, "name", "Name must be at least 2 characters");
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(email) {
        add_error(errors, "email", "Invalid email");
    }
}

fn check_city(errors: &mut FieldErrors, city: &str) {
    if city.is_empty() {
        add_error(errors, "city", "City is required");
    }
}

fn check_locale(errors: &mut FieldErrors, locale: &str) -> Option<Locale> {
    let l = Locale::parse(locale);
    if l.is_none() {
        add_error(
            errors,
            "locale",
            &format!("Invalid enum value. Expected 'es' | 'en', received '{}'", locale),
        );
    }
    l
}

/// Raw registration form, every field as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationInput {
    pub name: String,
    pub email: String,
    pub city: String,
    pub track: String,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub city: String,
    pub track: Track,
    pub locale: Locale,
}

impl RegistrationInput {
    pub fn validate(&self) -> Result<ValidRegistration, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &self.name);
        check_email(&mut errors, &self.email);
        check_city(&mut errors, &self.city);
        let track = Track::parse(&self.track);
        if track.is_none() {
            add_error(
                &mut errors,
                "track",
                &format!(
                    "Invalid enum value. Expected 'virtual' | 'hub', received '{}'",
                    self.track
                ),
            );
        }
        let locale = check_locale(&mut errors, &self.locale);
        match (track, locale) {
            (Some(track), Some(locale)) if errors.is_empty() => Ok(ValidRegistration {
                name: self.name.clone(),
                email: self.email.clone(),
                city: self.city.clone(),
                track,
                locale,
            }),
            _ => Err(errors),
        }
    }
}

/// Card fields handed back to the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    pub agent_number: String,
    pub name: String,
    pub builder_class: String,
    pub builder_class_desc: ClassDesc,
    pub gradient_data: String,
}

impl CardPayload {
    fn from_record(rec: &ParticipantRecord, desc: ClassDesc) -> Self {
        Self {
            agent_number: format_agent_number(rec.agent_number),
            name: rec.name.clone(),
            builder_class: rec.builder_class.clone(),
            builder_class_desc: desc,
            gradient_data: rec.gradient_data.clone(),
        }
    }

    /// The card the form shows, completed with the city and track it
    /// submitted. A gradient that does not parse is derived from the name
    /// again.
    pub fn to_card(&self, city: &str, track: Track) -> CardData {
        CardData {
            agent_number: self.agent_number.clone(),
            name: self.name.clone(),
            city: city.to_string(),
            track,
            builder_class: BuilderClass {
                name: self.builder_class.clone(),
                desc: self.builder_class_desc.clone(),
            },
            gradient: Gradient::from_json(&self.gradient_data)
                .unwrap_or_else(|| generate_card_gradient(&self.name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CardPayload>,
}

impl RegisterResponse {
    fn fail(message: &str, errors: Option<FieldErrors>) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            errors,
            data: None,
        }
    }

    fn ok(message: &str, data: CardPayload) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            errors: None,
            data: Some(data),
        }
    }

    pub fn is_existing(&self) -> bool {
        self.message == MSG_EXISTING
    }
}

/// What the registration form shows after [`Registrar::submit_from_device`].
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    /// this device already holds a card, nothing was submitted
    Returning(CardData),
    /// the form was submitted; `card` is set when it yielded one
    Submitted {
        response: RegisterResponse,
        card: Option<CardData>,
    },
}

/// Registration front door over a participant store.
pub struct Registrar<S: ParticipantStore> {
    store: S,
    rng: Rand,
    analytics: AnalyticsClient,
}

impl<S: ParticipantStore> Registrar<S> {
    pub fn new(store: S, analytics: AnalyticsClient) -> Self {
        Self::with_rng(store, analytics, Rand::from_now())
    }

    pub fn with_rng(store: S, analytics: AnalyticsClient, rng: Rand) -> Self {
        Self {
            store,
            rng,
            analytics,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn analytics(&self) -> &AnalyticsClient {
        &self.analytics
    }

    pub fn submit(&mut self, input: &RegistrationInput) -> RegisterResponse {
        let valid = match input.validate() {
            Ok(v) => v,
            Err(errors) => {
                info!("registration rejected: {:?}", errors.keys().collect::<Vec<_>>());
                return RegisterResponse::fail(MSG_VALIDATION, Some(errors));
            }
        };
        match self.register(&valid) {
            Ok(resp) => {
                self.analytics.capture(
                    "spechack_registration",
                    &[
                        ("result", resp.message.as_str()),
                        ("track", valid.track.as_str()),
                        ("locale", valid.locale.as_str()),
                    ],
                );
                resp
            }
            Err(e) => {
                error!("registration error: {}", e);
                RegisterResponse::fail(MSG_SERVER_ERROR, None)
            }
        }
    }

    /// Form flow of a visitor device: a card already saved in `storage`
    /// is shown as is and the store is never asked. Otherwise the input
    /// is submitted and the resulting card saved for the next visit.
    pub fn submit_from_device(
        &mut self,
        input: &RegistrationInput,
        storage: &mut CardStorage,
    ) -> RegistrationOutcome {
        if let Some(card) = storage.load() {
            info!("returning visitor {}, registration skipped", card.agent_number);
            return RegistrationOutcome::Returning(card);
        }
        let response = self.submit(input);
        let card = match (&response.data, input.validate()) {
            (Some(data), Ok(valid)) => Some(data.to_card(&valid.city, valid.track)),
            _ => None,
        };
        if let Some(c) = &card {
            if let Err(e) = storage.save(c) {
                warn!("card not saved on device: {}", e);
            }
        }
        RegistrationOutcome::Submitted { response, card }
    }

    fn register(
        &mut self,
        v: &ValidRegistration,
    ) -> Result<RegisterResponse, crate::error::StoreError> {
        if let Some(rec) = self.store.find_by_email(&v.email)? {
            info!("email already registered as {}", rec.agent_number);
            let desc = find_builder_class(&rec.builder_class).desc;
            return Ok(RegisterResponse::ok(
                MSG_EXISTING,
                CardPayload::from_record(&rec, desc),
            ));
        }
        let class = random_builder_class(&mut self.rng);
        let gradient = generate_card_gradient(&v.name);
        let rec = self.store.insert(NewParticipant {
            name: v.name.clone(),
            email: v.email.clone(),
            city: v.city.clone(),
            track: v.track,
            builder_class: class.name.clone(),
            gradient_data: gradient.to_json(),
            locale: v.locale,
        })?;
        info!("registered {} as {}", rec.agent_number, rec.builder_class);
        Ok(RegisterResponse::ok(
            MSG_CREATED,
            CardPayload::from_record(&rec, class.desc),
        ))
    }
}

/// Raw ambassador application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbassadorInput {
    pub name: String,
    pub email: String,
    pub city: String,
    pub community: String,
    pub locale: String,
}

impl AmbassadorInput {
    pub fn validate(&self) -> Result<Locale, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &self.name);
        check_email(&mut errors, &self.email);
        check_city(&mut errors, &self.city);
        if text_len(&self.community) < 10 {
            add_error(&mut errors, "community", "Please describe your community");
        }
        let locale = check_locale(&mut errors, &self.locale);
        match locale {
            Some(l) if errors.is_empty() => Ok(l),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbassadorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

pub fn submit_ambassador<S: AmbassadorStore>(
    store: &mut S,
    input: &AmbassadorInput,
) -> AmbassadorResponse {
    let locale = match input.validate() {
        Ok(l) => l,
        Err(errors) => {
            return AmbassadorResponse {
                success: false,
                message: MSG_VALIDATION.to_string(),
                errors: Some(errors),
            }
        }
    };
    let rec = AmbassadorRecord {
        name: input.name.clone(),
        email: input.email.clone(),
        city: input.city.clone(),
        community: input.community.clone(),
        locale,
        created_at: Utc::now(),
    };
    match store.insert_ambassador(rec) {
        Ok(()) => {
            info!("ambassador application from {}", input.city);
            AmbassadorResponse {
                success: true,
                message: MSG_SUCCESS.to_string(),
                errors: None,
            }
        }
        Err(e) => {
            error!("ambassador submission error: {}", e);
            AmbassadorResponse {
                success: false,
                message: MSG_ERROR.to_string(),
                errors: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::BUILDER_CLASSES;
    use crate::error::StoreError;

    fn input(email: &str) -> RegistrationInput {
        RegistrationInput {
            name: "Ada Lovelace".into(),
            email: email.into(),
            city: "Bogotá".into(),
            track: "hub".into(),
            locale: "es".into(),
        }
    }

    struct BrokenStore;
    impl ParticipantStore for BrokenStore {
        fn find_by_email(&self, _: &str) -> Result<Option<ParticipantRecord>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("db down")))
        }
        fn insert(&mut self, _: NewParticipant) -> Result<ParticipantRecord, StoreError> {
            unreachable!()
        }
    }
    impl AmbassadorStore for BrokenStore {
        fn insert_ambassador(&mut self, _: AmbassadorRecord) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("db down")))
        }
    }

    #[test]
    fn emails() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email(".ada@example.com"));
        assert!(!is_valid_email("a..b@example.com"));
        assert!(!is_valid_email("ada.@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn validation_collects_every_field() {
        let bad = RegistrationInput {
            name: "A".into(),
            email: "nope".into(),
            city: "".into(),
            track: "web".into(),
            locale: "fr".into(),
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(
            errors.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            vec!["city", "email", "locale", "name", "track"]
        );
        assert_eq!(errors["name"], vec!["Name must be at least 2 characters"]);
    }

    #[test]
    fn name_length_in_utf16_units() {
        let with_name = |name: &str| RegistrationInput {
            name: name.into(),
            ..input("ada@example.com")
        };
        // one char above the bmp is two code units
        assert!(with_name("𝓐").validate().is_ok());
        assert!(with_name("é").validate().unwrap_err().contains_key("name"));
        assert!(with_name("Al").validate().is_ok());
    }

    #[test]
    fn created_then_existing() {
        let mut r = Registrar::with_rng(MemoryStore::new(), AnalyticsClient::disabled(), Rand::new());
        let first = r.submit(&input("ada@example.com"));
        assert!(first.success);
        assert_eq!(first.message, MSG_CREATED);
        let data = first.data.clone().unwrap();
        assert_eq!(data.agent_number, "SPEC-0001");
        assert!(BUILDER_CLASSES.iter().any(|c| c.name == data.builder_class));
        assert_eq!(
            Gradient::from_json(&data.gradient_data),
            Some(generate_card_gradient("Ada Lovelace"))
        );

        let mut again = input("ada@example.com");
        again.name = "Someone Else".into();
        let second = r.submit(&again);
        assert!(second.is_existing());
        assert_eq!(second.data, first.data);
        assert_eq!(r.store().table.participants.len(), 1);

        let other = r.submit(&input("grace@example.com"));
        assert_eq!(other.data.unwrap().agent_number, "SPEC-0002");
    }

    #[test]
    fn payload_becomes_card() {
        let mut r = Registrar::with_rng(MemoryStore::new(), AnalyticsClient::disabled(), Rand::new());
        let data = r.submit(&input("ada@example.com")).data.unwrap();
        let card = data.to_card("Bogotá", Track::Hub);
        assert_eq!(card.agent_number, "SPEC-0001");
        assert_eq!(card.builder_class, find_builder_class(&data.builder_class));
        assert_eq!(card.city, "Bogotá");

        let mut broken = data.clone();
        broken.gradient_data = "{}".into();
        assert_eq!(
            broken.to_card("", Track::Virtual).gradient,
            generate_card_gradient("Ada Lovelace")
        );
    }

    #[test]
    fn store_failure_is_server_error() {
        let mut r = Registrar::with_rng(BrokenStore, AnalyticsClient::disabled(), Rand::new());
        let resp = r.submit(&input("ada@example.com"));
        assert!(!resp.success);
        assert_eq!(resp.message, MSG_SERVER_ERROR);
        assert!(resp.data.is_none() && resp.errors.is_none());
    }

    #[test]
    fn analytics_sees_outcomes() {
        let mut r = Registrar::with_rng(
            MemoryStore::new(),
            AnalyticsClient::new(Some("key".into())),
            Rand::new(),
        );
        r.submit(&input("ada@example.com"));
        r.submit(&input("ada@example.com"));
        let results: Vec<_> = r
            .analytics()
            .events()
            .iter()
            .map(|e| e.properties["result"].clone())
            .collect();
        assert_eq!(results, vec!["created", "existing"]);
    }

    #[test]
    fn ambassadors() {
        let mut store = MemoryStore::new();
        let mut a = AmbassadorInput {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            city: "Quito".into(),
            community: "short".into(),
            locale: "en".into(),
        };
        let resp = submit_ambassador(&mut store, &a);
        assert_eq!(resp.message, MSG_VALIDATION);
        assert!(resp.errors.unwrap().contains_key("community"));

        a.community = "Rust meetup of 200 builders".into();
        assert_eq!(submit_ambassador(&mut store, &a).message, MSG_SUCCESS);
        assert_eq!(store.ambassadors.len(), 1);
        assert_eq!(submit_ambassador(&mut BrokenStore, &a).message, MSG_ERROR);
    }
}
