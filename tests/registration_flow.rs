// SpecHack
// copyright zipxing@hotmail.com 2022～2025

use spechack::analytics::AnalyticsClient;
use spechack::card::{generate_card_gradient, Locale, Track};
use spechack::registration::{
    JsonFileStore, ParticipantStore, Registrar, RegistrationInput, RegistrationOutcome,
};
use spechack::share::{resolve_challenge, ChallengeResolution};
use spechack::storage::CardStorage;
use spechack::util::Rand;
use tempfile::tempdir;

fn form(name: &str, email: &str) -> RegistrationInput {
    RegistrationInput {
        name: name.into(),
        email: email.into(),
        city: "Ciudad de México".into(),
        track: "hub".into(),
        locale: "es".into(),
    }
}

#[test]
fn existing_email_returns_the_stored_identity() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("participants.json");

    let mut first = Registrar::with_rng(
        JsonFileStore::open(&path),
        AnalyticsClient::disabled(),
        Rand::new(),
    );
    let created = first.submit(&form("Grace Hopper", "grace@navy.mil"));
    assert_eq!(created.message, "created");
    let created_data = created.data.unwrap();

    // a later process, different seed, different name on the form
    let mut rng = Rand::new();
    rng.srand(99);
    let mut second = Registrar::with_rng(JsonFileStore::open(&path), AnalyticsClient::disabled(), rng);
    let again = second.submit(&form("G. Hopper", "grace@navy.mil"));
    assert!(again.success);
    assert_eq!(again.message, "existing");
    let again_data = again.data.unwrap();
    assert_eq!(again_data, created_data);
    assert_eq!(again_data.name, "Grace Hopper");
    assert_eq!(
        again_data.to_card("Ciudad de México", Track::Hub).gradient,
        generate_card_gradient("Grace Hopper")
    );

    let table = JsonFileStore::open(&path).table().unwrap();
    assert_eq!(table.participants.len(), 1);
    assert_eq!(table.last_serial, 1);
    assert!(second.store().find_by_email("grace@navy.mil").unwrap().is_some());
}

#[test]
fn stored_card_wins_on_challenge_pages() {
    let dir = tempdir().unwrap();
    let mut registrar = Registrar::with_rng(
        JsonFileStore::open(dir.path().join("p.json")),
        AnalyticsClient::disabled(),
        Rand::new(),
    );
    let data = registrar
        .submit(&form("Ada Lovelace", "ada@example.com"))
        .data
        .unwrap();
    let mine = data.to_card("Ciudad de México", Track::Hub);
    let mut storage = CardStorage::open(dir.path().join("local.json"));
    storage.save(&mine).unwrap();

    match resolve_challenge(Locale::Es, "ada", &storage) {
        ChallengeResolution::Preview(page) => {
            assert_eq!(page.returning.as_ref(), Some(&mine));
            // the preview number is hash derived, the stored one sequential
            assert_eq!(mine.agent_number, "SPEC-0001");
            assert_ne!(page.challenger.agent_number, mine.agent_number);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn device_with_a_saved_card_skips_registration() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("participants.json");
    let mut storage = CardStorage::open(dir.path().join("local.json"));
    let mut registrar = Registrar::with_rng(
        JsonFileStore::open(&path),
        AnalyticsClient::disabled(),
        Rand::new(),
    );

    let first =
        registrar.submit_from_device(&form("Katherine Johnson", "kj@nasa.gov"), &mut storage);
    let saved = match first {
        RegistrationOutcome::Submitted { response, card } => {
            assert_eq!(response.message, "created");
            card.unwrap()
        }
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(storage.load(), Some(saved.clone()));

    // a different email from the same device never reaches the store
    let again =
        registrar.submit_from_device(&form("Dorothy Vaughan", "dv@nasa.gov"), &mut storage);
    assert_eq!(again, RegistrationOutcome::Returning(saved));
    assert!(registrar.store().find_by_email("dv@nasa.gov").unwrap().is_none());
    assert_eq!(JsonFileStore::open(&path).table().unwrap().participants.len(), 1);
}

#[test]
fn rejected_form_saves_nothing() {
    let dir = tempdir().unwrap();
    let mut storage = CardStorage::open(dir.path().join("local.json"));
    let mut registrar = Registrar::with_rng(
        JsonFileStore::open(dir.path().join("p.json")),
        AnalyticsClient::disabled(),
        Rand::new(),
    );
    match registrar.submit_from_device(&form("K", "not-an-email"), &mut storage) {
        RegistrationOutcome::Submitted { response, card } => {
            assert_eq!(response.message, "validation");
            assert!(card.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(storage.load().is_none());
}
