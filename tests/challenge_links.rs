// SpecHack
// copyright zipxing@hotmail.com 2022～2025

use spechack::card::{generate_deterministic_card, Locale};
use spechack::share::{build_challenge_link, resolve_challenge, ChallengeResolution};
use spechack::storage::CardStorage;
use tempfile::tempdir;

#[test]
fn link_then_resolve_round() {
    let dir = tempdir().unwrap();
    let storage = CardStorage::open(dir.path().join("none.json"));

    let link = build_challenge_link("Zoë Ramírez", "https://spechack.404tf.com", Locale::En);
    assert_eq!(link, "https://spechack.404tf.com/en/c/zo%C3%AB");
    let segment = link.rsplit('/').next().unwrap();

    match resolve_challenge(Locale::En, segment, &storage) {
        ChallengeResolution::Preview(page) => {
            assert_eq!(page.display_name, "Zoë");
            assert_eq!(page.challenger, generate_deterministic_card("zoë"));
            assert_eq!(page.challenger.name, "Zoë");
            assert!(page.returning.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn names_without_letters_go_home() {
    let dir = tempdir().unwrap();
    let storage = CardStorage::open(dir.path().join("none.json"));
    for seg in ["", "42", "%F0%9F%94%A5", "---"] {
        assert_eq!(
            resolve_challenge(Locale::Es, seg, &storage),
            ChallengeResolution::Redirect("/es".to_string())
        );
    }
}
