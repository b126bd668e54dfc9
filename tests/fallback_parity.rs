// SpecHack
// copyright zipxing@hotmail.com 2022～2025

use spechack::card::{generate_deterministic_card, Locale};
use spechack::config::RevealTiming;
use spechack::error::RenderError;
use spechack::render::{CardFaceTexture, FlatCard};
use spechack::scene::{mount_card_view, FailingBackend, HeadlessBackend};

#[test]
fn flat_card_carries_the_face_identity() {
    let card = generate_deterministic_card("margaret hamilton");
    for locale in [Locale::Es, Locale::En] {
        let face = CardFaceTexture::new(&card, locale);
        let flat = FlatCard::new(&card, locale).lines();

        assert!(face.canvas().find_text(&format!("#{}", card.agent_number)).is_some());
        assert!(flat.contains(&card.agent_number));

        assert!(face.canvas().find_text(&card.name.to_uppercase()).is_some());
        assert!(flat.contains(&card.name));

        assert!(face
            .canvas()
            .find_text(&card.builder_class.name.to_uppercase())
            .is_some());
        assert!(flat.contains(&card.builder_class.name));

        let desc = card.builder_class.desc.get(locale).to_string();
        assert!(!desc.is_empty());
        assert!(face.canvas().find_text(&desc).is_some());
        assert!(flat.contains(&desc));
    }
}

#[test]
fn both_views_offer_the_same_actions() {
    let card = generate_deterministic_card("margaret hamilton");
    let flat = mount_card_view(
        &card,
        Locale::En,
        &mut FailingBackend(RenderError::Shader("no webgl".into())),
        RevealTiming::default(),
    );
    let full = mount_card_view(&card, Locale::En, &mut HeadlessBackend, RevealTiming::default());
    assert!(!flat.is_3d());
    assert!(full.is_3d());
    assert_eq!(flat.actions("https://o.test"), full.actions("https://o.test"));
    assert_eq!(
        flat.actions("https://o.test").challenge_link(),
        "https://o.test/en/c/margaret"
    );
}
