//! Integration tests for sampling settings.

mod common;

use common::TestContext;
use pretty_assertions::assert_eq;

use practice_cards_lib::commands;
use practice_cards_lib::storage::MirrorStatus;
use practice_core::{DrawChances, Level, SamplingSettings};

/// Settings that only ever draw from the Learning level.
fn learning_only() -> SamplingSettings {
    let mut settings = SamplingSettings::default();
    for level in [Level::Familiar, Level::Confident, Level::Mastered] {
        settings.draw_chances.set(level, 0.0);
    }
    settings
}

#[test]
fn test_defaults_use_baseline_chances() {
    let ctx = TestContext::new();
    let settings = commands::get_sampling_settings(&ctx.state);

    assert_eq!(settings.draw_chances, DrawChances::default());
    assert_eq!(settings.draw_chances.get(Level::Learning), 0.5);
    assert_eq!(settings.draw_chances.get(Level::Mastered), 0.05);
    assert!(settings.folder_weights.is_empty());
}

#[test]
fn test_saved_settings_are_normalized_and_persisted() {
    let mut ctx = TestContext::new();
    let mut settings = SamplingSettings::default();
    for level in Level::ALL {
        settings.draw_chances.set(level, 2.0);
    }
    settings.folder_weights.insert("Math".to_string(), -3.0);
    settings.folder_weights.insert("History".to_string(), 2.5);

    let saved = commands::save_sampling_settings(&mut ctx.state, settings).unwrap();
    for level in Level::ALL {
        assert_eq!(saved.draw_chances.get(level), 0.25);
    }
    assert_eq!(saved.folder_weight("Math"), 0.0);
    assert_eq!(saved.folder_weight("History"), 2.5);

    let reopened = ctx.reopen();
    assert_eq!(reopened.settings, saved);
}

#[test]
fn test_reset_restores_defaults() {
    let mut ctx = TestContext::new();
    let mut settings = SamplingSettings::default();
    settings.draw_chances.set(Level::Mastered, 0.0);
    settings.set_folder_weight("Math", 4.0);
    commands::save_sampling_settings(&mut ctx.state, settings).unwrap();

    let reset = commands::reset_sampling_settings(&mut ctx.state).unwrap();
    assert_eq!(reset, SamplingSettings::default());
    assert_eq!(ctx.reopen().settings, SamplingSettings::default());
}

#[test]
fn test_zero_weight_folder_is_never_drawn() {
    let mut ctx = TestContext::new();
    for i in 0..5 {
        ctx.add("Math", &format!("m{i}"), "x");
        ctx.add("History", &format!("h{i}"), "y");
    }
    let mut settings = learning_only();
    settings.set_folder_weight("Math", 0.0);
    commands::save_sampling_settings(&mut ctx.state, settings).unwrap();
    commands::set_active_folders(&mut ctx.state, vec!["Math".into(), "History".into()]);

    for _ in 0..200 {
        let draw = commands::next_card(&mut ctx.state).unwrap();
        assert_eq!(draw.location.folder, "History");
    }
}

#[test]
fn test_zero_chance_level_is_skipped() {
    let mut ctx = TestContext::new();
    ctx.add("Math", "learning", "x");
    let mastered = ctx.add("Math", "mastered", "y");
    let id = ctx.state.store.card_at(&mastered).unwrap().id;
    for _ in 0..3 {
        let location = ctx.state.store.locate(id).unwrap();
        let card = ctx.state.store.card_at(&location).unwrap().clone();
        ctx.state.current = Some(practice_core::Draw { location, card });
        commands::report_outcome(&mut ctx.state, true).unwrap();
    }

    commands::save_sampling_settings(&mut ctx.state, learning_only()).unwrap();
    commands::set_active_folders(&mut ctx.state, vec!["Math".into()]);

    for _ in 0..200 {
        let draw = commands::next_card(&mut ctx.state).unwrap();
        assert_eq!(draw.card.question, "learning");
    }
}

#[test]
fn test_save_now_without_mirror() {
    let mut ctx = TestContext::new();
    ctx.add("Math", "q", "a");

    let response = commands::save_now(&mut ctx.state).unwrap();
    assert_eq!(response.mirror, MirrorStatus::Disabled);
    assert_eq!(commands::mirror_status(&mut ctx.state), MirrorStatus::Disabled);
    assert_eq!(response.bytes_written, ctx.read_document().len());
}
