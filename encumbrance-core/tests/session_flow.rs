//! End-to-end flows through the headless tracker.
//!
//! These cover a full editing session:
//! - Building a ledger by hand and from the CEL
//! - Strength and modifiers against slot capacity
//! - Switching measurement systems
//! - Clears and repopulating the CEL

use encumbrance_core::headless::{HeadlessTracker, ResponseKind};
use encumbrance_core::{Category, MeasurementSystem};

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

async fn run(tracker: &mut HeadlessTracker, lines: &[&str]) {
    for line in lines {
        if let Err(e) = tracker.send(line).await {
            panic!("'{line}' failed: {e}");
        }
    }
}

#[tokio::test]
async fn test_rope_and_torches() {
    setup();
    let mut tracker = HeadlessTracker::in_memory();

    run(
        &mut tracker,
        &[
            "str 10",
            "add Rope",
            "weight 1 10",
            "qty 1 2",
            "add Torch",
            "weight 2 1",
            "qty 2 5",
        ],
    )
    .await;

    let response = tracker.send("status").await.expect("status");
    assert_eq!(response.kind, ResponseKind::Info);
    assert_eq!(response.total_weight, 25.0);
    assert_eq!(response.slots_used, Some(1));
    assert!(!response.over_encumbered);

    let report = tracker.session().report();
    assert_eq!(report.slots_available(), Some(9));
    assert!(report
        .to_string()
        .starts_with("Total Weight: 25 Gold Pieces (2.50 lbs, 1 Slots)"));
}

#[tokio::test]
async fn test_packing_from_the_cel_until_over_encumbered() {
    setup();
    let mut tracker = HeadlessTracker::in_memory();
    run(&mut tracker, &["str 1", "cel armor 1"]).await;

    let armor = tracker.session().state().catalog.entries(Category::Armor)[0].clone();
    let expected_slots = (armor.unit_weight / 100.0).ceil() as i64;
    assert_eq!(
        tracker.session().report().slots_used(),
        Some(expected_slots)
    );

    let response = tracker.send("add Anvil").await.expect("add");
    assert!(!response.over_encumbered);

    let response = tracker.send("weight 2 250").await.expect("weight");
    assert_eq!(response.slots_used, Some(3));
    assert!(response.over_encumbered);

    // A belt of giant strength fixes it
    let response = tracker
        .send("mod 20 Belt of Giant Strength")
        .await
        .expect("mod");
    assert!(!response.over_encumbered);
}

#[tokio::test]
async fn test_classic_system_has_no_slots() {
    setup();
    let mut tracker = HeadlessTracker::in_memory();
    run(&mut tracker, &["str 0", "add Chest", "weight 1 1000"]).await;
    assert!(tracker.session().report().over_encumbered());

    let response = tracker.send("system").await.expect("system");
    assert_eq!(tracker.session().state().system, MeasurementSystem::Classic);
    assert_eq!(response.text, "Classic System");
    assert_eq!(response.slots_used, None);
    assert!(!response.over_encumbered);

    let kilograms = tracker.session().report().kilograms().expect("classic");
    assert!((kilograms - 45.3592).abs() < 1e-9);
}

#[tokio::test]
async fn test_clears() {
    setup();
    let mut tracker = HeadlessTracker::in_memory();
    run(
        &mut tracker,
        &[
            "charname Ilse",
            "race Gnome",
            "str 8",
            "mod 1 Ring",
            "add Lantern",
            "celnew misc 2 Lucky Coin",
        ],
    )
    .await;
    let catalog_size = tracker.session().state().catalog.len();

    run(&mut tracker, &["clear"]).await;
    let state = tracker.session().state();
    assert!(state.name.is_empty());
    assert!(state.race.is_empty());
    assert_eq!(state.strength, 0);
    assert!(state.modifiers.is_empty());
    assert!(state.ledger.is_empty());
    assert_eq!(state.catalog.len(), catalog_size);

    run(&mut tracker, &["clearall"]).await;
    assert!(tracker.session().state().catalog.is_empty());

    run(&mut tracker, &["repopulate"]).await;
    let catalog = &tracker.session().state().catalog;
    assert_eq!(catalog.len(), 65);
    assert!(catalog.find("lucky coin").is_none());
}

#[tokio::test]
async fn test_failed_commands_leave_state_alone() {
    setup();
    let mut tracker = HeadlessTracker::in_memory();
    run(&mut tracker, &["add Rope", "weight 1 10"]).await;
    let before = tracker.session().state().clone();

    for line in [
        "rm 5",
        "celweight weapons 1 -3",
        "celweight weapons 99 3",
        "celnew gems nope Ruby",
        "mod 3",
        "unmod 1",
        "import",
        "load",
    ] {
        assert!(tracker.send(line).await.is_err(), "'{line}' should fail");
    }

    assert_eq!(tracker.session().state(), &before);
}

#[tokio::test]
async fn test_impossible_loads_still_warn() {
    setup();
    let mut tracker = HeadlessTracker::in_memory();
    run(
        &mut tracker,
        &["str 10", "add A", "weight 1 1e308", "add B", "weight 2 1e308"],
    )
    .await;

    let response = tracker.send("status").await.expect("status");
    assert_eq!(response.total_weight, f64::INFINITY);
    assert_eq!(response.slots_used, Some(i64::MAX));
    assert!(response.over_encumbered);

    run(&mut tracker, &["rm 2", "qty 1 10"]).await;
    let response = tracker.send("status").await.expect("status");
    assert_eq!(response.total_weight, f64::INFINITY);
    assert!(response.over_encumbered);
}
