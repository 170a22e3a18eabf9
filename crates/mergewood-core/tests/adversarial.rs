//! Adversarial tests: hostile indices, wrong-kind targets, and malformed
//! saves. Every rejected operation must leave the session exactly as it
//! was.

use mergewood_core::error::ActionError;
use mergewood_core::id::{ProducerId, SpecialKind};
use mergewood_core::item::Item;
use mergewood_core::serialize::SaveState;
use mergewood_core::session::GameSession;
use mergewood_core::test_utils::*;

// ===========================================================================
// Hostile indices
// ===========================================================================

#[test]
fn tap_rejects_everything_but_markers() {
    let mut session = new_session(1, 0);
    // Empty cell, piece cell, out of range.
    assert_eq!(session.tap(30, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.tap(1, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.tap(9999, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.energy().current(), 100);
    assert_eq!(session.stats().items_produced, 0);
}

#[test]
fn drag_rejects_bad_sources_and_targets() {
    let mut session = new_session(1, 0);

    // Empty and out-of-range sources.
    assert_eq!(session.drag_drop(30, 1, 0), Err(ActionError::InvalidTarget));
    assert_eq!(
        session.drag_drop(9999, 1, 0),
        Err(ActionError::InvalidTarget)
    );
    // Markers are tapped, not dragged.
    assert_eq!(session.drag_drop(0, 1, 0), Err(ActionError::InvalidTarget));
    // Dropping a piece onto a marker is not a merge.
    assert_eq!(session.drag_drop(1, 0, 0), Err(ActionError::InvalidTarget));
    // Dropping onto itself.
    assert_eq!(session.drag_drop(1, 1, 0), Err(ActionError::InvalidTarget));

    // Nothing moved.
    assert_eq!(session.grid().get(0), Some(&Item::ProducerMarker(satchel())));
    assert_eq!(session.grid().get(1), Some(&Item::piece(woodland(), 1)));
}

#[test]
fn drag_onto_a_locked_cell_is_rejected() {
    let tuning = mergewood_core::registry::Tuning {
        initial_cobwebs: vec![(4, 4)],
        ..open_board_tuning()
    };
    let mut session = GameSession::new_game(test_registry(), tuning, 1, 0);
    let locked = session.grid().index(4, 4).unwrap();
    assert_eq!(
        session.drag_drop(1, locked, 0),
        Err(ActionError::InvalidTarget)
    );
    assert_eq!(session.grid().get(1), Some(&Item::piece(woodland(), 1)));
    assert!(session.grid().cell_is_locked(locked));
}

#[test]
fn sell_rejects_markers_and_empty_cells() {
    let mut session = new_session(1, 0);
    assert_eq!(session.sell(0, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.sell(30, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.sell(9999, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.economy().coins(), 0);
    assert!(session.grid().get(0).is_some());
}

#[test]
fn retrieve_from_an_empty_or_missing_slot_fails() {
    let mut session = new_session(1, 0);
    assert_eq!(session.retrieve_item(0), Err(ActionError::InvalidTarget));
    session.expand_inventory().unwrap();
    assert_eq!(session.retrieve_item(0), Err(ActionError::InvalidTarget));
    assert_eq!(session.retrieve_item(99), Err(ActionError::InvalidTarget));
}

#[test]
fn expand_inventory_stops_at_the_cap() {
    let tuning = mergewood_core::registry::Tuning {
        inventory_initial_slots: 2,
        inventory_max_slots: 2,
        ..open_board_tuning()
    };
    let mut session = GameSession::new_game(test_registry(), tuning, 1, 0);
    assert_eq!(session.expand_inventory(), Err(ActionError::NoSpace));
    assert_eq!(session.economy().gems(), 10);
}

#[test]
fn hourglass_on_an_unknown_producer_keeps_the_charge() {
    let mut session = new_session(1, 0);
    session.add_special_charges(SpecialKind::Hourglass, 1);
    assert_eq!(
        session.use_hourglass(ProducerId(99), 0),
        Err(ActionError::InvalidTarget)
    );
    assert_eq!(session.specials().count(SpecialKind::Hourglass), 1);
}

#[test]
fn scissors_on_hostile_targets() {
    let mut session = new_session(1, 0);
    session.add_special_charges(SpecialKind::Scissors, 1);
    // Level 1, marker, empty, out of range.
    assert_eq!(session.use_scissors(1, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.use_scissors(0, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.use_scissors(30, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.use_scissors(9999, 0), Err(ActionError::InvalidTarget));
    assert_eq!(session.specials().count(SpecialKind::Scissors), 1);
}

// ===========================================================================
// Hostile saves
// ===========================================================================

#[test]
fn oversized_grid_vector_is_truncated() {
    let board_len = 9 * 7;
    let save = SaveState {
        grid: vec![Some(Item::piece(woodland(), 1)); board_len + 50],
        ..SaveState::default()
    };
    let session = GameSession::load(test_registry(), open_board_tuning(), save, 0);
    assert_eq!(session.grid().len(), board_len);
    // Every board cell holds the saved piece; the overflow is gone.
    assert_eq!(session.grid().occupied().count(), board_len);
}

#[test]
fn items_saved_on_cobweb_cells_are_dropped() {
    let tuning = mergewood_core::registry::Tuning {
        initial_cobwebs: vec![(0, 0)],
        ..open_board_tuning()
    };
    let save = SaveState {
        grid: vec![Some(Item::piece(woodland(), 3))],
        cobwebs: vec![(0, 0)],
        ..SaveState::default()
    };
    let session = GameSession::load(test_registry(), tuning, save, 0);
    assert!(session.grid().cell_is_locked(0));
    assert_eq!(session.grid().get(0), None);
}

#[test]
fn oversized_inventory_is_clamped_to_max_slots() {
    let save = SaveState {
        inventory_slots: 500,
        inventory_items: vec![Some(Item::piece(woodland(), 1)); 500],
        ..SaveState::default()
    };
    let session = GameSession::load(test_registry(), open_board_tuning(), save, 0);
    assert_eq!(session.inventory().slots(), 28);
}

#[test]
fn empty_producer_lists_default_to_the_first_unlock() {
    let save = SaveState::default();
    let session = GameSession::load(test_registry(), open_board_tuning(), save, 0);
    assert_eq!(session.unlocked_producers(), &[satchel()]);
    assert_eq!(session.active_producers(), &[satchel()]);
    // Its marker was re-placed and the state map filled in.
    assert!(session.producer_state(satchel()).unwrap().grid_index.is_some());
}

#[test]
fn saved_orders_beyond_the_slot_count_are_dropped() {
    let save = SaveState {
        orders: vec![None; 10],
        ..SaveState::default()
    };
    let session = GameSession::load(test_registry(), open_board_tuning(), save, 0);
    assert_eq!(session.orders().slot_count(), 3);
}

#[test]
fn saved_state_for_a_locked_producer_is_ignored() {
    // The save claims sprinkler state, but sprinkler is not unlocked.
    let mut producers = std::collections::BTreeMap::new();
    producers.insert(
        sprinkler(),
        mergewood_core::producer::ProducerState {
            buffer_used: 5,
            cooldown_start: Some(1),
            uses_left: None,
            grid_index: Some(3),
        },
    );
    let save = SaveState {
        producers,
        unlocked_producers: vec![satchel()],
        active_producers: vec![satchel()],
        ..SaveState::default()
    };
    let session = GameSession::load(test_registry(), open_board_tuning(), save, 0);
    assert!(session.producer_state(sprinkler()).is_none());
}

#[cfg(feature = "json-save")]
#[test]
fn empty_json_save_boots_a_playable_session() {
    let save = mergewood_core::serialize::from_json("{}").unwrap();
    let mut session = GameSession::load(test_registry(), open_board_tuning(), save, 0);
    // Default save: full energy, first producer placed, orders generated.
    assert_eq!(session.energy().current(), 100);
    assert!(session.orders().slots().iter().all(|s| s.is_some()));
    let marker = session.producer_state(satchel()).unwrap().grid_index.unwrap();
    assert!(session.tap(marker, 0).is_ok());
}

#[test]
fn marker_in_the_save_grid_is_adopted_not_duplicated() {
    // The marker sits at cell 5 in the save, while the state map says 3.
    let mut producers = std::collections::BTreeMap::new();
    producers.insert(
        satchel(),
        mergewood_core::producer::ProducerState {
            buffer_used: 0,
            cooldown_start: None,
            uses_left: None,
            grid_index: Some(3),
        },
    );
    let mut grid = vec![None; 9 * 7];
    grid[5] = Some(Item::ProducerMarker(satchel()));
    let save = SaveState {
        grid,
        producers,
        unlocked_producers: vec![satchel()],
        active_producers: vec![satchel()],
        ..SaveState::default()
    };
    let session = GameSession::load(test_registry(), open_board_tuning(), save, 0);
    assert_eq!(
        session.producer_state(satchel()).unwrap().grid_index,
        Some(5)
    );
    let markers = session
        .grid()
        .occupied()
        .filter(|(_, item)| item.is_marker())
        .count();
    assert_eq!(markers, 1);
}
