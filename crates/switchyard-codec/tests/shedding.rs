//! End-to-end shedding scenarios on the five-substation fixture grid:
//! build action → validate → apply to the environment topology state,
//! with serialization checkpoints along the way.

use switchyard_action::{
    validate, ActionClass, ActionSpace, ActionUpdate, MaxSubstationsChanged, TopologyState,
};
use switchyard_codec::{decode_document, decode_json, decode_vect, encode_document, encode_json,
    encode_vect};
use switchyard_core::{AmbiguousAction, ElementKind, FieldKey, GridConfig, SlotId};
use switchyard_test_utils::case5;

fn shedding_space() -> ActionSpace {
    ActionSpace::new(case5(), GridConfig::with_detachment(), ActionClass::Complete)
}

/// Validate then apply, the way an environment step does.
fn step(state: &mut TopologyState, space: &ActionSpace, update: ActionUpdate) {
    let action = space.from_update(update).unwrap();
    let budget = MaxSubstationsChanged { limit: 5 };
    validate(&action, space.config(), &[&budget]).unwrap();
    state.apply(&action);
}

#[test]
fn detachment_keys_follow_the_parameter() {
    let space = shedding_space();
    assert!(space.authorized_keys().contains(FieldKey::DetachLoad));

    let disabled = ActionSpace::new(case5(), GridConfig::default(), ActionClass::Complete);
    assert!(!disabled.authorized_keys().contains(FieldKey::DetachLoad));
}

#[test]
fn shed_single_load() {
    let space = shedding_space();
    let registry = space.registry().clone();
    let mut state = TopologyState::new(registry.clone());

    let load_idx = registry.load_index("load_4_2").unwrap();
    let load_pos = registry.load_pos(load_idx).unwrap();
    step(
        &mut state,
        &space,
        ActionUpdate {
            set_bus: Some(vec![(load_pos, -1)].into()),
            ..Default::default()
        },
    );
    assert_eq!(state.get(load_pos), Some(-1));
}

#[test]
fn shed_single_generator() {
    let space = shedding_space();
    let registry = space.registry().clone();
    let mut state = TopologyState::new(registry.clone());

    let gen_idx = registry.gen_index("gen_0_0").unwrap();
    let gen_pos = registry.gen_pos(gen_idx).unwrap();
    step(
        &mut state,
        &space,
        ActionUpdate {
            set_bus: Some(vec![(gen_pos, -1)].into()),
            ..Default::default()
        },
    );
    assert_eq!(state.get(gen_pos), Some(-1));
}

#[test]
fn shed_multiple_loads_in_one_step() {
    let space = shedding_space();
    let registry = space.registry().clone();
    let mut state = TopologyState::new(registry.clone());

    let pos1 = registry
        .load_pos(registry.load_index("load_4_2").unwrap())
        .unwrap();
    let pos2 = registry
        .load_pos(registry.load_index("load_3_1").unwrap())
        .unwrap();
    step(
        &mut state,
        &space,
        ActionUpdate {
            set_bus: Some(vec![(pos1, -1), (pos2, -1)].into()),
            ..Default::default()
        },
    );
    assert_eq!(state.get(pos1), Some(-1));
    assert_eq!(state.get(pos2), Some(-1));
}

#[test]
fn shed_load_and_generator_together() {
    let space = shedding_space();
    let registry = space.registry().clone();
    let mut state = TopologyState::new(registry.clone());

    let load_pos = registry
        .load_pos(registry.load_index("load_4_2").unwrap())
        .unwrap();
    let gen_pos = registry
        .gen_pos(registry.gen_index("gen_0_0").unwrap())
        .unwrap();
    step(
        &mut state,
        &space,
        ActionUpdate {
            set_bus: Some(vec![(load_pos, -1), (gen_pos, -1)].into()),
            ..Default::default()
        },
    );
    assert_eq!(state.get(load_pos), Some(-1));
    assert_eq!(state.get(gen_pos), Some(-1));
}

#[test]
fn shedding_persists_until_reconnected() {
    let space = shedding_space();
    let registry = space.registry().clone();
    let mut state = TopologyState::new(registry.clone());

    let load_pos = registry
        .load_pos(registry.load_index("load_4_2").unwrap())
        .unwrap();
    step(
        &mut state,
        &space,
        ActionUpdate {
            set_bus: Some(vec![(load_pos, -1)].into()),
            ..Default::default()
        },
    );
    // A do-nothing step leaves the load shed.
    step(&mut state, &space, ActionUpdate::default());
    assert_eq!(state.get(load_pos), Some(-1));

    // Reconnection is an explicit assignment.
    step(
        &mut state,
        &space,
        ActionUpdate {
            set_bus: Some(vec![(load_pos, 1)].into()),
            ..Default::default()
        },
    );
    assert_eq!(state.get(load_pos), Some(1));
}

#[test]
fn detach_flag_shapes_agree() {
    let space = shedding_space();
    let n_load = space.registry().n_load();

    let mut by_array = space.empty();
    let mut flags = vec![false; n_load];
    flags[1] = true;
    by_array.detach_load(flags).unwrap();

    let mut by_index = space.empty();
    by_index.detach_load(1usize).unwrap();

    let mut by_list = space.empty();
    by_list.detach_load(vec![1usize]).unwrap();

    let mut by_name = space.empty();
    by_name.detach_load("load_3_1").unwrap();

    for other in [&by_index, &by_list, &by_name] {
        assert_eq!(&by_array, other);
    }
}

#[test]
fn detach_conflicts_are_ambiguous() {
    let space = shedding_space();
    let registry = space.registry().clone();
    let load_slot = registry.load_pos(0).unwrap();

    // change_bus + detach on the same load.
    let mut act = space.empty();
    act.change_bus(vec![load_slot]).unwrap();
    act.detach_load([0usize]).unwrap();
    let (is_amb, reason) = act.is_ambiguous();
    assert!(is_amb);
    assert_eq!(
        reason,
        Some(AmbiguousAction::DetachAndChangeBus {
            kind: ElementKind::Load,
            index: 0
        })
    );

    // set_bus + detach on the same load.
    let mut act = space.empty();
    act.set_bus(vec![(load_slot, 1)]).unwrap();
    act.detach_load([0usize]).unwrap();
    let (is_amb, reason) = act.is_ambiguous();
    assert!(is_amb);
    assert_eq!(
        reason,
        Some(AmbiguousAction::DetachAndSetBus {
            kind: ElementKind::Load,
            index: 0
        })
    );

    // Raw flag without declaration.
    let mut act = space.empty();
    act.set_detach_flag_raw(ElementKind::Load, 0, true);
    let (is_amb, reason) = act.is_ambiguous();
    assert!(is_amb);
    assert_eq!(
        reason,
        Some(AmbiguousAction::UndeclaredDetachment {
            kind: ElementKind::Load
        })
    );
}

#[test]
fn document_round_trip_preserves_detachment() {
    let space = shedding_space();
    let mut act = space.empty();
    act.detach_load([0usize]).unwrap();

    let doc = encode_document(&act);
    let reloaded = decode_document(&space, doc).unwrap();
    assert_eq!(act, reloaded);
}

#[test]
fn json_round_trip_survives_reparse() {
    let space = shedding_space();
    let mut act = space.empty();
    act.detach_load([0usize]).unwrap();

    // The text form survives a write/read cycle verbatim: parse the text
    // back into a generic value and re-serialize before decoding.
    let text = encode_json(&act).unwrap();
    let reread: serde_json::Value = serde_json::from_str(&text).unwrap();
    let text_again = serde_json::to_string(&reread).unwrap();
    let reloaded = decode_json(&space, &text_again).unwrap();
    assert_eq!(act, reloaded);
}

#[test]
fn vector_round_trip_preserves_detachment() {
    let space = shedding_space();
    let mut act = space.empty();
    act.detach_load([0usize]).unwrap();

    let vect = encode_vect(&act);
    let reloaded = decode_vect(&space, &vect).unwrap();
    assert_eq!(act, reloaded);
}

#[test]
fn substation_budget_applies_to_wide_actions() {
    let space = shedding_space();
    let tight = MaxSubstationsChanged { limit: 1 };

    // Slots 0 and 18 sit in substations 0 and 4.
    let mut wide = space.empty();
    wide.set_bus([(SlotId(0), 2), (SlotId(18), 2)]).unwrap();
    assert!(validate(&wide, space.config(), &[&tight]).is_err());

    let mut narrow = space.empty();
    narrow.set_bus([(SlotId(0), 2)]).unwrap();
    assert!(validate(&narrow, space.config(), &[&tight]).is_ok());
}
