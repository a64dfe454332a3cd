//! Benchmark profiles for the Switchyard action subsystem.
//!
//! Provides pre-built action spaces and representative actions so the
//! benches measure codec and validator cost, not setup cost.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use switchyard_action::{ActionClass, ActionSpace, TopologyAction};
use switchyard_core::GridConfig;
use switchyard_test_utils::case5;

/// The reference benchmark space: the five-substation fixture grid with
/// detachment enabled and every field authorized.
pub fn reference_space() -> ActionSpace {
    ActionSpace::new(case5(), GridConfig::with_detachment(), ActionClass::Complete)
}

/// A busy action touching every field kind: two assignments, two toggles,
/// one load shed.
pub fn busy_action(space: &ActionSpace) -> TopologyAction {
    let mut action = space.empty();
    action.set_bus([(0u32, 2), (18u32, -1)]).unwrap();
    action.change_bus([5u32, 13u32]).unwrap();
    action.detach_load([1usize]).unwrap();
    action
}
