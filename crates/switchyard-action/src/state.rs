//! The environment-owned topology vector.
//!
//! Actions only describe one step's deltas; connectivity lives here and
//! persists across steps. In particular a slot disconnected by one action
//! stays disconnected until a later action explicitly reconnects it.

use std::sync::Arc;

use tracing::trace;

use switchyard_core::{BusTarget, GridRegistry, SlotId};

use crate::action::{TopologyAction, DETACH_KINDS};

/// Raw topology value for a disconnected slot.
const DISCONNECTED: i32 = -1;

/// Per-slot busbar state of the whole grid, owned by the environment.
///
/// Values follow the raw assignment encoding: `-1` disconnected, `n >= 1`
/// connected to busbar `n`. There is no neutral `0` here — every terminal
/// is always in some definite state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyState {
    registry: Arc<GridRegistry>,
    topo: Vec<i32>,
}

impl TopologyState {
    /// A fresh state with every terminal on busbar 1.
    pub fn new(registry: Arc<GridRegistry>) -> Self {
        let topo = vec![1; registry.dim_topo()];
        Self { registry, topo }
    }

    /// The registry this state is bound to.
    pub fn registry(&self) -> &Arc<GridRegistry> {
        &self.registry
    }

    /// The raw value of one slot.
    pub fn get(&self, slot: SlotId) -> Option<i32> {
        self.topo.get(slot.0 as usize).copied()
    }

    /// The whole topology vector.
    pub fn as_slice(&self) -> &[i32] {
        &self.topo
    }

    /// Apply one validated action's deltas.
    ///
    /// The caller is responsible for having run validation; apply itself
    /// resolves fields mechanically:
    ///
    /// - `set_bus` entries overwrite their slot;
    /// - `change_bus` toggles busbar 1↔2 on connected slots and leaves
    ///   disconnected slots alone;
    /// - declared detach flags force every terminal of the element to
    ///   disconnected.
    ///
    /// Slots the action does not touch keep their previous value — this is
    /// where shedding persistence comes from.
    ///
    /// # Panics
    ///
    /// Panics if the action is bound to a different registry.
    pub fn apply(&mut self, action: &TopologyAction) {
        assert!(
            *action.registry() == self.registry,
            "action and topology state are bound to different registries"
        );
        for (&slot, &target) in &action.set_bus {
            self.topo[slot.0 as usize] = target.to_raw();
        }
        for slot in &action.change_bus {
            let value = &mut self.topo[slot.0 as usize];
            *value = match *value {
                1 => 2,
                2 => 1,
                other => other,
            };
        }
        for kind in DETACH_KINDS {
            let field = action.detach_field(kind).expect("detachable kind");
            if !field.declared {
                continue;
            }
            for (index, &flagged) in field.flags.iter().enumerate() {
                if !flagged {
                    continue;
                }
                for slot in self.registry.slots_of(kind, index) {
                    self.topo[slot.0 as usize] = BusTarget::Disconnect.to_raw();
                }
            }
        }
        trace!(%action, "applied action to topology state");
    }

    /// Whether a slot is currently disconnected.
    pub fn is_disconnected(&self, slot: SlotId) -> bool {
        self.get(slot) == Some(DISCONNECTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionClass;
    use crate::space::ActionSpace;
    use switchyard_core::{ElementKind, GridConfig};
    use switchyard_test_utils::case5;

    fn space() -> ActionSpace {
        ActionSpace::new(case5(), GridConfig::with_detachment(), ActionClass::Complete)
    }

    #[test]
    fn fresh_state_is_all_busbar_one() {
        let state = TopologyState::new(case5());
        assert!(state.as_slice().iter().all(|&v| v == 1));
    }

    #[test]
    fn set_bus_overwrites_slot() {
        let space = space();
        let mut state = TopologyState::new(space.registry().clone());
        let mut action = space.empty();
        action.set_bus([(0u32, 2), (5u32, -1)]).unwrap();
        state.apply(&action);
        assert_eq!(state.get(SlotId(0)), Some(2));
        assert!(state.is_disconnected(SlotId(5)));
    }

    #[test]
    fn change_bus_toggles_connected_slots_only() {
        let space = space();
        let mut state = TopologyState::new(space.registry().clone());

        let mut shed = space.empty();
        shed.set_bus([(3u32, -1)]).unwrap();
        state.apply(&shed);

        let mut toggle = space.empty();
        toggle.change_bus([0u32, 3u32]).unwrap();
        state.apply(&toggle);
        assert_eq!(state.get(SlotId(0)), Some(2));
        // Disconnected slot is left alone.
        assert_eq!(state.get(SlotId(3)), Some(-1));

        state.apply(&toggle);
        assert_eq!(state.get(SlotId(0)), Some(1));
    }

    #[test]
    fn detach_forces_all_element_terminals_down() {
        let space = space();
        let registry = space.registry().clone();
        let mut state = TopologyState::new(registry.clone());
        let mut action = space.empty();
        action.detach_load("load_4_2").unwrap();
        state.apply(&action);
        let load_idx = registry.load_index("load_4_2").unwrap();
        let slot = registry.load_pos(load_idx).unwrap();
        assert!(state.is_disconnected(slot));
    }

    #[test]
    fn shedding_persists_across_empty_steps() {
        let space = space();
        let registry = space.registry().clone();
        let mut state = TopologyState::new(registry.clone());
        let slot = registry
            .slots_of(ElementKind::Load, 0)
            .first()
            .copied()
            .unwrap();

        let mut shed = space.empty();
        shed.set_bus(vec![(slot, -1)]).unwrap();
        state.apply(&shed);
        assert!(state.is_disconnected(slot));

        // A do-nothing step does not restore connectivity.
        state.apply(&space.empty());
        assert!(state.is_disconnected(slot));
    }
}
