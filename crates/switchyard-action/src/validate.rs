//! The ambiguity validator and the environment legality hook.
//!
//! Ambiguity is a property of the action alone: do its fields contradict
//! each other? The checks run in a fixed precedence order and the first
//! violated rule names the result. Everything beyond ambiguity — slot
//! budgets, substation limits, busbar counts — is environment policy and
//! plugs in through [`LegalityCheck`].

use std::collections::BTreeSet;

use tracing::debug;

use switchyard_core::{
    ActionRejection, AmbiguousAction, GridConfig, IllegalAction,
};

use crate::action::{TopologyAction, DETACH_KINDS};

/// Scan an action for self-contradictions.
///
/// Pure: never mutates the action, deterministic for identical input.
/// Rule precedence (first failure wins), scanning kinds in load →
/// generator → storage order:
///
/// 1. a declared-detached element also appears in `change_bus`;
/// 2. a declared-detached element has a live `set_bus` entry;
/// 3. a detach flag is raised without its declaration marker.
///
/// The reverse of rule 2 is deliberately legal: a bare
/// `set_bus = disconnect` without the matching detach flag is the
/// lower-level disconnect mechanism, not a contradiction.
pub fn check_ambiguity(action: &TopologyAction) -> Option<AmbiguousAction> {
    let registry = action.registry();

    // Rule 1: detach + change_bus on the same element.
    for kind in DETACH_KINDS {
        let field = action.detach_field(kind).expect("detachable kind");
        if !field.declared {
            continue;
        }
        for (index, &flagged) in field.flags.iter().enumerate() {
            if !flagged {
                continue;
            }
            for slot in registry.slots_of(kind, index) {
                if action.change_bus.contains(slot) {
                    return Some(AmbiguousAction::DetachAndChangeBus { kind, index });
                }
            }
        }
    }

    // Rule 2: detach + live set_bus entry on the same element.
    for kind in DETACH_KINDS {
        let field = action.detach_field(kind).expect("detachable kind");
        if !field.declared {
            continue;
        }
        for (index, &flagged) in field.flags.iter().enumerate() {
            if !flagged {
                continue;
            }
            for slot in registry.slots_of(kind, index) {
                if action.set_bus.contains_key(&slot) {
                    return Some(AmbiguousAction::DetachAndSetBus { kind, index });
                }
            }
        }
    }

    // Rule 3: flag raised behind the declaration marker's back.
    for kind in DETACH_KINDS {
        let field = action.detach_field(kind).expect("detachable kind");
        if !field.declared && field.flags.iter().any(|&f| f) {
            return Some(AmbiguousAction::UndeclaredDetachment { kind });
        }
    }

    None
}

impl TopologyAction {
    /// The step-loop convenience form of [`check_ambiguity`].
    pub fn is_ambiguous(&self) -> (bool, Option<AmbiguousAction>) {
        match check_ambiguity(self) {
            Some(reason) => (true, Some(reason)),
            None => (false, None),
        }
    }
}

/// An environment-level legality rule, run after the ambiguity checks.
///
/// Implementations live with the environment, not with this core; the
/// trait is the hook they plug into. Checks receive the configuration
/// explicitly and must be pure.
pub trait LegalityCheck {
    /// Stable name, used in rejection reports.
    fn name(&self) -> &str;

    /// Accept or reject the action.
    fn check(&self, action: &TopologyAction, config: &GridConfig) -> Result<(), IllegalAction>;
}

/// Run the full validation pipeline: ambiguity rules first, then each
/// legality check in order. The first rejection wins.
pub fn validate(
    action: &TopologyAction,
    config: &GridConfig,
    checks: &[&dyn LegalityCheck],
) -> Result<(), ActionRejection> {
    if let Some(reason) = check_ambiguity(action) {
        debug!(%reason, "action rejected as ambiguous");
        return Err(ActionRejection::Ambiguous(reason));
    }
    for check in checks {
        if let Err(reason) = check.check(action, config) {
            debug!(check = check.name(), %reason, "action rejected as illegal");
            return Err(ActionRejection::Illegal(reason));
        }
    }
    Ok(())
}

/// Rejects actions whose `set_bus`/`change_bus` slots span more than
/// `limit` distinct substations in one step.
pub struct MaxSubstationsChanged {
    /// Maximum number of substations one action may touch.
    pub limit: usize,
}

impl LegalityCheck for MaxSubstationsChanged {
    fn name(&self) -> &str {
        "max_substations_changed"
    }

    fn check(&self, action: &TopologyAction, _config: &GridConfig) -> Result<(), IllegalAction> {
        let registry = action.registry();
        let touched: BTreeSet<usize> = action
            .touched_slots()
            .iter()
            .filter_map(|slot| registry.substation_of(slot))
            .collect();
        if touched.len() > self.limit {
            return Err(IllegalAction {
                check: self.name().to_owned(),
                reason: format!(
                    "{} substations touched, limit {}",
                    touched.len(),
                    self.limit
                ),
            });
        }
        Ok(())
    }
}
