//! The structured-document form of an action.
//!
//! [`ActionDocument`] is the wire-facing mirror of
//! [`ActionUpdate`](switchyard_action::ActionUpdate): one optional entry per
//! field key, every value a primitive number, string, boolean, or sequence
//! thereof. Encoding is canonical (slot-sorted pairs, sorted slot lists,
//! full flag arrays); decoding accepts every polymorphic shape the setters
//! accept.
//!
//! The action type itself stays serde-free: actions cross the interchange
//! boundary only through this document, keeping the wire shapes and the
//! in-memory representation free to evolve separately.

use serde::{Deserialize, Serialize};

use switchyard_action::{
    ActionSpace, ActionUpdate, ChangeBusInput, ElementRef, FieldState, FlagInput, SetBusInput,
    TopologyAction,
};
use switchyard_core::{CodecError, FieldKey, SlotId};

/// Flat key→value mapping of one action. Absent field = untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionDocument {
    /// Busbar assignments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_bus: Option<SetBusValue>,
    /// Busbar toggles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_bus: Option<ChangeBusValue>,
    /// Load detachment flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detach_load: Option<FlagValue>,
    /// Generator detachment flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detach_gen: Option<FlagValue>,
    /// Storage detachment flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detach_storage: Option<FlagValue>,
}

/// Document shapes of the `set_bus` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetBusValue {
    /// `(slot, raw assignment)` pairs.
    Pairs(Vec<(u32, i32)>),
    /// One raw assignment per topology slot.
    Full(Vec<i32>),
}

/// Document shapes of the `change_bus` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeBusValue {
    /// Slots to toggle.
    Slots(Vec<u32>),
    /// One toggle flag per topology slot.
    Full(Vec<bool>),
}

/// Document shapes of a detachment field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// One flag per element of the kind.
    Full(Vec<bool>),
    /// Several elements by index or name.
    Many(Vec<ElementRefValue>),
    /// A single element by index or name.
    One(ElementRefValue),
}

/// An element reference in a document: index or name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementRefValue {
    /// Element index within its kind.
    Index(usize),
    /// Element name.
    Name(String),
}

impl From<ElementRefValue> for ElementRef {
    fn from(value: ElementRefValue) -> Self {
        match value {
            ElementRefValue::Index(i) => ElementRef::Index(i),
            ElementRefValue::Name(name) => ElementRef::Name(name),
        }
    }
}

impl From<FlagValue> for FlagInput {
    fn from(value: FlagValue) -> Self {
        match value {
            FlagValue::Full(flags) => FlagInput::Full(flags),
            FlagValue::Many(elems) => {
                FlagInput::Many(elems.into_iter().map(ElementRef::from).collect())
            }
            FlagValue::One(elem) => FlagInput::One(elem.into()),
        }
    }
}

impl From<SetBusValue> for SetBusInput {
    fn from(value: SetBusValue) -> Self {
        match value {
            SetBusValue::Pairs(pairs) => {
                SetBusInput::Pairs(pairs.into_iter().map(|(s, v)| (SlotId(s), v)).collect())
            }
            SetBusValue::Full(raws) => SetBusInput::Full(raws),
        }
    }
}

impl From<ChangeBusValue> for ChangeBusInput {
    fn from(value: ChangeBusValue) -> Self {
        match value {
            ChangeBusValue::Slots(slots) => {
                ChangeBusInput::Slots(slots.into_iter().map(SlotId).collect())
            }
            ChangeBusValue::Full(flags) => ChangeBusInput::Full(flags),
        }
    }
}

impl From<ActionDocument> for ActionUpdate {
    fn from(doc: ActionDocument) -> Self {
        ActionUpdate {
            set_bus: doc.set_bus.map(SetBusInput::from),
            change_bus: doc.change_bus.map(ChangeBusInput::from),
            detach_load: doc.detach_load.map(FlagInput::from),
            detach_gen: doc.detach_gen.map(FlagInput::from),
            detach_storage: doc.detach_storage.map(FlagInput::from),
        }
    }
}

/// Encode an action into its canonical document.
///
/// Only live state is emitted: untouched fields are absent, `set_bus`
/// becomes slot-sorted pairs, `change_bus` a sorted slot list, and each
/// declared detach field its full flag array (declared-but-all-false
/// survives the trip).
pub fn encode_document(action: &TopologyAction) -> ActionDocument {
    let mut doc = ActionDocument::default();
    for key in action.authorized_keys().iter() {
        let state = action.field(key).expect("key is authorized");
        match (key, state) {
            (FieldKey::SetBus, FieldState::SetBus(map)) => {
                if !map.is_empty() {
                    let mut pairs: Vec<(u32, i32)> =
                        map.iter().map(|(s, t)| (s.0, t.to_raw())).collect();
                    pairs.sort_unstable_by_key(|&(s, _)| s);
                    doc.set_bus = Some(SetBusValue::Pairs(pairs));
                }
            }
            (FieldKey::ChangeBus, FieldState::ChangeBus(set)) => {
                if !set.is_empty() {
                    doc.change_bus = Some(ChangeBusValue::Slots(
                        set.iter().map(|s| s.0).collect(),
                    ));
                }
            }
            (key, FieldState::Detach { flags, declared }) => {
                if declared {
                    let value = Some(FlagValue::Full(flags.to_vec()));
                    match key {
                        FieldKey::DetachLoad => doc.detach_load = value,
                        FieldKey::DetachGen => doc.detach_gen = value,
                        FieldKey::DetachStorage => doc.detach_storage = value,
                        _ => unreachable!("detach state only comes from detach keys"),
                    }
                }
            }
            _ => unreachable!("field state matches its key"),
        }
    }
    doc
}

/// Decode a document into a validated action through the space's factory.
pub fn decode_document(
    space: &ActionSpace,
    doc: ActionDocument,
) -> Result<TopologyAction, CodecError> {
    space
        .from_update(doc.into())
        .map_err(|reason| CodecError::FieldRejected { reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_action::ActionClass;
    use switchyard_core::GridConfig;
    use switchyard_test_utils::case5;

    fn space() -> ActionSpace {
        ActionSpace::new(case5(), GridConfig::with_detachment(), ActionClass::Complete)
    }

    fn round_trip(action: &TopologyAction, space: &ActionSpace) -> TopologyAction {
        decode_document(space, encode_document(action)).unwrap()
    }

    #[test]
    fn empty_action_encodes_to_empty_document() {
        let space = space();
        let action = space.empty();
        let doc = encode_document(&action);
        assert_eq!(doc, ActionDocument::default());
        assert_eq!(round_trip(&action, &space), action);
    }

    #[test]
    fn round_trip_every_field() {
        let space = space();
        let mut action = space.empty();
        action.set_bus([(0u32, 2), (18u32, -1)]).unwrap();
        action.change_bus([5u32]).unwrap();
        action.detach_load(2usize).unwrap();
        action.detach_storage(0usize).unwrap();
        assert_eq!(round_trip(&action, &space), action);
    }

    #[test]
    fn declared_all_false_survives_the_document_trip() {
        let space = space();
        let mut action = space.empty();
        let n_load = space.registry().n_load();
        action.detach_load(vec![false; n_load]).unwrap();

        let doc = encode_document(&action);
        assert_eq!(doc.detach_load, Some(FlagValue::Full(vec![false; n_load])));

        let back = round_trip(&action, &space);
        assert_eq!(back, action);
        // Equality is effective, but the declaration itself also survives.
        assert!(matches!(
            back.field(FieldKey::DetachLoad).unwrap(),
            FieldState::Detach { declared: true, .. }
        ));
    }

    #[test]
    fn canonical_pairs_are_slot_sorted() {
        let space = space();
        let mut action = space.empty();
        action.set_bus([(18u32, -1), (0u32, 1)]).unwrap();
        let doc = encode_document(&action);
        assert_eq!(doc.set_bus, Some(SetBusValue::Pairs(vec![(0, 1), (18, -1)])));
    }

    #[test]
    fn ambiguous_actions_serialize_too() {
        // Serialization never validates: a self-contradictory action
        // round-trips like any other.
        let space = space();
        let mut action = space.empty();
        action.set_bus([(0u32, 1)]).unwrap();
        action.detach_load(0usize).unwrap();
        assert!(action.is_ambiguous().0);
        assert_eq!(round_trip(&action, &space), action);
    }

    #[test]
    fn decode_rejects_unauthorized_field() {
        let reduced = ActionSpace::new(case5(), GridConfig::default(), ActionClass::SetBusOnly);
        let doc = ActionDocument {
            change_bus: Some(ChangeBusValue::Slots(vec![0])),
            ..Default::default()
        };
        let err = decode_document(&reduced, doc).unwrap_err();
        assert!(matches!(err, CodecError::FieldRejected { .. }));
    }

    #[test]
    fn decode_rejects_bad_shape() {
        let space = space();
        let doc = ActionDocument {
            detach_load: Some(FlagValue::Full(vec![true])),
            ..Default::default()
        };
        let err = decode_document(&space, doc).unwrap_err();
        assert!(matches!(err, CodecError::FieldRejected { .. }));
    }
}
