//! Error types for the Switchyard action subsystem.
//!
//! All subsystem errors live in this leaf crate, organized by boundary:
//! registry construction, field mutation, ambiguity, legality, and
//! serialization. Every enum hand-implements `Display` and `Error`.

use std::error::Error;
use std::fmt;

use crate::id::{ElementKind, SlotId};
use crate::key::FieldKey;

/// Errors from [`GridRegistry`](crate::GridRegistry) construction.
///
/// A registry is rejected wholesale on the first violated layout rule;
/// a half-valid registry is never observable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A kind's name and position lists have different lengths.
    CountMismatch {
        /// The element kind with the mismatch.
        kind: ElementKind,
        /// Number of names supplied.
        names: usize,
        /// Number of topology positions supplied.
        positions: usize,
    },
    /// Two elements of the same kind share a name.
    DuplicateName {
        /// The element kind.
        kind: ElementKind,
        /// The offending name.
        name: String,
    },
    /// A position points outside `[0, dim_topo)`.
    SlotOutOfRange {
        /// The offending slot.
        slot: SlotId,
        /// The registry's topology-vector length.
        dim_topo: usize,
    },
    /// Two terminals claim the same topology slot.
    SlotReused {
        /// The slot claimed twice.
        slot: SlotId,
    },
    /// The slot→substation map has the wrong length or a bad substation id.
    BadSubstation {
        /// Description of the violation.
        reason: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountMismatch {
                kind,
                names,
                positions,
            } => write!(
                f,
                "{kind}: {names} names but {positions} topology positions"
            ),
            Self::DuplicateName { kind, name } => {
                write!(f, "duplicate {kind} name '{name}'")
            }
            Self::SlotOutOfRange { slot, dim_topo } => {
                write!(f, "slot {slot} outside topology vector of length {dim_topo}")
            }
            Self::SlotReused { slot } => write!(f, "slot {slot} claimed by two terminals"),
            Self::BadSubstation { reason } => write!(f, "bad substation map: {reason}"),
        }
    }
}

impl Error for RegistryError {}

/// Errors from setting or reading an action field.
///
/// Raised at the offending call, never deferred to validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionError {
    /// The field is not in this action variant's authorized key set.
    UnauthorizedField {
        /// The rejected key.
        key: FieldKey,
    },
    /// The supplied value has the wrong shape for the field.
    InvalidField {
        /// The key being set.
        key: FieldKey,
        /// Description of the shape violation.
        reason: String,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnauthorizedField { key } => {
                write!(f, "field '{key}' is not authorized for this action variant")
            }
            Self::InvalidField { key, reason } => {
                write!(f, "invalid value for field '{key}': {reason}")
            }
        }
    }
}

impl Error for ActionError {}

/// The ways an action can contradict itself.
///
/// Returned as a value by the ambiguity validator — asking "is this action
/// well-formed" is a routine per-step question, not an exceptional one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AmbiguousAction {
    /// An element is both detached and bus-toggled in the same step.
    DetachAndChangeBus {
        /// The element kind.
        kind: ElementKind,
        /// The element index within its kind.
        index: usize,
    },
    /// An element is both detached and bus-assigned in the same step.
    DetachAndSetBus {
        /// The element kind.
        kind: ElementKind,
        /// The element index within its kind.
        index: usize,
    },
    /// A detach flag is raised without its declaration marker.
    UndeclaredDetachment {
        /// The element kind whose flag array is out of sync.
        kind: ElementKind,
    },
}

impl fmt::Display for AmbiguousAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DetachAndChangeBus { kind, index } => write!(
                f,
                "cannot both change bus and detach {kind} {index} in one step"
            ),
            Self::DetachAndSetBus { kind, index } => write!(
                f,
                "cannot both assign a bus and detach {kind} {index} in one step"
            ),
            Self::UndeclaredDetachment { kind } => write!(
                f,
                "{kind} detachment flag set without proper declaration"
            ),
        }
    }
}

impl Error for AmbiguousAction {}

/// Rejection from an environment-level legality check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IllegalAction {
    /// Name of the check that rejected the action.
    pub check: String,
    /// Why the action was rejected.
    pub reason: String,
}

impl fmt::Display for IllegalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected by '{}': {}", self.check, self.reason)
    }
}

impl Error for IllegalAction {}

/// Combined outcome of full validation (ambiguity rules, then legality).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionRejection {
    /// The action contradicts itself.
    Ambiguous(AmbiguousAction),
    /// The action is well-formed but out of policy.
    Illegal(IllegalAction),
}

impl fmt::Display for ActionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambiguous(inner) => write!(f, "ambiguous action: {inner}"),
            Self::Illegal(inner) => write!(f, "illegal action: {inner}"),
        }
    }
}

impl Error for ActionRejection {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Ambiguous(inner) => Some(inner),
            Self::Illegal(inner) => Some(inner),
        }
    }
}

/// Decode-time structural failures of the serialization codecs.
///
/// Always surfaced, never silently coerced: a length or shape mismatch
/// means the document or vector was produced against a different registry
/// or format version.
#[derive(Clone, Debug, PartialEq)]
pub enum CodecError {
    /// A flat vector's length does not match the registry-derived layout.
    LengthMismatch {
        /// Expected total length.
        expected: usize,
        /// Actual length received.
        got: usize,
    },
    /// A document contains a key outside the field vocabulary.
    UnknownKey {
        /// The unrecognized key.
        key: String,
    },
    /// A value has the wrong shape, type, or range for its field.
    BadValue {
        /// Which field or region the value belonged to.
        context: String,
        /// Description of the violation.
        reason: String,
    },
    /// The decoded fields were rejected by the action itself.
    FieldRejected {
        /// The underlying field error.
        reason: ActionError,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { expected, got } => {
                write!(f, "vector length mismatch: expected {expected}, got {got}")
            }
            Self::UnknownKey { key } => write!(f, "unknown field key '{key}'"),
            Self::BadValue { context, reason } => {
                write!(f, "bad value for {context}: {reason}")
            }
            Self::FieldRejected { reason } => write!(f, "decoded field rejected: {reason}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FieldRejected { reason } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_first_violated_rule() {
        let err = AmbiguousAction::DetachAndSetBus {
            kind: ElementKind::Load,
            index: 0,
        };
        assert!(err.to_string().contains("assign a bus"));
        assert!(err.to_string().contains("load 0"));
    }

    #[test]
    fn rejection_source_chains() {
        let rejection = ActionRejection::Illegal(IllegalAction {
            check: "max_substations_changed".into(),
            reason: "3 substations touched, limit 2".into(),
        });
        assert!(rejection.source().is_some());
    }

    #[test]
    fn codec_error_wraps_field_error() {
        let err = CodecError::FieldRejected {
            reason: ActionError::UnauthorizedField {
                key: FieldKey::ChangeBus,
            },
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("change_bus"));
    }
}
