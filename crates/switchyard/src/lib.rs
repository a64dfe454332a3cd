//! Switchyard: the topology action subsystem of a power-grid control
//! simulation.
//!
//! This is the top-level facade crate re-exporting the public API from the
//! Switchyard sub-crates. For most users, adding `switchyard` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use switchyard::prelude::*;
//!
//! // A two-substation grid: one load behind one line.
//! let registry = Arc::new(
//!     GridRegistry::new(GridLayout {
//!         name_load: vec!["load_1_0".into()],
//!         name_gen: vec![],
//!         name_storage: vec![],
//!         name_line: vec!["line_0_1_0".into()],
//!         load_pos: vec![SlotId(2)],
//!         gen_pos: vec![],
//!         storage_pos: vec![],
//!         line_or_pos: vec![SlotId(0)],
//!         line_ex_pos: vec![SlotId(1)],
//!         n_sub: 2,
//!         slot_sub: vec![0, 1, 1],
//!     })
//!     .unwrap(),
//! );
//!
//! // Build an action that sheds the load, validate it, apply it.
//! let space = ActionSpace::new(
//!     registry.clone(),
//!     GridConfig::with_detachment(),
//!     ActionClass::Complete,
//! );
//! let mut action = space.empty();
//! action.set_bus([(2u32, -1)]).unwrap();
//! assert_eq!(action.is_ambiguous(), (false, None));
//!
//! let mut state = TopologyState::new(registry);
//! state.apply(&action);
//! assert_eq!(state.get(SlotId(2)), Some(-1));
//!
//! // Serialized forms round-trip to an equal action.
//! let text = switchyard::codec::encode_json(&action).unwrap();
//! let reloaded = switchyard::codec::decode_json(&space, &text).unwrap();
//! assert_eq!(reloaded, action);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `switchyard-core` | IDs, registry, slot sets, keys, config, errors |
//! | [`action`] | `switchyard-action` | Actions, validation, action spaces, topology state |
//! | [`codec`] | `switchyard-codec` | Document, JSON, and flat-vector serialization |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary: IDs, registry, slot sets, keys, config, and errors
/// (`switchyard-core`).
pub use switchyard_core as types;

/// Action encoding, ambiguity validation, action spaces, and the
/// environment topology state (`switchyard-action`).
pub use switchyard_action as action;

/// Document, JSON, and flat-vector serialization (`switchyard-codec`).
pub use switchyard_codec as codec;

/// Common imports for typical Switchyard usage.
///
/// ```rust
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    pub use switchyard_action::{
        check_ambiguity, validate, ActionClass, ActionSpace, ActionUpdate, LegalityCheck,
        TopologyAction, TopologyState,
    };
    pub use switchyard_core::{
        ActionError, ActionRejection, AmbiguousAction, BusTarget, CodecError, ElementKind,
        FieldKey, GridConfig, GridLayout, GridRegistry, KeySet, SlotId, SlotSet,
    };
}
