//! Topology action encoding, ambiguity validation, and action spaces.
//!
//! An action is one decision step's requested grid mutation: busbar
//! assignments per topology slot, busbar toggles, and per-element
//! detachment flags. This crate owns the mutable action object and its
//! polymorphic setters, the ambiguity validator that rejects
//! self-contradictory requests before they reach the physical solver, the
//! factory that builds actions bound to a registry and configuration, and
//! the environment-side topology vector that actions are applied to.
//!
//! Serialization of actions lives in `switchyard-codec`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod input;
pub mod space;
pub mod state;
pub mod validate;

pub use action::{ActionClass, FieldState, TopologyAction};
pub use input::{ChangeBusInput, ElementRef, FlagInput, SetBusInput};
pub use space::{ActionSpace, ActionUpdate};
pub use state::TopologyState;
pub use validate::{check_ambiguity, validate, LegalityCheck, MaxSubstationsChanged};
