//! Serialization codecs for Switchyard topology actions.
//!
//! Three interchangeable forms, all agreeing on round-trip identity
//! (`decode(encode(a)) == a` under the action's effective-value equality),
//! none of which validates ambiguity:
//!
//! - **document** — a flat key→value mapping ([`ActionDocument`]) using the
//!   stable field names; absent key = untouched field.
//! - **json** — the document through `serde_json`, for logging and
//!   checkpointing; primitive values only.
//! - **vect** — a fixed-length `f32` vector whose layout derives entirely
//!   from the registry and the space's authorized keys ([`VectLayout`]).
//!
//! Decoding always goes back through the action-space factory, so a
//! serialized field the target space does not authorize is rejected rather
//! than smuggled in.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod document;
pub mod json;
pub mod vect;

pub use document::{
    decode_document, encode_document, ActionDocument, ChangeBusValue, ElementRefValue, FlagValue,
    SetBusValue,
};
pub use json::{decode_json, decode_json_value, encode_json};
pub use vect::{decode_vect, encode_vect, VectLayout, VectRegion};
