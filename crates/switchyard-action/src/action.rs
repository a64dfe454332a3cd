//! The mutable topology action and its field accessors.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use switchyard_core::{
    ActionError, BusTarget, ElementKind, FieldKey, GridConfig, GridRegistry, KeySet, SlotId,
    SlotSet,
};

use crate::input::{
    ChangeBusInput, ChangeBusPatch, FlagInput, FlagPatch, SetBusInput, SetBusPatch,
};

/// Action variants, each exposing a fixed subset of the field keys.
///
/// The variant is chosen when the action space is built; a reduced variant
/// rejects writes to the fields it does not expose with
/// [`ActionError::UnauthorizedField`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionClass {
    /// Every field: bus assignment, bus toggling, and (when the
    /// configuration permits it) detachment.
    Complete,
    /// Bus assignment only.
    SetBusOnly,
    /// Bus toggling only.
    ChangeBusOnly,
}

impl ActionClass {
    /// The authorized key set of this variant under a configuration.
    ///
    /// Detach keys appear only on [`Complete`](Self::Complete) and only when
    /// the configuration's master switch and the per-kind toggle both
    /// permit it.
    pub fn authorized_keys(self, config: &GridConfig) -> KeySet {
        let mut keys = KeySet::empty();
        match self {
            Self::Complete => {
                keys.insert(FieldKey::SetBus);
                keys.insert(FieldKey::ChangeBus);
                if config.allow_detachment {
                    if config.detach_load_allowed {
                        keys.insert(FieldKey::DetachLoad);
                    }
                    if config.detach_gen_allowed {
                        keys.insert(FieldKey::DetachGen);
                    }
                    if config.detach_storage_allowed {
                        keys.insert(FieldKey::DetachStorage);
                    }
                }
            }
            Self::SetBusOnly => {
                keys.insert(FieldKey::SetBus);
            }
            Self::ChangeBusOnly => {
                keys.insert(FieldKey::ChangeBus);
            }
        }
        keys
    }
}

/// One detachable kind's flag array plus its declaration marker.
///
/// The marker records that the caller touched the field this step; it is
/// distinct from the flag values (an explicit all-`false` replacement is
/// declared but detaches nothing).
#[derive(Clone, Debug)]
pub(crate) struct DetachField {
    pub(crate) flags: Vec<bool>,
    pub(crate) declared: bool,
}

impl DetachField {
    fn new(count: usize) -> Self {
        Self {
            flags: vec![false; count],
            declared: false,
        }
    }

    /// The flag array with an undeclared field resolved to all-`false`.
    pub(crate) fn effective(&self) -> Vec<bool> {
        if self.declared {
            self.flags.clone()
        } else {
            vec![false; self.flags.len()]
        }
    }
}

/// Read-only view of one action field, returned by
/// [`TopologyAction::field`].
#[derive(Clone, Debug)]
pub enum FieldState<'a> {
    /// Live bus assignments, keyed by slot.
    SetBus(&'a IndexMap<SlotId, BusTarget>),
    /// Slots marked for a busbar toggle.
    ChangeBus(&'a SlotSet),
    /// A detachment flag array and whether it was declared this step.
    Detach {
        /// Per-element flags.
        flags: &'a [bool],
        /// Whether the caller touched this field.
        declared: bool,
    },
}

/// A single decision step's topology mutation request.
///
/// Created empty by an [`ActionSpace`](crate::ActionSpace), mutated through
/// the typed setters, validated once, then handed to the environment's
/// apply step. Actions only ever describe one step's deltas — persistence
/// of disconnection lives in the environment's
/// [`TopologyState`](crate::TopologyState), never here.
///
/// Equality is defined over *effective* values: a slot explicitly assigned
/// the neutral value, or a detach array never declared, compares equal to
/// the untouched state.
#[derive(Clone, Debug)]
pub struct TopologyAction {
    registry: Arc<GridRegistry>,
    authorized: KeySet,
    pub(crate) set_bus: IndexMap<SlotId, BusTarget>,
    pub(crate) change_bus: SlotSet,
    // Grows monotonically; feeds downstream legality checks even when an
    // assignment is later reset to neutral.
    touched: SlotSet,
    pub(crate) detach_load: DetachField,
    pub(crate) detach_gen: DetachField,
    pub(crate) detach_storage: DetachField,
}

impl TopologyAction {
    pub(crate) fn new(registry: Arc<GridRegistry>, authorized: KeySet) -> Self {
        let (n_load, n_gen, n_storage) =
            (registry.n_load(), registry.n_gen(), registry.n_storage());
        Self {
            registry,
            authorized,
            set_bus: IndexMap::new(),
            change_bus: SlotSet::empty(),
            touched: SlotSet::empty(),
            detach_load: DetachField::new(n_load),
            detach_gen: DetachField::new(n_gen),
            detach_storage: DetachField::new(n_storage),
        }
    }

    /// The registry this action is bound to.
    pub fn registry(&self) -> &Arc<GridRegistry> {
        &self.registry
    }

    /// The keys this action variant may set or query.
    pub fn authorized_keys(&self) -> KeySet {
        self.authorized
    }

    /// Checked read access to one field.
    ///
    /// Fails with [`ActionError::UnauthorizedField`] when the key is not in
    /// the variant's authorized set.
    pub fn field(&self, key: FieldKey) -> Result<FieldState<'_>, ActionError> {
        self.ensure_authorized(key)?;
        Ok(match key {
            FieldKey::SetBus => FieldState::SetBus(&self.set_bus),
            FieldKey::ChangeBus => FieldState::ChangeBus(&self.change_bus),
            FieldKey::DetachLoad => FieldState::Detach {
                flags: &self.detach_load.flags,
                declared: self.detach_load.declared,
            },
            FieldKey::DetachGen => FieldState::Detach {
                flags: &self.detach_gen.flags,
                declared: self.detach_gen.declared,
            },
            FieldKey::DetachStorage => FieldState::Detach {
                flags: &self.detach_storage.flags,
                declared: self.detach_storage.declared,
            },
        })
    }

    /// Every slot touched by `set_bus` or `change_bus` so far this step.
    ///
    /// Monotone: resetting an assignment to neutral does not un-touch the
    /// slot. Downstream legality checks (substation budgets) consume this.
    pub fn touched_slots(&self) -> &SlotSet {
        &self.touched
    }

    /// Whether this action requests no modification at all.
    pub fn is_empty(&self) -> bool {
        self.set_bus.is_empty()
            && self.change_bus.is_empty()
            && !self.any_effective_detach(ElementKind::Load)
            && !self.any_effective_detach(ElementKind::Generator)
            && !self.any_effective_detach(ElementKind::Storage)
    }

    /// Whether element `index` of `kind` is effectively detached by this
    /// action (flag raised *and* declared).
    pub fn is_detached(&self, kind: ElementKind, index: usize) -> bool {
        match self.detach_field(kind) {
            Some(field) => field.declared && field.flags.get(index).copied().unwrap_or(false),
            None => false,
        }
    }

    /// Assign busbars to topology slots.
    ///
    /// Accepts `(slot, raw)` pairs (merged into the current assignments;
    /// raw `0` resets a slot to untouched) or a full `dim_topo`-length raw
    /// array (wholesale replacement).
    pub fn set_bus(&mut self, input: impl Into<SetBusInput>) -> Result<(), ActionError> {
        self.ensure_authorized(FieldKey::SetBus)?;
        match input.into().normalize(&self.registry)? {
            SetBusPatch::Merge(pairs) => {
                for (slot, target) in pairs {
                    self.touched.insert(slot);
                    match target {
                        Some(target) => {
                            self.set_bus.insert(slot, target);
                        }
                        None => {
                            self.set_bus.shift_remove(&slot);
                        }
                    }
                }
            }
            SetBusPatch::Replace(entries) => {
                self.set_bus.clear();
                for (slot, target) in entries {
                    self.touched.insert(slot);
                    self.set_bus.insert(slot, target);
                }
            }
        }
        Ok(())
    }

    /// Mark topology slots for a busbar toggle.
    ///
    /// Accepts a slot list (marked in addition to previous calls) or a full
    /// `dim_topo`-length boolean array (wholesale replacement).
    pub fn change_bus(&mut self, input: impl Into<ChangeBusInput>) -> Result<(), ActionError> {
        self.ensure_authorized(FieldKey::ChangeBus)?;
        match input.into().normalize(&self.registry)? {
            ChangeBusPatch::Mark(slots) => {
                for slot in slots {
                    self.change_bus.insert(slot);
                    self.touched.insert(slot);
                }
            }
            ChangeBusPatch::Replace(slots) => {
                self.change_bus = SlotSet::empty();
                for slot in slots {
                    self.change_bus.insert(slot);
                    self.touched.insert(slot);
                }
            }
        }
        Ok(())
    }

    /// Request detachment of elements of `kind`.
    ///
    /// Accepts a single index or name, a list of either, or a full
    /// flag array for the kind. Every successful call declares the field,
    /// keeping the flag array and its declaration marker synchronized.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is [`ElementKind::Line`] — lines carry no
    /// detachment flag; disconnect them through `set_bus`.
    pub fn detach(
        &mut self,
        kind: ElementKind,
        input: impl Into<FlagInput>,
    ) -> Result<(), ActionError> {
        let key = detach_key(kind).expect("lines carry no detachment flag");
        self.ensure_authorized(key)?;
        let patch = input.into().normalize(key, kind, &self.registry)?;
        let field = self
            .detach_field_mut(kind)
            .expect("detach_key only maps detachable kinds");
        match patch {
            FlagPatch::Replace(flags) => {
                field.flags = flags;
            }
            FlagPatch::Raise(indices) => {
                for index in indices {
                    field.flags[index] = true;
                }
            }
        }
        field.declared = true;
        Ok(())
    }

    /// Request detachment of loads. Sugar for [`detach`](Self::detach).
    pub fn detach_load(&mut self, input: impl Into<FlagInput>) -> Result<(), ActionError> {
        self.detach(ElementKind::Load, input)
    }

    /// Request detachment of generators. Sugar for [`detach`](Self::detach).
    pub fn detach_gen(&mut self, input: impl Into<FlagInput>) -> Result<(), ActionError> {
        self.detach(ElementKind::Generator, input)
    }

    /// Request detachment of storage units. Sugar for
    /// [`detach`](Self::detach).
    pub fn detach_storage(&mut self, input: impl Into<FlagInput>) -> Result<(), ActionError> {
        self.detach(ElementKind::Storage, input)
    }

    /// Raw mutation of one detach flag, bypassing declaration tracking.
    ///
    /// This exists so the undeclared-detachment ambiguity rule stays
    /// testable; it is not part of the supported mutation API.
    #[doc(hidden)]
    pub fn set_detach_flag_raw(&mut self, kind: ElementKind, index: usize, value: bool) {
        if let Some(field) = self.detach_field_mut(kind) {
            if let Some(flag) = field.flags.get_mut(index) {
                *flag = value;
            }
        }
    }

    pub(crate) fn detach_field(&self, kind: ElementKind) -> Option<&DetachField> {
        match kind {
            ElementKind::Load => Some(&self.detach_load),
            ElementKind::Generator => Some(&self.detach_gen),
            ElementKind::Storage => Some(&self.detach_storage),
            ElementKind::Line => None,
        }
    }

    fn detach_field_mut(&mut self, kind: ElementKind) -> Option<&mut DetachField> {
        match kind {
            ElementKind::Load => Some(&mut self.detach_load),
            ElementKind::Generator => Some(&mut self.detach_gen),
            ElementKind::Storage => Some(&mut self.detach_storage),
            ElementKind::Line => None,
        }
    }

    fn any_effective_detach(&self, kind: ElementKind) -> bool {
        match self.detach_field(kind) {
            Some(field) => field.declared && field.flags.iter().any(|&f| f),
            None => false,
        }
    }

    fn ensure_authorized(&self, key: FieldKey) -> Result<(), ActionError> {
        if self.authorized.contains(key) {
            Ok(())
        } else {
            Err(ActionError::UnauthorizedField { key })
        }
    }
}

/// The kinds that carry a detachment flag array, with their field key.
pub(crate) fn detach_key(kind: ElementKind) -> Option<FieldKey> {
    match kind {
        ElementKind::Load => Some(FieldKey::DetachLoad),
        ElementKind::Generator => Some(FieldKey::DetachGen),
        ElementKind::Storage => Some(FieldKey::DetachStorage),
        ElementKind::Line => None,
    }
}

pub(crate) const DETACH_KINDS: [ElementKind; 3] = [
    ElementKind::Load,
    ElementKind::Generator,
    ElementKind::Storage,
];

impl PartialEq for TopologyAction {
    fn eq(&self, other: &Self) -> bool {
        if self.authorized != other.authorized || *self.registry != *other.registry {
            return false;
        }
        if self.set_bus != other.set_bus || self.change_bus != other.change_bus {
            return false;
        }
        // Effective detach semantics: an undeclared array is all-false.
        DETACH_KINDS.iter().all(|&kind| {
            let a = self.detach_field(kind).expect("detachable kind");
            let b = other.detach_field(kind).expect("detachable kind");
            a.effective() == b.effective()
        })
    }
}

impl Eq for TopologyAction {}

// Summarizes the live fields for logs and test failures.
impl fmt::Display for TopologyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "topology action: do nothing");
        }
        write!(f, "topology action:")?;
        for (slot, target) in &self.set_bus {
            write!(f, " set[{slot}]={target}")?;
        }
        for slot in &self.change_bus {
            write!(f, " change[{slot}]")?;
        }
        for kind in DETACH_KINDS {
            if let Some(field) = self.detach_field(kind) {
                if field.declared {
                    for (i, &on) in field.flags.iter().enumerate() {
                        if on {
                            write!(f, " detach[{kind} {i}]")?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
