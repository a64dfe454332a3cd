//! Setter input payloads and their normalization.
//!
//! Every polymorphic shape a field setter accepts is a variant of one tagged
//! union here, resolved by a single normalization function before any
//! mutation happens. Call sites never branch on "what did the caller pass" —
//! they convert into the union (usually through a `From` impl) and hand it
//! to the action.

use switchyard_core::{ActionError, BusTarget, ElementKind, FieldKey, GridRegistry, SlotId};

/// Reference to one element of a kind, by index or by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementRef {
    /// Element index within its kind.
    Index(usize),
    /// Element name, resolved through the registry.
    Name(String),
}

impl From<usize> for ElementRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ElementRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for ElementRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Accepted shapes for the per-element detachment flag setters.
///
/// - [`Full`](Self::Full) replaces the whole flag array and marks the field
///   declared even when every entry is `false`.
/// - [`One`](Self::One)/[`Many`](Self::Many) raise the listed flags and
///   leave the rest untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlagInput {
    /// Full replacement array, length must equal the kind's element count.
    Full(Vec<bool>),
    /// Raise the flag of a single element.
    One(ElementRef),
    /// Raise the flags of every listed element.
    Many(Vec<ElementRef>),
}

impl From<Vec<bool>> for FlagInput {
    fn from(flags: Vec<bool>) -> Self {
        Self::Full(flags)
    }
}

impl From<usize> for FlagInput {
    fn from(index: usize) -> Self {
        Self::One(ElementRef::Index(index))
    }
}

impl From<&str> for FlagInput {
    fn from(name: &str) -> Self {
        Self::One(ElementRef::Name(name.to_owned()))
    }
}

impl From<Vec<usize>> for FlagInput {
    fn from(indices: Vec<usize>) -> Self {
        Self::Many(indices.into_iter().map(ElementRef::Index).collect())
    }
}

impl<const N: usize> From<[usize; N]> for FlagInput {
    fn from(indices: [usize; N]) -> Self {
        Self::Many(indices.into_iter().map(ElementRef::Index).collect())
    }
}

impl From<Vec<&str>> for FlagInput {
    fn from(names: Vec<&str>) -> Self {
        Self::Many(names.into_iter().map(ElementRef::from).collect())
    }
}

/// A normalized flag mutation, ready to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FlagPatch {
    /// Replace the array wholesale.
    Replace(Vec<bool>),
    /// Raise these element indices.
    Raise(Vec<usize>),
}

impl FlagInput {
    /// Resolve names and bounds-check indices against the registry.
    pub(crate) fn normalize(
        self,
        key: FieldKey,
        kind: ElementKind,
        registry: &GridRegistry,
    ) -> Result<FlagPatch, ActionError> {
        let count = registry.count(kind);
        let resolve = |elem: ElementRef| -> Result<usize, ActionError> {
            let index = match elem {
                ElementRef::Index(i) => i,
                ElementRef::Name(name) => registry.element_index(kind, &name).ok_or_else(|| {
                    ActionError::InvalidField {
                        key,
                        reason: format!("no {kind} named '{name}'"),
                    }
                })?,
            };
            if index >= count {
                return Err(ActionError::InvalidField {
                    key,
                    reason: format!("{kind} index {index} out of range (count {count})"),
                });
            }
            Ok(index)
        };
        match self {
            Self::Full(flags) => {
                if flags.len() != count {
                    return Err(ActionError::InvalidField {
                        key,
                        reason: format!(
                            "flag array has {} entries, {kind} count is {count}",
                            flags.len()
                        ),
                    });
                }
                Ok(FlagPatch::Replace(flags))
            }
            Self::One(elem) => Ok(FlagPatch::Raise(vec![resolve(elem)?])),
            Self::Many(elems) => {
                let indices = elems
                    .into_iter()
                    .map(resolve)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FlagPatch::Raise(indices))
            }
        }
    }
}

/// Accepted shapes for the `set_bus` setter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetBusInput {
    /// Merge these `(slot, raw assignment)` pairs into the action. A raw
    /// value of `0` resets the slot to untouched.
    Pairs(Vec<(SlotId, i32)>),
    /// Replace every assignment; length must equal `dim_topo`.
    Full(Vec<i32>),
}

impl From<Vec<(SlotId, i32)>> for SetBusInput {
    fn from(pairs: Vec<(SlotId, i32)>) -> Self {
        Self::Pairs(pairs)
    }
}

impl<const N: usize> From<[(SlotId, i32); N]> for SetBusInput {
    fn from(pairs: [(SlotId, i32); N]) -> Self {
        Self::Pairs(pairs.to_vec())
    }
}

impl From<Vec<(u32, i32)>> for SetBusInput {
    fn from(pairs: Vec<(u32, i32)>) -> Self {
        Self::Pairs(pairs.into_iter().map(|(s, v)| (SlotId(s), v)).collect())
    }
}

impl<const N: usize> From<[(u32, i32); N]> for SetBusInput {
    fn from(pairs: [(u32, i32); N]) -> Self {
        Self::Pairs(pairs.iter().map(|&(s, v)| (SlotId(s), v)).collect())
    }
}

/// A normalized `set_bus` mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SetBusPatch {
    /// Merge the pairs; `None` targets reset to untouched.
    Merge(Vec<(SlotId, Option<BusTarget>)>),
    /// Replace the whole map with the live entries.
    Replace(Vec<(SlotId, BusTarget)>),
}

impl SetBusInput {
    pub(crate) fn normalize(
        self,
        registry: &GridRegistry,
    ) -> Result<SetBusPatch, ActionError> {
        let key = FieldKey::SetBus;
        let dim_topo = registry.dim_topo();
        let decode = |slot: SlotId, raw: i32| -> Result<Option<BusTarget>, ActionError> {
            if slot.0 as usize >= dim_topo {
                return Err(ActionError::InvalidField {
                    key,
                    reason: format!("slot {slot} outside topology vector of length {dim_topo}"),
                });
            }
            BusTarget::from_raw(raw).map_err(|bad| ActionError::InvalidField {
                key,
                reason: format!("assignment {bad} for slot {slot} is below -1"),
            })
        };
        match self {
            Self::Pairs(pairs) => {
                let mut out = Vec::with_capacity(pairs.len());
                for (slot, raw) in pairs {
                    out.push((slot, decode(slot, raw)?));
                }
                Ok(SetBusPatch::Merge(out))
            }
            Self::Full(raws) => {
                if raws.len() != dim_topo {
                    return Err(ActionError::InvalidField {
                        key,
                        reason: format!(
                            "assignment array has {} entries, topology vector has {dim_topo}",
                            raws.len()
                        ),
                    });
                }
                let mut out = Vec::new();
                for (i, raw) in raws.into_iter().enumerate() {
                    let slot = SlotId(i as u32);
                    if let Some(target) = decode(slot, raw)? {
                        out.push((slot, target));
                    }
                }
                Ok(SetBusPatch::Replace(out))
            }
        }
    }
}

/// Accepted shapes for the `change_bus` setter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeBusInput {
    /// Mark these slots for a busbar toggle.
    Slots(Vec<SlotId>),
    /// Replace the toggle set; length must equal `dim_topo`.
    Full(Vec<bool>),
}

impl From<Vec<SlotId>> for ChangeBusInput {
    fn from(slots: Vec<SlotId>) -> Self {
        Self::Slots(slots)
    }
}

impl<const N: usize> From<[SlotId; N]> for ChangeBusInput {
    fn from(slots: [SlotId; N]) -> Self {
        Self::Slots(slots.to_vec())
    }
}

impl From<Vec<u32>> for ChangeBusInput {
    fn from(slots: Vec<u32>) -> Self {
        Self::Slots(slots.into_iter().map(SlotId).collect())
    }
}

impl<const N: usize> From<[u32; N]> for ChangeBusInput {
    fn from(slots: [u32; N]) -> Self {
        Self::Slots(slots.iter().copied().map(SlotId).collect())
    }
}

/// A normalized `change_bus` mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ChangeBusPatch {
    Mark(Vec<SlotId>),
    Replace(Vec<SlotId>),
}

impl ChangeBusInput {
    pub(crate) fn normalize(
        self,
        registry: &GridRegistry,
    ) -> Result<ChangeBusPatch, ActionError> {
        let key = FieldKey::ChangeBus;
        let dim_topo = registry.dim_topo();
        let check = |slot: SlotId| -> Result<SlotId, ActionError> {
            if slot.0 as usize >= dim_topo {
                return Err(ActionError::InvalidField {
                    key,
                    reason: format!("slot {slot} outside topology vector of length {dim_topo}"),
                });
            }
            Ok(slot)
        };
        match self {
            Self::Slots(slots) => {
                let slots = slots.into_iter().map(check).collect::<Result<Vec<_>, _>>()?;
                Ok(ChangeBusPatch::Mark(slots))
            }
            Self::Full(flags) => {
                if flags.len() != dim_topo {
                    return Err(ActionError::InvalidField {
                        key,
                        reason: format!(
                            "toggle array has {} entries, topology vector has {dim_topo}",
                            flags.len()
                        ),
                    });
                }
                let slots = flags
                    .into_iter()
                    .enumerate()
                    .filter(|(_, on)| *on)
                    .map(|(i, _)| SlotId(i as u32))
                    .collect();
                Ok(ChangeBusPatch::Replace(slots))
            }
        }
    }
}
