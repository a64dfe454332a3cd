//! The flat numeric vector form.
//!
//! A fixed-length `f32` vector with one contiguous region per authorized
//! field key, in [`FieldKey::ALL`] declaration order. The layout is fully
//! determined by the registry and the space's key set — never by which
//! fields happen to be populated — so a decoder that has only the vector
//! and the registry reconstructs an equal action.
//!
//! Region layout for a space authorizing every key:
//!
//! ```text
//! [dim_topo × set_bus raw]   0 = untouched, -1 = disconnect, n = busbar n
//! [dim_topo × change_bus]    0 or 1
//! [n_load × detach_load]     0 or 1
//! [n_gen × detach_gen]       0 or 1
//! [n_storage × detach_storage] 0 or 1
//! ```
//!
//! A length mismatch is a hard decode failure: it means the vector was
//! produced against a different registry or key set, and reinterpreting it
//! silently would corrupt the action. Hosts should persist the layout
//! (via [`VectLayout::regions`]) alongside any stored vectors.

use switchyard_action::{ActionSpace, ActionUpdate, FieldState, FlagInput, TopologyAction};
use switchyard_core::{CodecError, FieldKey, GridRegistry, KeySet, SlotId};

/// One field's region within the vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectRegion {
    /// The field this region encodes.
    pub key: FieldKey,
    /// Offset of the region's first entry.
    pub offset: usize,
    /// Number of entries in the region.
    pub len: usize,
}

/// The registry-derived layout of the vector form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectLayout {
    regions: Vec<VectRegion>,
    total: usize,
}

impl VectLayout {
    /// Derive the layout for a registry and authorized key set.
    pub fn new(registry: &GridRegistry, keys: KeySet) -> Self {
        let mut regions = Vec::with_capacity(keys.len());
        let mut offset = 0;
        for key in keys.iter() {
            let len = match key {
                FieldKey::SetBus | FieldKey::ChangeBus => registry.dim_topo(),
                FieldKey::DetachLoad => registry.n_load(),
                FieldKey::DetachGen => registry.n_gen(),
                FieldKey::DetachStorage => registry.n_storage(),
            };
            regions.push(VectRegion { key, offset, len });
            offset += len;
        }
        Self {
            regions,
            total: offset,
        }
    }

    /// The layout of a space's vectors.
    pub fn of_space(space: &ActionSpace) -> Self {
        Self::new(space.registry(), space.authorized_keys())
    }

    /// The regions in encoding order.
    pub fn regions(&self) -> &[VectRegion] {
        &self.regions
    }

    /// Total vector length.
    pub fn total_len(&self) -> usize {
        self.total
    }

    fn region(&self, key: FieldKey) -> Option<VectRegion> {
        self.regions.iter().copied().find(|r| r.key == key)
    }
}

/// Encode an action as a flat vector.
///
/// Effective semantics only: an undeclared detach array encodes as zeros,
/// identical to an untouched one.
pub fn encode_vect(action: &TopologyAction) -> Vec<f32> {
    let layout = VectLayout::new(action.registry(), action.authorized_keys());
    let mut vect = vec![0.0_f32; layout.total_len()];
    for region in layout.regions() {
        let state = action.field(region.key).expect("key is authorized");
        let out = &mut vect[region.offset..region.offset + region.len];
        match state {
            FieldState::SetBus(map) => {
                for (slot, target) in map {
                    out[slot.0 as usize] = target.to_raw() as f32;
                }
            }
            FieldState::ChangeBus(set) => {
                for slot in set {
                    out[slot.0 as usize] = 1.0;
                }
            }
            FieldState::Detach { flags, declared } => {
                if declared {
                    for (i, &flag) in flags.iter().enumerate() {
                        if flag {
                            out[i] = 1.0;
                        }
                    }
                }
            }
        }
    }
    vect
}

/// Decode a flat vector into an action bound to the space.
pub fn decode_vect(space: &ActionSpace, vect: &[f32]) -> Result<TopologyAction, CodecError> {
    let layout = VectLayout::of_space(space);
    if vect.len() != layout.total_len() {
        return Err(CodecError::LengthMismatch {
            expected: layout.total_len(),
            got: vect.len(),
        });
    }

    let mut update = ActionUpdate::default();
    if let Some(region) = layout.region(FieldKey::SetBus) {
        let mut pairs = Vec::new();
        for (i, &value) in vect[region.offset..region.offset + region.len].iter().enumerate() {
            let raw = integral(FieldKey::SetBus, i, value)?;
            if raw < -1 {
                return Err(CodecError::BadValue {
                    context: region_context(FieldKey::SetBus, i),
                    reason: format!("assignment {raw} is below -1"),
                });
            }
            if raw != 0 {
                pairs.push((SlotId(i as u32), raw));
            }
        }
        if !pairs.is_empty() {
            update.set_bus = Some(pairs.into());
        }
    }
    if let Some(region) = layout.region(FieldKey::ChangeBus) {
        let slots = flag_region(FieldKey::ChangeBus, &vect[region.offset..region.offset + region.len])?;
        if slots.iter().any(|&on| on) {
            let marked: Vec<SlotId> = slots
                .iter()
                .enumerate()
                .filter(|(_, &on)| on)
                .map(|(i, _)| SlotId(i as u32))
                .collect();
            update.change_bus = Some(marked.into());
        }
    }
    for key in [
        FieldKey::DetachLoad,
        FieldKey::DetachGen,
        FieldKey::DetachStorage,
    ] {
        if let Some(region) = layout.region(key) {
            let flags = flag_region(key, &vect[region.offset..region.offset + region.len])?;
            if flags.iter().any(|&on| on) {
                let input = FlagInput::Full(flags);
                match key {
                    FieldKey::DetachLoad => update.detach_load = Some(input),
                    FieldKey::DetachGen => update.detach_gen = Some(input),
                    FieldKey::DetachStorage => update.detach_storage = Some(input),
                    _ => unreachable!("iterating detach keys"),
                }
            }
        }
    }

    space
        .from_update(update)
        .map_err(|reason| CodecError::FieldRejected { reason })
}

fn region_context(key: FieldKey, index: usize) -> String {
    format!("{key} region entry {index}")
}

/// Reject NaN, infinite, and fractional entries.
fn integral(key: FieldKey, index: usize, value: f32) -> Result<i32, CodecError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(CodecError::BadValue {
            context: region_context(key, index),
            reason: format!("{value} is not an integral value"),
        });
    }
    Ok(value as i32)
}

/// Decode a 0/1 region into booleans.
fn flag_region(key: FieldKey, values: &[f32]) -> Result<Vec<bool>, CodecError> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| match integral(key, i, value)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::BadValue {
                context: region_context(key, i),
                reason: format!("{other} is not a 0/1 flag"),
            }),
        })
        .collect()
}
