//! The element registry: static per-environment grid metadata.
//!
//! A [`GridRegistry`] records how many loads, generators, storage units, and
//! lines the grid has, their names, and where each of their terminals sits
//! in the flattened topology vector. It is built once at environment
//! construction, validated wholesale, and shared read-only (`Arc`) by every
//! action, space, and codec afterwards.

use indexmap::IndexMap;
use smallvec::{smallvec, SmallVec};

use crate::error::RegistryError;
use crate::id::{ElementKind, LineEnd, SlotId, Terminal};

/// Construction input for a [`GridRegistry`].
///
/// Plain data, no invariants of its own — everything is checked by
/// [`GridRegistry::new`]. Position lists map element index → topology slot;
/// `slot_sub` maps topology slot → substation id.
///
/// # Examples
///
/// ```
/// use switchyard_core::{GridLayout, GridRegistry, SlotId};
///
/// // One load and one line across two substations: dim_topo = 3.
/// let layout = GridLayout {
///     name_load: vec!["load_1_0".into()],
///     name_gen: vec![],
///     name_storage: vec![],
///     name_line: vec!["line_0_1_0".into()],
///     load_pos: vec![SlotId(2)],
///     gen_pos: vec![],
///     storage_pos: vec![],
///     line_or_pos: vec![SlotId(0)],
///     line_ex_pos: vec![SlotId(1)],
///     n_sub: 2,
///     slot_sub: vec![0, 1, 1],
/// };
/// let registry = GridRegistry::new(layout).unwrap();
/// assert_eq!(registry.dim_topo(), 3);
/// assert_eq!(registry.load_index("load_1_0"), Some(0));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridLayout {
    /// Load names, unique within the kind.
    pub name_load: Vec<String>,
    /// Generator names, unique within the kind.
    pub name_gen: Vec<String>,
    /// Storage-unit names, unique within the kind.
    pub name_storage: Vec<String>,
    /// Line names, unique within the kind.
    pub name_line: Vec<String>,
    /// Load index → topology slot.
    pub load_pos: Vec<SlotId>,
    /// Generator index → topology slot.
    pub gen_pos: Vec<SlotId>,
    /// Storage index → topology slot.
    pub storage_pos: Vec<SlotId>,
    /// Line index → origin-end topology slot.
    pub line_or_pos: Vec<SlotId>,
    /// Line index → extremity-end topology slot.
    pub line_ex_pos: Vec<SlotId>,
    /// Number of substations.
    pub n_sub: usize,
    /// Topology slot → substation id, length `dim_topo`.
    pub slot_sub: Vec<usize>,
}

/// Validated, immutable grid metadata.
///
/// Invariant: the per-kind position lists form a bijection onto
/// `[0, dim_topo)` where `dim_topo = n_load + n_gen + n_storage + 2*n_line`,
/// and every slot maps to a substation below `n_sub`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridRegistry {
    layout: GridLayout,
    load_index: IndexMap<String, usize>,
    gen_index: IndexMap<String, usize>,
    storage_index: IndexMap<String, usize>,
    // slot -> owning terminal, length dim_topo
    owners: Vec<Terminal>,
}

impl GridRegistry {
    /// Validate a layout into a registry.
    ///
    /// Fails on the first violated rule: length-matched name/position lists,
    /// unique names per kind, position bijection onto `[0, dim_topo)`, and a
    /// well-formed substation map.
    pub fn new(layout: GridLayout) -> Result<Self, RegistryError> {
        let checks: [(ElementKind, usize, usize); 5] = [
            (ElementKind::Load, layout.name_load.len(), layout.load_pos.len()),
            (ElementKind::Generator, layout.name_gen.len(), layout.gen_pos.len()),
            (
                ElementKind::Storage,
                layout.name_storage.len(),
                layout.storage_pos.len(),
            ),
            (ElementKind::Line, layout.name_line.len(), layout.line_or_pos.len()),
            (ElementKind::Line, layout.name_line.len(), layout.line_ex_pos.len()),
        ];
        for (kind, names, positions) in checks {
            if names != positions {
                return Err(RegistryError::CountMismatch {
                    kind,
                    names,
                    positions,
                });
            }
        }

        let load_index = index_names(ElementKind::Load, &layout.name_load)?;
        let gen_index = index_names(ElementKind::Generator, &layout.name_gen)?;
        let storage_index = index_names(ElementKind::Storage, &layout.name_storage)?;
        index_names(ElementKind::Line, &layout.name_line)?;

        let dim_topo = layout.name_load.len()
            + layout.name_gen.len()
            + layout.name_storage.len()
            + 2 * layout.name_line.len();

        // Fill the owner table; a collision or out-of-range slot breaks the
        // bijection invariant.
        let mut owners: Vec<Option<Terminal>> = vec![None; dim_topo];
        let mut claim = |slot: SlotId, terminal: Terminal| -> Result<(), RegistryError> {
            let idx = slot.0 as usize;
            if idx >= dim_topo {
                return Err(RegistryError::SlotOutOfRange { slot, dim_topo });
            }
            if owners[idx].is_some() {
                return Err(RegistryError::SlotReused { slot });
            }
            owners[idx] = Some(terminal);
            Ok(())
        };
        for (i, &slot) in layout.load_pos.iter().enumerate() {
            claim(slot, Terminal::Load(i))?;
        }
        for (i, &slot) in layout.gen_pos.iter().enumerate() {
            claim(slot, Terminal::Generator(i))?;
        }
        for (i, &slot) in layout.storage_pos.iter().enumerate() {
            claim(slot, Terminal::Storage(i))?;
        }
        for (i, &slot) in layout.line_or_pos.iter().enumerate() {
            claim(
                slot,
                Terminal::Line {
                    index: i,
                    end: LineEnd::Origin,
                },
            )?;
        }
        for (i, &slot) in layout.line_ex_pos.iter().enumerate() {
            claim(
                slot,
                Terminal::Line {
                    index: i,
                    end: LineEnd::Extremity,
                },
            )?;
        }
        // Every slot was claimed exactly once: claims == dim_topo entries
        // and no collisions, so no None can remain.
        let owners: Vec<Terminal> = owners.into_iter().map(|o| o.expect("bijection")).collect();

        if layout.slot_sub.len() != dim_topo {
            return Err(RegistryError::BadSubstation {
                reason: format!(
                    "slot_sub has {} entries, topology vector has {dim_topo}",
                    layout.slot_sub.len()
                ),
            });
        }
        if let Some(&bad) = layout.slot_sub.iter().find(|&&s| s >= layout.n_sub) {
            return Err(RegistryError::BadSubstation {
                reason: format!("substation id {bad} >= n_sub {}", layout.n_sub),
            });
        }

        Ok(Self {
            layout,
            load_index,
            gen_index,
            storage_index,
            owners,
        })
    }

    /// Number of loads.
    pub fn n_load(&self) -> usize {
        self.layout.name_load.len()
    }

    /// Number of generators.
    pub fn n_gen(&self) -> usize {
        self.layout.name_gen.len()
    }

    /// Number of storage units.
    pub fn n_storage(&self) -> usize {
        self.layout.name_storage.len()
    }

    /// Number of lines.
    pub fn n_line(&self) -> usize {
        self.layout.name_line.len()
    }

    /// Number of substations.
    pub fn n_sub(&self) -> usize {
        self.layout.n_sub
    }

    /// Length of the topology vector: one slot per element terminal.
    pub fn dim_topo(&self) -> usize {
        self.owners.len()
    }

    /// Number of elements of a kind.
    pub fn count(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Load => self.n_load(),
            ElementKind::Generator => self.n_gen(),
            ElementKind::Storage => self.n_storage(),
            ElementKind::Line => self.n_line(),
        }
    }

    /// The ordered names of a kind's elements.
    pub fn names(&self, kind: ElementKind) -> &[String] {
        match kind {
            ElementKind::Load => &self.layout.name_load,
            ElementKind::Generator => &self.layout.name_gen,
            ElementKind::Storage => &self.layout.name_storage,
            ElementKind::Line => &self.layout.name_line,
        }
    }

    /// Resolve an element name to its index within the kind.
    pub fn element_index(&self, kind: ElementKind, name: &str) -> Option<usize> {
        match kind {
            ElementKind::Load => self.load_index.get(name).copied(),
            ElementKind::Generator => self.gen_index.get(name).copied(),
            ElementKind::Storage => self.storage_index.get(name).copied(),
            ElementKind::Line => self.layout.name_line.iter().position(|n| n == name),
        }
    }

    /// Resolve a load name to its element index.
    pub fn load_index(&self, name: &str) -> Option<usize> {
        self.load_index.get(name).copied()
    }

    /// Resolve a generator name to its element index.
    pub fn gen_index(&self, name: &str) -> Option<usize> {
        self.gen_index.get(name).copied()
    }

    /// Resolve a storage name to its element index.
    pub fn storage_index(&self, name: &str) -> Option<usize> {
        self.storage_index.get(name).copied()
    }

    /// Topology slot of a load's terminal.
    pub fn load_pos(&self, index: usize) -> Option<SlotId> {
        self.layout.load_pos.get(index).copied()
    }

    /// Topology slot of a generator's terminal.
    pub fn gen_pos(&self, index: usize) -> Option<SlotId> {
        self.layout.gen_pos.get(index).copied()
    }

    /// Topology slot of a storage unit's terminal.
    pub fn storage_pos(&self, index: usize) -> Option<SlotId> {
        self.layout.storage_pos.get(index).copied()
    }

    /// Topology slot of one end of a line.
    pub fn line_pos(&self, index: usize, end: LineEnd) -> Option<SlotId> {
        match end {
            LineEnd::Origin => self.layout.line_or_pos.get(index).copied(),
            LineEnd::Extremity => self.layout.line_ex_pos.get(index).copied(),
        }
    }

    /// The terminal owning a topology slot.
    pub fn owner(&self, slot: SlotId) -> Option<Terminal> {
        self.owners.get(slot.0 as usize).copied()
    }

    /// Every topology slot of one element.
    ///
    /// One slot for loads, generators, and storage; two (origin then
    /// extremity) for lines. Empty if the index is out of range.
    pub fn slots_of(&self, kind: ElementKind, index: usize) -> SmallVec<[SlotId; 2]> {
        match kind {
            ElementKind::Load => match self.load_pos(index) {
                Some(slot) => smallvec![slot],
                None => SmallVec::new(),
            },
            ElementKind::Generator => match self.gen_pos(index) {
                Some(slot) => smallvec![slot],
                None => SmallVec::new(),
            },
            ElementKind::Storage => match self.storage_pos(index) {
                Some(slot) => smallvec![slot],
                None => SmallVec::new(),
            },
            ElementKind::Line => {
                match (
                    self.line_pos(index, LineEnd::Origin),
                    self.line_pos(index, LineEnd::Extremity),
                ) {
                    (Some(or), Some(ex)) => smallvec![or, ex],
                    _ => SmallVec::new(),
                }
            }
        }
    }

    /// The substation a topology slot belongs to.
    pub fn substation_of(&self, slot: SlotId) -> Option<usize> {
        self.layout.slot_sub.get(slot.0 as usize).copied()
    }
}

fn index_names(
    kind: ElementKind,
    names: &[String],
) -> Result<IndexMap<String, usize>, RegistryError> {
    let mut map = IndexMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if map.insert(name.clone(), i).is_some() {
            return Err(RegistryError::DuplicateName {
                kind,
                name: name.clone(),
            });
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_loads_one_line() -> GridLayout {
        GridLayout {
            name_load: vec!["load_0_0".into(), "load_1_1".into()],
            name_gen: vec![],
            name_storage: vec![],
            name_line: vec!["line_0_1_0".into()],
            load_pos: vec![SlotId(0), SlotId(2)],
            gen_pos: vec![],
            storage_pos: vec![],
            line_or_pos: vec![SlotId(1)],
            line_ex_pos: vec![SlotId(3)],
            n_sub: 2,
            slot_sub: vec![0, 0, 1, 1],
        }
    }

    #[test]
    fn valid_layout_builds() {
        let registry = GridRegistry::new(two_loads_one_line()).unwrap();
        assert_eq!(registry.dim_topo(), 4);
        assert_eq!(registry.n_load(), 2);
        assert_eq!(registry.load_index("load_1_1"), Some(1));
        assert_eq!(registry.owner(SlotId(2)), Some(Terminal::Load(1)));
        assert_eq!(
            registry.owner(SlotId(3)),
            Some(Terminal::Line {
                index: 0,
                end: LineEnd::Extremity
            })
        );
        assert_eq!(registry.substation_of(SlotId(3)), Some(1));
    }

    #[test]
    fn slots_of_line_has_both_ends() {
        let registry = GridRegistry::new(two_loads_one_line()).unwrap();
        let slots = registry.slots_of(ElementKind::Line, 0);
        assert_eq!(slots.as_slice(), &[SlotId(1), SlotId(3)]);
        assert_eq!(
            registry.slots_of(ElementKind::Load, 0).as_slice(),
            &[SlotId(0)]
        );
        assert!(registry.slots_of(ElementKind::Load, 9).is_empty());
    }

    #[test]
    fn count_mismatch_rejected() {
        let mut layout = two_loads_one_line();
        layout.load_pos.pop();
        let err = GridRegistry::new(layout).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::CountMismatch {
                kind: ElementKind::Load,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut layout = two_loads_one_line();
        layout.name_load[1] = "load_0_0".into();
        let err = GridRegistry::new(layout).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { .. }));
    }

    #[test]
    fn slot_out_of_range_rejected() {
        let mut layout = two_loads_one_line();
        layout.load_pos[1] = SlotId(4);
        let err = GridRegistry::new(layout).unwrap_err();
        assert_eq!(
            err,
            RegistryError::SlotOutOfRange {
                slot: SlotId(4),
                dim_topo: 4
            }
        );
    }

    #[test]
    fn slot_collision_rejected() {
        let mut layout = two_loads_one_line();
        layout.line_or_pos[0] = SlotId(0);
        let err = GridRegistry::new(layout).unwrap_err();
        assert_eq!(err, RegistryError::SlotReused { slot: SlotId(0) });
    }

    #[test]
    fn bad_substation_map_rejected() {
        let mut layout = two_loads_one_line();
        layout.slot_sub = vec![0, 0, 5, 1];
        let err = GridRegistry::new(layout).unwrap_err();
        assert!(matches!(err, RegistryError::BadSubstation { .. }));

        let mut layout = two_loads_one_line();
        layout.slot_sub.pop();
        assert!(matches!(
            GridRegistry::new(layout).unwrap_err(),
            RegistryError::BadSubstation { .. }
        ));
    }
}
