//! Fixture registries for Switchyard development.
//!
//! Small, fully-specified grids used across the workspace's tests. The
//! layouts are written out slot by slot so test failures point at concrete
//! positions rather than generated ones.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use switchyard_core::{GridLayout, GridRegistry, SlotId};

/// A five-substation grid: 3 loads, 2 generators, 1 storage unit, 8 lines.
///
/// Slot layout (22 slots, grouped by substation):
///
/// ```text
/// sub 0: 0 load_0_0   1 gen_0_0    2 l0.or  3 l1.or  4 l2.or
/// sub 1: 5 gen_1_1    6 l3.or      7 l7.or  8 l0.ex
/// sub 2: 9 storage_2_0 10 l4.or   11 l5.or 12 l1.ex 13 l3.ex
/// sub 3: 14 load_3_1  15 l6.or    16 l2.ex 17 l4.ex
/// sub 4: 18 load_4_2  19 l5.ex    20 l6.ex 21 l7.ex
/// ```
///
/// Lines run 0–1, 0–2, 0–3, 1–2, 2–3, 2–4, 3–4, 1–4.
pub fn case5() -> Arc<GridRegistry> {
    let layout = GridLayout {
        name_load: vec!["load_0_0".into(), "load_3_1".into(), "load_4_2".into()],
        name_gen: vec!["gen_0_0".into(), "gen_1_1".into()],
        name_storage: vec!["storage_2_0".into()],
        name_line: vec![
            "line_0_1_0".into(),
            "line_0_2_1".into(),
            "line_0_3_2".into(),
            "line_1_2_3".into(),
            "line_2_3_4".into(),
            "line_2_4_5".into(),
            "line_3_4_6".into(),
            "line_1_4_7".into(),
        ],
        load_pos: vec![SlotId(0), SlotId(14), SlotId(18)],
        gen_pos: vec![SlotId(1), SlotId(5)],
        storage_pos: vec![SlotId(9)],
        line_or_pos: vec![
            SlotId(2),
            SlotId(3),
            SlotId(4),
            SlotId(6),
            SlotId(10),
            SlotId(11),
            SlotId(15),
            SlotId(7),
        ],
        line_ex_pos: vec![
            SlotId(8),
            SlotId(12),
            SlotId(16),
            SlotId(13),
            SlotId(17),
            SlotId(19),
            SlotId(20),
            SlotId(21),
        ],
        n_sub: 5,
        slot_sub: vec![
            0, 0, 0, 0, 0, // sub 0
            1, 1, 1, 1, // sub 1
            2, 2, 2, 2, 2, // sub 2
            3, 3, 3, 3, // sub 3
            4, 4, 4, 4, // sub 4
        ],
    };
    Arc::new(GridRegistry::new(layout).expect("case5 layout is valid"))
}

/// A two-substation grid with a single load sitting at topology slot 7.
///
/// Four lines fill slots 0–6 and 8; the load's terminal is slot 7.
pub fn single_load() -> Arc<GridRegistry> {
    let layout = GridLayout {
        name_load: vec!["load_1_0".into()],
        name_gen: vec![],
        name_storage: vec![],
        name_line: vec![
            "line_0_1_0".into(),
            "line_0_1_1".into(),
            "line_0_1_2".into(),
            "line_0_1_3".into(),
        ],
        load_pos: vec![SlotId(7)],
        gen_pos: vec![],
        storage_pos: vec![],
        line_or_pos: vec![SlotId(0), SlotId(1), SlotId(2), SlotId(3)],
        line_ex_pos: vec![SlotId(4), SlotId(5), SlotId(6), SlotId(8)],
        n_sub: 2,
        slot_sub: vec![0, 0, 0, 0, 1, 1, 1, 1, 1],
    };
    Arc::new(GridRegistry::new(layout).expect("single_load layout is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::{ElementKind, Terminal};

    #[test]
    fn case5_counts() {
        let registry = case5();
        assert_eq!(registry.dim_topo(), 22);
        assert_eq!(registry.n_sub(), 5);
        assert_eq!(registry.load_index("load_4_2"), Some(2));
        assert_eq!(registry.load_pos(2), Some(SlotId(18)));
        assert_eq!(registry.substation_of(SlotId(18)), Some(4));
    }

    #[test]
    fn case5_owner_table_is_consistent() {
        let registry = case5();
        for kind in [
            ElementKind::Load,
            ElementKind::Generator,
            ElementKind::Storage,
            ElementKind::Line,
        ] {
            for index in 0..registry.count(kind) {
                for slot in registry.slots_of(kind, index) {
                    let owner = registry.owner(slot).unwrap();
                    assert_eq!(owner.kind(), kind);
                    assert_eq!(owner.index(), index);
                }
            }
        }
    }

    #[test]
    fn single_load_sits_at_slot_seven() {
        let registry = single_load();
        assert_eq!(registry.dim_topo(), 9);
        assert_eq!(registry.load_pos(0), Some(SlotId(7)));
        assert_eq!(registry.owner(SlotId(7)), Some(Terminal::Load(0)));
    }
}
