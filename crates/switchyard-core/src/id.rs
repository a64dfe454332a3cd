//! Strongly-typed identifiers for grid elements and topology slots.

use std::fmt;

/// Identifies a slot in the flattened topology vector.
///
/// Every electrical terminal of every element (one per load, generator, and
/// storage unit, two per line) occupies exactly one slot. Slots are assigned
/// at registry construction and never change for the lifetime of an
/// environment. `SlotId(n)` is the n-th entry of the topology vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SlotId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// The kinds of grid element tracked by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A consumer of power.
    Load,
    /// A producer of power.
    Generator,
    /// A storage unit (battery, pumped hydro, ...).
    Storage,
    /// A powerline or transformer connecting two substations.
    Line,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Generator => write!(f, "generator"),
            Self::Storage => write!(f, "storage"),
            Self::Line => write!(f, "line"),
        }
    }
}

/// Which end of a line a slot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineEnd {
    /// The origin side.
    Origin,
    /// The extremity side.
    Extremity,
}

impl fmt::Display for LineEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => write!(f, "origin"),
            Self::Extremity => write!(f, "extremity"),
        }
    }
}

/// The element terminal that owns a topology-vector slot.
///
/// Produced by [`GridRegistry::owner`](crate::GridRegistry::owner) when
/// translating between slot-indexed fields (`set_bus`, `change_bus`) and
/// element-indexed fields (the detach flags).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// The terminal of the load with this element index.
    Load(usize),
    /// The terminal of the generator with this element index.
    Generator(usize),
    /// The terminal of the storage unit with this element index.
    Storage(usize),
    /// One end of the line with this element index.
    Line {
        /// Element index of the line.
        index: usize,
        /// Which end of the line.
        end: LineEnd,
    },
}

impl Terminal {
    /// The kind of element this terminal belongs to.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Load(_) => ElementKind::Load,
            Self::Generator(_) => ElementKind::Generator,
            Self::Storage(_) => ElementKind::Storage,
            Self::Line { .. } => ElementKind::Line,
        }
    }

    /// The element index within its kind.
    pub fn index(&self) -> usize {
        match self {
            Self::Load(i) | Self::Generator(i) | Self::Storage(i) => *i,
            Self::Line { index, .. } => *index,
        }
    }
}

/// A live busbar assignment for one topology slot.
///
/// The raw wire encoding used by the original interchange formats maps
/// `0` to "no change" (no assignment present), `-1` to disconnection, and
/// `n >= 1` to busbar `n`. [`BusTarget`] represents only the live values;
/// the neutral `0` is the *absence* of a `BusTarget`.
///
/// # Examples
///
/// ```
/// use switchyard_core::BusTarget;
///
/// assert_eq!(BusTarget::from_raw(0).unwrap(), None);
/// assert_eq!(BusTarget::from_raw(-1).unwrap(), Some(BusTarget::Disconnect));
/// assert_eq!(BusTarget::from_raw(2).unwrap(), Some(BusTarget::Bus(2)));
/// assert!(BusTarget::from_raw(-3).is_err());
///
/// assert_eq!(BusTarget::Disconnect.to_raw(), -1);
/// assert_eq!(BusTarget::Bus(1).to_raw(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BusTarget {
    /// Disconnect the terminal from every busbar.
    Disconnect,
    /// Connect the terminal to this busbar (numbered from 1).
    Bus(u32),
}

impl BusTarget {
    /// Decode a raw assignment value.
    ///
    /// Returns `Ok(None)` for the neutral value `0`, `Ok(Some(..))` for a
    /// live value, and `Err` with the rejected raw value for anything below
    /// `-1`.
    pub fn from_raw(raw: i32) -> Result<Option<Self>, i32> {
        match raw {
            0 => Ok(None),
            -1 => Ok(Some(Self::Disconnect)),
            n if n >= 1 => Ok(Some(Self::Bus(n as u32))),
            other => Err(other),
        }
    }

    /// Encode this assignment as its raw wire value.
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Disconnect => -1,
            Self::Bus(n) => n as i32,
        }
    }
}

impl fmt::Display for BusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnect => write!(f, "disconnect"),
            Self::Bus(n) => write!(f, "bus {n}"),
        }
    }
}
