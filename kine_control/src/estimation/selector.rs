//! Wrench component selectors.
//!
//! A selector is an ordered subset of indices into a 6-D spatial vector
//! (`0..3` linear, `3..6` angular). The observer holds two of them: one
//! masks the wrench output, the other masks the Jacobian rows that take part
//! in the joint-effort → wrench mapping.

use bitflags::bitflags;
use kine_common::consts::WRENCH_DIM;
use nalgebra::Vector6;
use static_assertions::const_assert_eq;

use crate::error::SelectorFault;

bitflags! {
    /// Membership mask over the six wrench components.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WrenchAxes: u8 {
        const FX = 0x01;
        const FY = 0x02;
        const FZ = 0x04;
        const TX = 0x08;
        const TY = 0x10;
        const TZ = 0x20;
    }
}

const_assert_eq!(core::mem::size_of::<WrenchAxes>(), 1);

impl WrenchAxes {
    /// Linear force components.
    pub const LINEAR: Self =
        Self::from_bits_truncate(Self::FX.bits() | Self::FY.bits() | Self::FZ.bits());

    /// Angular torque components.
    pub const ANGULAR: Self =
        Self::from_bits_truncate(Self::TX.bits() | Self::TY.bits() | Self::TZ.bits());

    /// Flag for component `index`, `None` when out of range.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < WRENCH_DIM {
            Some(Self::from_bits_truncate(1 << index))
        } else {
            None
        }
    }

    /// Returns true if component `index` is set.
    #[inline]
    pub const fn has_index(&self, index: usize) -> bool {
        index < WRENCH_DIM && (self.bits() & (1 << index)) != 0
    }
}

impl Default for WrenchAxes {
    fn default() -> Self {
        Self::all()
    }
}

/// Validated, ordered subset of `{0, …, 5}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    indices: heapless::Vec<usize, WRENCH_DIM>,
    mask: WrenchAxes,
}

impl Selector {
    /// Build a selector from component indices.
    ///
    /// Rejects indices outside `[0, 5]` and repeated indices. Order is kept.
    pub fn new(indices: &[usize]) -> Result<Self, SelectorFault> {
        let mut stored = heapless::Vec::new();
        let mut mask = WrenchAxes::empty();

        for &i in indices {
            let flag = WrenchAxes::from_index(i).ok_or(SelectorFault::OutOfRange(i))?;
            if mask.contains(flag) {
                return Err(SelectorFault::Duplicate(i));
            }
            mask |= flag;
            // Unique in-range indices never exceed the capacity.
            stored.push(i).map_err(|_| SelectorFault::Duplicate(i))?;
        }

        Ok(Self {
            indices: stored,
            mask,
        })
    }

    /// All six components, in natural order.
    pub fn all() -> Self {
        Self {
            indices: (0..WRENCH_DIM).collect(),
            mask: WrenchAxes::all(),
        }
    }

    /// Linear force components only.
    pub fn linear() -> Self {
        Self {
            indices: (0..3).collect(),
            mask: WrenchAxes::LINEAR,
        }
    }

    /// Angular torque components only.
    pub fn angular() -> Self {
        Self {
            indices: (3..WRENCH_DIM).collect(),
            mask: WrenchAxes::ANGULAR,
        }
    }

    /// Selected indices in caller order.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn mask(&self) -> WrenchAxes {
        self.mask
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.mask.has_index(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Zero every component of `vector` that is not selected.
    #[inline]
    pub fn apply(&self, vector: &mut Vector6<f64>) {
        for i in 0..WRENCH_DIM {
            if !self.contains(i) {
                vector[i] = 0.0;
            }
        }
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::all()
    }
}
