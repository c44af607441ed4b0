//! Ordered parameter tables and value ranges.
//!
//! A [`ParameterTable`] lists the device's native patch layout slot by slot.
//! The order is the hardware contract: slot `i` of the table is byte `i` of
//! the unpacked payload. Reserved slots are named [`RESERVED`].
//!
//! The key → index map is built once alongside the slot list and never
//! mutated, so tables can live in `static`s behind a `OnceLock` or be built
//! per codec instance.

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use crate::model::ParameterModel;

/// Marker for unused slots.
pub const RESERVED: &str = "-";

/// An ordered slot list with its key lookup.
#[derive(Debug, Clone)]
pub struct ParameterTable {
    slots: Vec<&'static str>,
    index: BTreeMap<&'static str, usize>,
}

impl ParameterTable {
    /// Builds a table from its slot order. For duplicate keys the first slot
    /// wins.
    pub fn new(slots: &[&'static str]) -> Self {
        let mut index = BTreeMap::new();
        for (i, &key) in slots.iter().enumerate() {
            if key != RESERVED {
                index.entry(key).or_insert(i);
            }
        }
        Self {
            slots: slots.to_vec(),
            index,
        }
    }

    /// Number of slots, reserved ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True for a table with no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Key at slot `i`.
    pub fn slot(&self, i: usize) -> Option<&'static str> {
        self.slots.get(i).copied()
    }

    /// All slots in order.
    pub fn slots(&self) -> &[&'static str] {
        &self.slots
    }

    /// Slot index of `key`.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// True when `key` names a slot.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Non-reserved keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().copied().filter(|&k| k != RESERVED)
    }
}

/// Inclusive value range for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRange {
    /// Parameter key.
    pub key: &'static str,
    /// Smallest legal value.
    pub min: i32,
    /// Largest legal value.
    pub max: i32,
}

impl ParamRange {
    /// Creates a range.
    pub const fn new(key: &'static str, min: i32, max: i32) -> Self {
        Self { key, min, max }
    }

    /// True when `value` lies in the range.
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Range lookup: explicit entries first, then a fallback for keys of a table.
#[derive(Debug, Clone)]
pub struct RangeMap {
    ranges: BTreeMap<&'static str, ParamRange>,
}

impl RangeMap {
    /// Every key of `table` gets `default_min..=default_max` unless
    /// `overrides` names it.
    pub fn new(
        keys: impl IntoIterator<Item = &'static str>,
        default_min: i32,
        default_max: i32,
        overrides: &[ParamRange],
    ) -> Self {
        let mut ranges: BTreeMap<_, _> = keys
            .into_iter()
            .map(|key| (key, ParamRange::new(key, default_min, default_max)))
            .collect();
        for r in overrides {
            ranges.insert(r.key, *r);
        }
        Self { ranges }
    }

    /// Range of `key`.
    pub fn get(&self, key: &str) -> Option<&ParamRange> {
        self.ranges.get(key)
    }

    /// All ranges in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ParamRange> {
        self.ranges.values()
    }

    /// Number of ranged keys.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True when no keys are ranged.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Clamps every ranged value present in `model`. Returns how many were
    /// changed.
    pub fn clamp(&self, model: &mut dyn ParameterModel) -> usize {
        let mut changed = 0;
        for r in self.ranges.values() {
            if let Some(v) = model.get(r.key) {
                let clamped = v.clamp(r.min, r.max);
                if clamped != v {
                    model.set(r.key, clamped);
                    changed += 1;
                }
            }
        }
        changed
    }
}

/// Display helper: the `value`th entry of `names`, or the number itself when
/// out of range.
pub fn name_from_list(names: &[&str], value: i32) -> String {
    #[cfg(not(feature = "std"))]
    use alloc::string::ToString;
    usize::try_from(value)
        .ok()
        .and_then(|i| names.get(i))
        .map_or_else(|| value.to_string(), |s| (*s).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Patch;

    #[test]
    fn lookup_skips_reserved() {
        let t = ParameterTable::new(&["a", "-", "b", "-", "c"]);
        assert_eq!(t.len(), 5);
        assert_eq!(t.index_of("b"), Some(2));
        assert_eq!(t.index_of("-"), None);
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(t.slot(1), Some(RESERVED));
    }

    #[test]
    fn duplicate_keys_keep_first_slot() {
        let t = ParameterTable::new(&["a", "a"]);
        assert_eq!(t.index_of("a"), Some(0));
    }

    #[test]
    fn range_map_defaults_and_overrides() {
        let ranges = RangeMap::new(["x", "y"], 0, 127, &[ParamRange::new("y", 2, 12)]);
        assert_eq!(ranges.get("x"), Some(&ParamRange::new("x", 0, 127)));
        assert_eq!(ranges.get("y").map(|r| r.max), Some(12));

        let mut p = Patch::new("").with("x", 200).with("y", 1);
        assert_eq!(ranges.clamp(&mut p), 2);
        assert_eq!(p.get("x"), Some(127));
        assert_eq!(p.get("y"), Some(2));
    }

    #[test]
    fn name_from_list_falls_back_to_number() {
        let waves = ["Saw", "Square"];
        assert_eq!(name_from_list(&waves, 1), "Square");
        assert_eq!(name_from_list(&waves, 5), "5");
        assert_eq!(name_from_list(&waves, -1), "-1");
    }
}
