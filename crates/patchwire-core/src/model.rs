//! Patch model: a named bag of integer parameters keyed by string.
//!
//! Codecs never touch a patch directly; they read and write through
//! [`ParameterModel`], which keeps them independent of whatever editor or
//! file format holds the values.

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, string::String};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

/// A bank/number pair addressing one patch slot on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PatchLocation {
    /// Zero-based bank index.
    pub bank: u8,
    /// Zero-based patch number within the bank.
    pub number: u8,
}

impl PatchLocation {
    /// Creates a location.
    pub const fn new(bank: u8, number: u8) -> Self {
        Self { bank, number }
    }

    /// The slot after this one, wrapping the number into the next bank and
    /// the last bank back to the first.
    ///
    /// ```rust
    /// use patchwire_core::PatchLocation;
    ///
    /// let last = PatchLocation::new(3, 127);
    /// assert_eq!(last.next(4, 128), PatchLocation::new(0, 0));
    /// ```
    pub fn next(self, banks: u8, per_bank: u8) -> Self {
        let number = self.number.saturating_add(1);
        if per_bank == 0 || number >= per_bank {
            let bank = self.bank.saturating_add(1);
            Self::new(if bank >= banks { 0 } else { bank }, 0)
        } else {
            Self::new(self.bank, number)
        }
    }
}

/// String-keyed integer parameter access.
pub trait ParameterModel {
    /// Value of `key`, if set.
    fn get(&self, key: &str) -> Option<i32>;

    /// Sets `key` to `value`.
    fn set(&mut self, key: &str, value: i32);

    /// Patch name.
    fn name(&self) -> &str;

    /// Replaces the patch name.
    fn set_name(&mut self, name: &str);

    /// Value of `key`, or `default` when unset.
    fn get_or(&self, key: &str, default: i32) -> i32 {
        self.get(key).unwrap_or(default)
    }

    /// Where the patch was read from or is headed, if known.
    fn location(&self) -> Option<PatchLocation> {
        None
    }
}

/// One decoded patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Patch {
    name: String,
    location: Option<PatchLocation>,
    values: BTreeMap<String, i32>,
}

impl Patch {
    /// An empty patch with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            location: None,
            values: BTreeMap::new(),
        }
    }

    /// Builder form of [`set_location`](Self::set_location).
    pub fn with_location(mut self, location: PatchLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Builder form of [`ParameterModel::set`].
    pub fn with(mut self, key: &str, value: i32) -> Self {
        self.set(key, value);
        self
    }

    /// Sets or clears the location.
    pub fn set_location(&mut self, location: Option<PatchLocation>) {
        self.location = location;
    }

    /// All parameters in key order.
    pub fn values(&self) -> impl Iterator<Item = (&str, i32)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Number of parameters set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<i32> {
        self.values.remove(key)
    }
}

impl ParameterModel for Patch {
    fn get(&self, key: &str) -> Option<i32> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i32) {
        if let Some(slot) = self.values.get_mut(key) {
            *slot = value;
        } else {
            self.values.insert(key.into(), value);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.into();
    }

    fn location(&self) -> Option<PatchLocation> {
        self.location
    }
}

impl FromIterator<(String, i32)> for Patch {
    fn from_iter<I: IntoIterator<Item = (String, i32)>>(iter: I) -> Self {
        Self {
            name: String::new(),
            location: None,
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_and_defaults() {
        let mut p = Patch::new("Lead");
        assert_eq!(p.get("cutoff"), None);
        assert_eq!(p.get_or("cutoff", 7), 7);
        p.set("cutoff", 9000);
        p.set("cutoff", 9001);
        assert_eq!(p.get("cutoff"), Some(9001));
        assert_eq!(p.len(), 1);
        assert_eq!(p.name(), "Lead");
    }

    #[test]
    fn values_iterate_in_key_order() {
        let p = Patch::new("x").with("b", 2).with("a", 1).with("c", 3);
        let keys: Vec<&str> = p.values().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn next_location_wraps_number_then_bank() {
        assert_eq!(
            PatchLocation::new(0, 5).next(4, 128),
            PatchLocation::new(0, 6)
        );
        assert_eq!(
            PatchLocation::new(1, 127).next(4, 128),
            PatchLocation::new(2, 0)
        );
        assert_eq!(
            PatchLocation::new(6, 47).next(7, 48),
            PatchLocation::new(0, 0)
        );
    }

    #[test]
    fn equality_includes_name_and_location() {
        let a = Patch::new("A").with("x", 1);
        let b = a.clone().with_location(PatchLocation::new(0, 1));
        assert_ne!(a, b);
        let mut c = a.clone();
        c.set_name("B");
        assert_ne!(a, c);
    }
}
