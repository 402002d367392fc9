//! NBT (Named Binary Tag) values attached to entities and tile entities.
//!
//! Only the in-memory tree is modelled here. Scanners export it as JSON, so
//! the tree implements `serde::Serialize` with compounds mapping to objects and
//! every list or array mapping to a JSON array.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// An NBT value
#[derive(Debug, Clone, PartialEq)]
pub enum NbtValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(NbtList),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// An NBT list (all elements must be same type)
#[derive(Debug, Clone, PartialEq)]
pub enum NbtList {
    Empty,
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    String(Vec<String>),
    List(Vec<NbtList>),
    Compound(Vec<NbtCompound>),
}

/// An NBT compound (map of string -> value), in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbtCompound {
    entries: Vec<(String, NbtValue)>,
}

impl NbtCompound {
    /// Create a new empty compound
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a value, replacing an existing entry with the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<NbtValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Get a value by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&NbtValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Get a string value by name.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            NbtValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get a nested compound by name.
    #[must_use]
    pub fn get_compound(&self, key: &str) -> Option<&Self> {
        match self.get(key)? {
            NbtValue::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NbtValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the compound has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for NbtValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Byte(v) => serializer.serialize_i8(*v),
            Self::Short(v) => serializer.serialize_i16(*v),
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::Long(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::ByteArray(v) => serializer.collect_seq(v),
            Self::String(v) => serializer.serialize_str(v),
            Self::List(list) => list.serialize(serializer),
            Self::Compound(compound) => compound.serialize(serializer),
            Self::IntArray(v) => serializer.collect_seq(v),
            Self::LongArray(v) => serializer.collect_seq(v),
        }
    }
}

impl Serialize for NbtList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.collect_seq(core::iter::empty::<i8>()),
            Self::Byte(v) => serializer.collect_seq(v),
            Self::Short(v) => serializer.collect_seq(v),
            Self::Int(v) => serializer.collect_seq(v),
            Self::Long(v) => serializer.collect_seq(v),
            Self::Float(v) => serializer.collect_seq(v),
            Self::Double(v) => serializer.collect_seq(v),
            Self::String(v) => serializer.collect_seq(v),
            Self::List(v) => serializer.collect_seq(v),
            Self::Compound(v) => serializer.collect_seq(v),
        }
    }
}

impl Serialize for NbtCompound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// Convenient From implementations
impl From<bool> for NbtValue {
    fn from(v: bool) -> Self {
        Self::Byte(i8::from(v))
    }
}

impl From<i8> for NbtValue {
    fn from(v: i8) -> Self {
        Self::Byte(v)
    }
}

impl From<i16> for NbtValue {
    fn from(v: i16) -> Self {
        Self::Short(v)
    }
}

impl From<i32> for NbtValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for NbtValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for NbtValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for NbtValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for NbtValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for NbtValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<NbtCompound> for NbtValue {
    fn from(v: NbtCompound) -> Self {
        Self::Compound(v)
    }
}

impl From<NbtList> for NbtValue {
    fn from(v: NbtList) -> Self {
        Self::List(v)
    }
}

/// Macro for building NBT compounds ergonomically
///
/// # Example
/// ```
/// use scan_world::nbt;
///
/// let compound = nbt! {
///     "CustomName" => "Steve",
///     "Health" => 20.0f32,
///     "Owner" => nbt! {
///         "Tamed" => true,
///     },
/// };
/// assert_eq!(compound.len(), 3);
/// ```
#[macro_export]
macro_rules! nbt {
    // Empty compound
    () => {
        $crate::nbt::NbtCompound::new()
    };

    // Compound with entries
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut compound = $crate::nbt::NbtCompound::new();
        $(
            compound.insert($key, $value);
        )*
        compound
    }};
}
