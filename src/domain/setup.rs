use super::{Attribute, VirtualChannel};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Full schema snapshot: attributes and virtual channels.
///
/// On the wire both lists are JSON objects keyed by identifier. Entry order
/// is preserved in both directions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Setup {
    pub attributes: Vec<Attribute>,
    pub virtual_channels: Vec<VirtualChannel>,
}

impl Setup {
    pub fn new(attributes: Vec<Attribute>, virtual_channels: Vec<VirtualChannel>) -> Self {
        Self {
            attributes,
            virtual_channels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.virtual_channels.is_empty()
    }

    pub fn contains_attribute(&self, identifier: &str) -> bool {
        self.attributes.iter().any(|a| a.identifier == identifier)
    }

    pub fn contains_virtual_channel(&self, identifier: &str) -> bool {
        self.virtual_channels
            .iter()
            .any(|vc| vc.identifier == identifier)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Schema entities stored in identifier-keyed maps.
trait Keyed {
    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);
}

impl Keyed for Attribute {
    fn key(&self) -> &str {
        &self.identifier
    }

    fn set_key(&mut self, key: String) {
        self.identifier = key;
    }
}

impl Keyed for VirtualChannel {
    fn key(&self) -> &str {
        &self.identifier
    }

    fn set_key(&mut self, key: String) {
        self.identifier = key;
    }
}

struct KeyedSlice<'a, T>(&'a [T]);

impl<T: Keyed + Serialize> Serialize for KeyedSlice<'_, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(entry.key(), entry)?;
        }
        map.end()
    }
}

struct KeyedVec<T>(Vec<T>);

impl<T> Default for KeyedVec<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, T: Keyed + Deserialize<'de>> Deserialize<'de> for KeyedVec<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyedVisitor<T>(PhantomData<T>);

        impl<'de, T: Keyed + Deserialize<'de>> Visitor<'de> for KeyedVisitor<T> {
            type Value = KeyedVec<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map keyed by identifier")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, mut entry)) = map.next_entry::<String, T>()? {
                    entry.set_key(key);
                    entries.push(entry);
                }
                Ok(KeyedVec(entries))
            }
        }

        deserializer.deserialize_map(KeyedVisitor(PhantomData))
    }
}

#[derive(Serialize)]
struct SetupRef<'a> {
    attributes: KeyedSlice<'a, Attribute>,
    virtual_channels: KeyedSlice<'a, VirtualChannel>,
}

#[derive(Deserialize)]
struct SetupOwned {
    #[serde(default)]
    attributes: KeyedVec<Attribute>,
    #[serde(default)]
    virtual_channels: KeyedVec<VirtualChannel>,
}

impl Serialize for Setup {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        SetupRef {
            attributes: KeyedSlice(&self.attributes),
            virtual_channels: KeyedSlice(&self.virtual_channels),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Setup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let owned = SetupOwned::deserialize(deserializer)?;
        Ok(Self {
            attributes: owned.attributes.0,
            virtual_channels: owned.virtual_channels.0,
        })
    }
}
