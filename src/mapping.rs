//! The "Mapping" configuration group.
//!
//! A [`Mapping`] is an ordered set of option name/value pairs taken from a
//! map-projection label. Names keep the spelling they were inserted with;
//! lookup is ASCII-case-insensitive, matching the label conventions of the
//! data products this crate consumes. Values are plain text, reals, or
//! integers ([`MapValue`]), and the typed getters coerce between them the way
//! label keywords do (a textual `"360"` reads fine as an integer).

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProjError;

/// Latitude convention of a Mapping group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatitudeType {
    Planetocentric,
    Planetographic,
}

impl LatitudeType {
    pub fn from_label(s: &str) -> Result<Self, ProjError> {
        match s {
            "Planetocentric" => Ok(LatitudeType::Planetocentric),
            "Planetographic" => Ok(LatitudeType::Planetographic),
            _ => Err(ProjError::Configuration(format!(
                "invalid value [{s}] for option [LatitudeType], \
                 must be [Planetocentric or Planetographic]"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LatitudeType::Planetocentric => "Planetocentric",
            LatitudeType::Planetographic => "Planetographic",
        }
    }
}

/// Longitude sign convention of a Mapping group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LongitudeDirection {
    PositiveEast,
    PositiveWest,
}

impl LongitudeDirection {
    pub fn from_label(s: &str) -> Result<Self, ProjError> {
        match s {
            "PositiveEast" => Ok(LongitudeDirection::PositiveEast),
            "PositiveWest" => Ok(LongitudeDirection::PositiveWest),
            _ => Err(ProjError::Configuration(format!(
                "invalid value [{s}] for option [LongitudeDirection], \
                 must be [PositiveEast or PositiveWest]"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LongitudeDirection::PositiveEast => "PositiveEast",
            LongitudeDirection::PositiveWest => "PositiveWest",
        }
    }
}

/// Longitude domain of a Mapping group: [-180, 180) or [0, 360).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LongitudeDomain {
    Domain180,
    Domain360,
}

impl LongitudeDomain {
    pub fn from_value(v: i64) -> Result<Self, ProjError> {
        match v {
            180 => Ok(LongitudeDomain::Domain180),
            360 => Ok(LongitudeDomain::Domain360),
            _ => Err(ProjError::Configuration(format!(
                "invalid value [{v}] for option [LongitudeDomain], must be [180 or 360]"
            ))),
        }
    }

    pub fn value(self) -> i64 {
        match self {
            LongitudeDomain::Domain180 => 180,
            LongitudeDomain::Domain360 => 360,
        }
    }
}

/// A single Mapping option value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl MapValue {
    /// Numeric view. Integers widen; text parses the way label keywords do.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MapValue::Real(v) => Some(*v),
            MapValue::Integer(v) => Some(*v as f64),
            MapValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MapValue::Integer(v) => Some(*v),
            MapValue::Real(v) if v.fract() == 0.0 => Some(*v as i64),
            MapValue::Real(_) => None,
            MapValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MapValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapValue::Integer(v) => write!(f, "{v}"),
            MapValue::Real(v) => write!(f, "{v}"),
            MapValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for MapValue {
    fn from(v: f64) -> Self {
        MapValue::Real(v)
    }
}

impl From<i64> for MapValue {
    fn from(v: i64) -> Self {
        MapValue::Integer(v)
    }
}

impl From<&str> for MapValue {
    fn from(v: &str) -> Self {
        MapValue::Text(v.to_string())
    }
}

impl From<String> for MapValue {
    fn from(v: String) -> Self {
        MapValue::Text(v)
    }
}

/// An ordered Mapping group.
///
/// Each projection owns its copy; the factory and projection constructors
/// may write defaulted options back into it, after which it is read-only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, MapValue)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace an option. Replacement keeps the spelling the option
    /// was first inserted with.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<MapValue>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MapValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MapValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Required real-valued option.
    pub fn real(&self, name: &str) -> Result<f64, ProjError> {
        let value = self
            .get(name)
            .ok_or_else(|| ProjError::MissingOption(name.to_string()))?;
        value.as_f64().ok_or_else(|| {
            ProjError::Configuration(format!("option [{name}] value [{value}] is not a number"))
        })
    }

    /// Required integer-valued option.
    pub fn integer(&self, name: &str) -> Result<i64, ProjError> {
        let value = self
            .get(name)
            .ok_or_else(|| ProjError::MissingOption(name.to_string()))?;
        value.as_i64().ok_or_else(|| {
            ProjError::Configuration(format!("option [{name}] value [{value}] is not an integer"))
        })
    }

    /// Required text-valued option.
    pub fn text(&self, name: &str) -> Result<&str, ProjError> {
        let value = self
            .get(name)
            .ok_or_else(|| ProjError::MissingOption(name.to_string()))?;
        value.as_str().ok_or_else(|| {
            ProjError::Configuration(format!("option [{name}] value [{value}] is not text"))
        })
    }
}

impl fmt::Display for Mapping {
    /// Renders the group in label form, the shape callers expect when the
    /// effective mapping is echoed back to them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|(k, _)| k.len())
            .max()
            .unwrap_or(0);
        writeln!(f, "Group = Mapping")?;
        for (name, value) in &self.entries {
            writeln!(f, "  {name:<width$} = {value}")?;
        }
        write!(f, "End_Group")
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = Mapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a Mapping group as a map of option names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Mapping, A::Error> {
                let mut mapping = Mapping::new();
                while let Some((name, value)) = access.next_entry::<String, MapValue>()? {
                    mapping.insert(name, value);
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}
