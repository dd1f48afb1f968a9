//! Serde adapters for values that have no native JSON representation.
//!
//! Use them with `#[serde(with = "...")]` or `#[serde(serialize_with = "...")]`
//! on fields of types written through [`crate::fs_op::io::write_file_json`].

/// `SystemTime` as an RFC 3339 / ISO-8601 string.
pub mod iso8601 {
    use std::time::SystemTime;

    use chrono::{DateTime, Local};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
        let dt: DateTime<Local> = (*time).into();
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SystemTime, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(SystemTime::from)
            .map_err(serde::de::Error::custom)
    }
}

/// Unordered sets as sorted JSON arrays, so the output is stable.
pub mod ordered_set {
    use std::collections::HashSet;
    use std::hash::Hash;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(set: &HashSet<T>, s: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize + Ord,
        S: Serializer,
    {
        let mut items: Vec<&T> = set.iter().collect();
        items.sort();
        items.serialize(s)
    }

    pub fn deserialize<'de, T, D>(d: D) -> Result<HashSet<T>, D::Error>
    where
        T: Deserialize<'de> + Eq + Hash,
        D: Deserializer<'de>,
    {
        Ok(Vec::<T>::deserialize(d)?.into_iter().collect())
    }
}

/// Serialize any `Display` value as its string form.
pub mod display {
    use std::fmt::Display;

    use serde::Serializer;

    pub fn serialize<T: Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }
}
