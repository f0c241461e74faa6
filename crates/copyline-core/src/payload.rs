//! Payload classification for copyable log lines.
//!
//! # Design
//! - A closed `Payload` enum carries the shape; keyed maps, structured values,
//!   and scalars are matched exhaustively by the renderer.
//! - Conversion goes through the `IntoPayload` and `MapKey` adapter traits so
//!   callers never hand the formatter an untyped value.
//! - Conversion is fallible; the formatter turns failures into a placeholder.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Write as _};

use serde::Serialize;
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::{FormatError, FormatResult};

/// A payload classified into exactly one rendering case.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Keyed-association container, rendered as a plain JSON object.
    KeyedMap(KeyedEntries),
    /// Non-null composite value (object or array), rendered as JSON.
    Structured(Value),
    /// Primitive value, rendered with the to-string coercion.
    Scalar(Scalar),
}

/// Primitive payload values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Absent or null value; renders as `null`.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Number(Number),
    /// Floating point value; non-finite values are allowed.
    Float(f64),
    /// Text rendered verbatim.
    Text(String),
}

impl Payload {
    /// Serialize an arbitrary record and classify the result.
    ///
    /// Records that serialize to a JSON primitive are demoted to `Scalar`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Serialize`] when the value's `Serialize`
    /// implementation fails.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> FormatResult<Self> {
        serde_json::to_value(value)
            .map(Self::from_value)
            .map_err(|source| FormatError::Serialize { source })
    }

    /// Coerce any displayable value into a text scalar.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Display`] when the `Display` implementation
    /// reports an error.
    pub fn display<T: Display + ?Sized>(value: &T) -> FormatResult<Self> {
        let mut text = String::new();
        write!(text, "{value}").map_err(|_| FormatError::Display)?;
        Ok(Self::Scalar(Scalar::Text(text)))
    }

    /// Try the structured serializer first, then fall back to `Display`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Display`] when both paths fail.
    pub fn structured_or_display<T: Serialize + Display + ?Sized>(value: &T) -> FormatResult<Self> {
        Self::structured(value).or_else(|err| {
            debug!(error = %err, "structured serialization failed; using text coercion");
            Self::display(value)
        })
    }

    /// Classify an already-built JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) | Value::Array(_) => Self::Structured(value),
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(flag) => Self::Scalar(Scalar::Bool(flag)),
            Value::Number(number) => Self::Scalar(Scalar::from(number)),
            Value::String(text) => Self::Scalar(Scalar::Text(text)),
        }
    }
}

impl From<Number> for Scalar {
    fn from(number: Number) -> Self {
        if number.is_f64() {
            Self::Float(number.as_f64().unwrap_or(f64::NAN))
        } else {
            Self::Number(number)
        }
    }
}

/// Ordered key/value entries of a keyed map.
///
/// Each key text appears once. Re-inserting a key keeps its first position
/// and replaces the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedEntries {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl KeyedEntries {
    /// Create an empty keyed map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a keyed map from ordered pairs, preserving first-seen key order.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MapEntry`] if a value cannot be serialized.
    pub fn from_pairs<K, V, I>(pairs: I) -> FormatResult<Self>
    where
        K: MapKey,
        V: Serialize,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entries = Self::new();
        for (key, value) in pairs {
            entries.try_insert(&key, &value)?;
        }
        Ok(entries)
    }

    /// Insert an already-serialized value.
    pub fn insert(&mut self, key: &(impl MapKey + ?Sized), value: Value) {
        let key = key.key_text();
        if let Some(&slot) = self.index.get(&key) {
            self.entries[slot].1 = value;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, value));
        }
    }

    /// Serialize `value` and insert it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MapEntry`] if the value cannot be serialized.
    pub fn try_insert<V: Serialize + ?Sized>(
        &mut self,
        key: &(impl MapKey + ?Sized),
        value: &V,
    ) -> FormatResult<()> {
        let value = serde_json::to_value(value).map_err(|source| FormatError::MapEntry {
            key: key.key_text(),
            source,
        })?;
        self.insert(key, value);
        Ok(())
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order of first insertion.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// Values usable as keyed-map keys.
pub trait MapKey {
    /// Textual form of the key in the rendered object.
    fn key_text(&self) -> String;
}

impl MapKey for str {
    fn key_text(&self) -> String {
        self.to_string()
    }
}

impl MapKey for String {
    fn key_text(&self) -> String {
        self.clone()
    }
}

impl MapKey for char {
    fn key_text(&self) -> String {
        self.to_string()
    }
}

impl MapKey for bool {
    fn key_text(&self) -> String {
        self.to_string()
    }
}

impl<T: MapKey + ?Sized> MapKey for &T {
    fn key_text(&self) -> String {
        (**self).key_text()
    }
}

macro_rules! integer_map_keys {
    ($($ty:ty),*) => {
        $(
            impl MapKey for $ty {
                fn key_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_map_keys!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Values that can be classified into a [`Payload`].
pub trait IntoPayload {
    /// Convert into a classified payload.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when the value cannot be serialized.
    fn into_payload(self) -> FormatResult<Payload>;
}

impl IntoPayload for Payload {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(self)
    }
}

impl IntoPayload for FormatResult<Payload> {
    fn into_payload(self) -> FormatResult<Payload> {
        self
    }
}

impl IntoPayload for KeyedEntries {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::KeyedMap(self))
    }
}

impl IntoPayload for Value {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::from_value(self))
    }
}

impl IntoPayload for &Value {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::from_value(self.clone()))
    }
}

impl IntoPayload for &str {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::Scalar(Scalar::Text(self.to_string())))
    }
}

impl IntoPayload for String {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::Scalar(Scalar::Text(self)))
    }
}

impl IntoPayload for &String {
    fn into_payload(self) -> FormatResult<Payload> {
        self.as_str().into_payload()
    }
}

impl IntoPayload for char {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::Scalar(Scalar::Text(self.to_string())))
    }
}

impl IntoPayload for bool {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::Scalar(Scalar::Bool(self)))
    }
}

impl IntoPayload for () {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::Scalar(Scalar::Null))
    }
}

impl IntoPayload for f64 {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::Scalar(Scalar::Float(self)))
    }
}

impl IntoPayload for f32 {
    fn into_payload(self) -> FormatResult<Payload> {
        Ok(Payload::Scalar(Scalar::Float(f64::from(self))))
    }
}

macro_rules! integer_payloads {
    ($($ty:ty),*) => {
        $(
            impl IntoPayload for $ty {
                fn into_payload(self) -> FormatResult<Payload> {
                    Ok(Payload::Scalar(Scalar::Number(Number::from(self))))
                }
            }
        )*
    };
}

integer_payloads!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: IntoPayload> IntoPayload for Option<T> {
    fn into_payload(self) -> FormatResult<Payload> {
        self.map_or(Ok(Payload::Scalar(Scalar::Null)), IntoPayload::into_payload)
    }
}

impl<T: Serialize> IntoPayload for Vec<T> {
    fn into_payload(self) -> FormatResult<Payload> {
        Payload::structured(&self)
    }
}

impl<T: Serialize> IntoPayload for &[T] {
    fn into_payload(self) -> FormatResult<Payload> {
        Payload::structured(self)
    }
}

impl<K: MapKey, V: Serialize, S> IntoPayload for &HashMap<K, V, S> {
    fn into_payload(self) -> FormatResult<Payload> {
        // Hash iteration order is arbitrary; sort by key text so equal maps
        // render identically.
        let mut pairs: Vec<(String, &V)> = self
            .iter()
            .map(|(key, value)| (key.key_text(), value))
            .collect();
        pairs.sort_by(|left, right| left.0.cmp(&right.0));
        KeyedEntries::from_pairs(pairs).map(Payload::KeyedMap)
    }
}

impl<K: MapKey, V: Serialize, S> IntoPayload for HashMap<K, V, S> {
    fn into_payload(self) -> FormatResult<Payload> {
        (&self).into_payload()
    }
}

impl<K: MapKey, V: Serialize> IntoPayload for &BTreeMap<K, V> {
    fn into_payload(self) -> FormatResult<Payload> {
        KeyedEntries::from_pairs(self.iter()).map(Payload::KeyedMap)
    }
}

impl<K: MapKey, V: Serialize> IntoPayload for BTreeMap<K, V> {
    fn into_payload(self) -> FormatResult<Payload> {
        (&self).into_payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;
    use std::error::Error;
    use std::fmt;

    struct Refuses;

    impl Serialize for Refuses {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cycle detected"))
        }
    }

    impl Display for Refuses {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("refuses")
        }
    }

    struct BrokenDisplay;

    impl Display for BrokenDisplay {
        fn fmt(&self, _formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn json_values_classify_by_shape() {
        assert!(matches!(
            Payload::from_value(json!({"a": 1})),
            Payload::Structured(_)
        ));
        assert!(matches!(
            Payload::from_value(json!([1, 2])),
            Payload::Structured(_)
        ));
        assert_eq!(Payload::from_value(Value::Null), Payload::Scalar(Scalar::Null));
        assert_eq!(
            Payload::from_value(json!("ready")),
            Payload::Scalar(Scalar::Text("ready".into()))
        );
        assert_eq!(
            Payload::from_value(json!(1.5)),
            Payload::Scalar(Scalar::Float(1.5))
        );
        assert_eq!(
            Payload::from_value(json!(7)),
            Payload::Scalar(Scalar::Number(Number::from(7)))
        );
    }

    #[test]
    fn keyed_entries_keep_first_position_and_last_value() -> Result<(), Box<dyn Error>> {
        let entries = KeyedEntries::from_pairs([("x", 1), ("y", 2), ("x", 3)])?;
        let collected: Vec<_> = entries.iter().collect();
        assert_eq!(collected, vec![("x", &json!(3)), ("y", &json!(2))]);
        assert_eq!(entries.len(), 2);
        Ok(())
    }

    #[test]
    fn primitive_keys_are_stringified() -> Result<(), Box<dyn Error>> {
        let mut map = BTreeMap::new();
        map.insert(2_u8, "two");
        map.insert(10_u8, "ten");
        let Payload::KeyedMap(entries) = map.into_payload()? else {
            return Err("expected keyed map".into());
        };
        let keys: Vec<_> = entries.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["2", "10"]);
        Ok(())
    }

    #[test]
    fn hash_maps_render_in_sorted_key_order() -> Result<(), Box<dyn Error>> {
        let map: HashMap<&str, i32> = [("b", 2), ("c", 3), ("a", 1)].into_iter().collect();
        let Payload::KeyedMap(entries) = (&map).into_payload()? else {
            return Err("expected keyed map".into());
        };
        let keys: Vec<_> = entries.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        Ok(())
    }

    #[test]
    fn option_none_is_null() -> Result<(), Box<dyn Error>> {
        assert_eq!(
            Option::<&str>::None.into_payload()?,
            Payload::Scalar(Scalar::Null)
        );
        assert_eq!(
            Some(true).into_payload()?,
            Payload::Scalar(Scalar::Bool(true))
        );
        Ok(())
    }

    #[test]
    fn structured_failure_is_reported() {
        assert!(matches!(
            Payload::structured(&Refuses),
            Err(FormatError::Serialize { .. })
        ));
    }

    #[test]
    fn structured_or_display_falls_back_to_text() -> Result<(), Box<dyn Error>> {
        assert_eq!(
            Payload::structured_or_display(&Refuses)?,
            Payload::Scalar(Scalar::Text("refuses".into()))
        );
        Ok(())
    }

    #[test]
    fn broken_display_is_reported() {
        assert!(matches!(
            Payload::display(&BrokenDisplay),
            Err(FormatError::Display)
        ));
    }

    #[test]
    fn unserializable_map_entry_names_the_key() {
        let result = KeyedEntries::from_pairs([("bad", Refuses)]);
        match result {
            Err(FormatError::MapEntry { key, .. }) => assert_eq!(key, "bad"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
