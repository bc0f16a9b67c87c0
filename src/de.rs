//! Case-insensitive field matching for stored documents
//!
//! serde matches struct fields by exact name. Documents on disk may have been
//! written by other tools with different casing (`"Name"` vs `name`), so
//! reads go through [`CaseInsensitive`], a deserializer over a parsed
//! [`serde_json::Value`] that renames object keys to the field names the
//! target struct declares before handing them to serde.
//!
//! An exact key always wins over a key that only matches after case folding.
//! Enum variant tags are folded, and so are the fields of their payloads.
//! Content buffered by serde itself is matched exactly: `#[serde(flatten)]`
//! fields and the bodies of internally tagged or untagged enums.
//!
//! Numbers are handed to serde_json unchanged, so integers wider than 64 bits
//! read back exactly.

use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    Unexpected, VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Value};

/// Deserialize `T` from a parsed document, matching field names without
/// regard to case.
///
/// # Errors
///
/// Returns the `serde_json` error when the document does not fit `T`.
pub fn from_value<T: de::DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    T::deserialize(CaseInsensitive(value))
}

/// Deserialize `T` from JSON text, matching field names without regard to case.
///
/// # Errors
///
/// Returns the `serde_json` error when the text is not JSON or does not fit `T`.
pub fn from_str<T: de::DeserializeOwned>(content: &str) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_str(content)?;
    from_value(value)
}

/// Deserializer wrapper that folds object keys onto declared field names.
pub struct CaseInsensitive(pub Value);

fn fold_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

fn match_name<'a>(key: &str, names: &'a [&'a str]) -> Option<&'a str> {
    names.iter().copied().find(|name| fold_eq(name, key))
}

/// Tag as declared by `variants`, or unchanged when nothing matches.
fn fold_variant(tag: String, variants: &[&str]) -> String {
    if variants.contains(&tag.as_str()) {
        return tag;
    }
    match match_name(&tag, variants) {
        Some(variant) => variant.to_string(),
        None => tag,
    }
}

/// Rename keys of `map` onto `fields` where they only differ by case.
fn fold_keys(map: Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    let mut folded = Map::with_capacity(map.len());
    let mut pending = Vec::new();

    for (key, value) in map {
        if fields.contains(&key.as_str()) {
            folded.insert(key, value);
        } else {
            pending.push((key, value));
        }
    }

    for (key, value) in pending {
        match match_name(&key, fields) {
            Some(field) if !folded.contains_key(field) => {
                folded.insert(field.to_string(), value);
            }
            _ => {
                folded.insert(key, value);
            }
        }
    }

    folded
}

// Typed number requests go to `Value`, which can parse numbers kept as text.
macro_rules! delegate_numbers {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                self.0.$method(visitor)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for CaseInsensitive {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => visitor.visit_map(ObjectAccess::new(map)),
            Value::Array(items) => visitor.visit_seq(ArrayAccess::new(items)),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(CaseInsensitive(other)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => visitor.visit_map(ObjectAccess::new(fold_keys(map, fields))),
            Value::Array(items) => visitor.visit_seq(ArrayAccess::new(items)),
            other => other.deserialize_struct(name, fields, visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.0 {
            Value::String(tag) => visitor.visit_enum(EnumValue {
                variant: fold_variant(tag, variants),
                payload: None,
            }),
            Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
                Some((tag, payload)) => visitor.visit_enum(EnumValue {
                    variant: fold_variant(tag, variants),
                    payload: Some(payload),
                }),
                None => Err(de::Error::invalid_length(0, &"map with a single key")),
            },
            other => other.deserialize_enum(name, variants, visitor),
        }
    }

    delegate_numbers! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64
    }

    forward_to_deserialize_any! {
        bool char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map identifier ignored_any
    }
}

/// Enum tag plus the payload of a `{"Variant": payload}` document
struct EnumValue {
    variant: String,
    payload: Option<Value>,
}

impl<'de> EnumAccess<'de> for EnumValue {
    type Error = serde_json::Error;
    type Variant = VariantValue;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), Self::Error> {
        let variant: StringDeserializer<serde_json::Error> = self.variant.into_deserializer();
        let tag = seed.deserialize(variant)?;
        Ok((
            tag,
            VariantValue {
                payload: self.payload,
            },
        ))
    }
}

struct VariantValue {
    payload: Option<Value>,
}

impl VariantValue {
    fn payload(self, expected: &str) -> Result<CaseInsensitive, serde_json::Error> {
        match self.payload {
            Some(value) => Ok(CaseInsensitive(value)),
            None => Err(de::Error::invalid_type(Unexpected::UnitVariant, &expected)),
        }
    }
}

impl<'de> VariantAccess<'de> for VariantValue {
    type Error = serde_json::Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.payload {
            Some(value) => de::Deserialize::deserialize(CaseInsensitive(value)),
            None => Ok(()),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, Self::Error> {
        seed.deserialize(self.payload("newtype variant")?)
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.payload("tuple variant")?.deserialize_tuple(len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.payload("struct variant")?.deserialize_struct("", fields, visitor)
    }
}

struct ObjectAccess {
    iter: serde_json::map::IntoIter,
    value: Option<Value>,
}

impl ObjectAccess {
    fn new(map: Map<String, Value>) -> Self {
        Self {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> MapAccess<'de> for ObjectAccess {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value.take() {
            Some(value) => seed.deserialize(CaseInsensitive(value)),
            None => Err(de::Error::custom("value is missing")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct ArrayAccess {
    iter: std::vec::IntoIter<Value>,
}

impl ArrayAccess {
    fn new(items: Vec<Value>) -> Self {
        Self {
            iter: items.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for ArrayAccess {
    type Error = serde_json::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        match self.iter.next() {
            Some(value) => seed.deserialize(CaseInsensitive(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

// =============================================================================
// Tests
// =============================================================================
