//! Keying records by their identifier

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

use crate::errors::{NanosError, NanosResult};

const RECORD_PREVIEW_CHARS: usize = 80;

/// Records keyed by identifier, in first-seen order.
pub type Keyed<R> = IndexMap<<R as Identify>::Id, R>;

/// Anything that can name itself with an identifier.
pub trait Identify {
    type Id: Eq + Hash;

    fn identify(&self) -> NanosResult<Self::Id>;
}

/// Scalar identifier taken from a JSON record's `id` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl TryFrom<&Value> for RecordId {
    type Error = NanosError;

    fn try_from(value: &Value) -> NanosResult<Self> {
        match value {
            Value::Null => Ok(RecordId::Null),
            Value::Bool(b) => Ok(RecordId::Bool(*b)),
            Value::Number(n) => Ok(RecordId::Number(n.clone())),
            Value::String(s) => Ok(RecordId::String(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(NanosError::UnhashableId {
                kind: NanosError::kind_of(value),
            }),
        }
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::String(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::String(id)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Number(id.into())
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId::Number(id.into())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Null => f.write_str("null"),
            RecordId::Bool(b) => write!(f, "{}", b),
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::String(s) => f.write_str(s),
        }
    }
}

impl Identify for Map<String, Value> {
    type Id = RecordId;

    fn identify(&self) -> NanosResult<RecordId> {
        match self.get("id") {
            Some(id) => RecordId::try_from(id),
            None => Err(NanosError::MissingId {
                record: preview(&Value::Object(self.clone())),
            }),
        }
    }
}

impl Identify for Value {
    type Id = RecordId;

    fn identify(&self) -> NanosResult<RecordId> {
        match self {
            Value::Object(map) => map.identify(),
            other => Err(NanosError::NotARecord {
                kind: NanosError::kind_of(other),
            }),
        }
    }
}

impl<T: Identify + ?Sized> Identify for &T {
    type Id = T::Id;

    fn identify(&self) -> NanosResult<T::Id> {
        (**self).identify()
    }
}

impl<T: Identify + ?Sized> Identify for Box<T> {
    type Id = T::Id;

    fn identify(&self) -> NanosResult<T::Id> {
        (**self).identify()
    }
}

impl<T: Identify + ?Sized> Identify for Rc<T> {
    type Id = T::Id;

    fn identify(&self) -> NanosResult<T::Id> {
        (**self).identify()
    }
}

impl<T: Identify + ?Sized> Identify for Arc<T> {
    type Id = T::Id;

    fn identify(&self) -> NanosResult<T::Id> {
        (**self).identify()
    }
}

/// Key every record by its identifier.
///
/// The iterator is consumed once, in order. A later record with an already
/// seen identifier replaces the earlier one but keeps its position. The first
/// record without a usable identifier aborts the whole call.
pub fn idfy<I>(records: I) -> NanosResult<Keyed<I::Item>>
where
    I: IntoIterator,
    I::Item: Identify,
{
    let records = records.into_iter();
    let mut keyed = IndexMap::with_capacity(records.size_hint().0);
    for record in records {
        let id = record.identify()?;
        keyed.insert(id, record);
    }
    Ok(keyed)
}

/// Key a single record.
pub fn idfy_one<R: Identify>(record: R) -> NanosResult<Keyed<R>> {
    idfy(std::iter::once(record))
}

/// Key a JSON document: an object is one record, an array a list of them.
pub fn idfy_value(value: Value) -> NanosResult<Keyed<Value>> {
    match value {
        Value::Object(_) => idfy_one(value),
        Value::Array(records) => idfy(records),
        other => Err(NanosError::NotARecord {
            kind: NanosError::kind_of(&other),
        }),
    }
}

/// Turn keyed JSON records back into a JSON object, stringifying the keys.
///
/// Distinct ids can render alike (`1` and `"1"`, `null` and `"null"`); that
/// is an error rather than a silently dropped record.
pub fn keyed_to_json(keyed: Keyed<Value>) -> NanosResult<Value> {
    let mut object = Map::with_capacity(keyed.len());
    for (id, record) in keyed {
        let key = id.to_string();
        if object.contains_key(&key) {
            return Err(NanosError::DuplicateKey { key });
        }
        object.insert(key, record);
    }
    Ok(Value::Object(object))
}

fn preview(record: &Value) -> String {
    let rendered = record.to_string();
    if rendered.chars().count() <= RECORD_PREVIEW_CHARS {
        return rendered;
    }
    let mut short: String = rendered.chars().take(RECORD_PREVIEW_CHARS).collect();
    short.push_str("...");
    short
}
