//! Valores de coluna do banco legado, antes e depois do processamento

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;

use super::driver::BlobHandle;

/// Valor primitivo de uma coluna (também usado como parâmetro de SQL)
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

/// Parâmetros posicionais (`?`) de um statement
pub type SqlParam = FieldValue;

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(value: NaiveTime) -> Self {
        FieldValue::Time(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Coluna como o driver entrega: valor primitivo ou handle de BLOB
#[derive(Clone)]
pub enum RawField {
    Value(FieldValue),
    /// `None` quando o driver marca a coluna como BLOB mas não fornece handle
    Blob(Option<Arc<dyn BlobHandle>>),
}

impl RawField {
    pub fn value(value: impl Into<FieldValue>) -> Self {
        RawField::Value(value.into())
    }

    pub fn blob(handle: Arc<dyn BlobHandle>) -> Self {
        RawField::Blob(Some(handle))
    }

    pub fn missing_blob() -> Self {
        RawField::Blob(None)
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, RawField::Blob(_))
    }
}

impl fmt::Debug for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawField::Value(value) => f.debug_tuple("Value").field(value).finish(),
            RawField::Blob(Some(_)) => write!(f, "Blob(<handle>)"),
            RawField::Blob(None) => write!(f, "Blob(None)"),
        }
    }
}

/// Linha crua, na ordem de colunas do driver
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    fields: Vec<(String, RawField)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, field: RawField) -> Self {
        self.push(column, field);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, field: RawField) {
        self.fields.push((column.into(), field));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn blob_count(&self) -> usize {
        self.fields.iter().filter(|(_, field)| field.is_blob()).count()
    }
}

impl IntoIterator for RawRow {
    type Item = (String, RawField);
    type IntoIter = std::vec::IntoIter<(String, RawField)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Linha processada: mesmas colunas, na mesma ordem, com BLOBs já em texto
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessedRow {
    fields: Vec<(String, FieldValue)>,
}

impl ProcessedRow {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Busca por nome de coluna, sem diferenciar maiúsculas (o Firebird devolve tudo em caixa alta)
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    pub fn get_text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, FieldValue)> for ProcessedRow {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ProcessedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
