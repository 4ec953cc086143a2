use crate::{Kind, Result, Value, convert};
use std::any::{self, TypeId};

/// Intermediate representation a column is read into before reaching its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holder {
    Integer,
    Unsigned,
    Float,
    Boolean,
    Text,
    Time,
    /// Passed through untouched, the field conversion does all the work.
    Raw,
}

impl Holder {
    pub fn for_kind(kind: Kind) -> Self {
        match kind {
            Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 => Holder::Integer,
            Kind::UInt8 | Kind::UInt16 | Kind::UInt32 | Kind::UInt64 => Holder::Unsigned,
            Kind::Float32 | Kind::Float64 => Holder::Float,
            Kind::Boolean => Holder::Boolean,
            Kind::Varchar | Kind::Unknown => Holder::Text,
            Kind::Timestamp => Holder::Time,
            _ => Holder::Raw,
        }
    }

    /// Widest kind of the holder, `None` for [`Holder::Raw`].
    pub fn kind(self) -> Option<Kind> {
        match self {
            Holder::Integer => Some(Kind::Int64),
            Holder::Unsigned => Some(Kind::UInt64),
            Holder::Float => Some(Kind::Float64),
            Holder::Boolean => Some(Kind::Boolean),
            Holder::Text => Some(Kind::Varchar),
            Holder::Time => Some(Kind::Timestamp),
            Holder::Raw => None,
        }
    }
}

/// How one result column is read into a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEntry {
    pub column: String,
    /// Position of the target field in the schema, `None` when no field maps the column.
    pub field: Option<usize>,
    pub kind: Kind,
    pub holder: Holder,
    pub nullable: bool,
}

impl ScanEntry {
    pub fn new(column: impl Into<String>, field: usize, kind: Kind, nullable: bool) -> Self {
        Self {
            column: column.into(),
            field: Some(field),
            kind,
            holder: Holder::for_kind(kind),
            nullable,
        }
    }

    /// Entry for a column no field maps, its values are discarded.
    pub fn ignored(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            field: None,
            kind: Kind::Null,
            holder: Holder::Raw,
            nullable: true,
        }
    }

    /// Convert a scanned value into what the field expects.
    ///
    /// NULL reaching a non nullable field becomes the zero value of its kind.
    pub fn convert(&self, value: Value) -> Result<Value> {
        if self.field.is_none() {
            return Ok(value);
        }
        let value = match self.holder.kind() {
            Some(kind) => convert(value, kind)?,
            None => value,
        };
        let value = convert(value, self.kind)?;
        Ok(if value.is_null() && !self.nullable {
            self.kind.zero_value()
        } else {
            value
        })
    }
}

/// Cached plan reading an exact ordered list of columns into a record type.
#[derive(Debug)]
pub struct ScannerPlan {
    record: TypeId,
    record_name: &'static str,
    entries: Box<[ScanEntry]>,
}

impl ScannerPlan {
    pub(crate) fn new<R: 'static>(entries: impl Into<Box<[ScanEntry]>>) -> Self {
        Self {
            record: TypeId::of::<R>(),
            record_name: any::type_name::<R>(),
            entries: entries.into(),
        }
    }
    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }
    pub fn columns(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|v| v.column.as_str())
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Whether the plan was built for the record type `R`.
    pub fn is_for<R: 'static>(&self) -> bool {
        self.record == TypeId::of::<R>()
    }
    pub fn record_name(&self) -> &'static str {
        self.record_name
    }
}
