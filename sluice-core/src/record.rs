use crate::{Kind, Result, Value};
use std::fmt::{self, Debug, Formatter};

/// A struct persisted as a table row.
///
/// Normally implemented through `#[derive(Record)]`, only fields annotated with
/// `#[sluice(...)]` take part in persistence.
pub trait Record: Default + Send + Sync + 'static {
    /// Table name, the lower-cased type name unless overridden.
    fn table_name() -> &'static str;
    /// Persisted fields in declaration order.
    fn fields() -> Vec<FieldDef<Self>>;
}

/// Declared metadata and accessors of one persisted field.
pub struct FieldDef<R> {
    /// Rust field name.
    pub name: &'static str,
    pub column: &'static str,
    /// Kind of the field, the conversion target when hydrating.
    pub kind: Kind,
    /// Whether the field accepts NULL (`Option<T>`).
    pub nullable: bool,
    pub primary_key: bool,
    /// Assigned by the database, never written.
    pub auto_generated: bool,
    /// Omitted from writes while holding its zero value, letting the column default apply.
    pub default_on_zero: bool,
    pub get: fn(&R) -> Value,
    pub set: fn(&mut R, Value) -> Result<()>,
}

impl<R> FieldDef<R> {
    pub fn value(&self, record: &R) -> Value {
        (self.get)(record)
    }
    pub fn assign(&self, record: &mut R, value: Value) -> Result<()> {
        (self.set)(record, value)
    }
    /// Whether `value` is the zero value of the field type, `None` for a nullable field.
    pub fn is_zero(&self, value: &Value) -> bool {
        if self.nullable {
            value.is_null()
        } else {
            value.is_zero()
        }
    }
}

impl<R> Clone for FieldDef<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            column: self.column,
            kind: self.kind,
            nullable: self.nullable,
            primary_key: self.primary_key,
            auto_generated: self.auto_generated,
            default_on_zero: self.default_on_zero,
            get: self.get,
            set: self.set,
        }
    }
}

impl<R> Debug for FieldDef<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("primary_key", &self.primary_key)
            .field("auto_generated", &self.auto_generated)
            .field("default_on_zero", &self.default_on_zero)
            .finish_non_exhaustive()
    }
}
