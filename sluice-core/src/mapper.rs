use crate::{FieldSchema, Record, Result, RowCursor, ScannerPlan, SchemaCache, Value};
use indexmap::IndexMap;
use std::sync::Arc;

/// Ordered column to value mapping of a record.
pub type ColumnMap = IndexMap<String, Value>;

/// Moves data between records and rows using the cached schemas.
///
/// ```rust
/// use sluice_core::{RecordMapper, SchemaCache};
/// let mapper = RecordMapper::new(SchemaCache::new().into());
/// assert!(mapper.cache().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RecordMapper {
    cache: Arc<SchemaCache>,
}

impl Default for RecordMapper {
    /// Mapper backed by [`SchemaCache::global`].
    fn default() -> Self {
        Self::new(SchemaCache::global())
    }
}

impl RecordMapper {
    pub fn new(cache: Arc<SchemaCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    pub fn schema<R: Record>(&self) -> Result<Arc<FieldSchema<R>>> {
        self.cache.schema::<R>()
    }

    /// Values to write for `record`, in column order.
    ///
    /// Auto generated fields are left out, so are default on zero fields holding
    /// their zero value. A missing record gives a missing map.
    pub fn to_column_map<R: Record>(&self, record: Option<&R>) -> Result<Option<ColumnMap>> {
        let Some(record) = record else {
            return Ok(None);
        };
        let schema = self.schema::<R>()?;
        let map = schema
            .fields()
            .filter(|field| !field.auto_generated)
            .filter_map(|field| {
                let value = field.value(record);
                if field.default_on_zero && field.is_zero(&value) {
                    None
                } else {
                    Some((field.column.to_string(), value))
                }
            })
            .collect();
        Ok(Some(map))
    }

    /// Primary key of `record`, `None` when the type has none or it is not assigned yet (zero).
    pub fn primary_key_value<R: Record>(&self, record: &R) -> Result<Option<Value>> {
        let schema = self.schema::<R>()?;
        Ok(schema
            .primary_key()
            .map(|field| (field, field.value(record)))
            .filter(|(field, value)| !field.is_zero(value))
            .map(|(_, value)| value))
    }

    pub fn scanner_plan<R: Record, S: AsRef<str>>(
        &self,
        columns: &[S],
    ) -> Result<Arc<ScannerPlan>> {
        Ok(self.schema::<R>()?.scanner_plan(columns))
    }

    /// Build a record from a row read according to `plan`.
    pub fn hydrate_row<R, I>(&self, plan: &ScannerPlan, values: I) -> Result<R>
    where
        R: Record,
        I: IntoIterator<Item = Value, IntoIter: ExactSizeIterator>,
    {
        self.schema::<R>()?.hydrate(plan, values)
    }

    /// Build a record from a column map, unknown columns are ignored.
    pub fn from_column_map<R: Record>(&self, map: ColumnMap) -> Result<R> {
        let (columns, values): (Vec<String>, Vec<Value>) = map.into_iter().unzip();
        let schema = self.schema::<R>()?;
        let plan = schema.scanner_plan(&columns);
        schema.hydrate(&plan, values)
    }

    /// Drain `cursor` into records, stopping at the first failure.
    pub fn scan_all<R: Record, C: RowCursor + ?Sized>(&self, cursor: &mut C) -> Result<Vec<R>> {
        let schema = self.schema::<R>()?;
        let plan = schema.scanner_plan(cursor.columns());
        let mut result = Vec::new();
        while let Some(row) = cursor.next_row() {
            result.push(schema.hydrate(&plan, row?)?);
        }
        Ok(result)
    }
}
