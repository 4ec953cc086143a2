use crate::{
    Error, FieldDef, Record, Result, RowError, ScanEntry, ScannerPlan, SchemaError, Value,
};
use anyhow::Context as _;
use indexmap::IndexMap;
use std::{
    any::{self, Any, TypeId},
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Column mapping of a record type, derived once and shared.
///
/// Besides the fields it owns the scanner plans built for this type, keyed by
/// the exact ordered list of columns they read.
pub struct FieldSchema<R> {
    table_name: &'static str,
    fields: IndexMap<&'static str, FieldDef<R>>,
    primary_key: Option<usize>,
    plans: RwLock<HashMap<String, Arc<ScannerPlan>>>,
}

impl<R: Record> FieldSchema<R> {
    /// Build the schema from the declared fields of `R`.
    pub fn derive() -> Result<Self> {
        let table = R::table_name();
        let defs = R::fields();
        let keys: Vec<_> = defs
            .iter()
            .filter(|v| v.primary_key)
            .map(|v| v.column)
            .collect();
        if keys.len() > 1 {
            return Err(SchemaError::MultiplePrimaryKeys {
                table,
                columns: keys,
            }
            .into());
        }
        let mut fields = IndexMap::with_capacity(defs.len());
        for def in defs {
            let column = def.column;
            if fields.insert(column, def).is_some() {
                return Err(SchemaError::DuplicateColumn { table, column }.into());
            }
        }
        let primary_key = fields.values().position(|v| v.primary_key);
        log::debug!(
            "Derived the schema of `{table}`: {}",
            fields.keys().copied().collect::<Vec<_>>().join(", ")
        );
        Ok(Self {
            table_name: table,
            fields,
            primary_key,
            plans: Default::default(),
        })
    }

    pub fn table_name(&self) -> &'static str {
        self.table_name
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn field(&self, column: &str) -> Option<&FieldDef<R>> {
        self.fields.get(column)
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = &FieldDef<R>> {
        self.fields.values()
    }

    pub fn primary_key(&self) -> Option<&FieldDef<R>> {
        self.primary_key
            .and_then(|i| self.fields.get_index(i))
            .map(|(_, v)| v)
    }

    /// Plan reading exactly `columns`, in that order.
    ///
    /// Plans are cached, the same columns in a different order make a different plan.
    pub fn scanner_plan<S: AsRef<str>>(&self, columns: &[S]) -> Arc<ScannerPlan> {
        let key = columns
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        if let Some(plan) = read(&self.plans).get(&key) {
            return plan.clone();
        }
        let mut plans = write(&self.plans);
        if let Some(plan) = plans.get(&key) {
            return plan.clone();
        }
        let entries: Vec<_> = columns
            .iter()
            .map(|column| {
                let column = column.as_ref();
                match self.fields.get_full(column) {
                    Some((i, _, def)) => ScanEntry::new(column, i, def.kind, def.nullable),
                    None => ScanEntry::ignored(column),
                }
            })
            .collect();
        let plan = Arc::new(ScannerPlan::new::<R>(entries));
        log::debug!("Built a scanner plan for `{}` reading: {key}", self.table_name);
        plans.insert(key, plan.clone());
        plan
    }

    /// Number of cached scanner plans.
    pub fn plan_count(&self) -> usize {
        read(&self.plans).len()
    }

    /// Build a record from one row of values read according to `plan`.
    ///
    /// Fields without an entry in the plan keep their default value.
    pub fn hydrate<I>(&self, plan: &ScannerPlan, values: I) -> Result<R>
    where
        I: IntoIterator<Item = Value, IntoIter: ExactSizeIterator>,
    {
        if !plan.is_for::<R>() {
            return Err(Error::msg(format!(
                "The scanner plan was built for `{}`, it cannot read `{}`",
                plan.record_name(),
                any::type_name::<R>()
            )));
        }
        let values = values.into_iter();
        if values.len() != plan.len() {
            return Err(RowError::ColumnCount {
                expected: plan.len(),
                found: values.len(),
            }
            .into());
        }
        let mut record = R::default();
        for (entry, value) in plan.entries().iter().zip(values) {
            let Some((_, def)) = entry.field.and_then(|i| self.fields.get_index(i)) else {
                continue;
            };
            entry
                .convert(value)
                .and_then(|v| def.assign(&mut record, v))
                .with_context(|| {
                    format!(
                        "While reading column `{}` into `{}.{}`",
                        entry.column, self.table_name, def.name
                    )
                })?;
        }
        Ok(record)
    }
}

impl<R> Debug for FieldSchema<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("table_name", &self.table_name)
            .field("fields", &self.fields.values().collect::<Vec<_>>())
            .field("primary_key", &self.primary_key)
            .finish_non_exhaustive()
    }
}

/// Process scoped cache of derived schemas, one per record type.
///
/// Concurrent first requests for the same type publish exactly one schema.
#[derive(Default)]
pub struct SchemaCache {
    schemas: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

static GLOBAL: LazyLock<Arc<SchemaCache>> = LazyLock::new(Default::default);

impl SchemaCache {
    /// Empty cache, independent from the global one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared cache used by [`crate::RecordMapper::default`].
    pub fn global() -> Arc<SchemaCache> {
        GLOBAL.clone()
    }

    /// Schema of `R`, derived on first request.
    pub fn schema<R: Record>(&self) -> Result<Arc<FieldSchema<R>>> {
        let id = TypeId::of::<R>();
        if let Some(schema) = read(&self.schemas).get(&id) {
            return downcast(schema.clone());
        }
        let mut schemas = write(&self.schemas);
        if let Some(schema) = schemas.get(&id) {
            return downcast(schema.clone());
        }
        let schema = Arc::new(
            FieldSchema::<R>::derive()
                .with_context(|| format!("While deriving the schema of `{}`", any::type_name::<R>()))?,
        );
        schemas.insert(id, schema.clone());
        Ok(schema)
    }

    /// Drop every cached schema, together with its plans.
    ///
    /// Schemas already handed out stay valid, later requests derive new ones.
    pub fn reset(&self) {
        let mut schemas = write(&self.schemas);
        log::debug!("Resetting the schema cache ({} schemas)", schemas.len());
        schemas.clear();
    }

    pub fn len(&self) -> usize {
        read(&self.schemas).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Debug for SchemaCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("len", &self.len())
            .finish()
    }
}

fn downcast<R: Record>(schema: Arc<dyn Any + Send + Sync>) -> Result<Arc<FieldSchema<R>>> {
    schema.downcast::<FieldSchema<R>>().map_err(|_| {
        Error::msg(format!(
            "The cached schema does not belong to `{}`",
            any::type_name::<R>()
        ))
    })
}
