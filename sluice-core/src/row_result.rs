use crate::{
    AsValue, Error, IterCursor, Record, RecordMapper, Result, RowError, SharedError, SliceCursor,
    Value,
};
use std::sync::Arc;
use time::OffsetDateTime;

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_insert_id: Option<i64>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_insert_id.is_some() {
                self.last_insert_id = elem.last_insert_id;
            }
        }
    }
}

/// Materialized outcome of one statement: named columns, rows and affected counts.
///
/// A result built with [`RowResult::from_error`] fails every accessor with the
/// same [`RowError::Execution`], so a failed statement can never be read as data.
///
/// ```rust
/// use sluice_core::{RowResult, values};
/// let result = RowResult::new(["id", "name"], [values![1, "ann"], values![2, "bob"]]).unwrap();
/// assert_eq!(result.size().unwrap(), 2);
/// assert_eq!(result.string("name").unwrap(), "ann");
/// assert_eq!(result.int_or("missing", -1), -1);
/// ```
#[derive(Default, Debug, Clone)]
pub struct RowResult {
    columns: RowNames,
    rows: Vec<Row>,
    affected: RowsAffected,
    error: Option<SharedError>,
}

macro_rules! impl_accessors {
    ($ty:ty, $name:ident, $name_opt:ident, $name_or:ident) => {
        #[doc = concat!("`", stringify!($ty), "` in `column` of the first row, NULL is an error.")]
        pub fn $name(&self, column: &str) -> Result<$ty> {
            self.get(column)
        }
        #[doc = concat!("`", stringify!($ty), "` in `column` of the first row, `None` when NULL.")]
        pub fn $name_opt(&self, column: &str) -> Result<Option<$ty>> {
            self.get_opt(column)
        }
        #[doc = concat!("`", stringify!($ty), "` in `column` of the first row, `default` when it cannot be read.")]
        pub fn $name_or(&self, column: &str, default: $ty) -> $ty {
            self.get_or(column, default)
        }
    };
}

impl RowResult {
    /// Result made of `rows`, each one must have a value for every column.
    pub fn new<C, R>(
        columns: impl IntoIterator<Item = C>,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Self>
    where
        C: Into<String>,
        R: Into<Row>,
    {
        let columns: RowNames = columns.into_iter().map(Into::<String>::into).collect();
        let rows = rows
            .into_iter()
            .map(|row| {
                let row: Row = row.into();
                if row.len() != columns.len() {
                    return Err(RowError::ColumnCount {
                        expected: columns.len(),
                        found: row.len(),
                    });
                }
                Ok(row)
            })
            .collect::<std::result::Result<Vec<_>, RowError>>()?;
        Ok(Self {
            columns,
            rows,
            ..Default::default()
        })
    }

    /// Result of a statement that failed.
    pub fn from_error(error: impl Into<Error>) -> Self {
        Self {
            error: Some(SharedError::new(error.into())),
            ..Default::default()
        }
    }

    pub fn with_affected(mut self, rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        self.affected = RowsAffected {
            rows_affected,
            last_insert_id,
        };
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows_affected(&self) -> u64 {
        self.affected.rows_affected
    }

    pub fn last_insert_id(&self) -> Option<i64> {
        self.affected.last_insert_id
    }

    pub fn affected(&self) -> RowsAffected {
        self.affected
    }

    pub fn error(&self) -> Option<&SharedError> {
        self.error.as_ref()
    }

    fn check(&self) -> Result<()> {
        match &self.error {
            Some(error) => Err(RowError::Execution(error.clone()).into()),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.check()?;
        Ok(self.rows.is_empty())
    }

    /// Number of rows.
    pub fn size(&self) -> Result<usize> {
        self.check()?;
        Ok(self.rows.len())
    }

    /// A new result holding only the first row.
    pub fn first(&self) -> Result<RowResult> {
        self.check()?;
        let row = self.rows.first().ok_or(RowError::NoRows)?;
        Ok(Self {
            columns: self.columns.clone(),
            rows: vec![row.clone()],
            affected: self.affected,
            error: None,
        })
    }

    pub fn row(&self, index: usize) -> Result<&[Value]> {
        self.check()?;
        self.rows.get(index).map(|v| &**v).ok_or_else(|| {
            RowError::RowOutOfRange {
                index,
                size: self.rows.len(),
            }
            .into()
        })
    }

    pub fn cursor(&self) -> Result<SliceCursor<'_>> {
        self.check()?;
        Ok(SliceCursor::new(&self.columns, &self.rows))
    }

    /// Hydrate every row into a record.
    pub fn into_records<R: Record>(self, mapper: &RecordMapper) -> Result<Vec<R>> {
        self.check()?;
        let mut cursor = IterCursor::new(self.columns, self.rows.into_iter().map(Ok::<Row, Error>));
        mapper.scan_all(&mut cursor)
    }

    /// Hydrate the first row into a record.
    pub fn into_record<R: Record>(self, mapper: &RecordMapper) -> Result<R> {
        self.check()?;
        let schema = mapper.schema::<R>()?;
        let plan = schema.scanner_plan(&self.columns[..]);
        let row = self.rows.into_iter().next().ok_or(RowError::NoRows)?;
        schema.hydrate(&plan, row)
    }

    /// Values of the first column, one per row.
    pub fn into_vec<T: AsValue>(self) -> Result<Vec<T>> {
        self.check()?;
        if self.columns.is_empty() {
            return Err(RowError::MissingColumn("#0".into()).into());
        }
        self.rows
            .into_iter()
            .map(|row| {
                let value = row.into_iter().next().unwrap_or_default();
                T::try_from_value(value)
            })
            .collect()
    }

    fn cell(&self, column: &str) -> Result<&Value> {
        self.check()?;
        let row = self.rows.first().ok_or(RowError::NoRows)?;
        let index = self
            .columns
            .iter()
            .position(|v| v == column)
            .ok_or_else(|| RowError::MissingColumn(column.into()))?;
        Ok(&row[index])
    }

    /// Value in `column` of the first row converted to `T`.
    ///
    /// A NULL cell is a [`RowError::NullValue`], use [`RowResult::get_opt`] or
    /// [`RowResult::get_or`] to accept it.
    pub fn get<T: AsValue>(&self, column: &str) -> Result<T> {
        let value = self.cell(column)?;
        if value.is_null() {
            return Err(RowError::NullValue(column.into()).into());
        }
        T::try_from_value(value.clone())
    }

    /// Value in `column` of the first row converted to `T`, `None` when NULL.
    pub fn get_opt<T: AsValue>(&self, column: &str) -> Result<Option<T>> {
        Option::<T>::try_from_value(self.cell(column)?.clone())
    }

    /// Value in `column` of the first row converted to `T`, `default` when it cannot be read.
    pub fn get_or<T: AsValue>(&self, column: &str, default: T) -> T {
        self.get_opt(column).ok().flatten().unwrap_or(default)
    }

    impl_accessors!(String, string, string_opt, string_or);
    impl_accessors!(i64, int, int_opt, int_or);
    impl_accessors!(u64, uint, uint_opt, uint_or);
    impl_accessors!(f64, float, float_opt, float_or);
    impl_accessors!(bool, boolean, boolean_opt, boolean_or);
    impl_accessors!(OffsetDateTime, timestamp, timestamp_opt, timestamp_or);
    impl_accessors!(Box<[u8]>, bytes, bytes_opt, bytes_or);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        SchemaCache, values,
        fixtures::{Account, Tag},
    };
    use time::macros::datetime;

    fn tags() -> RowResult {
        RowResult::new(
            ["name", "weight", "seen", "raw", "note"],
            [
                values!["a", 1.5, "2024-01-02 03:04:05", vec![1u8, 2].into_boxed_slice(), Value::Null],
                values!["b", 2.5, 0, Value::Null, "x"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn shape() {
        let result = tags();
        assert!(!result.is_empty().unwrap());
        assert_eq!(result.size().unwrap(), 2);
        assert_eq!(result.columns().len(), 5);
        assert_eq!(result.row(1).unwrap()[0], Value::Varchar(Some("b".into())));
        assert!(matches!(
            result.row(2).unwrap_err().downcast_ref::<RowError>(),
            Some(RowError::RowOutOfRange { index: 2, size: 2 })
        ));
        let error = RowResult::new(["a", "b"], [values![1]]).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RowError>(),
            Some(RowError::ColumnCount {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn first() {
        let result = tags();
        let first = result.first().unwrap();
        assert_eq!(first.size().unwrap(), 1);
        assert_eq!(first.row(0).unwrap(), result.row(0).unwrap());
        assert_eq!(result.size().unwrap(), 2);

        let empty = RowResult::new(["a"], Vec::<Row>::new()).unwrap();
        assert!(empty.is_empty().unwrap());
        assert!(matches!(
            empty.first().unwrap_err().downcast_ref::<RowError>(),
            Some(RowError::NoRows)
        ));
        assert!(matches!(
            empty.int("a").unwrap_err().downcast_ref::<RowError>(),
            Some(RowError::NoRows)
        ));
    }

    #[test]
    fn scalars() {
        let result = tags();
        assert_eq!(result.string("name").unwrap(), "a");
        assert_eq!(result.float("weight").unwrap(), 1.5);
        assert_eq!(result.int("weight").unwrap(), 1);
        assert_eq!(result.string("weight").unwrap(), "1.5");
        assert_eq!(
            result.timestamp("seen").unwrap(),
            datetime!(2024-01-02 03:04:05 UTC)
        );
        assert_eq!(&*result.bytes("raw").unwrap(), &[1, 2]);
        assert!(matches!(
            result.string("note").unwrap_err().downcast_ref::<RowError>(),
            Some(RowError::NullValue(column)) if column == "note"
        ));
        assert!(result.get::<Option<i64>>("note").is_err());
        assert_eq!(result.string_opt("note").unwrap(), None);
        assert_eq!(result.int_opt("note").unwrap(), None);
        assert_eq!(result.string_or("note", "fallback".into()), "fallback");
        assert_eq!(result.boolean_or("name", true), true);
        assert!(result.boolean("name").is_err());
        assert_eq!(result.get::<u8>("weight").unwrap(), 1);
        assert_eq!(result.uint_or("weight", 9), 1);
    }

    #[test]
    fn missing_column_is_an_error() {
        let result = tags();
        for error in [
            result.string("missing").unwrap_err(),
            result.int_opt("missing").unwrap_err(),
        ] {
            assert!(matches!(
                error.downcast_ref::<RowError>(),
                Some(RowError::MissingColumn(column)) if column == "missing"
            ));
        }
        assert_eq!(result.int_or("missing", 7), 7);
    }

    #[test]
    fn preset_error_short_circuits() {
        let result = RowResult::from_error(Error::msg("duplicate key"));
        let expected = result.error().unwrap().clone();
        let errors = [
            result.is_empty().unwrap_err(),
            result.size().unwrap_err(),
            result.first().unwrap_err(),
            result.row(0).unwrap_err(),
            result.cursor().unwrap_err(),
            result.string("a").unwrap_err(),
            result.float_opt("a").unwrap_err(),
            result.clone().into_vec::<i32>().unwrap_err(),
            result
                .clone()
                .into_records::<Tag>(&RecordMapper::default())
                .unwrap_err(),
        ];
        for error in errors {
            let Some(RowError::Execution(shared)) = error.downcast_ref::<RowError>() else {
                panic!("Unexpected error: {error:#}");
            };
            assert!(shared.ptr_eq(&expected));
            assert_eq!(error.to_string(), "The statement failed: duplicate key");
        }
        assert_eq!(result.int_or("a", 3), 3);
    }

    #[test]
    fn records() {
        let mapper = RecordMapper::new(Arc::new(SchemaCache::new()));
        let tags: Vec<Tag> = tags().into_records(&mapper).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].name, "b");
        assert_eq!(tags[1].weight, 2.5);

        let result = RowResult::new(
            ["id", "name", "level", "active"],
            [values![3, "ann", "2", "t"]],
        )
        .unwrap();
        let account: Account = result.clone().into_record(&mapper).unwrap();
        assert_eq!(account.id, 3);
        assert_eq!(account.level, 2);
        assert!(account.active);
        let accounts: Vec<Account> = result.into_records(&mapper).unwrap();
        assert_eq!(accounts, [account]);

        let empty = RowResult::new(["id"], Vec::<Row>::new()).unwrap();
        assert!(matches!(
            empty
                .into_record::<Account>(&mapper)
                .unwrap_err()
                .downcast_ref::<RowError>(),
            Some(RowError::NoRows)
        ));
    }

    #[test]
    fn vec_of_first_column() {
        let result = RowResult::new(["n"], [values![1], values!["2"], values![Value::Null]]).unwrap();
        let numbers: Vec<Option<i64>> = result.into_vec().unwrap();
        assert_eq!(numbers, [Some(1), Some(2), None]);
    }

    #[test]
    fn affected() {
        let result = RowResult::default().with_affected(3, Some(41));
        assert_eq!(result.rows_affected(), 3);
        assert_eq!(result.last_insert_id(), Some(41));
        assert!(result.is_empty().unwrap());
        let mut total = RowsAffected::default();
        total.extend([result.affected(), RowsAffected {
            rows_affected: 2,
            last_insert_id: None,
        }]);
        assert_eq!(total.rows_affected, 5);
        assert_eq!(total.last_insert_id, Some(41));
    }
}
