use crate::{Result, Row, RowNames};
use std::slice;

/// Forward only source of rows sharing one list of columns.
///
/// Implemented by the execution layer to stream rows into
/// [`crate::RecordMapper::scan_all`].
pub trait RowCursor {
    fn columns(&self) -> &[String];
    /// Next row, `None` once exhausted. A failed read is returned as is.
    fn next_row(&mut self) -> Option<Result<Row>>;
}

impl<C: RowCursor + ?Sized> RowCursor for &mut C {
    fn columns(&self) -> &[String] {
        (**self).columns()
    }
    fn next_row(&mut self) -> Option<Result<Row>> {
        (**self).next_row()
    }
}

/// Cursor over rows produced by an iterator.
#[derive(Debug)]
pub struct IterCursor<I> {
    columns: RowNames,
    rows: I,
}

impl<I: Iterator<Item = Result<Row>>> IterCursor<I> {
    pub fn new(columns: RowNames, rows: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Result<Row>>> RowCursor for IterCursor<I> {
    fn columns(&self) -> &[String] {
        &self.columns
    }
    fn next_row(&mut self) -> Option<Result<Row>> {
        self.rows.next()
    }
}

/// Cursor borrowing already materialized rows.
#[derive(Debug, Clone)]
pub struct SliceCursor<'a> {
    columns: &'a [String],
    rows: slice::Iter<'a, Row>,
}

impl<'a> SliceCursor<'a> {
    pub fn new(columns: &'a [String], rows: &'a [Row]) -> Self {
        Self {
            columns,
            rows: rows.iter(),
        }
    }
}

impl<'a> RowCursor for SliceCursor<'a> {
    fn columns(&self) -> &[String] {
        self.columns
    }
    fn next_row(&mut self) -> Option<Result<Row>> {
        self.rows.next().cloned().map(Ok)
    }
}
