use crate::{
    Value,
    writer::{Context, SqlWriter},
};
use std::fmt::Debug;

/// A renderable SQL fragment.
pub trait Expression: Send + Sync + Debug {
    /// Serialize the expression into `out` using the sql writer, binding parameters into `context`.
    fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, out: &mut String);
}

impl<T: Expression> Expression for &T {
    fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, out: &mut String) {
        (*self).write_query(writer, context, out);
    }
}

impl Expression for &dyn Expression {
    fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, out: &mut String) {
        (*self).write_query(writer, context, out);
    }
}

impl Expression for () {
    fn write_query(&self, _writer: &dyn SqlWriter, _context: &mut Context, _out: &mut String) {}
}

/// A value renders as a bound parameter.
impl Expression for Value {
    fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, out: &mut String) {
        writer.write_parameter(context, out, self.clone());
    }
}

impl<'a, T: Expression> From<&'a T> for &'a dyn Expression {
    fn from(value: &'a T) -> Self {
        value as &'a dyn Expression
    }
}
