use crate::{
    Condition, Kind, Linker, Node, Operator, Value, convert, possibly_parenthesized,
    separated_by, truncate_long, writer::Context,
};

/// Dialect printer turning condition trees into predicate text and bound parameters.
///
/// Every method has a default rendering, a dialect overrides only what differs
/// (placeholder style, identifier quoting, operator tokens).
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// Render a field name, verbatim unless the dialect quotes it.
    fn write_field(&self, _context: &mut Context, out: &mut String, field: &str) {
        out.push_str(field);
    }

    /// Render a parameter placeholder. Called before the value is bound.
    fn write_placeholder(&self, _context: &mut Context, out: &mut String) {
        out.push('?');
    }

    /// Render a placeholder and bind `value` to it.
    fn write_parameter(&self, context: &mut Context, out: &mut String, value: Value) {
        self.write_placeholder(context, out);
        context.bind(value);
    }

    fn linker_token(&self, linker: Linker) -> &'static str {
        match linker {
            Linker::And => "AND",
            Linker::Or => "OR",
        }
    }

    fn operator_token(&self, operator: Operator) -> &'static str {
        match operator {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Lt => "<",
            Operator::Like | Operator::LikeIgnoreStart | Operator::LikeIgnoreEnd => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Wrap the parameter of a LIKE operator with its wildcards.
    fn like_pattern(&self, operator: Operator, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        let text = match convert(value.clone(), Kind::Varchar) {
            Ok(Value::Varchar(Some(v))) => v,
            _ => {
                let rendered = format!("{value:?}");
                log::warn!(
                    "Cannot render {} as text for {operator}, binding it unchanged",
                    truncate_long!(rendered)
                );
                return value;
            }
        };
        let pattern = match operator {
            Operator::LikeIgnoreStart => format!("%{text}"),
            Operator::LikeIgnoreEnd => format!("{text}%"),
            _ => format!("%{text}%"),
        };
        Value::Varchar(Some(pattern))
    }

    /// Render a single predicate: `field <op> ?`, list and nullary forms included.
    fn write_predicate(
        &self,
        context: &mut Context,
        out: &mut String,
        field: &str,
        operator: Operator,
        values: &[Value],
    ) {
        if operator.is_list() && values.is_empty() {
            // Nothing is in an empty list, everything is outside of it
            out.push_str(if operator == Operator::In {
                "1 = 0"
            } else {
                "1 = 1"
            });
            return;
        }
        self.write_field(context, out, field);
        out.push(' ');
        out.push_str(self.operator_token(operator));
        if operator.is_nullary() {
            return;
        }
        out.push(' ');
        if operator.is_list() {
            out.push('(');
            separated_by(
                out,
                values,
                |out, v| self.write_parameter(context, out, v.clone()),
                ", ",
            );
            out.push(')');
            return;
        }
        if values.len() > 1 {
            log::warn!(
                "{operator} on `{field}` takes one value, {} extra values are not bound",
                values.len() - 1
            );
        }
        let value = values.first().cloned().unwrap_or_default();
        let value = if operator.is_like() {
            self.like_pattern(operator, value)
        } else {
            value
        };
        self.write_parameter(context, out, value);
    }

    /// Render verbatim predicate text, its values are bound in order.
    fn write_raw(&self, context: &mut Context, out: &mut String, expression: &str, values: &[Value]) {
        out.push_str(expression);
        for value in values {
            context.bind(value.clone());
        }
    }

    /// Render a condition tree.
    ///
    /// The first emitted child of a group has no leading linker, every other child
    /// is preceded by its own. Children that are groups are parenthesized and
    /// children without predicates are skipped.
    fn write_condition(&self, context: &mut Context, out: &mut String, condition: &Condition) {
        match condition.node() {
            Node::Empty => {}
            Node::Predicate {
                field,
                operator,
                values,
            } => self.write_predicate(context, out, field, *operator, values),
            Node::Raw { expression, values } => self.write_raw(context, out, expression, values),
            Node::Group(items) => {
                let mut first = true;
                for item in items.iter().filter(|v| v.payloads() > 0) {
                    if !first {
                        out.push(' ');
                        out.push_str(self.linker_token(item.linker()));
                        out.push(' ');
                    }
                    first = false;
                    possibly_parenthesized!(
                        out,
                        item.is_group(),
                        self.write_condition(context, out, item)
                    );
                }
            }
        }
    }

    /// Render ` WHERE <condition>`, nothing at all when the tree has no predicates.
    fn write_where(&self, context: &mut Context, out: &mut String, condition: &Condition) {
        if condition.is_empty() {
            return;
        }
        out.push_str(" WHERE ");
        self.write_condition(context, out, condition);
    }
}

/// Fallback generic SQL writer using `?` placeholders and bare field names.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;
impl GenericSqlWriter {
    /// Construct a new generic writer.
    pub fn new() -> Self {
        Self {}
    }
}
impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
