use crate::{
    Expression, Value,
    writer::{Context, SqlWriter},
};
use std::{
    fmt::{self, Display, Formatter},
    mem,
};

/// How a condition is joined to the sibling that precedes it.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linker {
    #[default]
    And,
    Or,
}

/// Comparison performed by a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Ge,
    Gt,
    Le,
    Lt,
    /// Matches the value anywhere: `%value%`.
    Like,
    /// Matches values ending with the value: `%value`.
    LikeIgnoreStart,
    /// Matches values starting with the value: `value%`.
    LikeIgnoreEnd,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub fn is_like(self) -> bool {
        matches!(
            self,
            Operator::Like | Operator::LikeIgnoreStart | Operator::LikeIgnoreEnd | Operator::NotLike
        )
    }
    pub fn is_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
    pub fn is_nullary(self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

/// Content of a condition node.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Node {
    /// Placeholder carrying no predicate, the root of a fresh tree.
    #[default]
    Empty,
    Predicate {
        field: String,
        operator: Operator,
        values: Vec<Value>,
    },
    /// Verbatim predicate text with its positional parameters.
    Raw {
        expression: String,
        values: Vec<Value>,
    },
    Group(Vec<Condition>),
}

/// A node of a filter tree: a predicate, a raw expression or a group of children.
///
/// Trees grow by appending children, each append fixes the child's [`Linker`] and
/// adds its payload to the parent. Appending to a node that is itself a predicate
/// turns it into a group whose first child is the former predicate, so nothing
/// already added to the tree is ever dropped.
///
/// ```rust
/// use sluice_core::{Condition, GenericSqlWriter, values};
/// let condition = Condition::new()
///     .eq("status", "active")
///     .is_in("role_id", values![vec![1, 2], 3])
///     .gt_if(false, "age", 18);
/// assert_eq!(condition.payloads(), 2);
/// let (sql, params) = condition.to_sql(&GenericSqlWriter::new());
/// assert_eq!(sql, "status = ? AND role_id IN (?, ?, ?)");
/// assert_eq!(params.len(), 4);
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Condition {
    linker: Linker,
    node: Node,
    payloads: usize,
}

/// Expand every list argument in place, one level deep.
fn flatten(values: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut result = Vec::new();
    for value in values {
        match value {
            Value::List(Some(items)) => result.extend(items),
            value => result.push(value),
        }
    }
    result
}

macro_rules! impl_single_operator {
    ($operator:expr, $op:ident, $op_if:ident, $or_op:ident, $or_op_if:ident) => {
        pub fn $op(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
            self.$op_if(true, field, value)
        }
        pub fn $op_if(self, include: bool, field: impl Into<String>, value: impl Into<Value>) -> Self {
            if !include {
                return self;
            }
            self.and(field, $operator, [value.into()])
        }
        pub fn $or_op(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
            self.$or_op_if(true, field, value)
        }
        pub fn $or_op_if(
            self,
            include: bool,
            field: impl Into<String>,
            value: impl Into<Value>,
        ) -> Self {
            if !include {
                return self;
            }
            self.or(field, $operator, [value.into()])
        }
    };
}

macro_rules! impl_list_operator {
    ($operator:expr, $op:ident, $op_if:ident, $or_op:ident, $or_op_if:ident) => {
        pub fn $op<V: Into<Value>>(
            self,
            field: impl Into<String>,
            values: impl IntoIterator<Item = V>,
        ) -> Self {
            self.$op_if(true, field, values)
        }
        pub fn $op_if<V: Into<Value>>(
            self,
            include: bool,
            field: impl Into<String>,
            values: impl IntoIterator<Item = V>,
        ) -> Self {
            self.and_if(include, field, $operator, values.into_iter().map(Into::into))
        }
        pub fn $or_op<V: Into<Value>>(
            self,
            field: impl Into<String>,
            values: impl IntoIterator<Item = V>,
        ) -> Self {
            self.$or_op_if(true, field, values)
        }
        pub fn $or_op_if<V: Into<Value>>(
            self,
            include: bool,
            field: impl Into<String>,
            values: impl IntoIterator<Item = V>,
        ) -> Self {
            self.or_if(include, field, $operator, values.into_iter().map(Into::into))
        }
    };
}

macro_rules! impl_nullary_operator {
    ($operator:expr, $op:ident, $op_if:ident, $or_op:ident, $or_op_if:ident) => {
        pub fn $op(self, field: impl Into<String>) -> Self {
            self.$op_if(true, field)
        }
        pub fn $op_if(self, include: bool, field: impl Into<String>) -> Self {
            self.and_if(include, field, $operator, [])
        }
        pub fn $or_op(self, field: impl Into<String>) -> Self {
            self.$or_op_if(true, field)
        }
        pub fn $or_op_if(self, include: bool, field: impl Into<String>) -> Self {
            self.or_if(include, field, $operator, [])
        }
    };
}

impl Condition {
    /// Empty root accumulator, compiles to nothing until something is appended.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single predicate. List values are flattened one level.
    pub fn leaf(
        field: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        Self {
            linker: Linker::And,
            node: Node::Predicate {
                field: field.into(),
                operator,
                values: flatten(values),
            },
            payloads: 1,
        }
    }

    /// Verbatim predicate text, counts as a predicate unless the text is blank.
    pub fn raw(expression: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        let expression = expression.into();
        let payloads = if expression.trim().is_empty() { 0 } else { 1 };
        Self {
            linker: Linker::And,
            node: Node::Raw {
                expression,
                values: flatten(values),
            },
            payloads,
        }
    }

    pub fn linker(&self) -> Linker {
        self.linker
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Number of predicates reachable from this node.
    pub fn payloads(&self) -> usize {
        self.payloads
    }

    /// A tree without predicates, it must not produce a `WHERE` clause.
    pub fn is_empty(&self) -> bool {
        self.payloads == 0
    }

    pub fn is_group(&self) -> bool {
        matches!(self.node, Node::Group(..))
    }

    pub fn items(&self) -> &[Condition] {
        match &self.node {
            Node::Group(items) => items,
            _ => &[],
        }
    }

    pub fn field(&self) -> Option<&str> {
        match &self.node {
            Node::Predicate { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match &self.node {
            Node::Predicate { operator, .. } => Some(*operator),
            _ => None,
        }
    }

    pub fn values(&self) -> &[Value] {
        match &self.node {
            Node::Predicate { values, .. } | Node::Raw { values, .. } => values,
            _ => &[],
        }
    }

    pub fn raw_expression(&self) -> Option<&str> {
        match &self.node {
            Node::Raw { expression, .. } => Some(expression),
            _ => None,
        }
    }

    fn append(mut self, linker: Linker, mut child: Condition) -> Self {
        child.linker = linker;
        self.payloads += child.payloads;
        match &mut self.node {
            Node::Group(items) => items.push(child),
            Node::Empty => self.node = Node::Group(vec![child]),
            node => {
                let own = mem::take(node);
                let first = Condition {
                    linker: Linker::And,
                    payloads: self.payloads - child.payloads,
                    node: own,
                };
                self.node = Node::Group(vec![first, child]);
            }
        }
        self
    }

    pub fn and(
        self,
        field: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.and_if(true, field, operator, values)
    }

    pub fn and_if(
        self,
        include: bool,
        field: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        if !include {
            return self;
        }
        self.append(Linker::And, Condition::leaf(field, operator, values))
    }

    pub fn or(
        self,
        field: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.or_if(true, field, operator, values)
    }

    pub fn or_if(
        self,
        include: bool,
        field: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        if !include {
            return self;
        }
        self.append(Linker::Or, Condition::leaf(field, operator, values))
    }

    /// Append an already built subtree joined with `AND`.
    pub fn and_group(self, condition: Condition) -> Self {
        self.append(Linker::And, condition)
    }

    /// Append an already built subtree joined with `OR`.
    pub fn or_group(self, condition: Condition) -> Self {
        self.append(Linker::Or, condition)
    }

    pub fn and_raw(
        self,
        expression: impl Into<String>,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.append(Linker::And, Condition::raw(expression, values))
    }

    pub fn or_raw(
        self,
        expression: impl Into<String>,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.append(Linker::Or, Condition::raw(expression, values))
    }

    impl_single_operator!(Operator::Eq, eq, eq_if, or_eq, or_eq_if);
    impl_single_operator!(Operator::NotEq, not_eq, not_eq_if, or_not_eq, or_not_eq_if);
    impl_single_operator!(Operator::Ge, ge, ge_if, or_ge, or_ge_if);
    impl_single_operator!(Operator::Gt, gt, gt_if, or_gt, or_gt_if);
    impl_single_operator!(Operator::Le, le, le_if, or_le, or_le_if);
    impl_single_operator!(Operator::Lt, lt, lt_if, or_lt, or_lt_if);
    impl_single_operator!(Operator::Like, like, like_if, or_like, or_like_if);
    impl_single_operator!(
        Operator::LikeIgnoreStart,
        like_ignore_start,
        like_ignore_start_if,
        or_like_ignore_start,
        or_like_ignore_start_if
    );
    impl_single_operator!(
        Operator::LikeIgnoreEnd,
        like_ignore_end,
        like_ignore_end_if,
        or_like_ignore_end,
        or_like_ignore_end_if
    );
    impl_single_operator!(Operator::NotLike, not_like, not_like_if, or_not_like, or_not_like_if);
    impl_list_operator!(Operator::In, is_in, is_in_if, or_is_in, or_is_in_if);
    impl_list_operator!(Operator::NotIn, not_in, not_in_if, or_not_in, or_not_in_if);
    impl_nullary_operator!(Operator::IsNull, is_null, is_null_if, or_is_null, or_is_null_if);
    impl_nullary_operator!(
        Operator::IsNotNull,
        is_not_null,
        is_not_null_if,
        or_is_not_null,
        or_is_not_null_if
    );

    /// Compile with `writer`, returning the text and the parameters in binding order.
    pub fn to_sql(&self, writer: &dyn SqlWriter) -> (String, Vec<Value>) {
        let mut context = Context::new();
        let mut out = String::with_capacity(64 * self.payloads.max(1));
        self.write_query(writer, &mut context, &mut out);
        log::trace!("Compiled condition: {out}");
        (out, context.into_params())
    }
}

impl Expression for Condition {
    fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, out: &mut String) {
        writer.write_condition(context, out, self);
    }
}

impl Display for Linker {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Linker::And => "And",
            Linker::Or => "Or",
        })
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Eq => "Eq",
            Operator::NotEq => "NotEq",
            Operator::Ge => "Ge",
            Operator::Gt => "Gt",
            Operator::Le => "Le",
            Operator::Lt => "Lt",
            Operator::Like => "Like",
            Operator::LikeIgnoreStart => "LikeIgnoreStart",
            Operator::LikeIgnoreEnd => "LikeIgnoreEnd",
            Operator::NotLike => "NotLike",
            Operator::In => "In",
            Operator::NotIn => "NotIn",
            Operator::IsNull => "IsNull",
            Operator::IsNotNull => "IsNotNull",
        })
    }
}
