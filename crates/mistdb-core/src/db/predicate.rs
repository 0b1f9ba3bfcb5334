use crate::value::Value;
use std::ops::BitAnd;

///
/// Predicate AST
///
/// Pure, schema-agnostic representation of query predicates.
/// This layer contains no attribute validation and no execution semantics;
/// unknown field names surface as remote-side errors, never here. All
/// interpretation occurs during compilation to the store's select language.
///

///
/// FieldRef
///
/// A predicate or ordering target: either a stored attribute or the
/// reserved identity pseudo-field. The pseudo-field is usable exactly like
/// an attribute in predicates and ordering, but it is never present in any
/// attribute map; it exists only in the query language.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldRef {
    Attr(String),
    ItemName,
}

impl FieldRef {
    #[must_use]
    pub fn attr(name: impl Into<String>) -> Self {
        Self::Attr(name.into())
    }
}

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
}

impl CompareOp {
    /// The operator's spelling in the store's select language.
    #[must_use]
    pub(crate) const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "in",
        }
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComparePredicate {
    pub field: FieldRef,
    pub op: CompareOp,
    pub value: Value,
}

impl ComparePredicate {
    const fn new(field: FieldRef, op: CompareOp, value: Value) -> Self {
        Self { field, op, value }
    }

    /// Comparisons this predicate spends against the per-select budget.
    /// An `in` list costs one per candidate; everything else costs one.
    #[must_use]
    pub(crate) fn cost(&self) -> usize {
        match (&self.op, &self.value) {
            (CompareOp::In, Value::List(values)) => values.len(),
            _ => 1,
        }
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    And(Vec<Self>),
    Compare(ComparePredicate),
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::compare(FieldRef::attr(field), CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: Value) -> Self {
        Self::compare(FieldRef::attr(field), CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::compare(FieldRef::attr(field), CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::compare(FieldRef::attr(field), CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::compare(FieldRef::attr(field), CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::compare(FieldRef::attr(field), CompareOp::Gte, value)
    }

    #[must_use]
    pub fn in_(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::compare(FieldRef::attr(field), CompareOp::In, Value::List(values))
    }

    /// Identity equality against a raw item name.
    #[must_use]
    pub fn identity_eq(name: impl Into<String>) -> Self {
        Self::compare(FieldRef::ItemName, CompareOp::Eq, Value::Text(name.into()))
    }

    /// Identity membership against raw item names.
    #[must_use]
    pub fn identity_in<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = names
            .into_iter()
            .map(|name| Value::Text(name.into()))
            .collect();

        Self::compare(FieldRef::ItemName, CompareOp::In, Value::List(values))
    }

    fn compare(field: FieldRef, op: CompareOp, value: Value) -> Self {
        Self::Compare(ComparePredicate::new(field, op, value))
    }

    /// Total comparison cost, recursing through conjunctions.
    #[must_use]
    pub(crate) fn cost(&self) -> usize {
        match self {
            Self::And(preds) => preds.iter().map(Self::cost).sum(),
            Self::Compare(cmp) => cmp.cost(),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(vec![self.clone(), rhs.clone()])
    }
}

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

///
/// OrderSpec
///
/// Single sort key; the store's select language accepts exactly one.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderSpec {
    pub field: FieldRef,
    pub direction: OrderDirection,
}

impl OrderSpec {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: FieldRef::attr(field),
            direction: OrderDirection::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: FieldRef::attr(field),
            direction: OrderDirection::Desc,
        }
    }

    #[must_use]
    pub const fn identity(direction: OrderDirection) -> Self {
        Self {
            field: FieldRef::ItemName,
            direction,
        }
    }
}
