use crate::{
    MAX_COMPARISONS,
    db::predicate::{CompareOp, ComparePredicate, FieldRef, OrderDirection, OrderSpec, Predicate},
    error::ErrorClass,
    value::Value,
};
use thiserror::Error as ThisError;
use time::format_description::well_known::Rfc3339;

/// Reserved identity pseudo-column, compiled verbatim and never quoted.
pub const ITEM_NAME: &str = "itemName()";

///
/// SelectOutput
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SelectOutput {
    /// Full rows.
    #[default]
    Rows,

    /// Scalar row count.
    Count,

    /// Identity-only projection.
    ItemNames,
}

impl SelectOutput {
    #[must_use]
    const fn keyword(self) -> &'static str {
        match self {
            Self::Rows => "*",
            Self::Count => "count(*)",
            Self::ItemNames => ITEM_NAME,
        }
    }
}

///
/// CompileError
/// Locally detectable shape errors; attribute names are never validated here.
///

#[derive(Debug, ThisError)]
pub enum CompileError {
    #[error("in() requires at least one candidate value")]
    EmptyInList,

    #[error("in() requires a list of candidate values, found {found}")]
    MalformedInList { found: &'static str },

    #[error("{kind} values cannot appear in a compiled comparison")]
    UnsupportedLiteral { kind: &'static str },

    #[error("select exceeds the {MAX_COMPARISONS}-comparison budget ({count})")]
    TooManyComparisons { count: usize },

    #[error("limit must be greater than zero")]
    ZeroLimit,

    #[error("timestamp failed to format as rfc3339: {0}")]
    TimestampFormat(String),
}

impl CompileError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyInList
            | Self::MalformedInList { .. }
            | Self::UnsupportedLiteral { .. }
            | Self::TooManyComparisons { .. }
            | Self::ZeroLimit => ErrorClass::Unsupported,
            Self::TimestampFormat(_) => ErrorClass::Internal,
        }
    }
}

///
/// SelectExpr
///
/// Declarative select specification, compiled on demand into one
/// select-expression string in the store's query language. Construction is
/// purely structural; every check happens in `compile`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectExpr {
    pub collection: String,
    pub output: SelectOutput,
    pub predicate: Option<Predicate>,
    pub order: Option<OrderSpec>,
    pub limit: Option<u32>,
}

impl SelectExpr {
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            output: SelectOutput::Rows,
            predicate: None,
            order: None,
            limit: None,
        }
    }

    /// Compile to the store's select language:
    ///
    /// ```text
    /// select <output> from `<collection>` [where ...] [order by ...] [limit n]
    /// ```
    pub fn compile(&self) -> Result<String, CompileError> {
        let mut sql = format!(
            "select {} from {}",
            self.output.keyword(),
            quote_ident(&self.collection)
        );

        if let Some(predicate) = &self.predicate {
            let count = predicate.cost();
            if count > MAX_COMPARISONS {
                return Err(CompileError::TooManyComparisons { count });
            }

            let mut conjuncts = Vec::new();
            flatten_predicate(predicate, &mut conjuncts)?;
            if !conjuncts.is_empty() {
                sql.push_str(" where ");
                sql.push_str(&conjuncts.join(" and "));
            }
        }

        if let Some(order) = &self.order {
            sql.push_str(" order by ");
            sql.push_str(&field_sql(&order.field));
            if order.direction == OrderDirection::Desc {
                sql.push_str(" desc");
            }
        }

        if let Some(limit) = self.limit {
            if limit == 0 {
                return Err(CompileError::ZeroLimit);
            }
            sql.push_str(&format!(" limit {limit}"));
        }

        Ok(sql)
    }
}

/// Flatten nested conjunctions left-to-right into rendered comparisons.
/// Member order is preserved; the store's `and` is the only combinator.
fn flatten_predicate(predicate: &Predicate, out: &mut Vec<String>) -> Result<(), CompileError> {
    match predicate {
        Predicate::And(members) => {
            for member in members {
                flatten_predicate(member, out)?;
            }
            Ok(())
        }
        Predicate::Compare(cmp) => {
            out.push(compare_sql(cmp)?);
            Ok(())
        }
    }
}

fn compare_sql(cmp: &ComparePredicate) -> Result<String, CompileError> {
    let field = field_sql(&cmp.field);

    if cmp.op == CompareOp::In {
        let Value::List(candidates) = &cmp.value else {
            return Err(CompileError::MalformedInList {
                found: cmp.value.kind(),
            });
        };
        if candidates.is_empty() {
            return Err(CompileError::EmptyInList);
        }

        let literals = candidates
            .iter()
            .map(encode_literal)
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(format!("{field} in ({})", literals.join(",")));
    }

    Ok(format!(
        "{field} {} {}",
        cmp.op.symbol(),
        encode_literal(&cmp.value)?
    ))
}

fn field_sql(field: &FieldRef) -> String {
    match field {
        FieldRef::Attr(name) => quote_ident(name),
        FieldRef::ItemName => ITEM_NAME.to_string(),
    }
}

/// Backtick-quote an identifier, doubling embedded backticks.
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Encode one literal for the select language. Everything is transported as
/// quoted text except bare integers; quotes are escaped by doubling.
fn encode_literal(value: &Value) -> Result<String, CompileError> {
    match value {
        Value::Text(s) => Ok(quote_text(s)),
        Value::Int(n) => Ok(n.to_string()),
        Value::Uint(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(quote_text(if *b { "true" } else { "false" })),
        Value::Timestamp(ts) => ts
            .format(&Rfc3339)
            .map(|s| quote_text(&s))
            .map_err(|err| CompileError::TimestampFormat(err.to_string())),
        Value::Null => Err(CompileError::UnsupportedLiteral { kind: "null" }),
        Value::List(_) => Err(CompileError::UnsupportedLiteral { kind: "list" }),
    }
}

fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
