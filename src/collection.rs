//! Source collections and field selection.
//!
//! A [`Collection`] is the boundary to the schema catalog: it turns declared
//! `(field, type)` pairs into column leaves, and it groups derived
//! expressions into projections. Joins, grouping and sorting live outside
//! this crate.

pub mod apply;

pub use apply::{Applied, ApplyOptions, Axis, MapFunction, MapSpec, Row};

use crate::expression::element::build_switch;
use crate::expression::{Cases, Expr, ExpressionError, ExpressionResult, TypeChecker};
use crate::types::Schema;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of a source collection; column leaves remember which one they
/// came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceId(u64);

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

impl SourceId {
    pub(crate) fn new() -> Self {
        SourceId(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A field named directly or given as an expression
#[derive(Debug, Clone)]
pub enum FieldRef {
    Name(String),
    Expr(Expr),
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        FieldRef::Name(name.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(name: String) -> Self {
        FieldRef::Name(name)
    }
}

impl From<Expr> for FieldRef {
    fn from(expr: Expr) -> Self {
        FieldRef::Expr(expr)
    }
}

impl From<&Expr> for FieldRef {
    fn from(expr: &Expr) -> Self {
        FieldRef::Expr(expr.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

#[derive(Debug)]
struct CollectionInner {
    name: String,
    source: SourceId,
    schema: Schema,
    fields: Vec<Expr>,
}

impl Collection {
    /// Create a source collection from a catalog schema
    pub fn source(name: impl Into<String>, schema: Schema) -> Self {
        let source = SourceId::new();
        let fields = schema
            .iter()
            .map(|(field, data_type)| Expr::column(field, source, data_type))
            .collect();
        let name = name.into();
        log::debug!("registered source {} with {} fields", name, schema.len());

        Self {
            inner: Arc::new(CollectionInner {
                name,
                source,
                schema,
                fields,
            }),
        }
    }

    /// A collection over the same source with different fields
    pub(crate) fn derived(&self, schema: Schema, fields: Vec<Expr>) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                name: self.inner.name.clone(),
                source: self.inner.source,
                schema,
                fields,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn source_id(&self) -> SourceId {
        self.inner.source
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn fields(&self) -> &[Expr] {
        &self.inner.fields
    }

    /// Look up a field by its output name
    pub fn col(&self, name: &str) -> ExpressionResult<Expr> {
        match self.inner.schema.index_of(name) {
            Some(index) => Ok(self.inner.fields[index].clone()),
            None => Err(ExpressionError::FieldNotFound {
                name: name.to_string(),
                collection: self.inner.name.clone(),
            }),
        }
    }

    /// Project a new collection from field names and derived expressions
    pub fn select<I, F>(&self, fields: I) -> ExpressionResult<Collection>
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldRef>,
    {
        let checker = TypeChecker::new("select");
        let mut selected = Vec::new();
        for field in fields {
            let field: FieldRef = field.into();
            let expr = match field {
                FieldRef::Name(name) => self.col(&name)?,
                FieldRef::Expr(expr) => {
                    self.check_owned(&expr)?;
                    expr
                }
            };
            selected.push(expr);
        }
        checker.expect_count(!selected.is_empty(), "at least one field", 0)?;

        let mut schema = Schema::new();
        for expr in &selected {
            let Some(name) = expr.name() else {
                return checker.invalid_argument(format!("{} needs a name, use rename()", expr));
            };
            schema.push(name, expr.data_type())?;
        }
        Ok(self.derived(schema, selected))
    }

    /// Multi-branch selection over independent boolean conditions.
    ///
    /// There is no value to dispatch on here, so every condition must be a
    /// boolean expression over this collection.
    pub fn switch(&self, cases: Cases) -> ExpressionResult<Expr> {
        for expr in cases.exprs() {
            self.check_owned(expr)?;
        }
        build_switch(None, cases)
    }

    /// Require every column leaf of `expr` to come from this collection's source
    pub(crate) fn check_owned(&self, expr: &Expr) -> ExpressionResult<()> {
        if expr.sources().iter().all(|s| *s == self.inner.source) {
            return Ok(());
        }
        log::debug!("rejected {}: foreign fields for {}", expr, self.inner.name);
        Err(ExpressionError::ForeignField {
            expression: expr.to_string(),
            collection: self.inner.name.clone(),
        })
    }
}
