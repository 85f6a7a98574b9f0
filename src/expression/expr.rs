//! Expression tree definitions.
//!
//! An [`Expr`] is a cheap-to-clone handle onto an immutable node. Every node
//! carries its operator tag, its inferred element type and shape, and its
//! ordered operands. None of these change after construction, so a tree can
//! be shared freely between threads and rewritten by building new nodes.

use crate::collection::apply::MapSpec;
use crate::collection::SourceId;
use crate::expression::cut::CutSpec;
use crate::expression::operator::{BinaryOperator, ReduceFunction, UnaryOperator};
use crate::expression::Shape;
use crate::types::{ElementType, Value};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Operator tag plus operator-specific payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ExprKind {
    /// Reference to a field of a source collection
    Column { name: String, source: SourceId },

    /// Literal constant value
    Literal(Value),

    Unary(UnaryOperator),

    Binary(BinaryOperator),

    Reduce(ReduceFunction),

    /// Operands: `[receiver, fill]`
    FillNa,

    /// Operands: `[receiver, candidates..]`
    IsIn { negated: bool },

    /// Operands: `[receiver, lower, upper]`
    Between { inclusive: bool },

    /// Operands: `[condition, if_true, if_false]`
    IfElse,

    /// Operands: `[case?, conditions.., thens.., default?]`
    Switch { has_case: bool, has_default: bool },

    /// Operands: `[receiver]`
    Cut(CutSpec),

    /// Explicit conversion to the node's element type
    Cast,

    /// User function over a row of fields
    Map(MapSpec),
}

impl ExprKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Column { .. } => "column",
            ExprKind::Literal(_) => "literal",
            ExprKind::Unary(op) => op.as_str(),
            ExprKind::Binary(op) => op.as_str(),
            ExprKind::Reduce(func) => func.as_str(),
            ExprKind::FillNa => "fillna",
            ExprKind::IsIn { negated: false } => "isin",
            ExprKind::IsIn { negated: true } => "notin",
            ExprKind::Between { .. } => "between",
            ExprKind::IfElse => "ifelse",
            ExprKind::Switch { .. } => "switch",
            ExprKind::Cut(_) => "cut",
            ExprKind::Cast => "astype",
            ExprKind::Map(_) => "map",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ExprKind::Column { .. } | ExprKind::Literal(_))
    }
}

#[derive(Debug)]
struct Node {
    kind: ExprKind,
    data_type: ElementType,
    shape: Shape,
    operands: Vec<Expr>,
    alias: Option<String>,
    // Structural hash, computed once from the fields above
    hash: u64,
}

/// Shared handle onto an immutable expression node
#[derive(Debug, Clone)]
pub struct Expr(Arc<Node>);

impl Expr {
    /// Build a node from already validated parts
    pub(crate) fn new(
        kind: ExprKind,
        data_type: ElementType,
        shape: Shape,
        operands: Vec<Expr>,
    ) -> Self {
        Self::from_parts(kind, data_type, shape, operands, None)
    }

    fn from_parts(
        kind: ExprKind,
        data_type: ElementType,
        shape: Shape,
        operands: Vec<Expr>,
        alias: Option<String>,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        data_type.hash(&mut hasher);
        shape.hash(&mut hasher);
        alias.hash(&mut hasher);
        for operand in &operands {
            hasher.write_u64(operand.0.hash);
        }
        let hash = hasher.finish();

        log::trace!("built {} node: {} {}", kind.name(), shape, data_type);

        Expr(Arc::new(Node {
            kind,
            data_type,
            shape,
            operands,
            alias,
            hash,
        }))
    }

    /// Create a column reference leaf
    pub(crate) fn column(name: impl Into<String>, source: SourceId, data_type: ElementType) -> Self {
        Self::new(
            ExprKind::Column {
                name: name.into(),
                source,
            },
            data_type,
            Shape::Sequence,
            Vec::new(),
        )
    }

    /// Create a scalar literal leaf
    pub fn literal(value: impl Into<Value>) -> Self {
        let value = value.into();
        let data_type = value.data_type();
        Self::new(ExprKind::Literal(value), data_type, Shape::Scalar, Vec::new())
    }

    /// Same node with a different operand list
    pub(crate) fn with_operands(&self, operands: Vec<Expr>) -> Self {
        Self::from_parts(
            self.0.kind.clone(),
            self.0.data_type,
            self.0.shape,
            operands,
            self.0.alias.clone(),
        )
    }

    /// Tag this expression with a display name. Type and shape are unchanged.
    pub fn rename(&self, name: impl Into<String>) -> Self {
        Self::from_parts(
            self.0.kind.clone(),
            self.0.data_type,
            self.0.shape,
            self.0.operands.clone(),
            Some(name.into()),
        )
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    pub fn data_type(&self) -> ElementType {
        self.0.data_type
    }

    pub fn shape(&self) -> Shape {
        self.0.shape
    }

    pub fn operands(&self) -> &[Expr] {
        &self.0.operands
    }

    pub fn operand(&self, index: usize) -> Option<&Expr> {
        self.0.operands.get(index)
    }

    pub fn alias(&self) -> Option<&str> {
        self.0.alias.as_deref()
    }

    /// Output name: the alias if set, else the referenced column's name
    pub fn name(&self) -> Option<&str> {
        match (&self.0.alias, &self.0.kind) {
            (Some(alias), _) => Some(alias),
            (None, ExprKind::Column { name, .. }) => Some(name),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.0.operands.is_empty()
    }

    pub fn is_scalar(&self) -> bool {
        self.0.shape.is_scalar()
    }

    pub fn is_sequence(&self) -> bool {
        self.0.shape.is_sequence()
    }

    pub fn literal_value(&self) -> Option<&Value> {
        match &self.0.kind {
            ExprKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Whether two handles point at the same node
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Candidate values of a membership test
    pub fn candidates(&self) -> &[Expr] {
        match self.0.kind {
            ExprKind::IsIn { .. } => &self.0.operands[1..],
            _ => &[],
        }
    }

    fn switch_layout(&self) -> Option<(usize, usize, bool)> {
        match self.0.kind {
            ExprKind::Switch {
                has_case,
                has_default,
            } => {
                let offset = has_case as usize;
                let branches = (self.0.operands.len() - offset - has_default as usize) / 2;
                Some((offset, branches, has_default))
            }
            _ => None,
        }
    }

    /// Value dispatched on by a switch with a receiver
    pub fn case(&self) -> Option<&Expr> {
        match self.0.kind {
            ExprKind::Switch { has_case: true, .. } => self.0.operands.first(),
            _ => None,
        }
    }

    /// Match values or boolean conditions of a switch
    pub fn conditions(&self) -> &[Expr] {
        match self.switch_layout() {
            Some((offset, n, _)) => &self.0.operands[offset..offset + n],
            None => &[],
        }
    }

    /// Result branches of a switch
    pub fn thens(&self) -> &[Expr] {
        match self.switch_layout() {
            Some((offset, n, _)) => &self.0.operands[offset + n..offset + 2 * n],
            None => &[],
        }
    }

    pub fn default(&self) -> Option<&Expr> {
        match self.switch_layout() {
            Some((_, _, true)) => self.0.operands.last(),
            _ => None,
        }
    }

    pub fn cut_spec(&self) -> Option<&CutSpec> {
        match &self.0.kind {
            ExprKind::Cut(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn map_spec(&self) -> Option<&MapSpec> {
        match &self.0.kind {
            ExprKind::Map(spec) => Some(spec),
            _ => None,
        }
    }

    /// Visit this node and all of its descendants in pre-order
    pub fn walk<F: FnMut(&Expr)>(&self, f: &mut F) {
        f(self);
        for operand in &self.0.operands {
            operand.walk(f);
        }
    }

    /// Sources referenced by column leaves anywhere in the tree
    pub fn sources(&self) -> BTreeSet<SourceId> {
        let mut sources = BTreeSet::new();
        self.walk(&mut |e| {
            if let ExprKind::Column { source, .. } = e.kind() {
                sources.insert(*source);
            }
        });
        sources
    }

    /// Distinct column leaves in first-visit order
    pub fn column_refs(&self) -> Vec<Expr> {
        let mut columns: Vec<Expr> = Vec::new();
        self.walk(&mut |e| {
            if matches!(e.kind(), ExprKind::Column { .. }) && !columns.contains(e) {
                columns.push(e.clone());
            }
        });
        columns
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        let (a, b) = (&self.0, &other.0);
        a.hash == b.hash
            && a.data_type == b.data_type
            && a.shape == b.shape
            && a.kind == b.kind
            && a.alias == b.alias
            && a.operands == b.operands
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Expr", 5)?;
        state.serialize_field("kind", &self.0.kind)?;
        state.serialize_field("data_type", &self.0.data_type)?;
        state.serialize_field("shape", &self.0.shape)?;
        state.serialize_field("alias", &self.0.alias)?;
        state.serialize_field("operands", &self.0.operands)?;
        state.end()
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops = self.operands();
        match self.kind() {
            ExprKind::Column { name, .. } => f.write_str(name)?,
            ExprKind::Literal(value) => write!(f, "{}", value)?,
            ExprKind::Unary(UnaryOperator::Not) => write!(f, "NOT {}", ops[0])?,
            ExprKind::Unary(UnaryOperator::Negate) => write!(f, "-{}", ops[0])?,
            ExprKind::Binary(op) => write!(f, "({} {} {})", ops[0], op.as_str(), ops[1])?,
            ExprKind::IsIn { .. } => {
                write!(f, "{}({}, [", self.kind().name(), ops[0])?;
                write_list(f, &ops[1..])?;
                f.write_str("])")?;
            }
            ExprKind::Switch { .. } => {
                f.write_str("switch(")?;
                if let Some(case) = self.case() {
                    write!(f, "{}, ", case)?;
                }
                for (i, (cond, then)) in self.conditions().iter().zip(self.thens()).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} => {}", cond, then)?;
                }
                if let Some(default) = self.default() {
                    write!(f, ", default => {}", default)?;
                }
                f.write_str(")")?;
            }
            ExprKind::Cut(spec) => {
                write!(f, "cut({}, [", ops[0])?;
                for (i, edge) in spec.edges().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", edge)?;
                }
                f.write_str("])")?;
            }
            ExprKind::Cast => write!(f, "astype({}, {})", ops[0], self.data_type())?,
            ExprKind::Map(spec) => {
                write!(f, "{}(", spec.function().name())?;
                write_list(f, ops)?;
                f.write_str(")")?;
            }
            kind => {
                write!(f, "{}(", kind.name())?;
                write_list(f, ops)?;
                f.write_str(")")?;
            }
        }
        if let Some(alias) = self.alias() {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: ElementType) -> Expr {
        Expr::column(name, SourceId::new(), data_type)
    }

    #[test]
    fn test_leaves() {
        let lit = Expr::literal(42);
        assert!(lit.is_leaf());
        assert!(lit.is_scalar());
        assert_eq!(lit.data_type(), ElementType::Int64);
        assert_eq!(lit.literal_value(), Some(&Value::Int64(42)));
        assert_eq!(lit.name(), None);

        let col = column("age", ElementType::Int32);
        assert!(col.is_leaf());
        assert!(col.is_sequence());
        assert_eq!(col.name(), Some("age"));
        assert!(col.kind().is_leaf());
    }

    #[test]
    fn test_structural_equality() {
        let a = Expr::literal("x");
        let b = Expr::literal("x");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, Expr::literal("y"));
        assert_ne!(Expr::literal(1), Expr::literal(1.0));
    }

    #[test]
    fn test_rename_keeps_type_and_shape() {
        let col = column("fid", ElementType::Float64);
        let renamed = col.rename("score");

        assert_eq!(renamed.alias(), Some("score"));
        assert_eq!(renamed.name(), Some("score"));
        assert_eq!(renamed.data_type(), col.data_type());
        assert_eq!(renamed.shape(), col.shape());
        assert_ne!(renamed, col);
        assert_eq!(col.alias(), None);
    }

    #[test]
    fn test_walk_and_sources() {
        let source = SourceId::new();
        let a = Expr::column("a", source, ElementType::Int64);
        let b = Expr::column("b", source, ElementType::Int64);
        let sum = Expr::new(
            ExprKind::Binary(BinaryOperator::Add),
            ElementType::Int64,
            Shape::Sequence,
            vec![a.clone(), b.clone()],
        );
        let twice = Expr::new(
            ExprKind::Binary(BinaryOperator::Add),
            ElementType::Int64,
            Shape::Sequence,
            vec![sum.clone(), a.clone()],
        );

        let mut visited = 0;
        twice.walk(&mut |_| visited += 1);
        assert_eq!(visited, 5);

        assert_eq!(twice.column_refs(), vec![a, b]);
        assert_eq!(twice.sources().into_iter().collect::<Vec<_>>(), vec![source]);
    }

    #[test]
    fn test_display() {
        let source = SourceId::new();
        let id = Expr::column("id", source, ElementType::Int64);
        let cmp = Expr::new(
            ExprKind::Binary(BinaryOperator::Eq),
            ElementType::Boolean,
            Shape::Sequence,
            vec![id.clone(), Expr::literal(3)],
        );
        assert_eq!(cmp.to_string(), "(id == 3)");

        let null = Expr::new(
            ExprKind::Unary(UnaryOperator::IsNull),
            ElementType::Boolean,
            Shape::Sequence,
            vec![id],
        );
        assert_eq!(null.rename("missing").to_string(), "isnull(id) AS missing");
    }
}
