//! Element-wise operators: null handling, membership, ranges and branching.

use crate::expression::builder::IntoExpr;
use crate::expression::expr::ExprKind;
use crate::expression::operator::UnaryOperator;
use crate::expression::type_checker::TypeChecker;
use crate::expression::{Expr, ExpressionResult, Shape};
use crate::types::ElementType;

impl Expr {
    /// Boolean test for missing values, shaped like the receiver
    pub fn is_null(&self) -> Expr {
        self.null_test(UnaryOperator::IsNull)
    }

    /// Boolean test for present values, shaped like the receiver
    pub fn not_null(&self) -> Expr {
        self.null_test(UnaryOperator::NotNull)
    }

    fn null_test(&self, op: UnaryOperator) -> Expr {
        Expr::new(
            ExprKind::Unary(op),
            ElementType::Boolean,
            self.shape(),
            vec![self.clone()],
        )
    }

    /// Replace missing values with `value`.
    ///
    /// Literal and expression fill values must both promote to the receiver's
    /// type; a literal may also narrow into it when the value fits exactly,
    /// and is stored converted. The fill value must be a scalar.
    pub fn fillna(&self, value: impl IntoExpr) -> ExpressionResult<Expr> {
        let checker = TypeChecker::new("fillna");
        let value = value.into_expr();
        checker.expect_scalar(&value, "fill value")?;

        let fill = match value.literal_value() {
            Some(literal) => Expr::literal(checker.coerce_literal(literal, self.data_type())?),
            None => {
                let common = checker.common_type([self.data_type(), value.data_type()])?;
                checker.expect_type(self.data_type(), common, "fill value")?;
                value
            }
        };

        Ok(Expr::new(
            ExprKind::FillNa,
            self.data_type(),
            self.shape(),
            vec![self.clone(), fill],
        ))
    }

    /// Membership test against an ordered list of scalar candidates
    pub fn isin<I, T>(&self, values: I) -> ExpressionResult<Expr>
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        self.membership(values, false)
    }

    /// Negated membership test
    pub fn notin<I, T>(&self, values: I) -> ExpressionResult<Expr>
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        self.membership(values, true)
    }

    fn membership<I, T>(&self, values: I, negated: bool) -> ExpressionResult<Expr>
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        let checker = TypeChecker::new(if negated { "notin" } else { "isin" });
        let candidates: Vec<Expr> = values.into_iter().map(IntoExpr::into_expr).collect();
        checker.expect_count(!candidates.is_empty(), "at least one candidate", 0)?;

        for candidate in &candidates {
            checker.expect_scalar(candidate, "candidate")?;
            checker.check_compatible(self.data_type(), candidate.data_type())?;
        }

        let mut operands = Vec::with_capacity(candidates.len() + 1);
        operands.push(self.clone());
        operands.extend(candidates);

        Ok(Expr::new(
            ExprKind::IsIn { negated },
            ElementType::Boolean,
            self.shape(),
            operands,
        ))
    }

    /// Inclusive range test
    pub fn between(&self, lower: impl IntoExpr, upper: impl IntoExpr) -> ExpressionResult<Expr> {
        self.between_with(lower, upper, true)
    }

    pub fn between_with(
        &self,
        lower: impl IntoExpr,
        upper: impl IntoExpr,
        inclusive: bool,
    ) -> ExpressionResult<Expr> {
        let checker = TypeChecker::new("between");
        let (lower, upper) = (lower.into_expr(), upper.into_expr());
        checker.common_type([self.data_type(), lower.data_type(), upper.data_type()])?;

        let shape = Shape::combine([self.shape(), lower.shape(), upper.shape()]);
        Ok(Expr::new(
            ExprKind::Between { inclusive },
            ElementType::Boolean,
            shape,
            vec![self.clone(), lower, upper],
        ))
    }

    /// Choose between two values; the receiver is the boolean condition
    pub fn ifelse(&self, if_true: impl IntoExpr, if_false: impl IntoExpr) -> ExpressionResult<Expr> {
        let checker = TypeChecker::new("ifelse");
        checker.expect_boolean(self, "condition")?;

        let (if_true, if_false) = (if_true.into_expr(), if_false.into_expr());
        let data_type = checker.common_type([if_true.data_type(), if_false.data_type()])?;
        let shape = Shape::combine([self.shape(), if_true.shape(), if_false.shape()]);

        Ok(Expr::new(
            ExprKind::IfElse,
            data_type,
            shape,
            vec![self.clone(), if_true, if_false],
        ))
    }

    /// Dispatch on the receiver's value: each case is compared for equality
    /// against the receiver and the first match selects its result.
    pub fn switch(&self, cases: Cases) -> ExpressionResult<Expr> {
        build_switch(Some(self), cases)
    }
}

/// Canonical `(condition, result)` list for a switch, plus optional default
#[derive(Debug, Clone, Default)]
pub struct Cases {
    pairs: Vec<(Expr, Expr)>,
    default: Option<Expr>,
}

impl Cases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an interleaved `condition, result, condition, result, ..` list
    pub fn flat<I, T>(items: I) -> ExpressionResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        let items: Vec<Expr> = items.into_iter().map(IntoExpr::into_expr).collect();
        TypeChecker::new("switch").expect_count(
            items.len() % 2 == 0,
            "condition and result pairs",
            items.len(),
        )?;

        let mut cases = Cases::new();
        let mut iter = items.into_iter();
        while let (Some(when), Some(then)) = (iter.next(), iter.next()) {
            cases.pairs.push((when, then));
        }
        Ok(cases)
    }

    /// Build from explicit `(condition, result)` pairs
    pub fn pairs<I, W, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (W, T)>,
        W: IntoExpr,
        T: IntoExpr,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(w, t)| (w.into_expr(), t.into_expr()))
                .collect(),
            default: None,
        }
    }

    pub fn case(mut self, when: impl IntoExpr, then: impl IntoExpr) -> Self {
        self.pairs.push((when.into_expr(), then.into_expr()));
        self
    }

    /// Result used when no case matches
    pub fn otherwise(mut self, value: impl IntoExpr) -> Self {
        self.default = Some(value.into_expr());
        self
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Every condition, result and default, in order
    pub(crate) fn exprs(&self) -> impl Iterator<Item = &Expr> {
        self.pairs
            .iter()
            .flat_map(|(when, then)| [when, then])
            .chain(self.default.as_ref())
    }
}

/// Build a switch node.
///
/// With a `case` value, conditions are match values compared against it.
/// Without one, every condition must itself be a boolean expression; anything
/// else leaves the dispatch mode ambiguous.
pub(crate) fn build_switch(case: Option<&Expr>, cases: Cases) -> ExpressionResult<Expr> {
    let checker = TypeChecker::new("switch");
    checker.expect_count(!cases.is_empty(), "at least one case", 0)?;

    for (when, _) in &cases.pairs {
        match case {
            Some(case) => checker.check_compatible(case.data_type(), when.data_type())?,
            None if when.data_type() != ElementType::Boolean => {
                return checker.ambiguous(format!(
                    "condition {} is not boolean and there is no value to compare it with",
                    when
                ));
            }
            None => {}
        }
    }

    let Cases { pairs, default } = cases;
    let (conditions, thens): (Vec<Expr>, Vec<Expr>) = pairs.into_iter().unzip();

    let data_type = checker.common_type(
        thens
            .iter()
            .chain(default.as_ref())
            .map(|e| e.data_type()),
    )?;

    let mut operands = Vec::with_capacity(conditions.len() * 2 + 2);
    operands.extend(case.cloned());
    operands.extend(conditions);
    operands.extend(thens);
    let has_default = default.is_some();
    operands.extend(default);

    let shape = Shape::combine(operands.iter().map(|e| e.shape()));
    Ok(Expr::new(
        ExprKind::Switch {
            has_case: case.is_some(),
            has_default,
        },
        data_type,
        shape,
        operands,
    ))
}
