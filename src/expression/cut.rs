//! Discretization of numeric values into labeled bins.

use crate::expression::expr::ExprKind;
use crate::expression::type_checker::TypeChecker;
use crate::expression::{Expr, ExpressionResult};
use crate::types::{ElementType, Value};
use serde::Serialize;

/// Payload of a cut node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CutSpec {
    edges: Vec<Value>,
    labels: Vec<String>,
    right: bool,
    include_lowest: bool,
    include_under: bool,
    include_over: bool,
}

impl CutSpec {
    /// Strictly increasing bin edges
    pub fn edges(&self) -> &[Value] {
        &self.edges
    }

    /// One label per bin, lowest bin first
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Whether bins are closed on the right
    pub fn right(&self) -> bool {
        self.right
    }

    pub fn include_lowest(&self) -> bool {
        self.include_lowest
    }

    /// Whether an open bin below the first edge exists
    pub fn include_under(&self) -> bool {
        self.include_under
    }

    /// Whether an open bin above the last edge exists
    pub fn include_over(&self) -> bool {
        self.include_over
    }

    pub fn bin_count(&self) -> usize {
        self.labels.len()
    }
}

/// Options for [`Expr::cut`]
#[derive(Debug, Clone)]
pub struct CutOptions {
    labels: Option<Vec<String>>,
    right: bool,
    include_lowest: bool,
    include_under: bool,
    include_over: bool,
}

impl Default for CutOptions {
    fn default() -> Self {
        Self {
            labels: None,
            right: true,
            include_lowest: false,
            include_under: false,
            include_over: false,
        }
    }
}

impl CutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn right(mut self, right: bool) -> Self {
        self.right = right;
        self
    }

    pub fn include_lowest(mut self, include_lowest: bool) -> Self {
        self.include_lowest = include_lowest;
        self
    }

    pub fn include_under(mut self, include_under: bool) -> Self {
        self.include_under = include_under;
        self
    }

    pub fn include_over(mut self, include_over: bool) -> Self {
        self.include_over = include_over;
        self
    }
}

impl Expr {
    /// Bin a numeric expression by `edges` into string labels.
    ///
    /// `n` edges form `n - 1` bins, plus one open bin for each of
    /// `include_under` and `include_over`. A single edge is accepted only
    /// with both open bins. Labels, when given, must match the bin count;
    /// otherwise interval labels are generated from the edges.
    pub fn cut<I, V>(&self, edges: I, options: CutOptions) -> ExpressionResult<Expr>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let checker = TypeChecker::new("cut");
        checker.expect_numeric(self.data_type())?;

        let CutOptions {
            labels,
            right,
            include_lowest,
            include_under,
            include_over,
        } = options;

        let edges: Vec<Value> = edges.into_iter().map(Into::into).collect();
        checker.expect_count(!edges.is_empty(), "at least 1 bin edge", 0)?;
        // A single edge only forms bins when both open bins are present
        checker.expect_count(
            edges.len() >= 2 || (include_under && include_over),
            "at least 2 bin edges, or 1 with both open bins",
            edges.len(),
        )?;

        let mut bounds = Vec::with_capacity(edges.len());
        for edge in &edges {
            checker.expect_numeric(edge.data_type())?;
            match edge.as_f64() {
                Some(v) if !v.is_nan() => bounds.push(v),
                _ => return checker.invalid_argument(format!("bin edge {} is not a number", edge)),
            }
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return checker.invalid_argument("bin edges must be strictly increasing");
        }

        let bins = edges.len() - 1 + include_under as usize + include_over as usize;
        let labels = match labels {
            Some(labels) => {
                checker.expect_count(labels.len() == bins, &format!("{} labels", bins), labels.len())?;
                labels
            }
            None => interval_labels(&edges, right, include_lowest, include_under, include_over),
        };

        let spec = CutSpec {
            edges,
            labels,
            right,
            include_lowest,
            include_under,
            include_over,
        };
        Ok(Expr::new(
            ExprKind::Cut(spec),
            ElementType::String,
            self.shape(),
            vec![self.clone()],
        ))
    }
}

fn interval_labels(
    edges: &[Value],
    right: bool,
    include_lowest: bool,
    include_under: bool,
    include_over: bool,
) -> Vec<String> {
    let last = edges.len().saturating_sub(2);
    let mut labels = Vec::with_capacity(edges.len() + 1);

    if include_under {
        labels.push(if right {
            format!("(-inf, {}]", edges[0])
        } else {
            format!("(-inf, {})", edges[0])
        });
    }
    for (i, pair) in edges.windows(2).enumerate() {
        let closed_left = !right || (include_lowest && i == 0);
        let closed_right = right || (include_lowest && i == last);
        labels.push(format!(
            "{}{}, {}{}",
            if closed_left { '[' } else { '(' },
            pair[0],
            pair[1],
            if closed_right { ']' } else { ')' },
        ));
    }
    if include_over {
        let last_edge = &edges[edges.len() - 1];
        labels.push(if right {
            format!("({}, inf)", last_edge)
        } else {
            format!("[{}, inf)", last_edge)
        });
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::SourceId;
    use crate::expression::ExpressionError;

    fn id() -> Expr {
        Expr::column("id", SourceId::new(), ElementType::Int64)
    }

    #[test]
    fn test_single_bin() {
        let id = id();
        let expr = id.cut([5, 10], CutOptions::new().labels(["mid"])).unwrap();

        assert!(matches!(expr.kind(), ExprKind::Cut(_)));
        assert_eq!(expr.data_type(), ElementType::String);
        assert!(expr.is_sequence());

        let spec = expr.cut_spec().unwrap();
        assert_eq!(spec.edges(), &[Value::Int64(5), Value::Int64(10)]);
        assert_eq!(spec.labels(), &["mid".to_string()]);
        assert_eq!(spec.bin_count(), 1);
    }

    #[test]
    fn test_reduced_receiver_yields_scalar() {
        let expr = id()
            .max()
            .unwrap()
            .cut([5, 10], CutOptions::new().labels(["mid"]))
            .unwrap();
        assert_eq!(expr.data_type(), ElementType::String);
        assert!(expr.is_scalar());
    }

    #[test]
    fn test_too_few_edges() {
        let id = id();

        for options in [
            CutOptions::new(),
            CutOptions::new().include_under(true),
            CutOptions::new().include_over(true),
        ] {
            let err = id.cut([5], options).unwrap_err();
            assert!(err.is_value_error());
            assert!(matches!(err, ExpressionError::ArgumentCount { actual: 1, .. }));
        }
    }

    #[test]
    fn test_single_edge_with_both_open_bins() {
        let id = id();

        let expr = id
            .cut(
                [5],
                CutOptions::new()
                    .labels(["low", "high"])
                    .include_under(true)
                    .include_over(true),
            )
            .unwrap();
        let spec = expr.cut_spec().unwrap();
        assert_eq!(spec.bin_count(), 2);
        assert_eq!(spec.edges(), &[Value::Int64(5)]);
        assert_eq!(expr.data_type(), ElementType::String);

        let expr = id
            .cut([5], CutOptions::new().include_under(true).include_over(true))
            .unwrap();
        assert_eq!(expr.cut_spec().unwrap().labels(), &["(-inf, 5]", "(5, inf)"]);

        let expr = id
            .cut(
                [5],
                CutOptions::new()
                    .right(false)
                    .include_under(true)
                    .include_over(true),
            )
            .unwrap();
        assert_eq!(expr.cut_spec().unwrap().labels(), &["(-inf, 5)", "[5, inf)"]);

        // Label count still has to match the two open bins
        let err = id
            .cut(
                [5],
                CutOptions::new()
                    .labels(["only"])
                    .include_under(true)
                    .include_over(true),
            )
            .unwrap_err();
        assert!(matches!(err, ExpressionError::ArgumentCount { actual: 1, .. }));

        let err = id
            .cut(Vec::<i64>::new(), CutOptions::new().include_under(true).include_over(true))
            .unwrap_err();
        assert!(matches!(err, ExpressionError::ArgumentCount { actual: 0, .. }));
    }

    #[test]
    fn test_label_count_accounts_for_open_bins() {
        let id = id();

        let err = id
            .cut([5, 10], CutOptions::new().labels(["mid"]).include_under(true))
            .unwrap_err();
        assert!(err.is_value_error());

        let err = id
            .cut([5, 10], CutOptions::new().labels(["mid"]).include_over(true))
            .unwrap_err();
        assert!(err.is_value_error());

        let expr = id
            .cut(
                [5, 10],
                CutOptions::new()
                    .labels(["low", "mid", "high"])
                    .include_under(true)
                    .include_over(true),
            )
            .unwrap();
        assert_eq!(expr.cut_spec().unwrap().bin_count(), 3);
    }

    #[test]
    fn test_generated_labels() {
        let id = id();

        let expr = id
            .cut(
                [0, 5, 10],
                CutOptions::new().include_under(true).include_over(true),
            )
            .unwrap();
        assert_eq!(
            expr.cut_spec().unwrap().labels(),
            &["(-inf, 0]", "(0, 5]", "(5, 10]", "(10, inf)"]
        );

        let expr = id
            .cut([0, 5, 10], CutOptions::new().right(false).include_lowest(true))
            .unwrap();
        assert_eq!(expr.cut_spec().unwrap().labels(), &["[0, 5)", "[5, 10]"]);

        let expr = id
            .cut([0, 5], CutOptions::new().include_lowest(true))
            .unwrap();
        assert_eq!(expr.cut_spec().unwrap().labels(), &["[0, 5]"]);
    }

    #[test]
    fn test_invalid_edges() {
        let id = id();

        let err = id.cut([10, 5], CutOptions::new()).unwrap_err();
        assert!(matches!(err, ExpressionError::InvalidArgument { .. }));

        let err = id.cut([5, 5], CutOptions::new()).unwrap_err();
        assert!(err.is_value_error());

        let err = id.cut([0.0, f64::NAN], CutOptions::new()).unwrap_err();
        assert!(err.is_value_error());

        let err = id.cut(["a", "b"], CutOptions::new()).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_non_numeric_receiver() {
        let name = Expr::column("name", SourceId::new(), ElementType::String);
        let err = name.cut([0, 1], CutOptions::new()).unwrap_err();
        assert!(matches!(err, ExpressionError::InvalidOperandType { .. }));
    }

    #[test]
    fn test_float_edges_on_integer_receiver() {
        let expr = id().cut([0.5, 1.5, 2.5], CutOptions::new()).unwrap();
        assert_eq!(
            expr.cut_spec().unwrap().labels(),
            &["(0.5, 1.5]", "(1.5, 2.5]"]
        );
        assert_eq!(expr.to_string(), "cut(id, [0.5, 1.5, 2.5])");
    }
}
