//! User functions mapped over the fields of a collection.

use crate::collection::Collection;
use crate::expression::{Expr, ExprKind, ExpressionResult, Shape, TypeChecker};
use crate::types::{ElementType, Schema, Value};
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Named field values handed to a user function
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Option<Value>)>,
}

impl Row {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Value>)>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Value of a field, `None` when absent or null
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.fields.get(index).and_then(|(_, v)| v.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

type RowFn = dyn Fn(&Row) -> Option<Value> + Send + Sync;

/// Reference to a user function; two references are equal when they share
/// both name and closure
#[derive(Clone)]
pub struct MapFunction {
    name: String,
    func: Arc<RowFn>,
}

impl MapFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Row) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, row: &Row) -> Option<Value> {
        (self.func)(row)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.func) as *const () as usize
    }
}

impl fmt::Debug for MapFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapFunction").field("name", &self.name).finish()
    }
}

impl PartialEq for MapFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.addr() == other.addr()
    }
}

impl Eq for MapFunction {}

impl Hash for MapFunction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.addr().hash(state);
    }
}

impl Serialize for MapFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// Orientation of an apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    /// The function sees one field value at a time
    #[default]
    Column,
    /// The function sees all selected fields of a row at once
    Row,
}

/// Payload of a map node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MapSpec {
    function: MapFunction,
    axis: Axis,
    output_index: Option<usize>,
}

impl MapSpec {
    pub fn function(&self) -> &MapFunction {
        &self.function
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Position in the function's output when a row expands to several fields
    pub fn output_index(&self) -> Option<usize> {
        self.output_index
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    axis: Axis,
    reduce: bool,
    names: Vec<String>,
    types: Vec<ElementType>,
}

impl ApplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// With a row axis, produce a single value per row
    pub fn reduce(mut self, reduce: bool) -> Self {
        self.reduce = reduce;
        self
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = ElementType>,
    {
        self.types = types.into_iter().collect();
        self
    }
}

/// Result of an apply: one mapped sequence, or a collection of mapped fields
#[derive(Debug, Clone)]
pub enum Applied {
    Sequence(Expr),
    Collection(Collection),
}

impl Applied {
    pub fn into_sequence(self) -> ExpressionResult<Expr> {
        match self {
            Applied::Sequence(expr) => Ok(expr),
            Applied::Collection(_) => TypeChecker::new("apply")
                .invalid_argument("apply produced a collection; set reduce for a single value"),
        }
    }

    pub fn into_collection(self) -> ExpressionResult<Collection> {
        match self {
            Applied::Collection(collection) => Ok(collection),
            Applied::Sequence(_) => {
                TypeChecker::new("apply").invalid_argument("apply produced a single sequence")
            }
        }
    }
}

impl Collection {
    /// Map `function` over the fields of this collection.
    ///
    /// - Row axis with `reduce`: one value per row, typed by the single
    ///   declared type or `String`.
    /// - Row axis without `reduce`: the row expands to one field per declared
    ///   `(name, type)`.
    /// - Column axis: each field is mapped on its own, keeping its type unless
    ///   one is declared.
    pub fn apply(&self, function: MapFunction, options: ApplyOptions) -> ExpressionResult<Applied> {
        let checker = TypeChecker::new("apply");
        let fields = self.fields();
        checker.expect_count(!fields.is_empty(), "at least one field", 0)?;
        for field in fields {
            self.check_owned(field)?;
        }

        let ApplyOptions {
            axis,
            reduce,
            names,
            types,
        } = options;
        log::debug!(
            "apply {} over {} fields of {} ({:?}, reduce={})",
            function.name(),
            fields.len(),
            self.name(),
            axis,
            reduce
        );

        let shape = Shape::combine(fields.iter().map(Expr::shape));
        let map = |output_index: Option<usize>| {
            ExprKind::Map(MapSpec {
                function: function.clone(),
                axis,
                output_index,
            })
        };

        match (axis, reduce) {
            (Axis::Row, true) => {
                checker.expect_count(types.len() <= 1, "at most one output type", types.len())?;
                checker.expect_count(names.len() <= 1, "at most one output name", names.len())?;

                let data_type = types.first().copied().unwrap_or(ElementType::String);
                let expr = Expr::new(map(None), data_type, shape, fields.to_vec());
                Ok(Applied::Sequence(match names.into_iter().next() {
                    Some(name) => expr.rename(name),
                    None => expr,
                }))
            }

            (Axis::Row, false) => {
                checker.expect_count(
                    !names.is_empty() && names.len() == types.len(),
                    &format!("one output type per output name ({})", names.len()),
                    types.len(),
                )?;

                let schema = Schema::from_lists(names.clone(), types.clone())?;
                let mapped = names
                    .into_iter()
                    .zip(types)
                    .enumerate()
                    .map(|(i, (name, data_type))| {
                        Expr::new(map(Some(i)), data_type, shape, fields.to_vec()).rename(name)
                    })
                    .collect();
                Ok(Applied::Collection(self.derived(schema, mapped)))
            }

            (Axis::Column, true) => checker.invalid_argument(
                "reducing along the column axis aggregates a whole field, not a row",
            ),

            (Axis::Column, false) => {
                checker.expect_count(
                    types.len() <= 1 || types.len() == fields.len(),
                    &format!("0, 1 or {} output types", fields.len()),
                    types.len(),
                )?;
                checker.expect_count(
                    names.is_empty() || names.len() == fields.len(),
                    &format!("0 or {} output names", fields.len()),
                    names.len(),
                )?;

                let mut schema = Schema::new();
                let mut mapped = Vec::with_capacity(fields.len());
                for (i, field) in fields.iter().enumerate() {
                    let data_type = match types.len() {
                        0 => field.data_type(),
                        1 => types[0],
                        _ => types[i],
                    };
                    let name = match names.get(i) {
                        Some(name) => name.clone(),
                        None => match field.name() {
                            Some(name) => name.to_string(),
                            None => {
                                return checker
                                    .invalid_argument(format!("{} needs a name", field))
                            }
                        },
                    };
                    schema.push(name.clone(), data_type)?;
                    mapped.push(
                        Expr::new(map(None), data_type, field.shape(), vec![field.clone()])
                            .rename(name),
                    );
                }
                Ok(Applied::Collection(self.derived(schema, mapped)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ExpressionError;

    fn people() -> Collection {
        let schema = Schema::from_fields([
            ("name", ElementType::String),
            ("id", ElementType::Int64),
            ("fid", ElementType::Float64),
        ])
        .unwrap();
        Collection::source("people", schema)
    }

    fn name_and_id() -> MapFunction {
        MapFunction::new("name_and_id", |row: &Row| {
            let name = row.get("name")?.as_str()?;
            let id = row.get("id")?.as_i64()?;
            Some(Value::from(format!("{}{}", name, id)))
        })
    }

    #[test]
    fn test_row_reduce_produces_single_map_node() {
        let people = people();
        let view = people.select(["name", "id"]).unwrap();

        let expr = view
            .apply(
                name_and_id(),
                ApplyOptions::new().axis(Axis::Row).reduce(true),
            )
            .unwrap()
            .into_sequence()
            .unwrap();

        let spec = expr.map_spec().unwrap();
        assert_eq!(spec.function().name(), "name_and_id");
        assert_eq!(spec.axis(), Axis::Row);
        assert_eq!(spec.output_index(), None);
        assert_eq!(expr.data_type(), ElementType::String);
        assert!(expr.is_sequence());
        assert_eq!(expr.operands().len(), 2);
        assert_eq!(expr.operands()[0].name(), Some("name"));
        assert_eq!(expr.to_string(), "name_and_id(name, id)");
    }

    #[test]
    fn test_row_reduce_with_declared_type_and_name() {
        let people = people();
        let expr = people
            .select(["id", "fid"])
            .unwrap()
            .apply(
                MapFunction::new("ratio", |_| None),
                ApplyOptions::new()
                    .axis(Axis::Row)
                    .reduce(true)
                    .names(["ratio"])
                    .types([ElementType::Float64]),
            )
            .unwrap()
            .into_sequence()
            .unwrap();

        assert_eq!(expr.data_type(), ElementType::Float64);
        assert_eq!(expr.name(), Some("ratio"));
    }

    #[test]
    fn test_row_expansion_produces_collection() {
        let people = people();
        let expanded = people
            .select(["name", "id"])
            .unwrap()
            .apply(
                name_and_id(),
                ApplyOptions::new()
                    .axis(Axis::Row)
                    .names(["first", "second"])
                    .types([ElementType::String, ElementType::Int64]),
            )
            .unwrap()
            .into_collection()
            .unwrap();

        assert_eq!(
            expanded.schema().names().collect::<Vec<_>>(),
            vec!["first", "second"]
        );
        let second = expanded.col("second").unwrap();
        assert_eq!(second.data_type(), ElementType::Int64);
        assert_eq!(second.map_spec().unwrap().output_index(), Some(1));
    }

    #[test]
    fn test_row_expansion_needs_matching_names_and_types() {
        let people = people();

        let err = people
            .apply(
                name_and_id(),
                ApplyOptions::new()
                    .axis(Axis::Row)
                    .names(["a", "b"])
                    .types([ElementType::String]),
            )
            .unwrap_err();
        assert!(err.is_value_error());

        let err = people
            .apply(name_and_id(), ApplyOptions::new().axis(Axis::Row))
            .unwrap_err();
        assert!(err.is_value_error());
    }

    #[test]
    fn test_column_axis_maps_each_field() {
        let people = people();
        let mapped = people
            .select(["id", "fid"])
            .unwrap()
            .apply(MapFunction::new("double", |_| None), ApplyOptions::new())
            .unwrap()
            .into_collection()
            .unwrap();

        assert_eq!(mapped.fields().len(), 2);
        assert_eq!(mapped.col("id").unwrap().data_type(), ElementType::Int64);
        assert_eq!(mapped.col("fid").unwrap().data_type(), ElementType::Float64);
        assert_eq!(mapped.col("fid").unwrap().operands().len(), 1);

        let err = people
            .apply(
                MapFunction::new("count", |_| None),
                ApplyOptions::new().reduce(true),
            )
            .unwrap_err();
        assert!(matches!(err, ExpressionError::InvalidArgument { .. }));
    }

    #[test]
    fn test_into_wrong_variant() {
        let people = people();
        let applied = people
            .apply(MapFunction::new("f", |_| None), ApplyOptions::new())
            .unwrap();
        assert!(applied.into_sequence().unwrap_err().is_value_error());
    }

    #[test]
    fn test_function_identity() {
        let f = name_and_id();
        let g = name_and_id();
        assert_eq!(f, f.clone());
        assert_ne!(f, g);

        let row = Row::new([
            ("name", Some(Value::from("ann"))),
            ("id", Some(Value::from(7))),
        ]);
        assert_eq!(f.call(&row), Some(Value::from("ann7")));

        let row = Row::new([("name", Some(Value::from("ann"))), ("id", None)]);
        assert_eq!(f.call(&row), None);
        assert_eq!(row.names().collect::<Vec<_>>(), vec!["name", "id"]);
        assert_eq!(row.get_index(0), Some(&Value::from("ann")));
    }
}
