//! TableValueConstructor executor: evaluates an in-line `VALUES (...)`
//! row list, coerces each column to the harmonized type
//! across all rows, and hands the result to the common OFFSET/FETCH/
//! ORDER BY/WITH TIES finishing path (`exec::finish`).

use crate::error::{ErrorKind, QueryError, Result};
use crate::external::Expression;
use crate::value::{higher_type, Row, Value, ValueType};

/// Coerce `value` to `target`. Only the widenings `higher_type` can ever
/// produce are supported (Int -> Float); anything else passes through
/// unchanged, since further coercion (e.g. into a DECIMAL/TIMESTAMP) is
/// the external value system's job.
fn coerce(value: Value, target: ValueType) -> Value {
    match (value, target) {
        (Value::Int(n), ValueType::Float) => Value::Float(n as f64),
        (v, _) => v,
    }
}

/// Evaluate every row of `rows` (each a same-arity list of expressions),
/// then coerce every column to the pairwise higher-type across all rows.
pub fn evaluate_value_rows(rows: &[Vec<Box<dyn Expression>>]) -> Result<Vec<Row>> {
    let Some(arity) = rows.first().map(Vec::len) else {
        return Ok(Vec::new());
    };
    if rows.iter().any(|row| row.len() != arity) {
        return Err(QueryError::from(ErrorKind::ColumnCountDoesNotMatch));
    }

    let empty_row: Row = Vec::new();
    let mut evaluated: Vec<Row> = Vec::with_capacity(rows.len());
    for row in rows {
        let values: Result<Row> = row.iter().map(|expr| expr.evaluate(&empty_row)).collect();
        evaluated.push(values?);
    }

    let mut column_types = vec![ValueType::Null; arity];
    for row in &evaluated {
        for (i, value) in row.iter().enumerate() {
            column_types[i] = higher_type(column_types[i], value.value_type());
        }
    }

    for row in &mut evaluated {
        for (i, value) in row.iter_mut().enumerate() {
            let taken = std::mem::replace(value, Value::Null);
            *value = coerce(taken, column_types[i]);
        }
    }

    Ok(evaluated)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lit(Value);
    impl Expression for Lit {
        fn is_constant(&self) -> bool {
            true
        }
        fn evaluate(&self, _row: &Row) -> Result<Value> {
            Ok(self.0.clone())
        }
        fn sql(&self) -> String {
            format!("{:?}", self.0)
        }
    }

    #[test]
    fn int_and_float_columns_widen_to_float() {
        let rows: Vec<Vec<Box<dyn Expression>>> = vec![
            vec![Box::new(Lit(Value::Int(1)))],
            vec![Box::new(Lit(Value::Float(2.5)))],
        ];
        let result = evaluate_value_rows(&rows).unwrap();
        assert_eq!(result, vec![vec![Value::Float(1.0)], vec![Value::Float(2.5)]]);
    }

    #[test]
    fn mismatched_arity_is_an_error() {
        let rows: Vec<Vec<Box<dyn Expression>>> = vec![
            vec![Box::new(Lit(Value::Int(1)))],
            vec![Box::new(Lit(Value::Int(1))), Box::new(Lit(Value::Int(2)))],
        ];
        assert!(evaluate_value_rows(&rows).is_err());
    }
}
