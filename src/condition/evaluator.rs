// SPDX-License-Identifier: MIT

//! Condition expression evaluator
//!
//! A pure walk over the tree: all state lives on the call stack, so one
//! expression can be evaluated from many threads at once. The left spine of an
//! `and`/`or` chain is walked in a loop, so chain length does not grow the stack.

use super::ast::{ArrayLiteral, Expression, FieldRef, LogicOp, MemberOp, NumOp, StrOp};
use super::error::EvalError;
use super::value::{Record, Value};

/// Evaluate a condition expression against a record
pub fn evaluate(expr: &Expression, record: &Record) -> Result<bool, EvalError> {
    match expr {
        Expression::Grouping(inner) => evaluate(inner, record),
        Expression::NumericComparison { key, op, literal } => {
            evaluate_numeric(key, *op, *literal, record)
        }
        Expression::StringComparison { key, op, literal } => {
            evaluate_string(key, *op, literal, record)
        }
        Expression::ArrayMembership { key, op, literal } => {
            evaluate_membership(key, *op, literal, record)
        }
        Expression::Logical { .. } => evaluate_chain(expr, record),
    }
}

/// Evaluate a left-deep `and`/`or` chain without recursing down its spine.
///
/// Every operand runs in source order; the leftmost error wins.
fn evaluate_chain(expr: &Expression, record: &Record) -> Result<bool, EvalError> {
    let mut links = Vec::new();
    let mut head = expr;
    while let Expression::Logical { op, left, right } = head {
        links.push((*op, right.as_ref()));
        head = left;
    }

    let first = evaluate(head, record);
    let rest: Vec<_> = links
        .iter()
        .rev()
        .map(|(op, right)| (*op, evaluate(right, record)))
        .collect();

    let mut acc = first?;
    for (op, result) in rest {
        let value = result?;
        acc = match op {
            LogicOp::And => acc && value,
            LogicOp::Or => acc || value,
        };
    }
    Ok(acc)
}

/// Look up a field, failing if the record doesn't have it
pub fn lookup<'r>(key: &FieldRef, record: &'r Record) -> Result<&'r Value, EvalError> {
    record
        .get(&key.name)
        .ok_or_else(|| EvalError::field_not_found(&key.name, key.column))
}

fn evaluate_numeric(
    key: &FieldRef,
    op: NumOp,
    literal: f64,
    record: &Record,
) -> Result<bool, EvalError> {
    let value = lookup(key, record)?;
    let value: f64 = value
        .to_string()
        .parse()
        .map_err(|e| EvalError::literal_parse(&key.name, Some(key.column), e))?;

    Ok(match op {
        NumOp::Gt => value > literal,
        NumOp::Lt => value < literal,
        NumOp::Eq => value == literal,
        NumOp::NotEq => value != literal,
        NumOp::Gte => value >= literal,
        NumOp::Lte => value <= literal,
    })
}

fn evaluate_string(
    key: &FieldRef,
    op: StrOp,
    literal: &str,
    record: &Record,
) -> Result<bool, EvalError> {
    let value = lookup(key, record)?.to_string();

    Ok(match op {
        StrOp::Contains => value.contains(literal),
        StrOp::NotContains => !value.contains(literal),
        StrOp::Eq => value == literal,
        StrOp::NotEq => value != literal,
    })
}

fn evaluate_membership(
    key: &FieldRef,
    op: MemberOp,
    literal: &ArrayLiteral,
    record: &Record,
) -> Result<bool, EvalError> {
    // A missing field is "not a member of anything" rather than an error,
    // unlike the other comparisons. Both `in` and `not in` yield false.
    let Some(value) = record.get(&key.name) else {
        return Ok(false);
    };

    let items = literal
        .parse()
        .map_err(|e| EvalError::literal_parse(&key.name, Some(key.column), e))?;

    let value = value.to_string();
    let found = items.iter().any(|item| item.to_string() == value);

    Ok(match op {
        MemberOp::In => found,
        MemberOp::NotIn => !found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::error::ErrorKind;
    use crate::condition::parser::parse;
    use serde_json::json;

    fn record_with(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn eval(src: &str, record: &Record) -> Result<bool, EvalError> {
        evaluate(&parse(src).unwrap(), record)
    }

    #[test]
    fn test_number_comparison() {
        let record = record_with(json!({"score": 7.5}));

        assert!(eval("score > 5", &record).unwrap());
        assert!(!eval("score > 10", &record).unwrap());

        assert!(eval("score >= 7.5", &record).unwrap());
        assert!(!eval("score >= 8", &record).unwrap());

        assert!(eval("score < 10", &record).unwrap());
        assert!(!eval("score < 5", &record).unwrap());

        assert!(eval("score <= 7.5", &record).unwrap());
        assert!(!eval("score <= 7", &record).unwrap());

        assert!(eval("score == 7.5", &record).unwrap());
        assert!(eval("score != 7", &record).unwrap());
    }

    #[test]
    fn test_numeric_coercion_from_strings() {
        let record = record_with(json!({"price": "12.5", "label": "abc"}));
        assert!(eval("price > 10", &record).unwrap());

        let err = eval("label > 10", &record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralParseError);
        assert_eq!(err.field(), Some("label"));
        assert_eq!(err.column(), Some(0));
    }

    #[test]
    fn test_numeric_on_bool_is_parse_error() {
        let record = record_with(json!({"beta": true}));
        let err = eval("beta == 1", &record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralParseError);
    }

    #[test]
    fn test_float_equality_is_exact() {
        let record = record_with(json!({"x": 0.30000000000000004}));
        assert!(!eval("x == 0.3", &record).unwrap());
        assert!(eval("x != 0.3", &record).unwrap());
    }

    #[test]
    fn test_string_equality() {
        let record = record_with(json!({"intent": "search"}));
        assert!(eval(r#"intent == "search""#, &record).unwrap());
        assert!(!eval(r#"intent == "code""#, &record).unwrap());
        assert!(eval(r#"intent != "code""#, &record).unwrap());
        assert!(!eval(r#"intent != "search""#, &record).unwrap());
    }

    #[test]
    fn test_string_contains_is_not_regex() {
        let record = record_with(json!({"message": "hello world", "path": "a.b"}));
        assert!(eval(r#"message =~ "world""#, &record).unwrap());
        assert!(!eval(r#"message =~ "foo""#, &record).unwrap());
        assert!(eval(r#"message !~ "foo""#, &record).unwrap());
        assert!(!eval(r#"path =~ "a.c""#, &record).unwrap());
        assert!(!eval(r#"message =~ "h.*d""#, &record).unwrap());
    }

    #[test]
    fn test_string_comparison_coerces_values() {
        let record = record_with(json!({"age": 30, "beta": false, "tags": ["a", 1]}));
        assert!(eval(r#"age == "30""#, &record).unwrap());
        assert!(eval(r#"beta == "false""#, &record).unwrap());
        assert!(eval(r#"tags == "[a 1]""#, &record).unwrap());
    }

    #[test]
    fn test_large_numbers_compare_as_positional_text() {
        let record = record_with(json!({"big": 1e21}));
        assert!(eval(r#"big == "1000000000000000000000""#, &record).unwrap());
        assert!(!eval(r#"big == "1e+21""#, &record).unwrap());
        assert!(eval("big == 1000000000000000000000", &record).unwrap());
    }

    #[test]
    fn test_missing_field_errors() {
        let record = Record::new();

        let err = eval(r#"  name == "bob""#, &record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldNotFound);
        assert_eq!(err.field(), Some("name"));
        assert_eq!(err.column(), Some(2));

        let err = eval("age > 1", &record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldNotFound);
    }

    #[test]
    fn test_membership() {
        let record = record_with(json!({"tag": "b", "level": 2, "flag": true}));
        assert!(eval(r#"tag in ["a", "b"]"#, &record).unwrap());
        assert!(!eval(r#"tag not in ["a", "b"]"#, &record).unwrap());
        assert!(eval(r#"tag notin ["x"]"#, &record).unwrap());
        assert!(eval("level in [1, 2, 3]", &record).unwrap());
        assert!(eval(r#"level in ["2"]"#, &record).unwrap());
        assert!(eval("flag IN [true]", &record).unwrap());
        assert!(!eval("tag in []", &record).unwrap());
    }

    #[test]
    fn test_membership_missing_field_is_false_not_error() {
        let record = Record::new();
        assert!(!eval(r#"tags in ["a", "b"]"#, &record).unwrap());
        assert!(!eval(r#"tags not in ["a", "b"]"#, &record).unwrap());
    }

    #[test]
    fn test_membership_missing_field_skips_literal_parse() {
        assert!(!eval("tags in [1,]", &Record::new()).unwrap());
    }

    #[test]
    fn test_malformed_array_literal() {
        let record = record_with(json!({"tags": "a"}));
        let err = eval("tags in [1,]", &record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralParseError);
        assert_eq!(err.field(), Some("tags"));

        let err = eval("tags in [null]", &record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralParseError);
    }

    #[test]
    fn test_and_or() {
        let record = record_with(json!({"intent": "code", "confidence": 0.9}));
        assert!(eval(r#"intent == "code" and confidence > 0.8"#, &record).unwrap());
        assert!(!eval(r#"intent == "code" and confidence > 0.95"#, &record).unwrap());
        assert!(eval(r#"intent == "bug" or confidence > 0.8"#, &record).unwrap());
        assert!(!eval(r#"intent == "bug" OR confidence > 0.95"#, &record).unwrap());
    }

    #[test]
    fn test_no_short_circuit() {
        let record = record_with(json!({"a": 5}));
        let err = eval("a > 1 or b > 1", &record).unwrap_err();
        assert_eq!(err.field(), Some("b"));

        let err = eval("a < 1 and b > 1", &record).unwrap_err();
        assert_eq!(err.field(), Some("b"));
    }

    #[test]
    fn test_left_error_wins() {
        let record = record_with(json!({"bad": "x"}));
        let err = eval("bad > 1 and missing > 1", &record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralParseError);
        assert_eq!(err.field(), Some("bad"));

        let err = eval("missing > 1 and bad > 1", &record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldNotFound);
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let term = |name: &str| Expression::NumericComparison {
            key: FieldRef::new(name, 0),
            op: NumOp::Gt,
            literal: 1.0,
        };
        let mut expr = term("a");
        for _ in 0..5_000 {
            expr = Expression::or(expr, term("a"));
        }

        assert!(!evaluate(&expr, &record_with(json!({"a": 0}))).unwrap());
        assert!(evaluate(&expr, &record_with(json!({"a": 2}))).unwrap());

        // Later operands still run, and the first failure in source order wins
        let expr = Expression::and(Expression::or(expr, term("b")), term("c"));
        let err = evaluate(&expr, &record_with(json!({"a": 2}))).unwrap_err();
        assert_eq!(err.field(), Some("b"));
    }

    #[test]
    fn test_mixed_chain_folds_left_to_right() {
        let record = record_with(json!({"a": 1, "b": 0, "c": 1, "d": 0}));
        // ((a or b) and c) or d
        assert!(eval("a > 0 or b > 0 and c > 0 or d > 0", &record).unwrap());
        // ((a and b) or c) and d
        assert!(!eval("a > 0 and b > 0 or c > 0 and d > 0", &record).unwrap());
    }

    #[test]
    fn test_grouping() {
        let record = record_with(json!({"a": 1, "b": 0, "c": 0}));
        // Left-associative: (a > 0 or b > 0) and c > 0
        assert!(!eval("a > 0 or b > 0 and c > 0", &record).unwrap());
        assert!(eval("a > 0 or (b > 0 and c > 0)", &record).unwrap());
    }

    #[test]
    fn test_lookup() {
        let record = record_with(json!({"age": 30}));
        assert_eq!(
            lookup(&FieldRef::new("age", 0), &record).unwrap(),
            &Value::Number(30.0)
        );
        assert!(lookup(&FieldRef::new("name", 3), &record).is_err());
    }
}
