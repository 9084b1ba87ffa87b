//! Binary and unary operator evaluation.
//!
//! Direct enum-based dispatch: the operand pair picks a per-type helper,
//! mirroring the original's dispatch order — numbers, arrays, strings,
//! booleans, regexes. Bitwise and shift operators coerce through signed
//! 64-bit integers; `\` is reverse division; dotted operators broadcast a
//! scalar across an array.

use rayon::prelude::*;
use rhea_ir::Token;

use crate::signal::{EvalResult, Unwind};
use crate::value::{ArrayRef, Value};

/// Evaluate `left op right` at `address`.
///
/// Assignment never reaches here; the evaluator handles `=` by matching
/// on the left-hand node shape.
pub fn evaluate_binary(address: &Token, operator: &str, left: Value, right: Value) -> EvalResult {
    // Nil coalescing: keep the left side unless it is nil.
    if operator == "?" {
        return Ok(if left.is_nil() { right } else { left });
    }

    // The logical operators work on truthiness for every variant. Both
    // operands are already evaluated; there is no short-circuit.
    if operator == "&&" {
        return Ok(Value::Bool(
            left.boolean_equivalent() && right.boolean_equivalent(),
        ));
    }
    if operator == "||" {
        return Ok(Value::Bool(
            left.boolean_equivalent() || right.boolean_equivalent(),
        ));
    }

    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => number_binary(address, operator, *a, *b),
        (Value::Array(a), Value::Array(b)) => array_binary(address, operator, a, b),
        (Value::Number(n), Value::Array(array)) if operator.starts_with('.') => {
            broadcast(address, operator, array, *n, BroadcastSide::ScalarLeft)
        }
        (Value::Array(array), Value::Number(n)) if operator.starts_with('.') => {
            broadcast(address, operator, array, *n, BroadcastSide::ScalarRight)
        }
        (Value::Str(_), _) | (_, Value::Str(_)) if operator != "::" && operator != "!:" => {
            string_binary(address, operator, &left, &right)
        }
        (Value::Bool(_), _) | (_, Value::Bool(_)) => bool_binary(address, operator, &left, &right),
        (Value::Regex(_), _) | (_, Value::Regex(_)) => {
            regex_binary(address, operator, &left, &right)
        }
        _ => Err(Unwind::throw_message(
            address,
            "Unsupported operation for these types.",
        )),
    }
}

/// Evaluate a prefix operator.
pub fn evaluate_unary(address: &Token, operator: &str, value: &Value) -> EvalResult {
    if operator == "!" {
        return Ok(Value::Bool(!value.boolean_equivalent()));
    }

    match value {
        Value::Array(array) if operator == "~" => {
            let mut elements = array.snapshot();
            elements.reverse();
            Ok(Value::array(elements))
        }
        Value::Number(n) => match operator {
            "+" => Ok(Value::Number(*n)),
            "-" => Ok(Value::Number(-n)),
            "~" => Ok(Value::Number(!(*n as i64) as f64)),
            _ => Err(Unwind::throw_message(
                address,
                "Invalid unary expression operation.",
            )),
        },
        Value::Str(s) => match operator {
            "*" => Ok(Value::Number(s.chars().count() as f64)),
            "~" => Ok(Value::string(s.chars().rev().collect::<String>())),
            _ => Err(Unwind::throw_message(
                address,
                "Invalid unary expression operation.",
            )),
        },
        _ => Err(Unwind::throw_message(
            address,
            "Invalid unary expression operation.",
        )),
    }
}

fn number_binary(address: &Token, operator: &str, a: f64, b: f64) -> EvalResult {
    let value = match operator {
        "+" => Value::Number(a + b),
        "-" => Value::Number(a - b),
        "*" => Value::Number(a * b),
        "/" => Value::Number(a / b),
        "\\" => Value::Number(b / a),
        "%" => Value::Number(int_op(a, b, |x, y| if y == 0 { 0 } else { x.wrapping_rem(y) })),
        "&" => Value::Number(int_op(a, b, |x, y| x & y)),
        "|" => Value::Number(int_op(a, b, |x, y| x | y)),
        "^" => Value::Number(int_op(a, b, |x, y| x ^ y)),
        "<<" => Value::Number(int_op(a, b, |x, y| x.wrapping_shl(y as u32))),
        ">>" => Value::Number(int_op(a, b, |x, y| x.wrapping_shr(y as u32))),
        "<" => Value::Bool(a < b),
        ">" => Value::Bool(a > b),
        "<=" => Value::Bool(a <= b),
        ">=" => Value::Bool(a >= b),
        "==" => Value::Bool((a - b).abs() < f64::EPSILON),
        "!=" => Value::Bool((a - b).abs() >= f64::EPSILON),
        _ => {
            return Err(Unwind::throw_message(
                address,
                format!("Unknown operator: {operator}"),
            ))
        }
    };
    Ok(value)
}

#[inline]
fn int_op(a: f64, b: f64, op: impl Fn(i64, i64) -> i64) -> f64 {
    op(a as i64, b as i64) as f64
}

fn string_binary(address: &Token, operator: &str, left: &Value, right: &Value) -> EvalResult {
    match operator {
        "+" => Ok(Value::string(format!(
            "{}{}",
            left.to_display_string(),
            right.to_display_string()
        ))),
        "-" => {
            // Right side is a pattern; every match is stripped from the left.
            let text = left.to_display_string();
            let pattern = right.to_display_string();
            let regex = regex::Regex::new(&pattern).map_err(|err| {
                Unwind::throw_message(
                    address,
                    format!("Invalid regular expression `{pattern}`: {err}"),
                )
            })?;
            Ok(Value::string(regex.replace_all(&text, "").into_owned()))
        }
        "*" => {
            let (count, text) = match (left, right) {
                (Value::Number(n), Value::Str(s)) => (*n, (**s).clone()),
                (Value::Str(s), Value::Number(n)) => (*n, (**s).clone()),
                _ => {
                    return Err(Unwind::throw_message(
                        address,
                        "String repetition needs a string and a number.",
                    ))
                }
            };
            if count <= 0.0 {
                return Ok(Value::string(String::new()));
            }
            Ok(Value::string(text.repeat(count as usize)))
        }
        "==" => Ok(Value::Bool(left == right)),
        "!=" => Ok(Value::Bool(left != right)),
        _ => Err(Unwind::throw_message(
            address,
            format!("Unknown operator for string: {operator}"),
        )),
    }
}

fn bool_binary(address: &Token, operator: &str, left: &Value, right: &Value) -> EvalResult {
    match operator {
        "==" => Ok(Value::Bool(left == right)),
        "!=" => Ok(Value::Bool(left != right)),
        _ => Err(Unwind::throw_message(
            address,
            format!("Unsupported operation for boolean: {operator}"),
        )),
    }
}

fn regex_binary(address: &Token, operator: &str, left: &Value, right: &Value) -> EvalResult {
    match operator {
        "::" | "!:" => {
            let matched = match (left, right) {
                (Value::Regex(pattern), Value::Str(text)) => pattern.regex().is_match(text),
                (Value::Str(text), Value::Regex(pattern)) => pattern.regex().is_match(text),
                _ => {
                    return Err(Unwind::throw_message(
                        address,
                        "Unsupported operation for regular expression matching.",
                    ))
                }
            };
            Ok(Value::Bool(if operator == "::" { matched } else { !matched }))
        }
        "==" => Ok(Value::Bool(left == right)),
        "!=" => Ok(Value::Bool(left != right)),
        _ => Err(Unwind::throw_message(
            address,
            "Unsupported operation for regular expression matching.",
        )),
    }
}

/// Component-wise arithmetic over two numeric arrays of equal length.
fn array_binary(address: &Token, operator: &str, a: &ArrayRef, b: &ArrayRef) -> EvalResult {
    if operator == "==" || operator == "!=" {
        let equal = Value::Array(a.clone()) == Value::Array(b.clone());
        return Ok(Value::Bool(if operator == "==" { equal } else { !equal }));
    }

    let left = numeric_elements(address, a)?;
    let right = numeric_elements(address, b)?;

    if left.len() != right.len() {
        return Err(Unwind::throw_message(
            address,
            "Array operands must have the same length.",
        ));
    }

    let apply = scalar_op(address, operator)?;
    let elements: Vec<Value> = left
        .par_iter()
        .zip(right.par_iter())
        .map(|(x, y)| Value::Number(apply(*x, *y)))
        .collect();
    Ok(Value::array(elements))
}

enum BroadcastSide {
    /// `n .op [a, b]` — the scalar is the left operand of each pair.
    ScalarLeft,
    /// `[a, b] .op n` — the scalar is the right operand of each pair.
    ScalarRight,
}

/// Broadcast a scalar across a numeric array with a dotted operator.
fn broadcast(
    address: &Token,
    operator: &str,
    array: &ArrayRef,
    scalar: f64,
    side: BroadcastSide,
) -> EvalResult {
    let base = operator.trim_start_matches('.');
    let elements = numeric_elements(address, array)?;
    let apply = scalar_op(address, base)?;

    let elements: Vec<Value> = match side {
        BroadcastSide::ScalarLeft => elements
            .par_iter()
            .map(|x| Value::Number(apply(scalar, *x)))
            .collect(),
        BroadcastSide::ScalarRight => elements
            .par_iter()
            .map(|x| Value::Number(apply(*x, scalar)))
            .collect(),
    };
    Ok(Value::array(elements))
}

fn numeric_elements(address: &Token, array: &ArrayRef) -> Result<Vec<f64>, Unwind> {
    array
        .snapshot()
        .iter()
        .map(|value| {
            value.as_number().ok_or_else(|| {
                Unwind::throw_message(
                    address,
                    "Unsupported binary operation for array that contains non-numbers.",
                )
            })
        })
        .collect()
}

type ScalarOp = fn(f64, f64) -> f64;

fn scalar_op(address: &Token, operator: &str) -> Result<ScalarOp, Unwind> {
    let op: ScalarOp = match operator {
        "+" => |x, y| x + y,
        "-" => |x, y| x - y,
        "*" => |x, y| x * y,
        "/" => |x, y| x / y,
        "\\" => |x, y| y / x,
        "%" => |x, y| int_op(x, y, |a, b| if b == 0 { 0 } else { a.wrapping_rem(b) }),
        "&" => |x, y| int_op(x, y, |a, b| a & b),
        "|" => |x, y| int_op(x, y, |a, b| a | b),
        "^" => |x, y| int_op(x, y, |a, b| a ^ b),
        "<<" => |x, y| int_op(x, y, |a, b| a.wrapping_shl(b as u32)),
        ">>" => |x, y| int_op(x, y, |a, b| a.wrapping_shr(b as u32)),
        _ => {
            return Err(Unwind::throw_message(
                address,
                "Unsupported operation for array objects.",
            ))
        }
    };
    Ok(op)
}
