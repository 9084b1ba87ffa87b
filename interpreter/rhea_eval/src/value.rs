//! Tagged dynamic values.
//!
//! # Heap sharing
//!
//! Immutable payloads (strings, compiled regexes) sit behind [`Heap`], an
//! `Arc` wrapper whose constructor is private so every heap allocation goes
//! through a `Value` factory method. Arrays are the exception: `a[i] = v`
//! mutates the shared sequence in place, so [`ArrayRef`] adds a `RwLock`
//! around the element vector.
//!
//! # Thread safety
//!
//! Values cross thread boundaries inside parallel tasks, so every payload
//! is `Send + Sync`: `Arc` for sharing, `parking_lot::RwLock` for the one
//! mutable container.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use rhea_ir::FunctionDecl;
use rustc_hash::FxHashMap;

use crate::native::NativeFunction;
use crate::symbol_table::SymbolTable;

/// Factory-enforced shared immutable payload.
#[derive(Debug)]
pub struct Heap<T>(Arc<T>);

impl<T> Heap<T> {
    fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

/// A compiled regex plus the original pattern text.
#[derive(Debug)]
pub struct RegexValue {
    pattern: String,
    compiled: regex::Regex,
}

impl RegexValue {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn regex(&self) -> &regex::Regex {
        &self.compiled
    }
}

/// Shared mutable array payload.
#[derive(Clone, Debug)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ArrayRef {
    fn new(elements: Vec<Value>) -> Self {
        ArrayRef(Arc::new(RwLock::new(elements)))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Replace the element at `index`; `false` when out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut elements = self.0.write();
        match elements.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// A point-in-time copy of the elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A user function: the declaration node plus its captured scope.
///
/// The scope is captured by reference at declaration time, so mutations of
/// the enclosing scope after the `func` node evaluated are visible to
/// later calls.
#[derive(Clone, Debug)]
pub struct FunctionValue {
    pub declaration: Arc<FunctionDecl>,
    pub scope: SymbolTable,
}

/// Runtime value in the Rhea interpreter.
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    Bool(bool),
    /// The sole numeric type: a 64-bit float.
    Number(f64),
    Str(Heap<String>),
    Regex(Heap<RegexValue>),
    Array(ArrayRef),
    Function(FunctionValue),
    Native(NativeFunction),
}

// Compiled patterns are cached process-wide so a regex literal compiles on
// its first evaluation only.
static REGEX_CACHE: OnceLock<Mutex<FxHashMap<String, Heap<RegexValue>>>> = OnceLock::new();

impl Value {
    pub fn string(text: impl Into<String>) -> Value {
        Value::Str(Heap::new(text.into()))
    }

    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(ArrayRef::new(elements))
    }

    /// Compile (or fetch the cached compilation of) a regex pattern.
    pub fn regex_from_pattern(pattern: &str) -> Result<Value, String> {
        let cache = REGEX_CACHE.get_or_init(|| Mutex::new(FxHashMap::default()));
        let mut cache = cache.lock();

        if let Some(existing) = cache.get(pattern) {
            return Ok(Value::Regex(existing.clone()));
        }

        let compiled = regex::Regex::new(pattern)
            .map_err(|err| format!("Invalid regular expression `{pattern}`: {err}"))?;
        let value = Heap::new(RegexValue {
            pattern: pattern.to_string(),
            compiled,
        });
        cache.insert(pattern.to_string(), value.clone());
        Ok(Value::Regex(value))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// The numeric payload, when this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The variant name reported by `type x`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Regex(_) => "regex",
            Value::Array(_) => "array",
            Value::Function(_) | Value::Native(_) => "function",
        }
    }

    /// Truthiness used by conditionals and the logical operators.
    ///
    /// Numbers are truthy only when negative; zero and positive are falsy.
    /// The rule reads backwards but is preserved from the original
    /// implementation, which several scripts depend on.
    pub fn boolean_equivalent(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n < 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Function(_) | Value::Regex(_) | Value::Native(_) => true,
        }
    }

    /// Rendered form: six-decimal numbers, bracketed arrays, raw strings.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Number(n) => format!("{n:.6}"),
            Value::Str(s) => (**s).clone(),
            Value::Regex(r) => r.pattern().to_string(),
            Value::Array(a) => {
                let rendered: Vec<String> = a
                    .snapshot()
                    .iter()
                    .map(Value::to_display_string)
                    .collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Function(f) => {
                let image = &f.declaration.address;
                format!(
                    "<func [{}, {}]: {}>",
                    image.line(),
                    image.column(),
                    image.file()
                )
            }
            Value::Native(func) => format!("<native func at {:p}>", *func as *const ()),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality; numbers compare within epsilon.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => (a - b).abs() < f64::EPSILON,
            (Value::Str(a), Value::Str(b)) => **a == **b,
            (Value::Regex(a), Value::Regex(b)) => a.pattern() == b.pattern(),
            (Value::Function(a), Value::Function(b)) => {
                a.declaration.address == b.declaration.address
            }
            (Value::Native(a), Value::Native(b)) => std::ptr::fn_addr_eq(*a, *b),
            (Value::Array(a), Value::Array(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let left = a.snapshot();
                let right = b.snapshot();
                left.len() == right.len()
                    && left.iter().zip(right.iter()).all(|(l, r)| l == r)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_render_with_six_decimals() {
        assert_eq!(Value::Number(7.0).to_display_string(), "7.000000");
        assert_eq!(Value::Number(2.5).to_display_string(), "2.500000");
    }

    #[test]
    fn arrays_render_bracketed() {
        let array = Value::array(vec![Value::Number(11.0), Value::Number(12.0)]);
        assert_eq!(array.to_display_string(), "[11.000000, 12.000000]");
    }

    #[test]
    fn truthiness_follows_the_preserved_quirk() {
        assert!(!Value::Number(0.0).boolean_equivalent());
        assert!(!Value::Number(1.0).boolean_equivalent());
        assert!(Value::Number(-1.0).boolean_equivalent());

        assert!(!Value::Nil.boolean_equivalent());
        assert!(Value::string("x").boolean_equivalent());
        assert!(!Value::string("").boolean_equivalent());
        assert!(Value::array(vec![Value::Nil]).boolean_equivalent());
        assert!(!Value::array(vec![]).boolean_equivalent());
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_ne!(Value::Number(1.0), Value::Number(1.5));
        assert_ne!(Value::Number(1.0), Value::string("1"));

        let a = Value::array(vec![Value::Number(1.0), Value::string("two")]);
        let b = Value::array(vec![Value::Number(1.0), Value::string("two")]);
        assert_eq!(a, b);

        let c = Value::array(vec![Value::Number(1.0)]);
        assert_ne!(a, c);
    }

    #[test]
    #[allow(clippy::unwrap_used, reason = "test patterns are valid")]
    fn regex_values_compare_by_pattern() {
        let a = Value::regex_from_pattern("^a+$").unwrap();
        let b = Value::regex_from_pattern("^a+$").unwrap();
        let c = Value::regex_from_pattern("^b+$").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn invalid_regex_reports() {
        assert!(Value::regex_from_pattern("(unclosed").is_err());
    }

    #[test]
    fn array_mutation_is_shared() {
        let array = Value::array(vec![Value::Number(1.0)]);
        let alias = array.clone();
        if let (Value::Array(a), Value::Array(b)) = (&array, &alias) {
            assert!(a.set(0, Value::Number(9.0)));
            assert_eq!(b.get(0), Some(Value::Number(9.0)));
            assert!(!a.set(5, Value::Nil));
        } else {
            unreachable!();
        }
    }
}
