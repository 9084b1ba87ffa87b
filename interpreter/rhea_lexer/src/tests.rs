#![allow(clippy::unwrap_used, reason = "tests lex known-good input")]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rhea_ir::TokenCategory;

fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source, "test.rhea").scan().unwrap()
}

fn images(source: &str) -> Vec<String> {
    lex(source).iter().map(|t| t.image().to_string()).collect()
}

#[test]
fn keywords_are_retagged() {
    let tokens = lex("val x while whale");
    assert_eq!(tokens[0].category(), TokenCategory::Keyword);
    assert_eq!(tokens[1].category(), TokenCategory::Identifier);
    assert_eq!(tokens[2].category(), TokenCategory::Keyword);
    assert_eq!(tokens[3].category(), TokenCategory::Identifier);
}

#[test]
fn operators_match_longest() {
    assert_eq!(images("a<<b"), vec!["a", "<<", "b"]);
    assert_eq!(images("a<=b"), vec!["a", "<=", "b"]);
    assert_eq!(images("a::b"), vec!["a", "::", "b"]);
    assert_eq!(images("a!:b"), vec!["a", "!:", "b"]);
    assert_eq!(images("x=>y"), vec!["x", "=>", "y"]);
    assert_eq!(images("a==b=c"), vec!["a", "==", "b", "=", "c"]);
}

#[test]
fn dotted_vector_operators() {
    assert_eq!(images("a .+ b"), vec!["a", ".+", "b"]);
    assert_eq!(images("a .% b"), vec!["a", ".%", "b"]);
    // Requires two-character lookahead: `.<` alone is not an operator.
    assert_eq!(images("a .<< b"), vec!["a", ".<<", "b"]);
    assert_eq!(images("a .>> b"), vec!["a", ".>>", "b"]);
}

#[test]
fn plain_dot_still_lexes() {
    assert_eq!(images("Color.RED"), vec!["Color", ".", "RED"]);
}

#[test]
fn tilde_is_a_single_character_operator() {
    let tokens = lex("~~x");
    assert_eq!(
        tokens.iter().map(|t| t.image()).collect::<Vec<_>>(),
        vec!["~", "~", "x"]
    );
    assert_eq!(tokens[0].category(), TokenCategory::Operator);
}

#[test]
fn comments_run_to_end_of_line() {
    assert_eq!(images("a # the rest is gone\nb"), vec!["a", "b"]);
}

#[test]
fn string_literal_with_escapes() {
    let tokens = lex("\"one\\ntwo\\ttab\"");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].category(), TokenCategory::String);
    assert_eq!(tokens[0].image(), "one\ntwo\ttab");
}

#[test]
fn regex_literal_preserves_classes() {
    let tokens = lex("`^\\d+$`");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].category(), TokenCategory::Regex);
    assert_eq!(tokens[0].image(), "^\\d+$");
}

#[test]
fn unterminated_string_fails() {
    let err = Lexer::new("\"open", "test.rhea").scan();
    assert!(err.is_err());
}

#[test]
fn newline_inside_string_fails() {
    let err = Lexer::new("\"one\ntwo\"", "test.rhea").scan();
    assert!(err.is_err());
}

#[test]
fn escape_at_end_of_file_fails() {
    let err = Lexer::new("\"oops\\", "test.rhea").scan();
    assert!(err.is_err());
}

#[test]
fn numeric_literals() {
    assert_eq!(images("0b101 0t12 0c17 0xfe 12 3.5 2e+3"), vec![
        "0b101", "0t12", "0c17", "0xfe", "12", "3.5", "2e+3"
    ]);
    for token in lex("0b101 0t12 0c17 0xfe 12 3.5 2e+3") {
        assert_eq!(token.category(), TokenCategory::Digit);
    }
}

#[test]
fn fraction_requires_digits() {
    assert!(Lexer::new("1.", "test.rhea").scan().is_err());
}

#[test]
fn exponent_requires_sign() {
    assert!(Lexer::new("1e5", "test.rhea").scan().is_err());
}

#[test]
fn positions_track_lines_and_columns() {
    let tokens = lex("val x = 1;\nval y = 2;");
    assert_eq!(tokens[0].line(), 1);
    assert_eq!(tokens[5].image(), "val");
    assert_eq!(tokens[5].line(), 2);
    assert_eq!(tokens[5].column(), 1);
}

#[test]
fn identifier_validity_helper() {
    assert!(is_valid_identifier("counter"));
    assert!(is_valid_identifier("snake_free"));
    assert!(!is_valid_identifier("val"));
    assert!(!is_valid_identifier("two words"));
    assert!(!is_valid_identifier("a+b"));
    assert!(!is_valid_identifier("9lives"));
}

#[test]
fn token_stream_covers_program() {
    let source = r#"
        val add = func(a, b) { ret a + b; };
        render add(1, 2);
    "#;
    let tokens = lex(source);
    assert_eq!(tokens.first().map(rhea_ir::Token::image), Some("val"));
    assert_eq!(tokens.last().map(rhea_ir::Token::image), Some(";"));
}

proptest! {
    // Base-correctness: a binary literal built from its digits equals the
    // positional expansion of those digits.
    #[test]
    fn binary_literals_are_base_correct(digits in proptest::collection::vec(0u8..2, 1..24)) {
        let image: String = std::iter::once("0b".to_string())
            .chain(digits.iter().map(ToString::to_string))
            .collect();
        let expected = digits
            .iter()
            .fold(0.0_f64, |acc, &d| acc * 2.0 + f64::from(d));
        prop_assert_eq!(translate_digit(&image).ok(), Some(expected));
    }

    #[test]
    fn decimal_integers_round_trip(n in 0u64..1_000_000_000) {
        let image = n.to_string();
        prop_assert_eq!(translate_digit(&image).ok(), Some(n as f64));
    }
}
