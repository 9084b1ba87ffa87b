#![allow(clippy::unwrap_used, reason = "tests parse known-good input")]

use super::*;
use rhea_ir::Expr;
use rhea_lexer::Lexer;

fn parse(source: &str) -> Vec<Arc<Stmt>> {
    let tokens = Lexer::new(source, "test.rhea").scan().unwrap();
    Parser::new(tokens).parse().unwrap()
}

fn parse_err(source: &str) -> ParserError {
    let tokens = Lexer::new(source, "test.rhea").scan().unwrap();
    Parser::new(tokens).parse().unwrap_err()
}

fn only_expr(source: &str) -> Arc<Expr> {
    let statements = parse(source);
    assert_eq!(statements.len(), 1, "expected a single statement");
    match statements[0].as_ref() {
        Stmt::Expression { expression } => Arc::clone(expression),
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn precedence_term_vs_factor() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    let expr = only_expr("1 + 2 * 3;");
    match expr.as_ref() {
        Expr::Binary {
            operator, right, ..
        } => {
            assert_eq!(operator, "+");
            assert!(matches!(
                right.as_ref(),
                Expr::Binary { operator, .. } if operator == "*"
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn assignment_is_right_associative() {
    let expr = only_expr("a = b = 1;");
    match expr.as_ref() {
        Expr::Binary {
            operator, right, ..
        } => {
            assert_eq!(operator, "=");
            assert!(matches!(
                right.as_ref(),
                Expr::Binary { operator, .. } if operator == "="
            ));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn comparison_binds_looser_than_shift() {
    // a << 1 < b parses as (a << 1) < b
    let expr = only_expr("a << 1 < b;");
    assert!(matches!(
        expr.as_ref(),
        Expr::Binary { operator, .. } if operator == "<"
    ));
}

#[test]
fn dotted_operators_parse_at_term_and_factor_level() {
    let expr = only_expr("[1] .+ 10 .* 2;");
    match expr.as_ref() {
        Expr::Binary {
            operator, right, ..
        } => {
            assert_eq!(operator, ".+");
            assert!(matches!(
                right.as_ref(),
                Expr::Binary { operator, .. } if operator == ".*"
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn nil_coalescing_level() {
    let expr = only_expr("a ? b == c;");
    assert!(matches!(
        expr.as_ref(),
        Expr::Binary { operator, .. } if operator == "?"
    ));
}

#[test]
fn unary_chains() {
    let expr = only_expr("~~x;");
    match expr.as_ref() {
        Expr::Unary {
            operator,
            expression,
            ..
        } => {
            assert_eq!(operator, "~");
            assert!(matches!(
                expression.as_ref(),
                Expr::Unary { operator, .. } if operator == "~"
            ));
        }
        other => panic!("expected unary, got {other:?}"),
    }
}

#[test]
fn call_and_index_postfix_chain() {
    let expr = only_expr("make(3)(4)[0];");
    match expr.as_ref() {
        Expr::ArrayAccess { array, .. } => {
            assert!(matches!(array.as_ref(), Expr::FunctionCall { .. }));
        }
        other => panic!("expected array access, got {other:?}"),
    }
}

#[test]
fn function_decl_with_parameters() {
    let expr = only_expr("func(a, b) { ret a + b; };");
    match expr.as_ref() {
        Expr::FunctionDecl(decl) => {
            let names: Vec<&str> = decl.parameters.iter().map(rhea_ir::Token::image).collect();
            assert_eq!(names, vec!["a", "b"]);
        }
        other => panic!("expected function declaration, got {other:?}"),
    }
}

#[test]
fn val_multi_binding() {
    let expr = only_expr("val a = 1, b = 2;");
    match expr.as_ref() {
        Expr::VariableDecl { declarations, .. } => {
            assert_eq!(declarations.len(), 2);
            assert_eq!(declarations[0].0.image(), "a");
            assert_eq!(declarations[1].0.image(), "b");
        }
        other => panic!("expected variable declaration, got {other:?}"),
    }
}

#[test]
fn val_native_binding() {
    let expr = only_expr("val cos@\"math\" = math.cos, sin = math.sin;");
    match expr.as_ref() {
        Expr::NativeDecl {
            library,
            declarations,
            ..
        } => {
            assert_eq!(library, "math");
            assert_eq!(declarations[0].0.image(), "cos");
            assert_eq!(declarations[0].1, "math.cos");
            assert_eq!(declarations[1].1, "math.sin");
        }
        other => panic!("expected native declaration, got {other:?}"),
    }
}

#[test]
fn dotted_variable_access_merges() {
    let expr = only_expr("Color.GREEN;");
    match expr.as_ref() {
        Expr::VariableAccess { address } => assert_eq!(address.image(), "Color.GREEN"),
        other => panic!("expected variable access, got {other:?}"),
    }
}

#[test]
fn when_with_default() {
    let expr = only_expr("when (x) { 1 => \"one\", 2 => \"two\", else => \"many\" }");
    match expr.as_ref() {
        Expr::When {
            cases,
            default_case,
            ..
        } => {
            assert_eq!(cases.len(), 2);
            assert!(default_case.is_some());
        }
        other => panic!("expected when, got {other:?}"),
    }
}

#[test]
fn loop_with_header() {
    let expr = only_expr("loop (val i = 0; i < 10; i = i + 1) { render i; }");
    assert!(matches!(expr.as_ref(), Expr::Loop { .. }));
}

#[test]
fn catch_handle_with_final() {
    let expr = only_expr("catch { throw 1; } handle(e) { render e; } final { render 2; }");
    match expr.as_ref() {
        Expr::CatchHandle {
            handler,
            final_block,
            ..
        } => {
            assert_eq!(handler.image(), "e");
            assert!(final_block.is_some());
        }
        other => panic!("expected catch-handle, got {other:?}"),
    }
}

#[test]
fn statement_keywords_in_expression_position() {
    let expr = only_expr("val x = { ret 5; };");
    assert!(matches!(expr.as_ref(), Expr::VariableDecl { .. }));
}

#[test]
fn use_and_import_statements() {
    let statements = parse("use math from \"1.0.0\"; import \"helpers.rhea\";");
    assert!(matches!(statements[0].as_ref(), Stmt::Use { name, .. } if name.image() == "math"));
    assert!(matches!(statements[1].as_ref(), Stmt::Import { .. }));
}

#[test]
fn enum_statement_lowering_shape() {
    let statements = parse("enum Color { RED = 1, GREEN = 2, BLUE = 3 }");
    match statements[0].as_ref() {
        Stmt::Enum { name, items, .. } => {
            assert_eq!(name.image(), "Color");
            assert_eq!(items.len(), 3);
            assert_eq!(items[1].0.image(), "GREEN");
        }
        other => panic!("expected enum, got {other:?}"),
    }
}

#[test]
fn mod_statement_members() {
    let statements = parse("mod geo { pi = 3.14; tau = 6.28; }");
    match statements[0].as_ref() {
        Stmt::Mod { name, members, .. } => {
            assert_eq!(name.image(), "geo");
            assert_eq!(members.len(), 2);
        }
        other => panic!("expected mod, got {other:?}"),
    }
}

#[test]
fn test_statement_shape() {
    let statements = parse("test \"adds\" assert nil { 1 + 1; };");
    match statements[0].as_ref() {
        Stmt::Test { .. } => {}
        other => panic!("expected test, got {other:?}"),
    }
}

#[test]
fn delete_statement_names() {
    let statements = parse("delete a, b;");
    match statements[0].as_ref() {
        Stmt::Delete { names, .. } => assert_eq!(names.len(), 2),
        other => panic!("expected delete, got {other:?}"),
    }
}

#[test]
fn missing_semicolon_after_break_is_an_error() {
    let err = parse_err("while (true) { break }");
    assert!(err.token.is_some());
}

#[test]
fn error_carries_offending_token() {
    let err = parse_err("if true) 1;");
    assert_eq!(err.token.map(|t| t.image().to_string()), Some("true".to_string()));
}

#[test]
fn end_of_stream_error() {
    let err = parse_err("1 +");
    assert!(err.message.contains("end of token stream"));
}
