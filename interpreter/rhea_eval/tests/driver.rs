//! File-list driver behaviour: exit codes, continue-after-failure, and
//! diagnostic banners.

#![allow(clippy::unwrap_used, reason = "tests run known-good scripts")]

use std::path::PathBuf;

use rhea_eval::{install_render_target, interpret_files, BufferTarget, SymbolTable};
use serial_test::serial;

fn write_script(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn drive(files: &[PathBuf]) -> (i32, String, String) {
    let buffer = BufferTarget::new();
    let previous = install_render_target(buffer.clone());

    let scope = SymbolTable::new();
    let code = interpret_files(&scope, files);

    let out = buffer.take_out();
    let err = buffer.take_err();
    install_render_target(previous);
    (code, out, err)
}

#[test]
#[serial]
fn successful_files_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_script(&dir, "a.rhea", "val driver_a = 1;\nrender driver_a;\n");
    let b = write_script(&dir, "b.rhea", "render driver_a + 1;\n");

    let (code, out, err) = drive(&[a, b]);
    assert_eq!(code, 0, "stderr: {err}");
    assert_eq!(out, "1.000000\n2.000000\n");
}

#[test]
#[serial]
fn later_files_still_run_after_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_script(&dir, "bad.rhea", "throw \"first file fails\";\n");
    let good = write_script(&dir, "good.rhea", "render \"second file runs\";\n");

    let (code, out, err) = drive(&[bad, good]);
    assert_eq!(code, 1);
    assert_eq!(out, "second file runs\n");
    assert!(err.contains("first file fails"), "stderr was {err:?}");
}

#[test]
#[serial]
fn missing_file_is_a_system_error() {
    let (code, _, err) = drive(&[PathBuf::from("/definitely/not/here.rhea")]);
    assert_eq!(code, 1);
    assert!(err.contains("System Error"), "stderr was {err:?}");
}

#[test]
#[serial]
fn lexical_and_parser_failures_report_banners() {
    let dir = tempfile::tempdir().unwrap();
    let unterminated = write_script(&dir, "lex.rhea", "val broken = \"no close\n");
    let misparsed = write_script(&dir, "parse.rhea", "val missing_init = ;\n");

    let (code, _, err) = drive(&[unterminated, misparsed]);
    assert_eq!(code, 1);
    assert!(err.contains("Lexical Error"), "stderr was {err:?}");
    assert!(err.contains("Parser Error"), "stderr was {err:?}");
}

#[test]
#[serial]
fn pending_tasks_are_joined_before_returning() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        &dir,
        "tasks.rhea",
        "val driver_flag = 0;\nparallel { driver_flag = 0 - 1; };\n",
    );

    // No explicit `wait`: the driver joins pending tasks at the end of
    // the run, so the write must have landed by the time we return.
    let scope = SymbolTable::new();
    let buffer = BufferTarget::new();
    let previous = install_render_target(buffer.clone());
    let code = interpret_files(&scope, &[script]);
    install_render_target(previous);

    assert_eq!(code, 0);
    let flag = scope
        .get(
            &rhea_ir::Token::new("driver_flag", "t", 1, 1, rhea_ir::TokenCategory::Identifier),
            "driver_flag",
        )
        .unwrap();
    assert_eq!(flag, rhea_eval::Value::Number(-1.0));
}
