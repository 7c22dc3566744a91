//! A stand-in for the out-of-scope parser: builds a [`Program`] good enough
//! to exercise [`crate::compile`] end to end without a real front end.
//!
//! Recognizes one declaration shape per non-blank source line -
//! `int NAME;` or `int NAME = VALUE;` - and nothing else. This exists only
//! to give the CLI something to compile; it is not a parser.

use std::path::Path;

use vbc_ir::{Descriptor, Dialect, InitValue, ObjectFormat, Program, Storage, Variable};

pub fn build_demo_program(source: &Path, format: ObjectFormat, dialect: Dialect) -> Program {
    let library_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("main")
        .to_string();
    let mut program = Program::new(library_name, format, dialect);

    let text = std::fs::read_to_string(source).unwrap_or_default();
    for line in text.lines() {
        if let Some(var) = parse_declaration(line) {
            let id = program.push_variable(var);
            program.main_library_mut().vars.push(id);
        }
    }

    program
}

fn parse_declaration(line: &str) -> Option<Variable> {
    let line = line.trim().trim_end_matches(';');
    let rest = line.strip_prefix("int ")?.trim();

    let (name, value) = match rest.split_once('=') {
        Some((name, value)) => (name.trim(), value.trim().parse::<i32>().ok()),
        None => (rest, None),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let mut var = Variable::new(name, Storage::Map, Descriptor::Primitive);
    if let Some(value) = value {
        var.values.push(InitValue::Expr(value));
    }
    Some(var)
}
