//! The object-layout and emission back end.
//!
//! Five phases run in sequence against a [`Program`]: classification,
//! shared-array construction, sorting and indexing, initializer patching,
//! and finally byte-image writing. Each phase is its own module; this crate
//! root only wires them together and exposes the shared error and context
//! types.

pub mod classify;
pub mod context;
pub mod error;
pub mod patch;
pub mod shared_array;
pub mod sort;
pub mod writer;

pub use context::{BackendContext, SharedArray, MAX_LIB_FUNCS, MAX_MAP_LOCATIONS};
pub use error::CodegenError;

use vbc_ir::Program;

/// Runs all five phases and returns the finished object image.
///
/// `write_asserts` controls whether the runtime-assert chunk and its
/// supporting strings are produced at all; turning it off lets a caller
/// drop all `assert` statements from the emitted object without touching
/// the source.
pub fn run_backend(program: &mut Program, write_asserts: bool) -> Result<Vec<u8>, CodegenError> {
    let _span = tracing::debug_span!("codegen").entered();
    let mut ctx = BackendContext::new();

    classify::run(program, &mut ctx)?;
    shared_array::run(program, &mut ctx);
    sort::run(program, &mut ctx);
    patch::run(program, &ctx, write_asserts);
    let image = writer::build(program, &ctx, write_asserts);

    tracing::debug!(bytes = image.len(), "object image built");
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbc_ir::{Descriptor, Dialect, ObjectFormat, Storage, Variable};

    #[test]
    fn an_empty_program_still_produces_a_valid_header() {
        let mut program = Program::new("main", ObjectFormat::Compact, Dialect::Legacy);
        let image = run_backend(&mut program, false).expect("empty program compiles");
        assert_eq!(&image[0..4], b"ACSE");
    }

    #[test]
    fn a_single_map_variable_round_trips_through_every_phase() {
        let mut program = Program::new("main", ObjectFormat::Compact, Dialect::Legacy);
        let mut var = Variable::new("score", Storage::Map, Descriptor::Primitive);
        var.values.push(vbc_ir::InitValue::Expr(7));
        let id = program.push_variable(var);
        program.main_library_mut().vars.push(id);

        let image = run_backend(&mut program, false).expect("single variable compiles");
        assert!(!image.is_empty());
        assert_eq!(program.variables[id].index, Some(0));
    }
}
