//! Rewrites every variable's initializer chain to use final addresses,
//! offsets, and string runtime indices, now that classification, shared-array
//! layout, and indexing have all run.

use vbc_error_macros::internal_error;
use vbc_ir::{InitValue, Program, VariableId};

use crate::context::BackendContext;

const ASSERT_MESSAGE_PREFIX: &str = "assertion failure";

pub fn run(program: &mut Program, ctx: &BackendContext, write_asserts: bool) {
    let _span = tracing::debug_span!("patch").entered();
    patch_initz_list(program, &ctx.vars.clone());
    patch_initz_list(program, &ctx.shary.vars.clone());
    if write_asserts && !program.asserts.is_empty() {
        create_assert_strings(program);
    }
}

fn patch_initz_list(program: &mut Program, vars: &[VariableId]) {
    for &id in vars {
        let count = program.variables[id].values.len();
        for value_index in 0..count {
            patch_value(program, id, value_index);
        }
    }
}

fn patch_value(program: &mut Program, var_id: VariableId, value_index: usize) {
    let value = program.variables[var_id].values[value_index].clone();
    match value {
        InitValue::ArrayRef {
            var,
            expr_offset,
            diminfo_offset,
            structure_member,
        } => {
            let target_index = program.variables[var]
                .index
                .unwrap_or_else(|| internal_error!("array-ref target has no assigned index"));
            let diminfo_start = match structure_member {
                Some(member) => program.structure_members[member].diminfo_start,
                None => program.variables[var].diminfo_start,
            }
            .unwrap_or_else(|| internal_error!("array-ref target has no diminfo_start"));

            program.variables[var_id].values[value_index] = InitValue::ArrayRef {
                var,
                expr_offset: target_index as i32 + expr_offset,
                diminfo_offset: diminfo_start as i32 + diminfo_offset,
                structure_member,
            };
        }
        InitValue::StructRef { var, expr_offset } => {
            let target_index = program.variables[var]
                .index
                .unwrap_or_else(|| internal_error!("struct-ref target has no assigned index"));
            program.variables[var_id].values[value_index] = InitValue::StructRef {
                var,
                expr_offset: target_index as i32 + expr_offset,
            };
        }
        InitValue::Str(s) => {
            program.strings.append_string(s);
        }
        InitValue::FuncRef(_) | InitValue::StringInitz(_) | InitValue::Expr(_) => {}
    }
}

fn create_assert_strings(program: &mut Program) {
    for i in 0..program.asserts.len() {
        let source_file = program.asserts[i].source_file.clone();
        let id = program.strings.intern(&source_file);
        program.strings.mark_used(id);
        program.asserts[i].file_path = Some(id);
    }
    let prefix = program.strings.intern(ASSERT_MESSAGE_PREFIX);
    program.strings.mark_used(prefix);
    program.assert_prefix = Some(prefix);
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbc_ir::{CompareKind, Descriptor, Dialect, ObjectFormat, RuntimeAssert, Storage, Variable};

    fn new_program() -> Program {
        Program::new("main", ObjectFormat::Compact, Dialect::Legacy)
    }

    #[test]
    fn struct_ref_is_patched_to_an_absolute_offset() {
        let mut program = new_program();
        let mut target = Variable::new("t", Storage::Map, Descriptor::StructVar);
        target.index = Some(10);
        let target_id = program.push_variable(target);

        let mut source = Variable::new("s", Storage::Map, Descriptor::Primitive);
        source.values.push(InitValue::StructRef {
            var: target_id,
            expr_offset: 3,
        });
        let source_id = program.push_variable(source);

        let ctx = BackendContext {
            vars: vec![source_id],
            ..BackendContext::new()
        };
        run(&mut program, &ctx, false);

        assert_eq!(
            program.variables[source_id].values[0],
            InitValue::StructRef {
                var: target_id,
                expr_offset: 13,
            }
        );
    }

    #[test]
    fn array_ref_patches_offset_and_diminfo_from_the_variable() {
        let mut program = new_program();
        let mut target = Variable::new("t", Storage::Map, Descriptor::Array);
        target.index = Some(20);
        target.diminfo_start = Some(5);
        let target_id = program.push_variable(target);

        let mut source = Variable::new("s", Storage::Map, Descriptor::Primitive);
        source.values.push(InitValue::ArrayRef {
            var: target_id,
            expr_offset: 2,
            diminfo_offset: 0,
            structure_member: None,
        });
        let source_id = program.push_variable(source);

        let ctx = BackendContext {
            vars: vec![source_id],
            ..BackendContext::new()
        };
        run(&mut program, &ctx, false);

        assert_eq!(
            program.variables[source_id].values[0],
            InitValue::ArrayRef {
                var: target_id,
                expr_offset: 22,
                diminfo_offset: 5,
                structure_member: None,
            }
        );
    }

    #[test]
    fn string_values_get_a_runtime_index_once() {
        let mut program = new_program();
        let s = program.strings.intern("hello");
        let mut source = Variable::new("s", Storage::Map, Descriptor::Primitive);
        source.values.push(InitValue::Str(s));
        let source_id = program.push_variable(source);

        let ctx = BackendContext {
            vars: vec![source_id],
            ..BackendContext::new()
        };
        run(&mut program, &ctx, false);

        assert!(program.strings.get(s).index_runtime() >= 0);
    }

    #[test]
    fn assert_strings_are_interned_and_marked_used_when_enabled() {
        let mut program = new_program();
        program.asserts.push(RuntimeAssert::new(
            10,
            "map01.acs",
            "x > 0",
            1,
            CompareKind::Gt,
            0,
        ));

        let ctx = BackendContext::new();
        run(&mut program, &ctx, true);

        let file_id = program.asserts[0].file_path.expect("file path interned");
        assert_eq!(program.strings.get(file_id).value(), "map01.acs");
        assert!(program.strings.get(file_id).used());

        let prefix_id = program.assert_prefix.expect("prefix interned");
        assert_eq!(program.strings.get(prefix_id).value(), ASSERT_MESSAGE_PREFIX);
    }

    #[test]
    fn assert_strings_are_skipped_when_write_asserts_is_off() {
        let mut program = new_program();
        program.asserts.push(RuntimeAssert::new(
            10,
            "map01.acs",
            "x > 0",
            1,
            CompareKind::Gt,
            0,
        ));

        let ctx = BackendContext::new();
        run(&mut program, &ctx, false);

        assert!(program.asserts[0].file_path.is_none());
        assert!(program.assert_prefix.is_none());
    }
}
