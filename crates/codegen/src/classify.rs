//! Partitions the main library's variables and functions into their
//! publication categories, deciding which live in direct VM-indexed slots
//! and which spill into the shared array.

use vbc_ir::{Descriptor, Function, FuncKind, ObjectFormat, Program};

use crate::context::{BackendContext, MAX_LIB_FUNCS, MAX_MAP_LOCATIONS};
use crate::error::CodegenError;

pub fn run(program: &mut Program, ctx: &mut BackendContext) -> Result<(), CodegenError> {
    let _span = tracing::debug_span!("classify").entered();
    clarify_vars(program, ctx)?;
    clarify_funcs(program, ctx)?;
    assign_func_indexes(program, ctx);
    tracing::debug!(
        vars = ctx.vars.len(),
        imported_vars = ctx.imported_vars.len(),
        shared = ctx.shary.vars.len(),
        funcs = ctx.funcs.len(),
        "classified"
    );
    Ok(())
}

fn clarify_vars(program: &mut Program, ctx: &mut BackendContext) -> Result<(), CodegenError> {
    let library_name = program.main_library().name.clone();
    let main_vars = program.main_library().vars.clone();
    let imports = program.main_library().imports.clone();
    let external_vars = program.main_library().external_vars.clone();

    let mut count: u32 = 0;

    // Non-hidden MAP variables of the main library get a direct slot.
    for &id in &main_vars {
        let var = &program.variables[id];
        if var.storage.is_map() && !var.hidden() {
            ctx.vars.push(id);
            count += 1;
        }
    }

    // Used MAP variables from dynamically imported libraries.
    for &lib_id in &imports {
        let lib_vars = program.libraries[lib_id].vars.clone();
        for &id in &lib_vars {
            let var = &program.variables[id];
            if var.storage.is_map() && var.used() {
                ctx.imported_vars.push(id);
                count += 1;
            }
        }
    }

    // Used, imported external declarations.
    for &id in &external_vars {
        let var = &program.variables[id];
        if var.imported() && var.used() {
            ctx.imported_vars.push(id);
            count += 1;
        }
    }

    // Reserve a speculative slot for the shared array; discarded below if
    // it turns out not to be needed.
    count += 1;

    // Hidden, address-taken arrays and struct-variables must live in the
    // shared array: their address can't move, so they can't be packed
    // arbitrarily among direct slots.
    for &id in &main_vars {
        let var = &program.variables[id];
        if var.storage.is_map()
            && matches!(var.descriptor, Descriptor::Array | Descriptor::StructVar)
            && var.hidden()
            && var.addr_taken()
        {
            ctx.shary.vars.push(id);
        }
    }

    // A scalar dim-counter slot is cheaper to do arithmetic against than a
    // shared-array element.
    if !ctx.shary.vars.is_empty() && count < MAX_MAP_LOCATIONS {
        ctx.shary.dim_counter_var = true;
        count += 1;
    }

    // Remaining hidden variables take a direct slot while one's free, and
    // spill into the shared array once slots run out.
    for &id in &main_vars {
        let var = &program.variables[id];
        if var.storage.is_map() && var.hidden() && !var.addr_taken() {
            if count < MAX_MAP_LOCATIONS {
                ctx.vars.push(id);
                count += 1;
            } else {
                ctx.shary.vars.push(id);
            }
        }
    }

    match ctx.shary.vars.len() {
        0 => count -= 1,
        1 => {
            let id = ctx.shary.vars[0];
            if program.variables[id].addr_taken() {
                ctx.shary.used = true;
            } else {
                let id = ctx.shary.vars.pop().expect("checked len == 1 above");
                ctx.vars.push(id);
            }
        }
        _ => ctx.shary.used = true,
    }

    if count > MAX_MAP_LOCATIONS {
        return Err(CodegenError::TooManyVariables {
            limit: MAX_MAP_LOCATIONS,
            library_name,
        });
    }

    Ok(())
}

fn clarify_funcs(program: &mut Program, ctx: &mut BackendContext) -> Result<(), CodegenError> {
    let library_name = program.main_library().name.clone();
    let format = program.main_library().format;
    let uses_nullable_refs = program.main_library().uses_nullable_refs;
    let imports = program.main_library().imports.clone();
    let external_funcs = program.main_library().external_funcs.clone();
    let main_funcs = program.main_library().funcs.clone();

    if uses_nullable_refs {
        let id = program.push_function(Function::new(format!("{library_name}."), FuncKind::User));
        ctx.null_handler = Some(id);
        ctx.funcs.push(id);
    }

    for &lib_id in &imports {
        let lib_funcs = program.libraries[lib_id].funcs.clone();
        for &id in &lib_funcs {
            if program.functions[id].usage > 0 {
                ctx.funcs.push(id);
            }
        }
    }

    for &id in &external_funcs {
        let func = &program.functions[id];
        if func.flags.imported && func.usage > 0 {
            ctx.funcs.push(id);
        }
    }

    // Non-hidden, then hidden, main-library functions.
    for &id in &main_funcs {
        if !program.functions[id].flags.hidden {
            ctx.funcs.push(id);
        }
    }
    for &id in &main_funcs {
        if program.functions[id].flags.hidden {
            ctx.funcs.push(id);
        }
    }

    // Compact format's call instruction uses a one-byte function-index
    // operand, addressing at most 256 distinct functions.
    if format == ObjectFormat::Compact && ctx.funcs.len() as u32 > MAX_LIB_FUNCS {
        return Err(CodegenError::TooManyFunctions {
            limit: MAX_LIB_FUNCS,
            library_name,
        });
    }

    Ok(())
}

fn assign_func_indexes(program: &mut Program, ctx: &BackendContext) {
    for (index, &id) in ctx.funcs.iter().enumerate() {
        program.functions[id].index = Some(index as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbc_ir::{Dialect, Storage, Variable, VariableFlags};

    fn map_var(program: &mut Program, hidden: bool) -> vbc_ir::VariableId {
        let mut var = Variable::new("v", Storage::Map, Descriptor::Primitive);
        if hidden {
            var.flags.insert(VariableFlags::HIDDEN);
        }
        let id = program.push_variable(var);
        program.main_library_mut().vars.push(id);
        id
    }

    #[test]
    fn visible_map_variables_get_a_direct_slot() {
        let mut program = Program::new("main", ObjectFormat::Compact, Dialect::Legacy);
        let mut ctx = BackendContext::new();
        let a = map_var(&mut program, false);
        let b = map_var(&mut program, false);

        run(&mut program, &mut ctx).unwrap();

        assert_eq!(ctx.vars, vec![a, b]);
        assert!(!ctx.shary.used);
    }

    #[test]
    fn exceeding_the_map_location_cap_is_an_error() {
        let mut program = Program::new("main", ObjectFormat::Compact, Dialect::Legacy);
        let mut ctx = BackendContext::new();
        for _ in 0..(MAX_MAP_LOCATIONS + 1) {
            map_var(&mut program, false);
        }

        let err = run(&mut program, &mut ctx).unwrap_err();
        assert!(matches!(err, CodegenError::TooManyVariables { .. }));
    }

    #[test]
    fn a_single_addr_taken_hidden_array_claims_the_shared_array() {
        let mut program = Program::new("main", ObjectFormat::Compact, Dialect::Legacy);
        let mut ctx = BackendContext::new();
        let mut var = Variable::new("a", Storage::Map, Descriptor::Array);
        var.flags.insert(VariableFlags::HIDDEN | VariableFlags::ADDR_TAKEN);
        let id = program.push_variable(var);
        program.main_library_mut().vars.push(id);

        run(&mut program, &mut ctx).unwrap();

        assert!(ctx.shary.used);
        assert_eq!(ctx.shary.vars, vec![id]);
    }

    #[test]
    fn a_hidden_var_that_overflows_into_a_lone_shared_slot_is_promoted_back() {
        // Fill every direct slot but one with visible variables, leaving no
        // room once the speculative shared-array slot is reserved; the one
        // hidden, non-addr-taken variable then spills into `shary.vars` and,
        // being alone there and not addr-taken, gets promoted back out.
        let mut program = Program::new("main", ObjectFormat::Compact, Dialect::Legacy);
        let mut ctx = BackendContext::new();
        for _ in 0..(MAX_MAP_LOCATIONS - 1) {
            map_var(&mut program, false);
        }
        let hidden = map_var(&mut program, true);

        run(&mut program, &mut ctx).unwrap();

        assert!(!ctx.shary.used);
        assert!(ctx.shary.vars.is_empty());
        assert!(ctx.vars.contains(&hidden));
        assert_eq!(ctx.vars.len(), MAX_MAP_LOCATIONS as usize);
    }
}
