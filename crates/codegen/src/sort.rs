//! Buckets `vars` into six groups that minimize the size of emitted
//! initializer chunks, then assigns final, contiguous indices to every
//! direct-slot variable.

use bumpalo::Bump;
use vbc_error_macros::internal_error;
use vbc_ir::{InitValue, Program, VariableId};

use crate::context::BackendContext;

pub fn run(program: &mut Program, ctx: &mut BackendContext) {
    let _span = tracing::debug_span!("sort").entered();
    bucket_sort(program, ctx);
    split_scalars_and_arrays(program, ctx);
    assign_indexes(program, ctx);
    tracing::debug!(
        scalars = ctx.scalars.len(),
        arrays = ctx.arrays.len(),
        "sorted and indexed"
    );
}

/// Drains `ctx.vars` into six arrival-order-preserving buckets, using a
/// compile-task-scoped arena for the scratch lists since they're discarded
/// the moment this function returns.
fn bucket_sort(program: &Program, ctx: &mut BackendContext) {
    let bump = Bump::new();
    let mut arrays = bumpalo::collections::Vec::new_in(&bump);
    let mut public_zero = bumpalo::collections::Vec::new_in(&bump);
    let mut public_nonzero = bumpalo::collections::Vec::new_in(&bump);
    let mut hidden_nonzero = bumpalo::collections::Vec::new_in(&bump);
    let mut hidden_zero = bumpalo::collections::Vec::new_in(&bump);
    let mut hidden_arrays = bumpalo::collections::Vec::new_in(&bump);

    for id in ctx.vars.drain(..) {
        if is_public_array(program, id) {
            arrays.push(id);
        } else if is_public_zero_scalar(program, id) {
            public_zero.push(id);
        } else if is_public_nonzero_scalar(program, id) {
            public_nonzero.push(id);
        } else if is_hidden_nonzero_scalar(program, id) {
            hidden_nonzero.push(id);
        } else if is_hidden_zero_scalar(program, id) {
            hidden_zero.push(id);
        } else if is_hidden_array(program, id) {
            hidden_arrays.push(id);
        } else {
            internal_error!("variable matched none of the six sort buckets");
        }
    }

    ctx.vars.extend(arrays);
    ctx.vars.extend(public_zero);
    ctx.vars.extend(public_nonzero);
    ctx.vars.extend(hidden_nonzero);
    ctx.vars.extend(hidden_zero);
    ctx.vars.extend(hidden_arrays);
}

fn split_scalars_and_arrays(program: &Program, ctx: &mut BackendContext) {
    for &id in &ctx.vars {
        if program.variables[id].descriptor.is_scalar_shaped() {
            ctx.scalars.push(id);
        } else {
            ctx.arrays.push(id);
        }
    }
    for &id in &ctx.imported_vars {
        if program.variables[id].descriptor.is_scalar_shaped() {
            ctx.imported_scalars.push(id);
        } else {
            ctx.imported_arrays.push(id);
        }
    }
}

/// Indices must be assigned in the same order the variables were allocated
/// in: `vars`, then `imported_vars`, then the shared array and its
/// dim-counter slot if either is present.
fn assign_indexes(program: &mut Program, ctx: &mut BackendContext) {
    let mut index: u32 = 0;
    for &id in &ctx.vars {
        program.variables[id].index = Some(index);
        index += 1;
    }
    for &id in &ctx.imported_vars {
        program.variables[id].index = Some(index);
        index += 1;
    }
    if ctx.shary.used {
        ctx.shary.index = index;
        index += 1;
        if ctx.shary.dim_counter_var {
            ctx.shary.dim_counter = index;
        }
    }
}

fn head(program: &Program, id: VariableId) -> Option<&InitValue> {
    program.variables[id].values.first()
}

fn is_initz_zero(program: &Program, id: VariableId) -> bool {
    match head(program, id) {
        None => true,
        Some(value) => value.is_zero_valued(
            |s| program.strings.get(s).index_runtime() == 0,
            |f| program.functions[f].index == Some(0),
        ),
    }
}

fn is_array(program: &Program, id: VariableId) -> bool {
    program.variables[id].descriptor.is_array_shaped()
}

fn is_public_array(program: &Program, id: VariableId) -> bool {
    is_array(program, id) && !program.variables[id].hidden()
}

fn is_hidden_array(program: &Program, id: VariableId) -> bool {
    is_array(program, id) && program.variables[id].hidden()
}

fn is_scalar(program: &Program, id: VariableId) -> bool {
    program.variables[id].descriptor.is_scalar_shaped()
}

fn is_zero_scalar(program: &Program, id: VariableId) -> bool {
    is_scalar(program, id) && is_initz_zero(program, id)
}

fn is_nonzero_scalar(program: &Program, id: VariableId) -> bool {
    is_scalar(program, id) && !is_initz_zero(program, id)
}

fn is_public_zero_scalar(program: &Program, id: VariableId) -> bool {
    is_zero_scalar(program, id) && !program.variables[id].hidden()
}

fn is_public_nonzero_scalar(program: &Program, id: VariableId) -> bool {
    is_nonzero_scalar(program, id) && !program.variables[id].hidden()
}

fn is_hidden_zero_scalar(program: &Program, id: VariableId) -> bool {
    is_zero_scalar(program, id) && program.variables[id].hidden()
}

fn is_hidden_nonzero_scalar(program: &Program, id: VariableId) -> bool {
    is_nonzero_scalar(program, id) && program.variables[id].hidden()
}
