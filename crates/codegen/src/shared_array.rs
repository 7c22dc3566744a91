//! Lays out the shared array's three regions: the null/dim-counter slot,
//! the deduplicated dimension-info table, and the data region holding the
//! spilled address-taken/overflow variables.

use vbc_ir::{same_emitted_sequence, Dim, Program};

use crate::context::BackendContext;

pub fn run(program: &mut Program, ctx: &mut BackendContext) {
    let _span = tracing::debug_span!("shared_array").entered();
    if !ctx.shary.used {
        return;
    }
    // The null-element/dimension-counter slot.
    ctx.shary.size += 1;
    setup_diminfo(program, ctx);
    setup_data(program, ctx);
    tracing::debug!(
        size = ctx.shary.size,
        diminfo_size = ctx.shary.diminfo_size,
        "shared array laid out"
    );
}

fn setup_diminfo(program: &mut Program, ctx: &mut BackendContext) {
    ctx.shary.diminfo_offset = ctx.shary.size;

    let main_vars = program.main_library().vars.clone();
    for &id in &main_vars {
        let var = &program.variables[id];
        if var.has_dim() && var.addr_taken() {
            let dim = var.dim.clone();
            let offset = append_dim(ctx, &dim);
            program.variables[id].diminfo_start = Some(offset);
        }
    }

    let structure_ids: Vec<_> = (0..program.structures.len() as u32)
        .map(vbc_collections::Idx::new)
        .collect();
    for structure_id in structure_ids {
        let member_ids = program.structures[structure_id].members.clone();
        for member_id in member_ids {
            let member = &program.structure_members[member_id];
            if member.has_dim() && member.addr_taken {
                let dim = member.dim.clone();
                let offset = append_dim(ctx, &dim);
                program.structure_members[member_id].diminfo_start = Some(offset);
            }
        }
    }

    ctx.shary.size += ctx.shary.diminfo_size;
}

/// Scans the currently-accumulated dim pool for a run that emits the same
/// word sequence as `candidate`; returns its offset if found, otherwise
/// appends `candidate` to the pool and returns the offset it was appended
/// at. A linear, quadratic-worst-case scan, but the pool stays small.
fn append_dim(ctx: &mut BackendContext, candidate: &[Dim]) -> u32 {
    let offset = ctx.shary.diminfo_offset;
    for start in 0..ctx.shary.dims.len() {
        if same_dim(candidate, &ctx.shary.dims[start..]) {
            return offset + start as u32;
        }
    }
    let append_offset = offset + ctx.shary.dims.len() as u32;
    for &dim in candidate {
        ctx.shary.dims.push(dim);
        ctx.shary.diminfo_size += 1;
    }
    append_offset
}

/// A match requires `candidate` to line up with `pool_suffix` all the way to
/// the end of the pool, not merely a prefix of it - this is a suffix match,
/// not a substring search.
fn same_dim(candidate: &[Dim], pool_suffix: &[Dim]) -> bool {
    same_emitted_sequence(candidate, pool_suffix)
}

fn setup_data(program: &mut Program, ctx: &mut BackendContext) {
    ctx.shary.data_offset = ctx.shary.size;
    for &id in &ctx.shary.vars.clone() {
        let size = program.variables[id].size;
        program.variables[id].index = Some(ctx.shary.size);
        program.variables[id]
            .flags
            .insert(vbc_ir::VariableFlags::IN_SHARED_ARRAY);
        ctx.shary.size += size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_dim_chains_dedup_to_the_same_offset() {
        let mut ctx = BackendContext::new();
        ctx.shary.diminfo_offset = 1;
        let chain = vec![Dim::new(3, 1), Dim::new(4, 1)];
        let first = append_dim(&mut ctx, &chain);
        let second = append_dim(&mut ctx, &chain);
        assert_eq!(first, second);
        assert_eq!(ctx.shary.diminfo_size, 2);
    }

    #[test]
    fn a_chain_that_is_a_suffix_of_an_existing_one_is_reused() {
        let mut ctx = BackendContext::new();
        ctx.shary.diminfo_offset = 1;
        let long = vec![Dim::new(5, 1), Dim::new(3, 1), Dim::new(4, 1)];
        let short = vec![Dim::new(3, 1), Dim::new(4, 1)];

        let long_offset = append_dim(&mut ctx, &long);
        let short_offset = append_dim(&mut ctx, &short);

        assert_eq!(short_offset, long_offset + 1);
        assert_eq!(ctx.shary.diminfo_size, 3);
    }

    #[test]
    fn distinct_chains_both_get_appended() {
        let mut ctx = BackendContext::new();
        ctx.shary.diminfo_offset = 1;
        let a = vec![Dim::new(3, 1)];
        let b = vec![Dim::new(2, 1)];
        let a_offset = append_dim(&mut ctx, &a);
        let b_offset = append_dim(&mut ctx, &b);
        assert_ne!(a_offset, b_offset);
        assert_eq!(ctx.shary.diminfo_size, 2);
    }
}
