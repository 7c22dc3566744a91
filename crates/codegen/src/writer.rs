//! Serializes the post-patch program state into a binary object image: a
//! small header, a sequence of tagged chunks, and the chunk directory that
//! locates them.

use vbc_ir::{InitValue, ObjectFormat, Program, VariableId};

use crate::context::BackendContext;

const MAGIC_COMPACT: [u8; 4] = *b"ACSE";
const MAGIC_VERBOSE: [u8; 4] = *b"ACSe";

/// Builds the byte image for the current program state. Pure function of
/// its inputs: running it twice over the same post-patch state produces
/// identical bytes.
pub fn build(program: &Program, ctx: &BackendContext, write_asserts: bool) -> Vec<u8> {
    let _span = tracing::debug_span!("write").entered();
    let format = program.main_library().format;

    let mut chunks: Vec<([u8; 4], Vec<u8>)> = Vec::new();
    push_if_nonempty(&mut chunks, *b"FNCT", function_directory(program, ctx));
    push_if_nonempty(&mut chunks, *b"FNCD", function_code_offsets(program, ctx));
    push_if_nonempty(&mut chunks, *b"FLAG", function_flags(program, ctx));
    push_if_nonempty(&mut chunks, *b"FARG", function_signatures(program, ctx));
    push_if_nonempty(&mut chunks, *b"SPTR", script_directory(program));
    push_if_nonempty(&mut chunks, *b"MINI", map_var_initializers(program, ctx));
    for payload in array_var_initializers(program, ctx) {
        chunks.push((*b"AINI", payload));
    }
    push_if_nonempty(&mut chunks, *b"IVAR", imported_var_directory(program, ctx));
    push_if_nonempty(&mut chunks, *b"IFUN", imported_func_directory(program, ctx));
    push_if_nonempty(&mut chunks, *b"LNAM", library_names(program));
    push_if_nonempty(&mut chunks, *b"STRL", string_pool(program));
    push_if_nonempty(&mut chunks, *b"DINF", dim_info(ctx));
    if write_asserts {
        push_if_nonempty(&mut chunks, *b"RASS", runtime_asserts(program));
    }

    assemble(format, chunks)
}

fn push_if_nonempty(chunks: &mut Vec<([u8; 4], Vec<u8>)>, tag: [u8; 4], payload: Vec<u8>) {
    if !payload.is_empty() {
        chunks.push((tag, payload));
    }
}

fn assemble(format: ObjectFormat, chunks: Vec<([u8; 4], Vec<u8>)>) -> Vec<u8> {
    let magic = match format {
        ObjectFormat::Compact => MAGIC_COMPACT,
        ObjectFormat::Verbose => MAGIC_VERBOSE,
    };

    let mut out = Vec::new();
    out.extend_from_slice(&magic);
    out.extend_from_slice(&0u32.to_le_bytes()); // patched below

    let mut directory = Vec::with_capacity(chunks.len());
    for (tag, payload) in &chunks {
        let offset = out.len() as u32;
        out.extend_from_slice(payload);
        directory.push((*tag, offset, payload.len() as u32));
    }

    let dir_offset = out.len() as u32;
    out.extend_from_slice(&(directory.len() as u32).to_le_bytes());
    for (tag, offset, len) in directory {
        out.extend_from_slice(&tag);
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
    }

    out[4..8].copy_from_slice(&dir_offset.to_le_bytes());
    out
}

fn function_directory(program: &Program, ctx: &BackendContext) -> Vec<u8> {
    let mut bytes = (ctx.funcs.len() as u32).to_le_bytes().to_vec();
    for &id in &ctx.funcs {
        let func = &program.functions[id];
        bytes.extend_from_slice(&func.index.unwrap_or(0).to_le_bytes());
        let name = func.name.as_bytes();
        bytes.extend_from_slice(&(name.len() as u32).to_le_bytes());
        bytes.extend_from_slice(name);
    }
    bytes
}

fn function_code_offsets(program: &Program, ctx: &BackendContext) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(ctx.funcs.len() * 4);
    for &id in &ctx.funcs {
        bytes.extend_from_slice(&program.functions[id].code_offset.unwrap_or(0).to_le_bytes());
    }
    bytes
}

fn function_flags(program: &Program, ctx: &BackendContext) -> Vec<u8> {
    ctx.funcs
        .iter()
        .map(|&id| {
            let flags = program.functions[id].flags;
            (flags.hidden as u8) | ((flags.imported as u8) << 1)
        })
        .collect()
}

fn function_signatures(program: &Program, ctx: &BackendContext) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(ctx.funcs.len() * 2);
    for &id in &ctx.funcs {
        let func = &program.functions[id];
        bytes.push(func.param_count);
        bytes.push(func.has_return as u8);
    }
    bytes
}

fn script_directory(program: &Program) -> Vec<u8> {
    let scripts = &program.main_library().scripts;
    let mut bytes = (scripts.len() as u32).to_le_bytes().to_vec();
    for script in scripts {
        match script.name {
            vbc_ir::ScriptName::Number(n) => {
                bytes.push(0);
                bytes.extend_from_slice(&n.to_le_bytes());
            }
            vbc_ir::ScriptName::Named(s) => {
                bytes.push(1);
                bytes.extend_from_slice(&(program.strings.get(s).index_runtime()).to_le_bytes());
            }
        }
        bytes.push(script.script_type);
        bytes.push(script.arg_count);
        bytes.push(script.flags.bits());
        bytes.extend_from_slice(&script.code_offset.unwrap_or(u32::MAX).to_le_bytes());
    }
    bytes
}

fn initial_word(program: &Program, value: &InitValue) -> i32 {
    match value {
        InitValue::Expr(v) => *v,
        InitValue::Str(s) | InitValue::StringInitz(s) => program.strings.get(*s).index_runtime(),
        InitValue::FuncRef(f) => program.functions[*f].index.unwrap_or(0) as i32,
        InitValue::StructRef { expr_offset, .. } => *expr_offset,
        InitValue::ArrayRef { expr_offset, .. } => *expr_offset,
    }
}

fn scalar_value(program: &Program, id: VariableId) -> i32 {
    program.variables[id]
        .values
        .first()
        .map_or(0, |v| initial_word(program, v))
}

/// The run of scalar values, with trailing zeros trimmed: the object loader
/// treats any indices past the end of this table as implicitly zero, so
/// sorting puts the zero-valued ones last to let this table shrink.
fn map_var_initializers(program: &Program, ctx: &BackendContext) -> Vec<u8> {
    let mut values: Vec<i32> = ctx.scalars.iter().map(|&id| scalar_value(program, id)).collect();
    while values.last() == Some(&0) {
        values.pop();
    }
    let mut bytes = (values.len() as u32).to_le_bytes().to_vec();
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

fn array_var_initializers(program: &Program, ctx: &BackendContext) -> Vec<Vec<u8>> {
    ctx.arrays
        .iter()
        .filter(|&&id| program.variables[id].has_initializer())
        .map(|&id| {
            let var = &program.variables[id];
            let mut bytes = var.index.unwrap_or(0).to_le_bytes().to_vec();
            bytes.extend_from_slice(&(var.values.len() as u32).to_le_bytes());
            for value in &var.values {
                bytes.extend_from_slice(&initial_word(program, value).to_le_bytes());
            }
            bytes
        })
        .collect()
}

fn imported_var_directory(program: &Program, ctx: &BackendContext) -> Vec<u8> {
    let mut bytes = (ctx.imported_vars.len() as u32).to_le_bytes().to_vec();
    for &id in &ctx.imported_vars {
        bytes.extend_from_slice(&program.variables[id].index.unwrap_or(0).to_le_bytes());
    }
    bytes
}

fn imported_func_directory(program: &Program, ctx: &BackendContext) -> Vec<u8> {
    let imported: Vec<_> = ctx
        .funcs
        .iter()
        .filter(|&&id| program.functions[id].flags.imported)
        .collect();
    let mut bytes = (imported.len() as u32).to_le_bytes().to_vec();
    for &id in imported {
        bytes.extend_from_slice(&program.functions[id].index.unwrap_or(0).to_le_bytes());
    }
    bytes
}

fn library_names(program: &Program) -> Vec<u8> {
    let imports = &program.main_library().imports;
    let mut bytes = (imports.len() as u32).to_le_bytes().to_vec();
    for &id in imports {
        let name = program.libraries[id].name.as_bytes();
        bytes.extend_from_slice(&(name.len() as u32).to_le_bytes());
        bytes.extend_from_slice(name);
    }
    bytes
}

fn string_pool(program: &Program) -> Vec<u8> {
    let used = program.strings.used_strings();
    let mut bytes = (used.len() as u32).to_le_bytes().to_vec();
    for &id in used {
        let s = program.strings.get(id);
        bytes.extend_from_slice(&s.index_runtime().to_le_bytes());
        let text = s.value().as_bytes();
        bytes.extend_from_slice(&(text.len() as u32).to_le_bytes());
        bytes.extend_from_slice(text);
    }
    bytes
}

fn dim_info(ctx: &BackendContext) -> Vec<u8> {
    if !ctx.shary.used {
        return Vec::new();
    }
    let mut bytes = (ctx.shary.dims.len() as u32).to_le_bytes().to_vec();
    for dim in &ctx.shary.dims {
        bytes.extend_from_slice(&dim.emitted_size().to_le_bytes());
    }
    bytes
}

fn runtime_asserts(program: &Program) -> Vec<u8> {
    let asserts = &program.asserts;
    if asserts.is_empty() {
        return Vec::new();
    }
    let mut bytes = (asserts.len() as u32).to_le_bytes().to_vec();
    for assert in asserts {
        bytes.extend_from_slice(&assert.line.to_le_bytes());
        bytes.extend_from_slice(&assert.left.to_le_bytes());
        bytes.push(compare_kind_tag(assert.compare));
        bytes.extend_from_slice(&assert.right.to_le_bytes());
        let message = assert.message.as_bytes();
        bytes.extend_from_slice(&(message.len() as u32).to_le_bytes());
        bytes.extend_from_slice(message);
        let file_runtime_index = assert
            .file_path
            .map_or(-1, |id| program.strings.get(id).index_runtime());
        bytes.extend_from_slice(&file_runtime_index.to_le_bytes());
    }
    bytes
}

fn compare_kind_tag(kind: vbc_ir::CompareKind) -> u8 {
    use vbc_ir::CompareKind::*;
    match kind {
        Eq => 0,
        Ne => 1,
        Lt => 2,
        Le => 3,
        Gt => 4,
        Ge => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbc_ir::{Dialect, Descriptor, Storage, Variable};

    fn program_with_format(format: ObjectFormat) -> Program {
        Program::new("main", format, Dialect::Legacy)
    }

    #[test]
    fn header_carries_the_format_specific_magic() {
        let program = program_with_format(ObjectFormat::Compact);
        let bytes = build(&program, &BackendContext::new(), false);
        assert_eq!(&bytes[0..4], b"ACSE");

        let program = program_with_format(ObjectFormat::Verbose);
        let bytes = build(&program, &BackendContext::new(), false);
        assert_eq!(&bytes[0..4], b"ACSe");
    }

    #[test]
    fn directory_offset_points_past_the_last_chunk() {
        let mut program = program_with_format(ObjectFormat::Compact);
        let mut var = Variable::new("v", Storage::Map, Descriptor::Primitive);
        var.index = Some(0);
        var.values.push(InitValue::Expr(42));
        let id = program.push_variable(var);

        let ctx = BackendContext {
            vars: vec![id],
            scalars: vec![id],
            ..BackendContext::new()
        };
        let bytes = build(&program, &ctx, false);

        let dir_offset = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        assert!(dir_offset <= bytes.len());
        let chunk_count = u32::from_le_bytes(bytes[dir_offset..dir_offset + 4].try_into().unwrap());
        assert_eq!(chunk_count, 1); // just the map-var initializer table
    }

    #[test]
    fn trailing_zero_scalars_are_trimmed_from_the_map_var_table() {
        let mut program = program_with_format(ObjectFormat::Compact);
        let mut a = Variable::new("a", Storage::Map, Descriptor::Primitive);
        a.values.push(InitValue::Expr(5));
        let a = program.push_variable(a);
        let b = program.push_variable(Variable::new("b", Storage::Map, Descriptor::Primitive));

        let ctx = BackendContext {
            scalars: vec![a, b],
            ..BackendContext::new()
        };
        let bytes = map_var_initializers(&program, &ctx);
        let count = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(count, 1);
    }

    #[test]
    fn empty_chunks_are_not_emitted() {
        let program = program_with_format(ObjectFormat::Compact);
        let bytes = build(&program, &BackendContext::new(), false);
        let dir_offset = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        let chunk_count = u32::from_le_bytes(bytes[dir_offset..dir_offset + 4].try_into().unwrap());
        assert_eq!(chunk_count, 0);
    }
}
