use vbc_ir::{Dim, FunctionId, VariableId};

/// The direct-slot cap on the `MAP` storage class, shared by both dialects.
pub const MAX_MAP_LOCATIONS: u32 = 128;
/// The function-table cap imposed by compact format's single-byte
/// call-instruction operand.
pub const MAX_LIB_FUNCS: u32 = 256;

/// The single pooled aggregate: a null/dim-counter word, the deduplicated
/// dim-info table, then the spilled address-taken/overflow variables.
#[derive(Debug, Default)]
pub struct SharedArray {
    pub vars: Vec<VariableId>,
    pub dims: Vec<Dim>,
    pub index: u32,
    pub dim_counter: u32,
    pub size: u32,
    pub diminfo_size: u32,
    pub diminfo_offset: u32,
    pub data_offset: u32,
    pub dim_counter_var: bool,
    pub used: bool,
}

/// Working state threaded through the five phases. Everything here is
/// derived from the `Program`; nothing is duplicated from it except the
/// classification orderings the phases build up.
#[derive(Debug, Default)]
pub struct BackendContext {
    pub vars: Vec<VariableId>,
    pub scalars: Vec<VariableId>,
    pub arrays: Vec<VariableId>,
    pub imported_vars: Vec<VariableId>,
    pub imported_scalars: Vec<VariableId>,
    pub imported_arrays: Vec<VariableId>,
    pub funcs: Vec<FunctionId>,
    pub shary: SharedArray,
    pub null_handler: Option<FunctionId>,
}

impl BackendContext {
    pub fn new() -> Self {
        Self::default()
    }
}
