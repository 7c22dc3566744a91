use vbc_module::StringId;

use crate::ids::{FunctionId, StructureMemberId, VariableId};

/// One link of a variable's initializer chain.
///
/// `ArrayRef`/`StructRef` carry a variable target and a constant expression
/// offset that the patcher turns into a final address; the other variants
/// carry everything they need already and are left untouched by patching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitValue {
    /// A folded constant integer.
    Expr(i32),
    /// A reference to an interned string.
    Str(StringId),
    /// A reference to a function, by its eventual emission index.
    FuncRef(FunctionId),
    /// A pointer-like reference into another variable's structure, at a
    /// constant expression offset from its base.
    StructRef { var: VariableId, expr_offset: i32 },
    /// A pointer-like reference into another variable's array, carrying both
    /// the base offset and the dim-info offset needed to bounds-check it.
    /// When the reference is to a member of an array of structures, the
    /// member supplies its own `diminfo_start` instead of the variable's.
    ArrayRef {
        var: VariableId,
        expr_offset: i32,
        diminfo_offset: i32,
        structure_member: Option<StructureMemberId>,
    },
    /// A string literal materialized in place rather than referenced by
    /// index (legacy dialect's inline string-initializer form).
    StringInitz(StringId),
}

impl InitValue {
    /// Does this value count as zero for the purposes of bucket
    /// classification and trailing-zero chunk trimming?
    ///
    /// `StructRef` is always nonzero, regardless of the target variable's
    /// own index. `ArrayRef` and `StringInitz` aren't scalar-like at all, so
    /// the question never arises for them in practice; they fall back to
    /// "zero" rather than being misclassified as carrying a real value.
    pub fn is_zero_valued(
        &self,
        string_runtime_index_is_zero: impl Fn(StringId) -> bool,
        function_index_is_zero: impl Fn(FunctionId) -> bool,
    ) -> bool {
        match self {
            InitValue::Expr(v) => *v == 0,
            InitValue::Str(s) => string_runtime_index_is_zero(*s),
            InitValue::FuncRef(f) => function_index_is_zero(*f),
            InitValue::StructRef { .. } => false,
            InitValue::ArrayRef { .. } | InitValue::StringInitz(_) => true,
        }
    }
}
