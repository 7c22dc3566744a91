/// What a function actually is, for the purposes of emission-order and
/// index assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncKind {
    /// A function declared in source.
    User,
    /// A built-in the runtime provides; never emitted into the function
    /// directory.
    Internal,
    /// A `str`-family printf-style formatter; handled by the caller
    /// inline, never emitted.
    Format,
    /// An "action special" call thunk; likewise never emitted.
    Aspec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FunctionFlags {
    pub hidden: bool,
    pub imported: bool,
}

/// A declared function. Only `User` functions are ever assigned an `index`;
/// the other kinds are resolved to VM built-ins upstream and never reach
/// the emission order.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub kind: FuncKind,
    pub flags: FunctionFlags,
    /// Incremented every time the main library references this function;
    /// only `usage > 0` imported functions are emitted.
    pub usage: u32,
    pub index: Option<u32>,
    pub param_count: u8,
    pub has_return: bool,
    /// Offset of the function's bytecode in the code section; filled in by
    /// the (out-of-scope) instruction emitter before the object writer runs.
    pub code_offset: Option<u32>,
}

impl Function {
    pub fn new(name: impl Into<String>, kind: FuncKind) -> Self {
        Self {
            name: name.into(),
            kind,
            flags: FunctionFlags::default(),
            usage: 0,
            index: None,
            param_count: 0,
            has_return: false,
            code_offset: None,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self.kind, FuncKind::User)
    }
}
