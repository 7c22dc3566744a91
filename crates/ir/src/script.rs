use bitflags::bitflags;

use vbc_module::StringId;

/// A script is identified either by a small numeric tag or, on the modern
/// dialect, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptName {
    Number(u16),
    Named(StringId),
}

bitflags! {
    #[derive(Default)]
    pub struct ScriptFlags: u8 {
        const NET        = 1 << 0;
        const CLIENTSIDE = 1 << 1;
    }
}

/// A declared script, as it appears in the script directory chunk.
#[derive(Debug, Clone)]
pub struct Script {
    pub name: ScriptName,
    pub script_type: u8,
    pub arg_count: u8,
    pub flags: ScriptFlags,
    /// Filled in once the object writer lays out code; `None` beforehand.
    pub code_offset: Option<u32>,
}

impl Script {
    pub fn new(name: ScriptName, script_type: u8, arg_count: u8) -> Self {
        Self {
            name,
            script_type,
            arg_count,
            flags: ScriptFlags::empty(),
            code_offset: None,
        }
    }
}
