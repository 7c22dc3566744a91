use crate::dim::DimChain;
use crate::ids::StructureMemberId;

/// A declared member of a `Structure`. Members form an ordered chain; each
/// may carry its own dimension chain (for array-of-struct members) and gets
/// its own `diminfo_start` once the shared-array builder places it.
#[derive(Debug, Clone)]
pub struct StructureMember {
    pub name: String,
    pub size: u32,
    pub dim: DimChain,
    pub addr_taken: bool,
    pub diminfo_start: Option<u32>,
}

impl StructureMember {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
            dim: Vec::new(),
            addr_taken: false,
            diminfo_start: None,
        }
    }

    pub fn has_dim(&self) -> bool {
        !self.dim.is_empty()
    }
}

/// Members live in `Program`'s member arena; a `Structure` only holds the
/// ordered handles, so an `InitValue::ArrayRef` can name a specific member
/// without borrowing the structure that owns it.
#[derive(Debug, Clone)]
pub struct Structure {
    pub name: String,
    pub members: Vec<StructureMemberId>,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }
}
