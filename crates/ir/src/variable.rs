use bitflags::bitflags;

use crate::descriptor::Descriptor;
use crate::dim::DimChain;
use crate::storage::Storage;
use crate::value::InitValue;

bitflags! {
    /// Flags a variable carries into classification and sorting.
    #[derive(Default)]
    pub struct VariableFlags: u8 {
        /// Not exported to other libraries. May still occupy a direct slot.
        const HIDDEN       = 1 << 0;
        /// Actually referenced somewhere in the program.
        const USED         = 1 << 1;
        /// Defined in another library, referenced here by index only.
        const IMPORTED     = 1 << 2;
        /// Its address is taken, forcing it through the shared array when
        /// it is also hidden and array/struct-shaped.
        const ADDR_TAKEN   = 1 << 3;
        /// Set by the shared-array builder once it has been placed.
        const IN_SHARED_ARRAY = 1 << 4;
        const CONSTANT     = 1 << 5;
    }
}

/// A declared variable, as delivered to the back end. `index` and
/// `diminfo_start` are the two fields the core computes; both start `None`
/// and are filled in exactly once during layout.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub storage: Storage,
    pub descriptor: Descriptor,
    pub size: u32,
    pub dim: DimChain,
    pub values: Vec<InitValue>,
    pub flags: VariableFlags,
    pub index: Option<u32>,
    pub diminfo_start: Option<u32>,
}

impl Variable {
    pub fn new(name: impl Into<String>, storage: Storage, descriptor: Descriptor) -> Self {
        Self {
            name: name.into(),
            storage,
            descriptor,
            size: 1,
            dim: Vec::new(),
            values: Vec::new(),
            flags: VariableFlags::empty(),
            index: None,
            diminfo_start: None,
        }
    }

    pub fn hidden(&self) -> bool {
        self.flags.contains(VariableFlags::HIDDEN)
    }

    pub fn used(&self) -> bool {
        self.flags.contains(VariableFlags::USED)
    }

    pub fn imported(&self) -> bool {
        self.flags.contains(VariableFlags::IMPORTED)
    }

    pub fn addr_taken(&self) -> bool {
        self.flags.contains(VariableFlags::ADDR_TAKEN)
    }

    pub fn in_shared_array(&self) -> bool {
        self.flags.contains(VariableFlags::IN_SHARED_ARRAY)
    }

    pub fn has_dim(&self) -> bool {
        !self.dim.is_empty()
    }

    /// Whether this variable, left unpatched, has an initializer chain at
    /// all - distinct from whether that chain folds to zero.
    pub fn has_initializer(&self) -> bool {
        !self.values.is_empty()
    }
}
