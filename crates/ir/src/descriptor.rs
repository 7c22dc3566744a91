/// What shape of value a variable holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    Primitive,
    Ref(RefTarget),
    Array,
    StructVar,
}

/// What a `Descriptor::Ref` variable ultimately points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTarget {
    Array,
    Structure,
    Function,
}

impl Descriptor {
    /// An array, a struct-shaped variable, or a reference to an array: all
    /// three pack into an array slot (a base offset plus a dim-info offset).
    pub fn is_array_shaped(self) -> bool {
        matches!(
            self,
            Descriptor::Array | Descriptor::StructVar | Descriptor::Ref(RefTarget::Array)
        )
    }

    /// A plain value, or a reference to a structure or function: single word.
    pub fn is_scalar_shaped(self) -> bool {
        matches!(
            self,
            Descriptor::Primitive
                | Descriptor::Ref(RefTarget::Structure)
                | Descriptor::Ref(RefTarget::Function)
        )
    }
}
