use vbc_collections::Arena;
use vbc_module::{StringId, StringTable};

use crate::assert::RuntimeAssert;
use crate::function::Function;
use crate::ids::{FunctionId, LibraryId, StructureId, StructureMemberId, VariableId};
use crate::library::{Dialect, Library, ObjectFormat};
use crate::structure::{Structure, StructureMember};
use crate::variable::Variable;

/// Everything the back end needs for one compile, already validated.
///
/// All variables, functions, structures, and structure members live in
/// flat arenas here regardless of which library declared them; a
/// [`Library`] only holds the ordered handles into these arenas. This is
/// what lets the variable sorter re-index in place: later readers hold an
/// `Idx<Variable>`, not a borrow, so a write through the arena is visible
/// everywhere without a fix-up pass.
#[derive(Debug)]
pub struct Program {
    pub variables: Arena<Variable>,
    pub functions: Arena<Function>,
    pub structures: Arena<Structure>,
    pub structure_members: Arena<StructureMember>,
    pub strings: StringTable,
    pub asserts: Vec<RuntimeAssert>,
    pub libraries: Arena<Library>,
    pub main_library: LibraryId,
    /// The interned `"assertion failure"` message prefix, set once the
    /// patcher has created the assertion strings.
    pub assert_prefix: Option<StringId>,
}

impl Program {
    pub fn new(main_library_name: impl Into<String>, format: ObjectFormat, dialect: Dialect) -> Self {
        let mut libraries = Arena::default();
        let main_library = libraries.push(Library::new(main_library_name, format, dialect));
        Self {
            variables: Arena::default(),
            functions: Arena::default(),
            structures: Arena::default(),
            structure_members: Arena::default(),
            strings: StringTable::new(),
            asserts: Vec::new(),
            libraries,
            main_library,
            assert_prefix: None,
        }
    }

    pub fn main_library(&self) -> &Library {
        &self.libraries[self.main_library]
    }

    pub fn main_library_mut(&mut self) -> &mut Library {
        &mut self.libraries[self.main_library]
    }

    pub fn push_variable(&mut self, var: Variable) -> VariableId {
        self.variables.push(var)
    }

    pub fn push_function(&mut self, func: Function) -> FunctionId {
        self.functions.push(func)
    }

    pub fn push_structure(&mut self, structure: Structure) -> StructureId {
        self.structures.push(structure)
    }

    pub fn push_structure_member(&mut self, member: StructureMember) -> StructureMemberId {
        self.structure_members.push(member)
    }

    pub fn imported_libraries(&self) -> impl Iterator<Item = &Library> {
        self.main_library()
            .imports
            .iter()
            .map(move |&id| &self.libraries[id])
    }
}
