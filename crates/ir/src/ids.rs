use vbc_collections::Idx;

use crate::function::Function;
use crate::library::Library;
use crate::structure::{Structure, StructureMember};
use crate::variable::Variable;

pub type VariableId = Idx<Variable>;
pub type FunctionId = Idx<Function>;
pub type StructureId = Idx<Structure>;
pub type StructureMemberId = Idx<StructureMember>;
pub type LibraryId = Idx<Library>;
