//! Renders [`vbc_codegen::CodegenError`] (and internal-invariant panics) into
//! the compiler's diagnostic line format.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use bitflags::bitflags;
use vbc_codegen::{CodegenError, MAX_LIB_FUNCS, MAX_MAP_LOCATIONS};

bitflags! {
    /// The position and classification bits a diagnostic carries; mirrors
    /// the flag argument the (out-of-scope) front end's `diag()` call takes.
    #[derive(Default)]
    pub struct DiagFlags: u16 {
        const ERR      = 1 << 0;
        const WARN     = 1 << 1;
        const FILE     = 1 << 2;
        const LINE     = 1 << 3;
        const COLUMN   = 1 << 4;
        const SYNTAX   = 1 << 5;
        const INTERNAL = 1 << 6;
    }
}

/// One rendered diagnostic: a position (as much of it as `flags` requests),
/// a classification, a severity, and a message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub flags: DiagFlags,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(flags: DiagFlags, message: impl Into<String>) -> Self {
        Self {
            flags,
            file: None,
            line: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.flags.insert(DiagFlags::FILE | DiagFlags::LINE);
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn at_column(mut self, column: u32) -> Self {
        self.flags.insert(DiagFlags::COLUMN);
        self.column = Some(column);
        self
    }

    pub fn is_error(&self) -> bool {
        self.flags.contains(DiagFlags::ERR)
    }

    fn kind(&self) -> &'static str {
        if self.flags.contains(DiagFlags::INTERNAL) {
            "internal"
        } else if self.flags.contains(DiagFlags::SYNTAX) {
            "syntax"
        } else {
            "custom"
        }
    }

    fn severity(&self) -> &'static str {
        if self.flags.contains(DiagFlags::ERR) {
            "error"
        } else {
            "warning"
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flags.contains(DiagFlags::FILE) {
            if let Some(file) = &self.file {
                write!(f, "{file}")?;
                if self.flags.contains(DiagFlags::LINE) {
                    if let Some(line) = self.line {
                        write!(f, ":{line}")?;
                        if self.flags.contains(DiagFlags::COLUMN) {
                            if let Some(column) = self.column {
                                write!(f, ":{column}")?;
                            }
                        }
                    }
                }
                write!(f, ": ")?;
            }
        }
        write!(f, "{} ({}): {}", self.kind(), self.severity(), self.message)
    }
}

/// Renders a [`CodegenError`] into the diagnostic it reports as, with no
/// position information: the back end reports these at main-library scope,
/// and only the (out-of-scope) front end knows the library's source file.
pub fn diagnostic_for_codegen_error(err: &CodegenError) -> Diagnostic {
    match err {
        CodegenError::TooManyVariables { .. } => Diagnostic::new(
            DiagFlags::ERR,
            format!("library uses more than {MAX_MAP_LOCATIONS} map-storage variables"),
        ),
        CodegenError::TooManyFunctions { .. } => Diagnostic::new(
            DiagFlags::ERR,
            format!(
                "library uses more than {MAX_LIB_FUNCS} functions; \
                 to use more functions, compile in non-compact mode"
            ),
        ),
        CodegenError::IoFailure(io_err) => {
            Diagnostic::new(DiagFlags::ERR, format!("failed to write object file: {io_err}"))
        }
    }
}

/// Renders the message `internal_error!` prints to stderr as a `DIAG_INTERNAL`
/// diagnostic, for a back end panic caught at the CLI's `catch_unwind` boundary.
pub fn diagnostic_for_panic(payload: &str) -> Diagnostic {
    Diagnostic::new(DiagFlags::ERR | DiagFlags::INTERNAL, payload.to_string())
}

/// Legacy compatibility mode: appends rendered diagnostics to `acs.err` in
/// `source_dir` instead of standard output. Line numbers are incremented by
/// one to match the legacy tool's off-by-one decoding.
pub fn log_to_acs_err(source_dir: &Path, diagnostics: &[Diagnostic]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(source_dir.join("acs.err"))?;
    for diag in diagnostics {
        let mut shifted = diag.clone();
        shifted.line = shifted.line.map(|line| line + 1);
        writeln!(file, "{shifted}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_positioned_error_includes_file_and_line() {
        let diag = Diagnostic::new(DiagFlags::ERR, "bad thing").at("map01.acs", 12);
        assert_eq!(diag.to_string(), "map01.acs:12: custom (error): bad thing");
    }

    #[test]
    fn a_positioned_warning_with_a_column_includes_all_three() {
        let diag = Diagnostic::new(DiagFlags::WARN, "unused variable")
            .at("map01.acs", 12)
            .at_column(5);
        assert_eq!(diag.to_string(), "map01.acs:12:5: custom (warning): unused variable");
    }

    #[test]
    fn an_unpositioned_diagnostic_has_no_leading_location() {
        let diag = Diagnostic::new(DiagFlags::ERR, "library uses too many variables");
        assert_eq!(diag.to_string(), "custom (error): library uses too many variables");
    }

    #[test]
    fn internal_diagnostics_render_with_the_internal_tag() {
        let diag = diagnostic_for_panic("variable matched none of the six sort buckets");
        assert_eq!(
            diag.to_string(),
            "internal (error): variable matched none of the six sort buckets"
        );
    }

    #[test]
    fn too_many_variables_renders_as_an_error() {
        let err = CodegenError::TooManyVariables {
            limit: MAX_MAP_LOCATIONS,
            library_name: "main".into(),
        };
        let diag = diagnostic_for_codegen_error(&err);
        assert!(diag.is_error());
        assert!(diag.message.contains("128"));
    }

    #[test]
    fn acs_err_log_shifts_line_numbers_by_one() {
        let dir = std::env::temp_dir().join(format!("vbc_reporting_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let diag = Diagnostic::new(DiagFlags::ERR, "oops").at("map01.acs", 9);

        log_to_acs_err(&dir, std::slice::from_ref(&diag)).unwrap();

        let contents = std::fs::read_to_string(dir.join("acs.err")).unwrap();
        assert!(contents.contains("map01.acs:10:"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
