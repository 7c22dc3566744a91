//! The front end that assembles a compile task: parses CLI flags into an
//! [`Options`] value, drives the five-phase back end, and renders any
//! diagnostics produced along the way.

pub mod demo;
pub mod options;

use std::panic;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};
use vbc_codegen::run_backend;
use vbc_ir::Program;
use vbc_reporting::{diagnostic_for_codegen_error, diagnostic_for_panic, log_to_acs_err};

pub use options::{Define, Options};

pub fn build_app() -> Command {
    Command::new("vbc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compiles a script-language source file into a VM object file")
        .arg(
            Arg::new("include_dir")
                .short('i')
                .value_name("DIR")
                .action(ArgAction::Append)
                .help("Adds a directory to the include search path"),
        )
        .arg(
            Arg::new("define")
                .short('D')
                .value_name("NAME[=VALUE]")
                .action(ArgAction::Append)
                .help("Defines a preprocessor macro"),
        )
        .arg(
            Arg::new("link_library")
                .short('l')
                .long("link-library")
                .value_name("LIB")
                .action(ArgAction::Append)
                .help("Links an import library into the object"),
        )
        .arg(
            Arg::new("preprocess")
                .long("preprocess")
                .action(ArgAction::SetTrue)
                .help("Stops after preprocessing and prints the result"),
        )
        .arg(
            Arg::new("acc_err")
                .long("acc-err")
                .action(ArgAction::SetTrue)
                .help("Logs diagnostics to acs.err instead of standard output"),
        )
        .arg(
            Arg::new("acc_stats")
                .long("acc-stats")
                .action(ArgAction::SetTrue)
                .help("Prints object layout statistics after a successful compile"),
        )
        .arg(
            Arg::new("one_column")
                .long("one-column")
                .action(ArgAction::SetTrue)
                .help("Reports diagnostic columns starting at 1 instead of 0"),
        )
        .arg(
            Arg::new("tab_size")
                .long("tab-size")
                .value_name("N")
                .value_parser(value_parser!(u8).range(1..100))
                .default_value("8")
                .help("Sets the column width a tab character advances by"),
        )
        .arg(
            Arg::new("no_write_asserts")
                .long("no-write-asserts")
                .action(ArgAction::SetTrue)
                .help("Drops assert statements from the emitted object"),
        )
        .arg(
            Arg::new("write_asserts")
                .long("write-asserts")
                .action(ArgAction::SetTrue)
                .conflicts_with("no_write_asserts")
                .help("Keeps assert statements in the emitted object (default)"),
        )
        .arg(
            Arg::new("cache_dir")
                .long("cache-dir")
                .value_name("DIR")
                .help("Sets the build cache directory"),
        )
        .arg(
            Arg::new("cache_lifetime")
                .long("cache-lifetime")
                .value_name("SECONDS")
                .value_parser(value_parser!(u32))
                .help("Sets how long cache entries are kept"),
        )
        .arg(
            Arg::new("no_cache")
                .long("no-cache")
                .action(ArgAction::SetTrue)
                .help("Disables the build cache"),
        )
        .arg(
            Arg::new("cache_clear")
                .long("cache-clear")
                .action(ArgAction::SetTrue)
                .help("Clears the build cache before compiling"),
        )
        .arg(
            Arg::new("cache_print")
                .long("cache-print")
                .action(ArgAction::SetTrue)
                .help("Prints cache statistics after compiling"),
        )
        .arg(
            Arg::new("source")
                .value_name("SOURCE")
                .required(true)
                .index(1)
                .help("The source file to compile"),
        )
        .arg(
            Arg::new("object")
                .value_name("OBJECT")
                .index(2)
                .help("The object file to write (defaults to SOURCE with a .o extension)"),
        )
}

/// Runs the five-phase back end against `program` and writes the resulting
/// object file, rendering any failure as a diagnostic.
///
/// A back-end panic (an internal invariant violation) is caught here rather
/// than unwinding past the CLI: this is the one `catch_unwind` boundary the
/// whole process has.
pub fn compile(program: &mut Program, options: &Options) -> i32 {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        run_backend(program, options.write_asserts)
    }));

    let image = match result {
        Ok(Ok(image)) => image,
        Ok(Err(err)) => {
            let diag = diagnostic_for_codegen_error(&err);
            report(&[diag], options);
            return 1;
        }
        Err(panic_payload) => {
            let message = panic_message(&panic_payload);
            let diag = diagnostic_for_panic(&message);
            report(&[diag], options);
            return 1;
        }
    };

    match std::fs::write(options.output_path(), &image) {
        Ok(()) => 0,
        Err(io_err) => {
            let diag = diagnostic_for_codegen_error(&vbc_codegen::CodegenError::IoFailure(io_err));
            report(&[diag], options);
            1
        }
    }
}

fn report(diagnostics: &[vbc_reporting::Diagnostic], options: &Options) {
    if options.acc_err {
        if let Some(dir) = options.source.parent() {
            let _ = log_to_acs_err(dir, diagnostics);
            return;
        }
    }
    for diag in diagnostics {
        eprintln!("{diag}");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal compiler error".to_string()
    }
}

pub fn canonicalized_source_path(options: &Options) -> PathBuf {
    options
        .source
        .canonicalize()
        .unwrap_or_else(|_| options.source.clone())
}
