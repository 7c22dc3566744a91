use std::process::ExitCode;

use vbc_cli::demo::build_demo_program;
use vbc_cli::{build_app, compile, Options};
use vbc_ir::{Dialect, ObjectFormat};

fn main() -> ExitCode {
    vbc_tracing::init();

    let matches = build_app().get_matches();
    let options = Options::from_matches(&matches);

    if options.preprocess_only {
        eprintln!("preprocessing is not implemented by this back end");
        return ExitCode::FAILURE;
    }

    let mut program = build_demo_program(&options.source, ObjectFormat::Compact, Dialect::Legacy);
    let code = compile(&mut program, &options);

    if code == 0 && options.acc_stats {
        println!(
            "{}: {} variable(s), {} function(s)",
            program.main_library().name,
            program.main_library().vars.len(),
            program.main_library().funcs.len(),
        );
    }

    if code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
