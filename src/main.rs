use clap::Parser;
use devx::cli::{self, Args};
use devx::core::error::{AppError, DefaultErrorReporter, ErrorReporter};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let _logging = match devx::logging::init(&args.command) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {:#}", err);
            None
        }
    };

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AppError>() {
                Some(app_error) => DefaultErrorReporter::new().report_error(app_error),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
