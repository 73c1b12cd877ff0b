//! Register of Information auditor CLI.

use clap::Parser;

use roi_cli::cli::{Cli, Command};
use roi_cli::commands::{
    EXIT_CLEAN, EXIT_FAILURE, exit_code, run_modules, run_rules, run_validate,
    run_verify_standards,
};
use roi_cli::logging::init_logging;
use roi_cli::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FAILURE);
    }
    let standards_dir = cli.standards_dir.as_deref();
    let result = match &cli.command {
        Command::Validate(args) => run_validate(args, standards_dir).map(|run| {
            print_summary(&run);
            exit_code(&run.report, args.fail_on.into())
        }),
        Command::Modules => run_modules(standards_dir).map(|()| EXIT_CLEAN),
        Command::Rules(args) => run_rules(args, standards_dir).map(|()| EXIT_CLEAN),
        Command::VerifyStandards => run_verify_standards(standards_dir).map(|()| EXIT_CLEAN),
    };
    let exit_code = result.unwrap_or_else(|error| {
        eprintln!("error: {error:#}");
        EXIT_FAILURE
    });
    std::process::exit(exit_code);
}
