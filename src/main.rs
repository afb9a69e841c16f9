use clap::Parser;
use extsort::cli::{Cli, run_cli};
use extsort::logging::init_logger;
use extsort::output::OutputFormatter;
use std::process;

fn main() {
    let args = Cli::parse();
    init_logger(args.verbose);

    let json = args.json;
    let (command, directory) = args.command.into_parts();

    if let Err(e) = run_cli(command, &directory, json) {
        OutputFormatter::error(&e);
        process::exit(1);
    }
}
