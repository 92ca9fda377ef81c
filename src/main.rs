use clap::Parser;
use std::process;

use tasktree::cli;
use tasktree::cli::commands::{Cli, Commands};

fn main() {
    let cli_args = Cli::parse();
    let json_output = cli_args.json;

    let exit_code = match cli_args.command {
        Commands::Init => cli::init::run(json_output),
        Commands::Task(cmd) => cli::task::run(cmd, json_output),
        Commands::Prioritize { state } => cli::view::run_prioritize(state, json_output),
        Commands::View(cmd) => cli::view::run(cmd, json_output),
        Commands::Share(cmd) => cli::share::run(cmd, json_output),
        Commands::Export { output } => cli::data::run_export(output.as_deref(), json_output),
        Commands::Import { file } => cli::data::run_import(file.as_deref(), json_output),
        Commands::Stats => cli::stats::run(json_output),
        Commands::Settings(cmd) => cli::settings::run(cmd, json_output),
    };

    process::exit(exit_code);
}
