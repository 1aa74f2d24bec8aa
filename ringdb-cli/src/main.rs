use std::process::ExitCode;

use clap::Parser;

use ringdb::EngineError;
use ringdb::cli::{Cli, commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.global.no_color {
        colored::control::set_override(false);
    }

    let config = match cli.global.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.global.log_filter(&config)),
    )
    .init();

    match commands::run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

/// 3 for data that could not be reconciled, 2 for everything else
fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    if err.chain().any(|cause| cause.is::<EngineError>()) {
        ExitCode::from(3)
    } else {
        ExitCode::from(2)
    }
}
