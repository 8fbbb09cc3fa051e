use clap::Parser;
use payload_formatter::{logging, run, Cli, Config};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(config) => cli.apply(config),
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::from(2);
        }
    };
    logging::init(&config.log_level);
    tracing::debug!(?config, "configuration loaded");

    match run(&cli.command, &config) {
        Ok(output) => {
            println!("{}", output.text);
            if output.complete {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
