use PlasmaNH3::cli::cli_main::run_interactive_menu;
use PlasmaNH3::cli::cli_plasma_ivp::run_task_file;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::process::ExitCode;

pub fn main() -> ExitCode {
    if TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .is_err()
    {
        eprintln!("logger already initialized");
    }
    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        // PlasmaNH3 run task.txt
        Some("run") => match args.get(2) {
            Some(file) => match run_task_file(file) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            },
            None => {
                eprintln!("usage: PlasmaNH3 run <task file>");
                ExitCode::FAILURE
            }
        },
        Some(other) => {
            eprintln!("unknown command '{}'; usage: PlasmaNH3 [run <task file>]", other);
            ExitCode::FAILURE
        }
        None => {
            run_interactive_menu();
            ExitCode::SUCCESS
        }
    }
}
