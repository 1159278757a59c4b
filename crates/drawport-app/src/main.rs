//! Main application entry point.

use clap::Parser;
use drawport_app::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match pollster::block_on(drawport_app::run(&cli)) {
        Ok(report) => {
            println!("{} ({} page(s))", report.file_name, report.page_count);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
