use std::process::ExitCode;

use chamber_cad::{parse_args, run, Command, USAGE};
use chamber_kernel::{Kernel, TruckKernel};
use chamber_models::all_models;
use env_logger::{Builder, Target};
use log::LevelFilter;

fn main() -> ExitCode {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();
    builder.target(Target::Stdout);
    builder.init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Command::List) => {
            for model in all_models() {
                println!("{}", model.name());
            }
            return ExitCode::SUCCESS;
        }
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Ok(Command::Run(args)) => args,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&args, &|| Box::new(TruckKernel::new()) as Box<dyn Kernel>) {
        Ok(report) => {
            for (tag, reason) in &report.failed {
                log::warn!("{tag} was not written: {reason}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
