use std::process::ExitCode;

use clap::Parser;
use log::error;

use clone_lite::cli::{
    args::StaleArgs,
    command_handlers::{do_stale_report, init_logging},
};

fn main() -> ExitCode {
    let args = StaleArgs::parse();
    init_logging(args.verbose);

    match do_stale_report(args) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
