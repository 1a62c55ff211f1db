use std::process::ExitCode;

use clap::Parser;
use log::error;

use clone_lite::{
    cli::{
        args::CloneArgs,
        command_handlers::{do_clone, init_logging},
    },
    config::CloneLiteConfig,
};

fn main() -> ExitCode {
    let args = CloneArgs::parse();
    init_logging(args.verbose);

    let result = CloneLiteConfig::load().and_then(|config| do_clone(args, config));
    match result {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
