pub mod types;
mod validators;

pub use types::*;

use clap::Parser;
use std::process;

/// Parse command line arguments and exit with a message if they are invalid
#[must_use]
pub fn args_checks() -> Args {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    args
}
