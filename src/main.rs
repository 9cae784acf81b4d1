use medupload::{args, run_app, utils::log_utils};

fn main() {
    // Parse and validate command-line arguments
    let args = args::args_checks();

    if let Err(e) = log_utils::init(args.verbose) {
        eprintln!("warn: could not initialize logging: {e}");
    }

    if let Err(e) = run_app(&args) {
        eprintln!("Application error: {e:#}");
        std::process::exit(1);
    }
}
