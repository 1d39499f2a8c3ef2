use human_panic::{metadata, setup_panic};
use log::error;
use sodra::cli::run_cli;
use sodra::log::is_logger_initialised;

fn main() {
    setup_panic!(metadata!().support(
        "Please report this crash, including the report file, to the sodra maintainers"
    ));

    if let Err(err) = run_cli() {
        if is_logger_initialised() {
            error!("{err:?}");
        } else {
            eprintln!("Error: {err:?}");
        }

        // Terminate program, signalling an error
        std::process::exit(1);
    }
}
