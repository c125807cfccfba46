//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

#[expect(
    clippy::print_stderr,
    reason = "fatal errors are reported on stderr before exiting"
)]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = databus_cli::run() {
        eprintln!("databus: {err}");
        std::process::exit(1);
    }
}
