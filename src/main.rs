//! syscollector CLI entry point
//!
//! All logic lives in the cli module. Failures are reported as a JSON error
//! object on stdout plus a line on stderr, and exit non-zero.

use syscollector::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        let _ = cli::write_error(e.code(), &e.to_string());
        std::process::exit(1);
    }
}
