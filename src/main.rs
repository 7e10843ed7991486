use std::io;
use std::process::ExitCode;

use lockbench::{DEFAULT_MATRIX, write_report};

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    match write_report(&mut stdout, &DEFAULT_MATRIX) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lockbench: {err}");
            ExitCode::FAILURE
        }
    }
}
