//! proj - find, inspect and jump between local projects

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = proj_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
