#![forbid(unsafe_code)]

use std::process::ExitCode;

fn main() -> ExitCode {
    microcheck::init_logging();
    match microcheck::run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("microcheck: {e}");
            ExitCode::from(2)
        }
    }
}
