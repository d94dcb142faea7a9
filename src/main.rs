//! bdcrm CLI entry point. All work is delegated to `bdcrm_lib::cli`.

use bdcrm_lib::cli;
use bdcrm_lib::error::ErrorPayload;

fn main() {
    if let Err(e) = cli::run() {
        let payload = ErrorPayload::from(&e);
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", e),
        }
        std::process::exit(1);
    }
}
