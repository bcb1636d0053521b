//! Binary entrypoint for the agency chat server.

use std::process::ExitCode;

use agency_chat::start_agency_chat;

fn main() -> ExitCode {
    start_agency_chat::run()
}
