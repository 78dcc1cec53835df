//! Campus relay binary: forwards chat messages to the Rasa webhook.
//! Run with: cargo run --bin campus-relay

use std::process::ExitCode;

use campus_assistant::start_relay;

fn main() -> ExitCode {
    start_relay::run()
}
