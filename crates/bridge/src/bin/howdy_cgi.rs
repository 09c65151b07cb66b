//! CGI entry point for the demonstration application.
//!
//! The request is read from the process environment and standard input, the response is
//! written to standard output. Logs go to standard error.

use std::io;
use std::process::ExitCode;

use http::StatusCode;
use micro_bridge::response::status_response;
use micro_bridge::{cgi, controller};
use micro_message::factory::{self, Globals};
use tracing::{Level, error, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).with_writer(io::stderr).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }

    let kernel = match controller::app() {
        Ok(kernel) => kernel,
        Err(e) => {
            error!(cause = %e, "failed to build kernel");
            return ExitCode::FAILURE;
        }
    };

    let response = match factory::from_globals(Globals::default()) {
        Ok(request) => kernel.handle(request),
        Err(e) => {
            warn!(cause = %e, "rejected malformed request");
            status_response(StatusCode::BAD_REQUEST)
        }
    };

    match cgi::write_response(&response, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(cause = %e, "failed to write response");
            ExitCode::FAILURE
        }
    }
}
