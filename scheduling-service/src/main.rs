use std::io::{self, Read, Write};

use scheduling_service::domain::error::SchedulerError;
use scheduling_service::domain::stream::{frame_sse, stream};
use shared::types::{SolveRequest, StreamRecord};

/// Reads a [`SolveRequest`] as JSON from stdin, runs the streaming
/// driver, and writes each record to stdout as an SSE-framed line. This
/// crate has no HTTP server of its own; an embedding service wires the
/// same `stream`/`frame_sse` functions onto its own request/response
/// types.
#[tokio::main]
async fn main() {
    let _guard = shared::telemetry::init_telemetry("scheduling-service");

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        tracing::error!(error = %e, "failed to read request from stdin");
        std::process::exit(1);
    }

    let request: SolveRequest = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => {
            let err = SchedulerError::InvalidRequest(e.to_string());
            tracing::error!(error = %err, "failed to parse request");
            std::process::exit(1);
        }
    };

    let mut rx = stream(request);
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    while let Some(record) = rx.recv().await {
        let done = matches!(record, StreamRecord::Done);
        match frame_sse(&record) {
            Ok(frame) => {
                if let Err(e) = handle.write_all(frame.as_bytes()) {
                    tracing::error!(error = %e, "failed to write stream record");
                    break;
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to serialize stream record"),
        }
        if done {
            break;
        }
    }
}
