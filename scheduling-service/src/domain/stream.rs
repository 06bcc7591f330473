//! Streaming driver: runs the solver on a blocking-pool worker task and
//! yields `base`, then each `alternative`, then `done` to a consumer
//! through a bounded channel, so a slow or abandoned consumer never makes
//! the solver block the async runtime, and never grows memory unbounded.

use shared::types::{SolveRequest, SolveStatus, StreamRecord};
use tokio::sync::mpsc;

use super::error::SchedulerError;
use super::plan_schedule;

/// Buffer depth of the channel between the solver worker task and the
/// consumer. Small on purpose: the producer is supposed to be bounded by
/// the consumer's pace, not race ahead of it.
const CHANNEL_CAPACITY: usize = 4;

/// Spawns the solver onto the blocking pool and returns a receiver that
/// yields the record sequence. Dropping the receiver cancels the
/// producer at its next attempted send.
pub fn stream(request: SolveRequest) -> mpsc::Receiver<StreamRecord> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || plan_schedule(&request)).await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(join_err) => {
                let err = SchedulerError::Internal(join_err.to_string());
                tracing::error!(error = %err, "solver worker task panicked");
                let _ = tx
                    .send(StreamRecord::Status {
                        status: SolveStatus::Error,
                        detail: Some(err.to_string()),
                    })
                    .await;
                let _ = tx.send(StreamRecord::Done).await;
                return;
            }
        };

        if tx
            .send(StreamRecord::Base {
                days: outcome.base.days,
                shifts: outcome.base.shifts,
                stations: outcome.base.stations,
                assignments: outcome.base.assignments,
                status: outcome.base.status,
                objective: outcome.base.objective,
            })
            .await
            .is_err()
        {
            tracing::debug!("consumer dropped before base record; stopping");
            return;
        }

        for (index, assignments) in outcome.alternatives.into_iter().enumerate() {
            let record = StreamRecord::Alternative {
                index: index as u32,
                assignments,
            };
            if tx.send(record).await.is_err() {
                tracing::debug!(index, "consumer dropped mid-stream; stopping");
                return;
            }
        }

        let _ = tx.send(StreamRecord::Done).await;
    });

    rx
}

/// Frames one record as a server-sent-events `data:` line. Pure function:
/// no dependency on any particular HTTP server so an embedding service
/// can map the byte stream onto its own response type.
pub fn frame_sse(record: &StreamRecord) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(record)?;
    Ok(format!("data: {json}\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{Day, ShiftConfig, SiteConfig, StationConfig, Worker};
    use std::collections::HashMap;

    fn trivial_request() -> SolveRequest {
        let mut days = HashMap::new();
        days.insert(Day::Sun, true);
        let station = StationConfig {
            name: "Gate".into(),
            per_day_custom: false,
            days,
            shifts: vec![ShiftConfig {
                name: "06-14".into(),
                enabled: true,
                workers: 1,
                roles: vec![],
            }],
            day_overrides: HashMap::new(),
            uniform_roles: false,
            workers: 0,
            roles: vec![],
        };
        let mut availability = HashMap::new();
        availability.insert(Day::Sun, vec!["06-14".into()]);
        SolveRequest {
            config: SiteConfig {
                stations: vec![station],
            },
            workers: vec![Worker {
                id: "w1".into(),
                name: "Dana".into(),
                max_shifts: 5,
                roles: vec![],
                availability,
            }],
            time_limit_seconds: Some(1),
            max_nights_per_worker: None,
            num_alternatives: Some(0),
            fixed_assignments: None,
            exclude_days: None,
            weekly_availability: None,
        }
    }

    #[tokio::test]
    async fn base_is_emitted_before_done() {
        let mut rx = stream(trivial_request());
        let first = rx.recv().await.expect("base record");
        assert!(matches!(first, StreamRecord::Base { .. }));

        let mut saw_done = false;
        while let Some(record) = rx.recv().await {
            if matches!(record, StreamRecord::Done) {
                saw_done = true;
                break;
            }
        }
        assert!(saw_done);
    }

    #[tokio::test]
    async fn dropping_the_receiver_does_not_hang_the_producer() {
        let rx = stream(trivial_request());
        drop(rx);
        // the producer task should observe the closed channel on its next
        // send and exit; nothing to assert beyond "this test completes".
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[test]
    fn sse_framing_wraps_json_with_data_prefix_and_blank_line() {
        let record = StreamRecord::Done;
        let framed = frame_sse(&record).unwrap();
        assert!(framed.starts_with("data: "));
        assert!(framed.ends_with("\n\n"));
    }
}
