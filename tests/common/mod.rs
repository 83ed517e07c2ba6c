//! Common test utilities for integration tests.
//!
//! Builds a client pointed at a wiremock server and a callback table that
//! records every invocation as a line of text.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatflow_client::adapters::mock::RecordingNotifier;
use chatflow_client::adapters::ReqwestTransport;
use chatflow_client::{ChatflowClient, ClientConfig, StreamHandlers};
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-app-key";
pub const TEST_USER: &str = "tester";

/// Client against `server` with the reqwest transport and a recording sink.
pub fn client_for(server: &MockServer) -> (ChatflowClient, Arc<RecordingNotifier>) {
    client_with_timeout(server, Duration::from_secs(180))
}

pub fn client_with_timeout(
    server: &MockServer,
    timeout: Duration,
) -> (ChatflowClient, Arc<RecordingNotifier>) {
    let config = ClientConfig::default()
        .with_base_url(format!("{}/v1", server.uri()))
        .with_api_key(TEST_API_KEY)
        .with_user(TEST_USER)
        .with_timeout(timeout);
    let notifier = Arc::new(RecordingNotifier::new());
    let client =
        ChatflowClient::with_parts(config, Arc::new(ReqwestTransport::new()), notifier.clone());
    (client, notifier)
}

/// Shared log of callback invocations.
#[derive(Clone, Default)]
pub struct CallbackLog(Arc<Mutex<Vec<String>>>);

impl CallbackLog {
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    /// Handlers for every slot, each appending one line.
    pub fn handlers(&self) -> StreamHandlers {
        let data = self.clone();
        let thought = self.clone();
        let end = self.clone();
        let replace = self.clone();
        let workflow_started = self.clone();
        let workflow_finished = self.clone();
        let node_started = self.clone();
        let node_finished = self.clone();
        let error = self.clone();
        let completed = self.clone();

        StreamHandlers::new()
            .on_data(move |text, first, info| {
                data.push(match info.error_message {
                    Some(err) => format!("data-error:{}", err),
                    None => format!("data:{}:{}", text, first),
                })
            })
            .on_thought(move |t| thought.push(format!("thought:{}", t.thought)))
            .on_message_end(move |e| end.push(format!("end:{}", e.id.unwrap_or_default())))
            .on_message_replace(move |r| replace.push(format!("replace:{}", r.answer)))
            .on_workflow_started(move |w| {
                workflow_started.push(format!(
                    "workflow_started:{}",
                    w.workflow_run_id.unwrap_or_default()
                ))
            })
            .on_workflow_finished(move |w| {
                workflow_finished.push(format!(
                    "workflow_finished:{}",
                    w.data.status.unwrap_or_default()
                ))
            })
            .on_node_started(move |n| node_started.push(format!("node_started:{}", n.data.node_id)))
            .on_node_finished(move |n| {
                node_finished.push(format!("node_finished:{}", n.data.node_id))
            })
            .on_error(move |msg, code| {
                error.push(format!("error:{}:{}", msg, code.unwrap_or_default()))
            })
            .on_completed(move |has_error| completed.push(format!("completed:{}", has_error)))
    }
}

/// Join frames into an event-stream body.
pub fn sse_body(frames: &[&str]) -> String {
    frames
        .iter()
        .map(|frame| format!("data: {}\n\n", frame))
        .collect()
}
