use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::collect::Entry;
use crate::serialize::{serialize_entries, ProblemRecord};
use crate::{Error, ErrorKind, Result, SerializeOptions};

/// The single message posted to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    pub form_data: Vec<Entry>,
    pub options: SerializeOptions,
}

/// Messages a worker posts back. Only `Success` and `Failure` settle a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerMessage {
    Progress {
        #[serde(rename = "__debug")]
        debug: String,
    },
    Success {
        result: Value,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        problems: Vec<ProblemRecord>,
    },
    Failure {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
        /// Set when the failure is a crate error, so the caller can rebuild it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<ErrorKind>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },
}

/// Both ends of a worker connection, seen from the caller. Messages are JSON text.
#[derive(Debug)]
pub struct WorkerChannel {
    pub outbound: UnboundedSender<String>,
    pub inbound: UnboundedReceiver<String>,
}

impl WorkerChannel {
    pub fn new(outbound: UnboundedSender<String>, inbound: UnboundedReceiver<String>) -> Self {
        Self { outbound, inbound }
    }
}

/// Something able to start an isolated worker.
pub trait WorkerFacility: Send + Sync {
    /// Capability probe consulted before every call.
    fn is_available(&self) -> bool {
        true
    }

    fn spawn(&self) -> Result<WorkerChannel>;
}

/// Runs each request on a fresh OS thread that only sees the JSON it is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadWorker;

impl WorkerFacility for ThreadWorker {
    fn spawn(&self) -> Result<WorkerChannel> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        thread::Builder::new()
            .name("formpath-worker".to_string())
            .spawn(move || worker_main(request_rx, reply_tx))
            .map_err(|err| Error::worker_transport(format!("failed to spawn worker: {err}")))?;
        Ok(WorkerChannel::new(request_tx, reply_rx))
    }
}

/// Worker loop: answer every request until the caller hangs up.
pub fn worker_main(mut requests: UnboundedReceiver<String>, replies: UnboundedSender<String>) {
    while let Some(raw) = requests.blocking_recv() {
        let reply = handle_request(&raw, &replies);
        if !post(&replies, &reply) {
            break;
        }
    }
}

fn handle_request(raw: &str, replies: &UnboundedSender<String>) -> WorkerMessage {
    let request: WorkerRequest = match serde_json::from_str(raw) {
        Ok(request) => request,
        Err(err) => {
            return WorkerMessage::Failure {
                error: format!("malformed worker request: {err}"),
                stack: None,
                kind: None,
                key: None,
            }
        }
    };
    // A closed reply channel surfaces on the final post.
    post(
        replies,
        &WorkerMessage::Progress {
            debug: format!("received {} entries", request.form_data.len()),
        },
    );
    match serialize_entries(request.form_data, &request.options) {
        Ok(out) => WorkerMessage::Success {
            result: out.tree,
            problems: out.problems,
        },
        Err(err) => WorkerMessage::Failure {
            stack: err.key.as_ref().map(|key| format!("while building field {key}")),
            kind: Some(err.kind),
            key: err.key,
            error: err.message,
        },
    }
}

/// False once the caller has hung up.
fn post(replies: &UnboundedSender<String>, message: &WorkerMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(text) => replies.send(text).is_ok(),
        Err(_) => false,
    }
}
