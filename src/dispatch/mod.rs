//! Running the serialization pipeline inline or on an isolated worker, bounded
//! by a timeout.
//!
//! The offloaded path never fails on transport problems: if the worker cannot
//! be started, hangs up, or answers with something undecodable, the same
//! entries are serialized inline instead. Only a timeout or a worker-reported
//! failure reject the call.

mod worker;

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::collect::{collect, Entry, FormSource};
use crate::serialize::{serialize_entries, Serialized};
use crate::{Error, ErrorKind, Result, SerializeOptions};

pub use worker::{
    worker_main, ThreadWorker, WorkerChannel, WorkerFacility, WorkerMessage, WorkerRequest,
};

/// One way of turning collected entries into a document.
pub trait Pipeline {
    fn run(
        &self,
        entries: Vec<Entry>,
        options: SerializeOptions,
    ) -> impl Future<Output = Result<Serialized>> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InlinePipeline;

impl Pipeline for InlinePipeline {
    fn run(
        &self,
        entries: Vec<Entry>,
        options: SerializeOptions,
    ) -> impl Future<Output = Result<Serialized>> + Send {
        std::future::ready(serialize_entries(entries, &options))
    }
}

#[derive(Clone)]
pub struct OffloadedPipeline {
    facility: Arc<dyn WorkerFacility>,
}

impl OffloadedPipeline {
    pub fn new(facility: Arc<dyn WorkerFacility>) -> Self {
        Self { facility }
    }

    async fn exchange(&self, request: String) -> Result<Serialized> {
        let WorkerChannel {
            outbound,
            mut inbound,
        } = self.facility.spawn()?;
        outbound
            .send(request)
            .map_err(|_| Error::worker_transport("worker hung up before the request was posted"))?;
        drop(outbound);

        while let Some(raw) = inbound.recv().await {
            match serde_json::from_str::<WorkerMessage>(&raw) {
                Ok(WorkerMessage::Progress { debug: note }) => debug!(worker = %note, "worker progress"),
                Ok(WorkerMessage::Success { result, problems }) => {
                    return Ok(Serialized {
                        tree: result,
                        problems,
                    })
                }
                Ok(WorkerMessage::Failure {
                    error,
                    stack,
                    kind,
                    key,
                }) => {
                    if let Some(stack) = stack {
                        debug!(%stack, "worker failure trace");
                    }
                    let err = match kind {
                        Some(kind) => Error::reported(kind, error),
                        None => Error::worker(error),
                    };
                    return Err(match key {
                        Some(key) => err.with_key(key),
                        None => err,
                    });
                }
                Err(err) => {
                    return Err(Error::worker_transport(format!(
                        "undecodable worker message: {err}"
                    )))
                }
            }
        }
        Err(Error::worker_transport("worker exited without a result"))
    }
}

impl Pipeline for OffloadedPipeline {
    fn run(
        &self,
        entries: Vec<Entry>,
        options: SerializeOptions,
    ) -> impl Future<Output = Result<Serialized>> + Send {
        async move {
            let request = WorkerRequest {
                form_data: entries,
                options,
            };
            let offloaded = match serde_json::to_string(&request) {
                Ok(text) => {
                    match tokio::time::timeout(request.options.timeout(), self.exchange(text)).await {
                        Ok(outcome) => outcome,
                        Err(_) => return Err(Error::timeout(request.options.timeout_ms)),
                    }
                }
                Err(err) => Err(Error::worker_transport(format!(
                    "failed to encode worker request: {err}"
                ))),
            };
            match offloaded {
                Err(err) if err.kind == ErrorKind::WorkerTransport => {
                    warn!(error = %err, "worker unavailable, serializing inline");
                    serialize_entries(request.form_data, &request.options)
                }
                outcome => outcome,
            }
        }
    }
}

/// Chooses between the inline and offloaded pipelines at call time.
#[derive(Clone)]
pub struct Dispatcher {
    facility: Option<Arc<dyn WorkerFacility>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Offload to a [`ThreadWorker`].
    pub fn new() -> Self {
        Self::with_facility(Arc::new(ThreadWorker))
    }

    pub fn inline() -> Self {
        Self { facility: None }
    }

    pub fn with_facility(facility: Arc<dyn WorkerFacility>) -> Self {
        Self {
            facility: Some(facility),
        }
    }

    pub async fn serialize<S>(&self, source: &S, options: &SerializeOptions) -> Result<Serialized>
    where
        S: FormSource + ?Sized,
    {
        let entries = collect(source, options);
        self.serialize_entries(entries, options).await
    }

    /// Entries are processed in the given order on either path.
    pub async fn serialize_entries(
        &self,
        entries: Vec<Entry>,
        options: &SerializeOptions,
    ) -> Result<Serialized> {
        match &self.facility {
            Some(facility) if facility.is_available() => {
                debug!(entries = entries.len(), "offloading serialization");
                OffloadedPipeline::new(Arc::clone(facility))
                    .run(entries, options.clone())
                    .await
            }
            _ => {
                debug!(entries = entries.len(), "serializing inline");
                InlinePipeline.run(entries, options.clone()).await
            }
        }
    }
}

/// Serialize `source` on a worker thread, bounded by `options.timeout()`.
pub async fn serialize_bounded<S>(source: &S, options: &SerializeOptions) -> Result<Serialized>
where
    S: FormSource + ?Sized,
{
    Dispatcher::new().serialize(source, options).await
}
