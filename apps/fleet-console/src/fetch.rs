//! Background requests and their completions.
//!
//! Requests run as tokio tasks and report back over an mpsc channel, tagged
//! with a request id and the owner that started them. The UI loop drains the
//! channel between frames. Cancelling an owner aborts its tasks; results that
//! still arrive for a forgotten id are dropped.

use std::collections::HashMap;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::api::ApiResponse;
use crate::error::ConsoleResult;
use crate::routes::Screen;

pub type RequestId = u64;

/// Who started a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Token refresh and other session traffic
    Session,
    Page(Screen),
}

/// A finished request.
#[derive(Debug)]
pub struct FetchResult {
    pub id: RequestId,
    pub owner: Owner,
    /// What the owner asked for, e.g. `"search"`
    pub tag: &'static str,
    pub result: ConsoleResult<ApiResponse>,
}

struct InFlight {
    owner: Owner,
    abort: AbortHandle,
}

pub struct Fetcher {
    tx: mpsc::UnboundedSender<FetchResult>,
    rx: mpsc::UnboundedReceiver<FetchResult>,
    next_id: RequestId,
    in_flight: HashMap<RequestId, InFlight>,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            next_id: 1,
            in_flight: HashMap::new(),
        }
    }

    /// Run a request in the background. Must be called inside a tokio runtime.
    pub fn spawn<F>(&mut self, owner: Owner, tag: &'static str, request: F) -> RequestId
    where
        F: Future<Output = ConsoleResult<ApiResponse>> + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = request.await;
            // The receiver only goes away at shutdown.
            let _ = tx.send(FetchResult {
                id,
                owner,
                tag,
                result,
            });
        });

        self.in_flight.insert(
            id,
            InFlight {
                owner,
                abort: handle.abort_handle(),
            },
        );
        tracing::debug!(id, ?owner, tag, "request started");
        id
    }

    /// Abort everything an owner has in flight. Returns how many were aborted.
    pub fn cancel(&mut self, owner: Owner) -> usize {
        let ids: Vec<RequestId> = self
            .in_flight
            .iter()
            .filter(|(_, f)| f.owner == owner)
            .map(|(id, _)| *id)
            .collect();

        for id in &ids {
            if let Some(flight) = self.in_flight.remove(id) {
                flight.abort.abort();
            }
        }
        if !ids.is_empty() {
            tracing::debug!(?owner, count = ids.len(), "requests cancelled");
        }
        ids.len()
    }

    pub fn is_pending(&self, id: RequestId) -> bool {
        self.in_flight.contains_key(&id)
    }

    /// Number of requests an owner has in flight.
    pub fn pending(&self, owner: Owner) -> usize {
        self.in_flight.values().filter(|f| f.owner == owner).count()
    }

    /// Take every completion that arrived, without waiting.
    pub fn drain(&mut self) -> Vec<FetchResult> {
        let mut finished = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            if let Some(result) = self.accept(result) {
                finished.push(result);
            }
        }
        finished
    }

    /// Wait for the next completion of a live request.
    pub async fn next(&mut self) -> Option<FetchResult> {
        loop {
            let result = self.rx.recv().await?;
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
    }

    fn accept(&mut self, result: FetchResult) -> Option<FetchResult> {
        if self.in_flight.remove(&result.id).is_some() {
            Some(result)
        } else {
            tracing::debug!(id = result.id, owner = ?result.owner, "dropping result of cancelled request");
            None
        }
    }
}
