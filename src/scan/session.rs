use anyhow::{anyhow, Context, Result};
use futures::{Stream, StreamExt};
use log::{debug, info};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::database::{ReferenceSet, ReferenceStorage};
use super::engine::ScanConfirmationEngine;
use super::types::{Classification, DecodeAttempt, ScanStats};

const COMMAND_BUFFER: usize = 64;

enum Command {
    Observe {
        attempt: DecodeAttempt,
        reply: oneshot::Sender<Classification>,
    },
    SetReference(ReferenceSet),
    Reset,
    Stats {
        reply: oneshot::Sender<ScanStats>,
    },
}

/// A confirmation engine owned by its own task.
///
/// Every request goes through one channel, so observations from any number
/// of producers are applied one at a time in arrival order.
pub struct ScanSession {
    handle: SessionHandle,
    task: JoinHandle<ScanConfirmationEngine>,
}

/// Cloneable sender side of a [`ScanSession`]
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl ScanSession {
    /// Move `engine` into a new task on the current runtime
    pub fn spawn(engine: ScanConfirmationEngine) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run(engine, rx));
        Self {
            handle: SessionHandle { tx },
            task,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stop accepting requests and return the engine.
    ///
    /// Waits until every cloned handle has been dropped.
    pub async fn shutdown(self) -> Result<ScanConfirmationEngine> {
        drop(self.handle);
        self.task.await.context("scan session task failed to join")
    }
}

async fn run(mut engine: ScanConfirmationEngine, mut rx: mpsc::Receiver<Command>) -> ScanConfirmationEngine {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Observe { attempt, reply } => {
                let classification = engine.observe(&attempt);
                // Caller may have given up waiting
                let _ = reply.send(classification);
            }
            Command::SetReference(reference) => engine.set_reference(reference),
            Command::Reset => engine.reset(),
            Command::Stats { reply } => {
                let _ = reply.send(engine.stats().clone());
            }
        }
    }

    debug!("Scan session closed");
    engine
}

impl SessionHandle {
    async fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).await.map_err(|_| anyhow!("scan session is closed"))
    }

    /// Feed one frame and wait for its classification
    pub async fn observe(&self, attempt: DecodeAttempt) -> Result<Classification> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Observe { attempt, reply }).await?;
        rx.await.map_err(|_| anyhow!("scan session dropped the request"))
    }

    /// Feed every attempt from `frames`, returning the non-pending results
    pub async fn observe_stream<S>(&self, frames: S) -> Result<Vec<Classification>>
    where
        S: Stream<Item = DecodeAttempt>,
    {
        let mut frames = std::pin::pin!(frames);
        let mut confirmed = Vec::new();

        while let Some(attempt) = frames.next().await {
            let classification = self.observe(attempt).await?;
            if !classification.is_pending() {
                confirmed.push(classification);
            }
        }

        Ok(confirmed)
    }

    pub async fn set_reference(&self, reference: ReferenceSet) -> Result<()> {
        self.send(Command::SetReference(reference)).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(Command::Reset).await
    }

    pub async fn stats(&self) -> Result<ScanStats> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stats { reply }).await?;
        rx.await.map_err(|_| anyhow!("scan session dropped the request"))
    }

    /// Load the reference file on a separate task and install it when done.
    ///
    /// Scanning continues meanwhile; a failed load installs nothing, so
    /// classification keeps using whatever set the session already has.
    pub fn load_reference_in_background(&self, mut storage: ReferenceStorage) -> JoinHandle<Result<()>> {
        let handle = self.clone();
        tokio::spawn(async move {
            let reference = storage.load_async().await?;
            info!("Reference set from {} ready", storage.path().display());
            handle.set_reference(reference).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::types::BarcodeFormat;

    fn frame(code: &str) -> DecodeAttempt {
        DecodeAttempt::detected(code, BarcodeFormat::Code128)
    }

    #[tokio::test]
    async fn test_session_serializes_observations() {
        let session = ScanSession::spawn(ScanConfirmationEngine::with_defaults());
        let handle = session.handle();

        assert_eq!(handle.observe(frame("A")).await.unwrap(), Classification::Pending);
        assert_eq!(handle.observe(frame("A")).await.unwrap(), Classification::Pending);
        assert_eq!(handle.observe(frame("A")).await.unwrap(), Classification::NotInReference("A".into()));

        drop(handle);
        let engine = session.shutdown().await.unwrap();
        assert!(engine.is_accepted("A"));
        assert_eq!(engine.stats().frames, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_handles_share_one_engine() {
        let session = ScanSession::spawn(ScanConfirmationEngine::with_defaults());

        let producers: Vec<_> = (0..2)
            .map(|_| {
                let handle = session.handle();
                tokio::spawn(async move {
                    let mut results = Vec::new();
                    for _ in 0..30 {
                        results.push(handle.observe(frame("A")).await?);
                    }
                    Ok::<_, anyhow::Error>(results)
                })
            })
            .collect();

        let mut confirmed = Vec::new();
        for producer in producers {
            let results = producer.await.unwrap().unwrap();
            confirmed.extend(results.into_iter().filter(|c| !c.is_pending()));
        }

        // 60 agreeing frames confirm A every third frame, whoever sent them
        assert_eq!(confirmed.len(), 20);
        assert_eq!(confirmed.iter().filter(|c| c.is_new()).count(), 1);
        assert!(confirmed.contains(&Classification::NotInReference("A".into())));

        let engine = session.shutdown().await.unwrap();
        assert_eq!(engine.stats().frames, 60);
        assert_eq!(engine.stats().duplicates, 19);
        assert_eq!(engine.accepted().len(), 1);
    }

    #[tokio::test]
    async fn test_reference_installed_mid_session() {
        let session = ScanSession::spawn(ScanConfirmationEngine::with_defaults());
        let handle = session.handle();

        let first = handle.observe_stream(futures::stream::iter(vec![frame("A"); 3])).await.unwrap();
        assert_eq!(first, vec![Classification::NotInReference("A".into())]);

        handle.set_reference(ReferenceSet::from_codes(["B"])).await.unwrap();
        let second = handle.observe_stream(futures::stream::iter(vec![frame("B"); 3])).await.unwrap();
        assert_eq!(second, vec![Classification::FoundInReference("B".into())]);

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.confirmations, 2);

        handle.reset().await.unwrap();
        assert_eq!(handle.stats().await.unwrap(), ScanStats::default());
    }

    #[tokio::test]
    async fn test_failed_background_load_keeps_scanning() {
        let dir = tempfile::tempdir().unwrap();
        let session = ScanSession::spawn(ScanConfirmationEngine::with_defaults());
        let handle = session.handle();

        let load = handle.load_reference_in_background(ReferenceStorage::new(dir.path().join("missing.json")));
        assert!(load.await.unwrap().is_err());

        let results = handle.observe_stream(futures::stream::iter(vec![frame("C"); 3])).await.unwrap();
        assert_eq!(results, vec![Classification::NotInReference("C".into())]);
    }
}
