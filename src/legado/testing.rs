//! Dublês do driver legado para os testes do crate

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use super::driver::{
    BlobHandle, BlobStream, ConnectionOptions, LegacyConnection, LegacyConnector,
    LegacyTransaction,
};
use super::error::{LegacyError, Result};
use super::types::{RawRow, SqlParam};

pub(crate) type EventLog = Arc<Mutex<Vec<String>>>;

fn record(events: &EventLog, event: &str) {
    events.lock().unwrap().push(event.to_string());
}

enum Script {
    Chunks(Vec<Vec<u8>>),
    FailAfter(Vec<Vec<u8>>),
    FailOpen,
    Gated(String, Mutex<Option<oneshot::Receiver<()>>>),
    Panics,
}

pub(crate) struct FakeBlob {
    script: Script,
}

impl FakeBlob {
    pub(crate) fn chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self { script: Script::Chunks(chunks) }
    }

    pub(crate) fn text(text: &str) -> Self {
        Self::chunks(vec![text.as_bytes().to_vec()])
    }

    pub(crate) fn failing_after(chunks: Vec<Vec<u8>>) -> Self {
        Self { script: Script::FailAfter(chunks) }
    }

    pub(crate) fn failing_open() -> Self {
        Self { script: Script::FailOpen }
    }

    pub(crate) fn panicking() -> Self {
        Self { script: Script::Panics }
    }

    /// Stream que só entrega `text` depois do sinal no sender devolvido
    pub(crate) fn gated(text: &str) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let blob = Self {
            script: Script::Gated(text.to_string(), Mutex::new(Some(rx))),
        };
        (blob, tx)
    }
}

#[async_trait]
impl BlobHandle for FakeBlob {
    async fn open(&self, _tx: &dyn LegacyTransaction) -> Result<BlobStream> {
        match &self.script {
            Script::Chunks(chunks) => Ok(stream::iter(chunks.clone().into_iter().map(Ok)).boxed()),
            Script::FailAfter(chunks) => {
                let items = chunks
                    .clone()
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(LegacyError::Blob("conexão perdida".into()))));
                Ok(stream::iter(items).boxed())
            }
            Script::FailOpen => Err(LegacyError::Blob("handle inválido".into())),
            Script::Gated(text, gate) => {
                let rx = gate
                    .lock()
                    .unwrap()
                    .take()
                    .ok_or_else(|| LegacyError::Blob("stream já consumido".into()))?;
                let bytes = text.as_bytes().to_vec();
                Ok(stream::once(async move {
                    let _ = rx.await;
                    Ok(bytes)
                })
                .boxed())
            }
            Script::Panics => panic!("driver corrompido"),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeTransaction {
    pub rows: Vec<RawRow>,
    pub fail_query: bool,
    pub fail_commit: bool,
    pub delay: Option<Duration>,
    pub events: EventLog,
}

impl FakeTransaction {
    pub(crate) fn with_rows(rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }
}

#[async_trait]
impl LegacyTransaction for FakeTransaction {
    async fn query(&self, _sql: &str, _params: &[SqlParam]) -> Result<Vec<RawRow>> {
        record(&self.events, "query");
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_query {
            return Err(LegacyError::Sql("Column unknown: XPTO".into()));
        }
        Ok(self.rows.clone())
    }

    async fn execute(&self, _sql: &str, _params: &[SqlParam]) -> Result<()> {
        record(&self.events, "execute");
        if self.fail_query {
            return Err(LegacyError::Sql("violation of PRIMARY or UNIQUE KEY".into()));
        }
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        record(&self.events, "commit");
        if self.fail_commit {
            return Err(LegacyError::Commit("deadlock".into()));
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        record(&self.events, "rollback");
        Ok(())
    }
}

pub(crate) struct FakeConnection {
    tx: FakeTransaction,
    fail_begin: bool,
    fail_detach: bool,
    attached: Arc<AtomicUsize>,
}

#[async_trait]
impl LegacyConnection for FakeConnection {
    async fn start_transaction(&mut self) -> Result<Box<dyn LegacyTransaction>> {
        record(&self.tx.events, "begin");
        if self.fail_begin {
            return Err(LegacyError::Transaction("lock conflict".into()));
        }
        Ok(Box::new(self.tx.clone()))
    }

    async fn detach(self: Box<Self>) -> Result<()> {
        record(&self.tx.events, "detach");
        self.attached.fetch_sub(1, Ordering::SeqCst);
        if self.fail_detach {
            return Err(LegacyError::Attach("connection shutdown".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeConnector {
    pub tx: FakeTransaction,
    pub fail_attach: bool,
    pub fail_begin: bool,
    pub fail_detach: bool,
    pub attached: Arc<AtomicUsize>,
    pub max_attached: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub(crate) fn new(tx: FakeTransaction) -> Self {
        Self {
            tx,
            ..Self::default()
        }
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.tx.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl LegacyConnector for FakeConnector {
    async fn attach(&self, _options: &ConnectionOptions) -> Result<Box<dyn LegacyConnection>> {
        record(&self.tx.events, "attach");
        if self.fail_attach {
            return Err(LegacyError::Attach("Unable to complete network request".into()));
        }

        let now = self.attached.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_attached.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(FakeConnection {
            tx: self.tx.clone(),
            fail_begin: self.fail_begin,
            fail_detach: self.fail_detach,
            attached: Arc::clone(&self.attached),
        }))
    }
}
