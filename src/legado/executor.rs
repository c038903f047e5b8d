//! Execução de SQL no banco legado
//!
//! Cada chamada segue o mesmo ciclo: anexar, abrir transação, executar,
//! processar as linhas (BLOBs lidos dentro da transação), commit, desanexar.
//! Qualquer falha depois do attach desfaz a transação e desanexa a conexão
//! antes de devolver o erro. O número de conexões anexadas ao mesmo tempo é
//! limitado por um semáforo do tamanho do pool.

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use super::blob_reader::BlobReader;
use super::driver::{ConnectionOptions, LegacyConnection, LegacyConnector, LegacyTransaction};
use super::error::{LegacyError, Result};
use super::row_processor::process_rows;
use super::types::{ProcessedRow, RawRow, SqlParam};
use crate::config::LegacySettings;
use crate::utils::logging::{
    log_cleanup_failed, log_detach_failed, log_pool_closed, log_pool_opened, log_query_finished,
    log_query_started, log_transaction_aborted,
};

#[derive(Debug, Clone, Copy)]
enum Statement {
    Query,
    Execute,
}

struct Pool {
    connector: Arc<dyn LegacyConnector>,
    options: ConnectionOptions,
    reader: BlobReader,
    permits: Semaphore,
}

/// Pool de acesso ao banco legado
///
/// Clonar é barato; todos os clones compartilham o mesmo limite de conexões.
#[derive(Clone)]
pub struct LegacyDatabase {
    pool: Arc<Pool>,
}

impl LegacyDatabase {
    pub fn open(connector: Arc<dyn LegacyConnector>, settings: &LegacySettings) -> Self {
        let options = settings.connection_options();
        let pool_size = settings.pool_size();
        let reader = BlobReader::new(settings.text_fallback).with_timeout(settings.blob_timeout());

        log_pool_opened(&options.database, pool_size);

        Self {
            pool: Arc::new(Pool {
                connector,
                options,
                reader,
                permits: Semaphore::new(pool_size),
            }),
        }
    }

    /// Fecha o pool: chamadas novas falham com `LegacyError::Closed`,
    /// as que já estão em andamento terminam normalmente
    pub fn close(&self) {
        if !self.pool.permits.is_closed() {
            self.pool.permits.close();
            log_pool_closed();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pool.permits.is_closed()
    }

    /// Executa um SELECT e devolve as linhas com os BLOBs já convertidos em texto
    pub async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<ProcessedRow>> {
        self.run(Statement::Query, sql, params).await
    }

    /// Executa um statement sem linhas de retorno, dentro da mesma disciplina de transação
    pub async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<()> {
        self.run(Statement::Execute, sql, params).await.map(|_| ())
    }

    async fn run(
        &self,
        statement: Statement,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<ProcessedRow>> {
        let _permit = self
            .pool
            .permits
            .acquire()
            .await
            .map_err(|_| LegacyError::Closed)?;

        log_query_started(sql, params.len());
        let started = Instant::now();

        let mut connection = self.pool.connector.attach(&self.pool.options).await?;

        let tx = match connection.start_transaction().await {
            Ok(tx) => tx,
            Err(e) => {
                log_transaction_aborted(sql, &e.to_string());
                detach_after_error(connection).await;
                return Err(e);
            }
        };

        let (rows, blobs) = match self.perform(statement, sql, params, tx.as_ref()).await {
            Ok(result) => result,
            Err(e) => {
                log_transaction_aborted(sql, &e.to_string());
                rollback(tx.as_ref()).await;
                detach_after_error(connection).await;
                return Err(e);
            }
        };

        if let Err(e) = tx.commit().await {
            log_transaction_aborted(sql, &e.to_string());
            rollback(tx.as_ref()).await;
            detach_after_error(connection).await;
            return Err(e);
        }

        // Commit já feito: falha no detach não invalida o resultado
        drop(tx);
        if let Err(e) = connection.detach().await {
            log_detach_failed(&e.to_string());
        }

        log_query_finished(rows.len(), blobs, started.elapsed().as_millis() as u64);
        Ok(rows)
    }

    async fn perform(
        &self,
        statement: Statement,
        sql: &str,
        params: &[SqlParam],
        tx: &dyn LegacyTransaction,
    ) -> Result<(Vec<ProcessedRow>, usize)> {
        match statement {
            Statement::Execute => {
                tx.execute(sql, params).await?;
                Ok((Vec::new(), 0))
            }
            Statement::Query => {
                let raw = tx.query(sql, params).await?;
                let blobs = raw.iter().map(RawRow::blob_count).sum();

                let rows = AssertUnwindSafe(process_rows(&self.pool.reader, raw, tx))
                    .catch_unwind()
                    .await
                    .map_err(|panic| LegacyError::Processing(panic_message(panic)))?;

                Ok((rows, blobs))
            }
        }
    }
}

async fn rollback(tx: &dyn LegacyTransaction) {
    if let Err(e) = tx.rollback().await {
        log_cleanup_failed("rollback", &e.to_string());
    }
}

async fn detach_after_error(connection: Box<dyn LegacyConnection>) {
    if let Err(e) = connection.detach().await {
        log_cleanup_failed("detach", &e.to_string());
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic sem mensagem".to_string()
    }
}
