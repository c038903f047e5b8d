//! Contratos do driver do banco legado
//!
//! O driver Firebird é um colaborador externo. Este módulo define só o que o
//! núcleo consome dele: anexar, abrir transação, executar SQL, commit/rollback,
//! desanexar, e abrir o stream de um BLOB dentro da transação ativa.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use super::error::Result;
use super::types::{RawRow, SqlParam};

/// Stream de chunks de um BLOB, terminado em fim ou erro
pub type BlobStream = BoxStream<'static, Result<Vec<u8>>>;

/// Parâmetros de conexão entregues ao driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub charset: String,
}

/// Handle de um campo BLOB, válido enquanto a transação que o produziu estiver aberta
#[async_trait]
pub trait BlobHandle: Send + Sync {
    /// Abre o stream do BLOB usando a transação ativa
    async fn open(&self, tx: &dyn LegacyTransaction) -> Result<BlobStream>;
}

#[async_trait]
pub trait LegacyTransaction: Send + Sync {
    /// Executa um SELECT e devolve as linhas cruas, na ordem do driver
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<RawRow>>;

    /// Executa um statement sem retorno de linhas
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<()>;

    async fn commit(&self) -> Result<()>;

    async fn rollback(&self) -> Result<()>;
}

#[async_trait]
pub trait LegacyConnection: Send {
    async fn start_transaction(&mut self) -> Result<Box<dyn LegacyTransaction>>;

    async fn detach(self: Box<Self>) -> Result<()>;
}

/// Fábrica de conexões (o driver propriamente dito)
#[async_trait]
pub trait LegacyConnector: Send + Sync {
    async fn attach(&self, options: &ConnectionOptions) -> Result<Box<dyn LegacyConnection>>;
}
