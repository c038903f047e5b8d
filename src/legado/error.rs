//! Tipos de erro da fronteira com o banco legado

use thiserror::Error;

/// Erros de conexão, transação e SQL do banco legado
///
/// Falhas de um BLOB isolado (`Blob`) nunca chegam ao chamador de
/// `LegacyDatabase`: o leitor de BLOBs as absorve e o campo fica sem texto.
#[derive(Debug, Error)]
pub enum LegacyError {
    /// Não foi possível anexar ao banco
    #[error("Attach failed: {0}")]
    Attach(String),

    /// Não foi possível iniciar (ou desfazer) a transação
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Erro na execução do SQL
    #[error("SQL error: {0}")]
    Sql(String),

    /// Falha no commit
    #[error("Commit failed: {0}")]
    Commit(String),

    /// Falha ao ler o stream de um BLOB
    #[error("BLOB read failed: {0}")]
    Blob(String),

    /// Falha inesperada ao montar as linhas processadas
    #[error("Row processing failed: {0}")]
    Processing(String),

    /// Pool já fechado
    #[error("Legacy database pool is closed")]
    Closed,
}

/// Tipo Result padrão da fronteira legada
pub type Result<T> = std::result::Result<T, LegacyError>;
