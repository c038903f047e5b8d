//! Leitura de BLOBs do banco legado
//!
//! Drena o stream de chunks de um campo, concatena na ordem de chegada e passa
//! o buffer pelo pipeline de `texto_legado`. Qualquer falha (handle ausente,
//! erro ao abrir, erro no meio do stream, timeout) resolve para `None`: um BLOB
//! ilegível nunca derruba a linha nem a query.

use futures_util::StreamExt;
use std::time::Duration;
use texto_legado::Fallback;

use super::driver::{BlobHandle, LegacyTransaction};
use super::error::Result;
use crate::utils::logging::log_blob_discarded;

#[derive(Debug, Clone, Default)]
pub struct BlobReader {
    fallback: Fallback,
    timeout: Option<Duration>,
}

impl BlobReader {
    pub fn new(fallback: Fallback) -> Self {
        Self {
            fallback,
            timeout: None,
        }
    }

    /// Limite por campo; sem ele um stream travado segura a linha indefinidamente
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Lê o BLOB e devolve o texto limpo
    ///
    /// `None` significa "sem texto disponível": handle ausente, falha de leitura
    /// ou texto vazio depois da limpeza.
    pub async fn read(
        &self,
        handle: Option<&dyn BlobHandle>,
        tx: &dyn LegacyTransaction,
    ) -> Option<String> {
        let handle = handle?;

        let drained = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, drain(handle, tx)).await {
                Ok(result) => result,
                Err(_) => {
                    log_blob_discarded(&format!("timeout de {}ms", limit.as_millis()));
                    return None;
                }
            },
            None => drain(handle, tx).await,
        };

        let bytes = match drained {
            Ok(bytes) => bytes,
            Err(e) => {
                log_blob_discarded(&e.to_string());
                return None;
            }
        };

        let text = texto_legado::recover_text(&bytes, self.fallback);
        tracing::debug!(
            "📄 BLOB lido: {} bytes -> {} caracteres",
            bytes.len(),
            text.chars().count()
        );

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

async fn drain(handle: &dyn BlobHandle, tx: &dyn LegacyTransaction) -> Result<Vec<u8>> {
    let mut stream = handle.open(tx).await?;
    let mut chunks: Vec<Vec<u8>> = Vec::new();

    while let Some(chunk) = stream.next().await {
        chunks.push(chunk?);
    }

    Ok(chunks.concat())
}
