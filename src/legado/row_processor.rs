//! Processamento das linhas cruas do driver
//!
//! Cada campo BLOB de uma linha vira uma leitura independente; todas as
//! leituras da linha (e todas as linhas do lote) ficam em voo ao mesmo tempo e
//! a linha só é montada depois que todas terminam. Campos primitivos passam
//! sem alteração. A linha processada tem exatamente as mesmas colunas, na
//! mesma ordem, da linha crua.

use futures_util::future::join_all;
use tracing::Instrument;

use super::blob_reader::BlobReader;
use super::driver::LegacyTransaction;
use super::types::{FieldValue, ProcessedRow, RawField, RawRow};

/// Processa uma linha, resolvendo todos os BLOBs antes de devolvê-la
pub async fn process_row(
    reader: &BlobReader,
    row: RawRow,
    tx: &dyn LegacyTransaction,
) -> ProcessedRow {
    let fields = row.into_iter().map(|(column, field)| async move {
        let value = match field {
            RawField::Value(value) => value,
            RawField::Blob(handle) => {
                let span = tracing::debug_span!("blob", column = %column);
                reader
                    .read(handle.as_deref(), tx)
                    .instrument(span)
                    .await
                    .map(FieldValue::Text)
                    .unwrap_or(FieldValue::Null)
            }
        };
        (column, value)
    });

    join_all(fields).await.into_iter().collect()
}

/// Processa o lote inteiro; a ordem das linhas é preservada
pub async fn process_rows(
    reader: &BlobReader,
    rows: Vec<RawRow>,
    tx: &dyn LegacyTransaction,
) -> Vec<ProcessedRow> {
    join_all(rows.into_iter().map(|row| process_row(reader, row, tx))).await
}
