use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Instala o subscriber de logs em stderr; `RUST_LOG` tem prioridade sobre `level`
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Pode já existir subscriber (testes, binários que chamam duas vezes)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_pool_opened(database: &str, pool_size: usize) {
    info!("🗄️ Banco legado '{}' pronto (pool de {} conexões)", database, pool_size);
}

pub fn log_pool_closed() {
    info!("🔒 Pool do banco legado fechado");
}

pub fn log_query_started(sql: &str, params: usize) {
    debug!("▶️ Executando SQL ({} parâmetros): {}", params, compact_sql(sql));
}

pub fn log_query_finished(rows: usize, blobs: usize, duration_ms: u64) {
    info!(
        "✅ Query concluída: {} linhas, {} BLOBs - Duration: {}ms",
        rows, blobs, duration_ms
    );
}

pub fn log_blob_discarded(reason: &str) {
    warn!("⚠️ BLOB ignorado, campo fica sem texto: {}", reason);
}

pub fn log_transaction_aborted(sql: &str, error: &str) {
    error!(
        "❌ Transação desfeita - SQL: {} - Error: {}",
        compact_sql(sql),
        error
    );
}

pub fn log_cleanup_failed(step: &str, error: &str) {
    warn!("⚠️ Falha no {} após erro: {}", step, error);
}

pub fn log_detach_failed(error: &str) {
    warn!("⚠️ Falha ao desanexar conexão: {}", error);
}

pub fn log_row_skipped(reason: &str) {
    warn!("⚠️ Linha de apontamento ignorada: {}", reason);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}

/// SQL em uma linha só, para caber no log
fn compact_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_sql() {
        let sql = "SELECT A.COD\n  FROM APONTAMENTO A\n WHERE A.DATA >= ?";
        assert_eq!(compact_sql(sql), "SELECT A.COD FROM APONTAMENTO A WHERE A.DATA >= ?");
    }
}
