//! Recuperação de texto legado
//!
//! Converte o conteúdo de BLOBs do banco legado (gravados sob outro code page
//! e com HTML do editor antigo) em texto UTF-8 limpo:
//!
//! ```text
//! bytes -> encoding (UTF-8 / fallback) -> strip_html -> repair_corruption
//! ```
//!
//! Todas as funções são totais: nunca falham, para qualquer entrada.

pub mod encoding;
pub mod html;
pub mod reparo;

pub use encoding::{decode_with, detect_and_decode, Fallback};
pub use html::strip_html;
pub use reparo::repair_corruption;

/// Limpa texto já decodificado: remove HTML e repara o encoding
///
/// # Exemplos
/// ```
/// use texto_legado::clean_text;
///
/// assert_eq!(clean_text("<p>Pedido &amp; CafÃ©</p>"), "Pedido & Café");
/// ```
pub fn clean_text(texto: &str) -> String {
    repair_corruption(&strip_html(texto))
}

/// Pipeline completo para o buffer de um campo BLOB
pub fn recover_text(bytes: &[u8], fallback: Fallback) -> String {
    clean_text(&decode_with(bytes, fallback))
}
