//! Detecção de encoding para bytes vindos de BLOBs legados
//!
//! O banco legado mistura conteúdo UTF-8 e Latin-1 sem marcação nenhuma.
//! A decodificação tenta UTF-8 primeiro; se o texto resultante contiver o
//! caractere de substituição (U+FFFD) em qualquer posição, os mesmos bytes são
//! decodificados com o code page de fallback, que nunca falha.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Code page usado quando os bytes não são UTF-8 válido
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    /// ISO-8859-1: cada byte vira o code point de mesmo valor
    #[default]
    Latin1,
    /// Windows-1252: 0x80–0x9F viram aspas/travessões tipográficos
    Windows1252,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Latin1 => write!(f, "latin1"),
            Fallback::Windows1252 => write!(f, "windows1252"),
        }
    }
}

impl FromStr for Fallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latin1" | "latin-1" | "iso-8859-1" | "iso88591" => Ok(Fallback::Latin1),
            "windows1252" | "windows-1252" | "win1252" | "cp1252" => Ok(Fallback::Windows1252),
            other => Err(format!("fallback de encoding desconhecido: {}", other)),
        }
    }
}

/// Decodifica bytes com UTF-8 e fallback Latin-1
///
/// # Exemplos
/// ```
/// use texto_legado::encoding::detect_and_decode;
///
/// assert_eq!(detect_and_decode("Açaí".as_bytes()), "Açaí");
/// assert_eq!(detect_and_decode(&[0x43, 0x61, 0x66, 0xE9]), "Café");
/// assert_eq!(detect_and_decode(&[]), "");
/// ```
pub fn detect_and_decode(bytes: &[u8]) -> String {
    decode_with(bytes, Fallback::Latin1)
}

/// Decodifica bytes com UTF-8 e o fallback informado
pub fn decode_with(bytes: &[u8], fallback: Fallback) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    let utf8 = String::from_utf8_lossy(bytes);
    if !utf8.contains(REPLACEMENT_CHAR) {
        return utf8.into_owned();
    }

    tracing::debug!(
        "🔤 {} bytes não são UTF-8 válido, usando fallback {}",
        bytes.len(),
        fallback
    );

    match fallback {
        Fallback::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        Fallback::Windows1252 => {
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}
