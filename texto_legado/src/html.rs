//! Remoção de HTML das observações legadas
//!
//! O editor rich-text antigo gravava HTML nos BLOBs e a exportação deixava
//! pontuação solta depois de remover as tags. A ordem das regras importa:
//! as regras de pontuação assumem que tags e entidades já foram resolvidas.

use once_cell::sync::Lazy;
use regex::Regex;

/// Blocos com conteúdo, depois tags restantes
static REGRAS_TAGS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    compilar(&[
        (r"(?is)<script\b[^>]*>.*?</script\s*>", ""),
        (r"(?is)<style\b[^>]*>.*?</style\s*>", ""),
        (r"<[^>]*>", " "),
    ])
});

/// `&amp;` por último, senão `&amp;lt;` viraria `<`
const ENTIDADES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

static REGRAS_PONTUACAO: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    compilar(&[
        (r",{2,}", ","),
        (r#""(?:\s*")+"#, "\""),
        (r#",""#, " \""),
        (r#"","#, "\" "),
        (r#"^[\s,"]+|[\s,"]+$"#, ""),
        (r"\s+", " "),
    ])
});

fn compilar(regras: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    regras
        .iter()
        .filter_map(|(padrao, substituto)| match Regex::new(padrao) {
            Ok(re) => Some((re, *substituto)),
            Err(e) => {
                tracing::error!("❌ Regex inválida '{}': {}", padrao, e);
                None
            }
        })
        .collect()
}

fn aplicar(regras: &[(Regex, &'static str)], texto: String) -> String {
    regras.iter().fold(texto, |acc, (re, substituto)| {
        re.replace_all(&acc, *substituto).into_owned()
    })
}

/// Remove tags, scripts, estilos e entidades, devolvendo texto plano
///
/// # Exemplos
/// ```
/// use texto_legado::html::strip_html;
///
/// assert_eq!(strip_html("<p>Hello &amp; World</p>"), "Hello & World");
/// assert_eq!(strip_html("<script>alert(1)</script>Visible"), "Visible");
/// assert_eq!(strip_html(""), "");
/// ```
pub fn strip_html(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let sem_tags = aplicar(&REGRAS_TAGS, input.to_string());
    let sem_entidades = ENTIDADES
        .iter()
        .fold(sem_tags, |acc, (entidade, literal)| acc.replace(entidade, literal));

    aplicar(&REGRAS_PONTUACAO, sem_entidades).trim().to_string()
}
