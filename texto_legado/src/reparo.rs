//! Reparo de texto corrompido por encoding duplo
//!
//! Texto UTF-8 relido como Latin-1/Windows-1252 (e regravado) vira sequências
//! como "Ã©" no lugar de "é". A tabela abaixo mapeia essas renderizações para
//! o caractere pretendido.
//!
//! Regras:
//! - passada única, da esquerda para a direita, casamento mais longo primeiro;
//! - todo padrão começa com `Ã`, `Â` ou `â`, e esses caracteres nunca aparecem
//!   em outra posição de nenhum padrão;
//! - uma substituição só é aplicada se o caractere novo, junto do texto vizinho,
//!   não formar outro padrão. Caso contrário o trecho original fica como está.
//!
//! Com isso `repair_corruption(repair_corruption(s)) == repair_corruption(s)`.

use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

/// (renderização corrompida, caractere pretendido)
pub const TABELA_REPARO: &[(&str, &str)] = &[
    // minúsculas: UTF-8 (C3 xx) lido como Latin-1
    ("Ã\u{A0}", "à"),
    ("Ã¡", "á"),
    ("Ã¢", "â"),
    ("Ã£", "ã"),
    ("Ã¤", "ä"),
    ("Ã§", "ç"),
    ("Ã¨", "è"),
    ("Ã©", "é"),
    ("Ãª", "ê"),
    ("Ã«", "ë"),
    ("Ã¬", "ì"),
    ("Ã\u{AD}", "í"),
    ("Ã®", "î"),
    ("Ã¯", "ï"),
    ("Ã±", "ñ"),
    ("Ã²", "ò"),
    ("Ã³", "ó"),
    ("Ã´", "ô"),
    ("Ãµ", "õ"),
    ("Ã¶", "ö"),
    ("Ã¹", "ù"),
    ("Ãº", "ú"),
    ("Ã»", "û"),
    ("Ã¼", "ü"),
    // maiúsculas, renderização Windows-1252
    ("Ã€", "À"),
    ("Ã‚", "Â"),
    ("Ãƒ", "Ã"),
    ("Ã„", "Ä"),
    ("Ã‡", "Ç"),
    ("Ãˆ", "È"),
    ("Ã‰", "É"),
    ("ÃŠ", "Ê"),
    ("ÃŒ", "Ì"),
    ("ÃŽ", "Î"),
    ("Ã‘", "Ñ"),
    ("Ã’", "Ò"),
    ("Ã“", "Ó"),
    ("Ã”", "Ô"),
    ("Ã•", "Õ"),
    ("Ã–", "Ö"),
    ("Ã™", "Ù"),
    ("Ãš", "Ú"),
    ("Ã›", "Û"),
    ("Ãœ", "Ü"),
    // maiúsculas, renderização Latin-1 (controles C1)
    ("Ã\u{80}", "À"),
    ("Ã\u{81}", "Á"),
    ("Ã\u{82}", "Â"),
    ("Ã\u{83}", "Ã"),
    ("Ã\u{84}", "Ä"),
    ("Ã\u{87}", "Ç"),
    ("Ã\u{88}", "È"),
    ("Ã\u{89}", "É"),
    ("Ã\u{8A}", "Ê"),
    ("Ã\u{8C}", "Ì"),
    ("Ã\u{8D}", "Í"),
    ("Ã\u{8E}", "Î"),
    ("Ã\u{91}", "Ñ"),
    ("Ã\u{92}", "Ò"),
    ("Ã\u{93}", "Ó"),
    ("Ã\u{94}", "Ô"),
    ("Ã\u{95}", "Õ"),
    ("Ã\u{96}", "Ö"),
    ("Ã\u{99}", "Ù"),
    ("Ã\u{9A}", "Ú"),
    ("Ã\u{9B}", "Û"),
    ("Ã\u{9C}", "Ü"),
    // símbolos C2 xx
    ("Â\u{A0}", " "),
    ("Â§", "§"),
    ("Â«", "«"),
    ("Â°", "°"),
    ("Âª", "ª"),
    ("Âº", "º"),
    ("Â»", "»"),
    ("Â´", "'"),
    // pontuação E2 80 xx, renderização Windows-1252
    ("â€™", "’"),
    ("â€˜", "‘"),
    ("â€œ", "“"),
    ("â€\u{9D}", "”"),
    ("â€“", "–"),
    ("â€”", "—"),
    ("â€¦", "…"),
    ("â€¢", "•"),
    ("â‚¬", "€"),
    // pontuação E2 80 xx, renderização Latin-1
    ("â\u{80}\u{99}", "’"),
    ("â\u{80}\u{98}", "‘"),
    ("â\u{80}\u{9C}", "“"),
    ("â\u{80}\u{9D}", "”"),
    ("â\u{80}\u{93}", "–"),
    ("â\u{80}\u{94}", "—"),
    ("â\u{80}¦", "…"),
    ("â\u{80}¢", "•"),
];

struct Reparador {
    /// Casamento mais longo à esquerda, usado na passada principal
    automato: AhoCorasick,
    /// Mesmo conjunto de padrões em modo sobreposto, usado pela guarda
    guarda: AhoCorasick,
    /// Maior padrão, em caracteres
    maior_padrao: usize,
}

static REPARADOR: Lazy<Option<Reparador>> = Lazy::new(Reparador::novo);

impl Reparador {
    fn novo() -> Option<Self> {
        let padroes: Vec<&str> = TABELA_REPARO.iter().map(|(padrao, _)| *padrao).collect();

        let automato = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&padroes);
        let guarda = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&padroes);

        match (automato, guarda) {
            (Ok(automato), Ok(guarda)) => Some(Self {
                automato,
                guarda,
                maior_padrao: padroes.iter().map(|p| p.chars().count()).max().unwrap_or(0),
            }),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!("❌ Falha ao montar tabela de reparo: {}", e);
                None
            }
        }
    }

    fn reparar(&self, texto: &str) -> String {
        let mut saida = String::with_capacity(texto.len());
        let mut ultimo = 0;

        for m in self.automato.find_iter(texto) {
            saida.push_str(&texto[ultimo..m.start()]);

            let (_, substituto) = TABELA_REPARO[m.pattern().as_usize()];
            if self.forma_novo_padrao(&saida, substituto, &texto[m.end()..]) {
                saida.push_str(&texto[m.start()..m.end()]);
            } else {
                saida.push_str(substituto);
            }

            ultimo = m.end();
        }

        saida.push_str(&texto[ultimo..]);
        saida
    }

    /// Verifica se `substituto`, entre a saída já emitida e o resto da entrada,
    /// completaria algum padrão da tabela
    fn forma_novo_padrao(&self, anterior: &str, substituto: &str, restante: &str) -> bool {
        let contexto = self.maior_padrao.saturating_sub(1);
        let esquerda = ultimos_chars(anterior, contexto);
        let direita = primeiros_chars(restante, contexto);

        let janela = format!("{}{}{}", esquerda, substituto, direita);
        let inicio = esquerda.len();
        let fim = inicio + substituto.len();

        self.guarda
            .find_overlapping_iter(&janela)
            .any(|m| m.start() < fim && m.end() > inicio)
    }
}

fn ultimos_chars(texto: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match texto.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &texto[idx..],
        None => texto,
    }
}

fn primeiros_chars(texto: &str, n: usize) -> &str {
    match texto.char_indices().nth(n) {
        Some((idx, _)) => &texto[..idx],
        None => texto,
    }
}

/// Corrige sequências conhecidas de encoding duplo
///
/// # Exemplos
/// ```
/// use texto_legado::reparo::repair_corruption;
///
/// assert_eq!(repair_corruption("CafÃ©"), "Café");
/// assert_eq!(repair_corruption("InstalaÃ§Ã£o concluÃ\u{AD}da"), "Instalação concluída");
/// assert_eq!(repair_corruption("Texto correto"), "Texto correto");
/// ```
pub fn repair_corruption(texto: &str) -> String {
    match REPARADOR.as_ref() {
        Some(reparador) => reparador.reparar(texto),
        None => texto.to_string(),
    }
}
