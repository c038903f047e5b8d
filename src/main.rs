//! recuperar-texto: limpa exportações de BLOBs do banco legado
//!
//! Lê cada arquivo (ou stdin) como os bytes crus de um BLOB, detecta a
//! codificação, remove o HTML, repara a acentuação corrompida e imprime o texto.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use solutii_legado::config::Settings;
use solutii_legado::texto_legado::{self, Fallback};
use solutii_legado::utils::logging::{init_tracing, log_config_loaded, log_warning};

#[derive(Parser)]
#[command(name = "recuperar-texto")]
#[command(version)]
#[command(about = "Recupera o texto de BLOBs exportados do banco legado", long_about = None)]
struct Cli {
    /// Arquivos com o conteúdo cru do BLOB (sem arquivos, lê de stdin)
    arquivos: Vec<PathBuf>,

    /// Code page usada quando os bytes não são UTF-8 válido (latin1, windows1252)
    #[arg(short = 'f', long, env = "SOLUTII__LEGADO__TEXT_FALLBACK")]
    fallback: Option<Fallback>,

    /// Só repara a acentuação, sem detectar codificação nem remover HTML
    #[arg(long)]
    somente_reparo: bool,

    /// Um objeto JSON por entrada: {"origem", "texto"}
    #[arg(long)]
    json: bool,

    /// Logs em nível debug
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let settings = Settings::new().context("Falha ao carregar configuração")?;

    init_tracing(if cli.verbose {
        "debug"
    } else {
        settings.logging.level.as_str()
    });
    match dotenv {
        Ok(path) => tracing::debug!("✅ Arquivo .env carregado: {}", path.display()),
        Err(_) => tracing::debug!(
            "Arquivo .env não encontrado - usando variáveis de ambiente do sistema"
        ),
    }
    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    let fallback = cli.fallback.unwrap_or(settings.legado.text_fallback);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.arquivos.is_empty() {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("Falha ao ler stdin")?;
        let texto = recuperar(&bytes, fallback, cli.somente_reparo);
        emitir(&mut out, &cli, "-", &texto)?;
        out.flush()?;
        return Ok(());
    }

    let falhas = processar_arquivos(&mut out, &cli, fallback)?;
    out.flush()?;

    if falhas > 0 {
        anyhow::bail!(
            "{} de {} arquivos não puderam ser lidos",
            falhas,
            cli.arquivos.len()
        );
    }
    Ok(())
}

/// Processa os arquivos da linha de comando e devolve quantos não puderam ser lidos
fn processar_arquivos(out: &mut impl Write, cli: &Cli, fallback: Fallback) -> Result<usize> {
    let mut falhas = 0;

    for arquivo in &cli.arquivos {
        let bytes = match std::fs::read(arquivo) {
            Ok(bytes) => bytes,
            Err(e) => {
                log_warning(&format!(
                    "⚠️ Não foi possível ler {}: {}",
                    arquivo.display(),
                    e
                ));
                falhas += 1;
                continue;
            }
        };
        let origem = arquivo.display().to_string();
        let texto = recuperar(&bytes, fallback, cli.somente_reparo);
        emitir(out, cli, &origem, &texto)?;
    }

    Ok(falhas)
}

fn recuperar(bytes: &[u8], fallback: Fallback, somente_reparo: bool) -> String {
    if somente_reparo {
        texto_legado::repair_corruption(&String::from_utf8_lossy(bytes))
    } else {
        texto_legado::recover_text(bytes, fallback)
    }
}

fn emitir(out: &mut impl Write, cli: &Cli, origem: &str, texto: &str) -> Result<()> {
    if cli.json {
        let texto = if texto.is_empty() { None } else { Some(texto) };
        let linha = serde_json::json!({ "origem": origem, "texto": texto });
        writeln!(out, "{}", linha)?;
    } else if cli.arquivos.len() > 1 {
        writeln!(out, "==> {} <==\n{}", origem, texto)?;
    } else {
        writeln!(out, "{}", texto)?;
    }
    Ok(())
}
