//! Totalização de horas apontadas

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

use super::filtro::{consulta_apontamentos, FiltroApontamentos};
use crate::legado::{FieldValue, LegacyDatabase, ProcessedRow};
use crate::utils::logging::log_row_skipped;
use crate::utils::{AppError, AppResult};

const MINUTOS_NO_DIA: i64 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Apontamento {
    pub chamado: i64,
    pub cliente: String,
    pub recurso: String,
    pub status: String,
    pub data: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub hora_fim: NaiveTime,
    pub observacao: Option<String>,
}

impl Apontamento {
    /// Minutos trabalhados; fim antes do início é turno que virou a meia-noite
    pub fn duracao_minutos(&self) -> i64 {
        let inicio = minutos_do_dia(self.hora_inicio);
        let fim = minutos_do_dia(self.hora_fim);

        if fim >= inicio {
            fim - inicio
        } else {
            fim + MINUTOS_NO_DIA - inicio
        }
    }
}

impl TryFrom<&ProcessedRow> for Apontamento {
    type Error = AppError;

    fn try_from(row: &ProcessedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            chamado: inteiro(row, "CHAMADO")?,
            cliente: texto(row, "CLIENTE")?,
            recurso: texto(row, "RECURSO")?,
            status: texto(row, "STATUS")?,
            data: data(row, "DATA")?,
            hora_inicio: hora(row, "HORA_INICIO")?,
            hora_fim: hora(row, "HORA_FIM")?,
            observacao: row.get_text("OBSERVACAO").map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumoHoras {
    pub quantidade: usize,
    pub total_horas: f64,
    pub por_cliente: BTreeMap<String, f64>,
    pub por_recurso: BTreeMap<String, f64>,
    pub por_status: BTreeMap<String, f64>,
    /// Chave `YYYY-MM`
    pub por_mes: BTreeMap<String, f64>,
}

/// Agrupa os apontamentos; a soma é feita em minutos e convertida no fim
pub fn agrupar(apontamentos: &[Apontamento]) -> ResumoHoras {
    let mut total = 0;
    let mut por_cliente = BTreeMap::new();
    let mut por_recurso = BTreeMap::new();
    let mut por_status = BTreeMap::new();
    let mut por_mes = BTreeMap::new();

    for apontamento in apontamentos {
        let minutos = apontamento.duracao_minutos();
        total += minutos;
        *por_cliente.entry(apontamento.cliente.clone()).or_insert(0) += minutos;
        *por_recurso.entry(apontamento.recurso.clone()).or_insert(0) += minutos;
        *por_status.entry(apontamento.status.clone()).or_insert(0) += minutos;
        *por_mes
            .entry(apontamento.data.format("%Y-%m").to_string())
            .or_insert(0) += minutos;
    }

    ResumoHoras {
        quantidade: apontamentos.len(),
        total_horas: horas(total),
        por_cliente: em_horas(por_cliente),
        por_recurso: em_horas(por_recurso),
        por_status: em_horas(por_status),
        por_mes: em_horas(por_mes),
    }
}

/// Busca os apontamentos do filtro e totaliza; linhas inválidas são ignoradas
pub async fn resumo_horas(
    db: &LegacyDatabase,
    filtro: &FiltroApontamentos,
) -> AppResult<ResumoHoras> {
    let (sql, params) = consulta_apontamentos(filtro);
    let rows = db.query(&sql, &params).await?;

    let apontamentos: Vec<Apontamento> = rows
        .iter()
        .filter_map(|row| match Apontamento::try_from(row) {
            Ok(apontamento) => Some(apontamento),
            Err(e) => {
                log_row_skipped(&e.to_string());
                None
            }
        })
        .collect();

    tracing::info!(
        "📊 Resumo de horas: {} de {} apontamentos válidos",
        apontamentos.len(),
        rows.len()
    );

    Ok(agrupar(&apontamentos))
}

fn minutos_do_dia(hora: NaiveTime) -> i64 {
    i64::from(hora.num_seconds_from_midnight() / 60)
}

fn horas(minutos: i64) -> f64 {
    (minutos as f64 / 60.0 * 100.0).round() / 100.0
}

fn em_horas(minutos: BTreeMap<String, i64>) -> BTreeMap<String, f64> {
    minutos.into_iter().map(|(chave, m)| (chave, horas(m))).collect()
}

fn campo<'a>(row: &'a ProcessedRow, coluna: &str) -> AppResult<&'a FieldValue> {
    match row.get(coluna) {
        Some(FieldValue::Null) | None => Err(AppError::ValidationError(format!(
            "Coluna {} ausente",
            coluna
        ))),
        Some(valor) => Ok(valor),
    }
}

fn invalido(coluna: &str, valor: &FieldValue) -> AppError {
    AppError::ValidationError(format!("Valor inválido em {}: {:?}", coluna, valor))
}

fn inteiro(row: &ProcessedRow, coluna: &str) -> AppResult<i64> {
    match campo(row, coluna)? {
        FieldValue::Integer(i) => Ok(*i),
        FieldValue::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| invalido(coluna, &FieldValue::Text(s.clone()))),
        outro => Err(invalido(coluna, outro)),
    }
}

fn texto(row: &ProcessedRow, coluna: &str) -> AppResult<String> {
    match campo(row, coluna)? {
        FieldValue::Text(s) => Ok(s.trim().to_string()),
        FieldValue::Integer(i) => Ok(i.to_string()),
        outro => Err(invalido(coluna, outro)),
    }
}

fn data(row: &ProcessedRow, coluna: &str) -> AppResult<NaiveDate> {
    match campo(row, coluna)? {
        FieldValue::Date(d) => Ok(*d),
        FieldValue::Timestamp(ts) => Ok(ts.date()),
        outro => Err(invalido(coluna, outro)),
    }
}

fn hora(row: &ProcessedRow, coluna: &str) -> AppResult<NaiveTime> {
    let valor = campo(row, coluna)?;
    match valor {
        FieldValue::Time(t) => Ok(*t),
        FieldValue::Timestamp(ts) => Ok(ts.time()),
        FieldValue::Text(s) => parse_hora(s).ok_or_else(|| invalido(coluna, valor)),
        outro => Err(invalido(coluna, outro)),
    }
}

/// Aceita `HH:MM`, `H:MM`, `HH:MM:SS` e `HHMM`
fn parse_hora(texto: &str) -> Option<NaiveTime> {
    let texto = texto.trim();

    let partes: Vec<&str> = if texto.contains(':') {
        texto.split(':').collect()
    } else if (3..=4).contains(&texto.len()) && texto.bytes().all(|b| b.is_ascii_digit()) {
        let (h, m) = texto.split_at(texto.len() - 2);
        vec![h, m]
    } else {
        return None;
    };

    let numeros: Option<Vec<u32>> = partes.iter().map(|p| p.parse().ok()).collect();
    match numeros?.as_slice() {
        [h, m] => NaiveTime::from_hms_opt(*h, *m, 0),
        [h, m, s] => NaiveTime::from_hms_opt(*h, *m, *s),
        _ => None,
    }
}
