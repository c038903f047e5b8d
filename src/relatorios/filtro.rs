//! Filtro de apontamentos de horas
//!
//! O conjunto de dimensões filtráveis é fechado (`Criterio`). O filtro é
//! montado por composição: cada método consome o filtro e devolve um novo.
//! A restrição do perfil (`escopo`) fica guardada à parte e é aplicada por
//! último em `to_sql`, então nenhuma chamada posterior consegue ampliá-la.

use chrono::NaiveDate;

use crate::legado::SqlParam;
use crate::utils::{AppError, AppResult};

/// Quem está consultando
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Perfil {
    /// Usuário do cliente: só enxerga os apontamentos do próprio cliente
    Cliente { codigo: String },
    /// Consultor: sem `admin`, só enxerga os próprios apontamentos
    Consultor { recurso: String, admin: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterio {
    Periodo { inicio: NaiveDate, fim: NaiveDate },
    Cliente(String),
    Recurso(String),
    Status(String),
}

impl Criterio {
    fn condicao(&self) -> &'static str {
        match self {
            Criterio::Periodo { .. } => "A.DATA BETWEEN ? AND ?",
            Criterio::Cliente(_) => "C.COD_CLIENTE = ?",
            Criterio::Recurso(_) => "UPPER(A.RECURSO) = UPPER(?)",
            Criterio::Status(_) => "UPPER(C.STATUS) = UPPER(?)",
        }
    }

    fn parametros(&self, params: &mut Vec<SqlParam>) {
        match self {
            Criterio::Periodo { inicio, fim } => {
                params.push(SqlParam::from(*inicio));
                params.push(SqlParam::from(*fim));
            }
            Criterio::Cliente(valor) | Criterio::Recurso(valor) | Criterio::Status(valor) => {
                params.push(SqlParam::from(valor.as_str()));
            }
        }
    }

    fn mesma_dimensao(&self, outro: &Criterio) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(outro)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltroApontamentos {
    criterios: Vec<Criterio>,
    restricao: Option<Criterio>,
}

impl FiltroApontamentos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Critérios pedidos, sem a restrição do perfil
    pub fn criterios(&self) -> &[Criterio] {
        &self.criterios
    }

    pub fn restricao(&self) -> Option<&Criterio> {
        self.restricao.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.criterios.is_empty() && self.restricao.is_none()
    }

    /// Intervalo fechado de datas
    pub fn periodo(self, inicio: NaiveDate, fim: NaiveDate) -> AppResult<Self> {
        if inicio > fim {
            return Err(AppError::ValidationError(format!(
                "Período inválido: {} é posterior a {}",
                inicio, fim
            )));
        }
        Ok(self.com(Criterio::Periodo { inicio, fim }))
    }

    pub fn cliente(self, codigo: &str) -> Self {
        self.com_texto(codigo, Criterio::Cliente)
    }

    pub fn recurso(self, recurso: &str) -> Self {
        self.com_texto(recurso, Criterio::Recurso)
    }

    pub fn status(self, status: &str) -> Self {
        self.com_texto(status, Criterio::Status)
    }

    /// Restringe o filtro ao que o perfil pode ver
    ///
    /// A restrição prevalece sobre o que for pedido na mesma dimensão, antes ou
    /// depois desta chamada. Um código em branco não libera nada: a condição
    /// fica e não casa com linha alguma. Perfil admin não remove uma restrição
    /// já aplicada.
    pub fn escopo(mut self, perfil: &Perfil) -> Self {
        match perfil {
            Perfil::Cliente { codigo } => {
                self.restricao = Some(Criterio::Cliente(codigo.trim().to_string()));
            }
            Perfil::Consultor {
                recurso,
                admin: false,
            } => {
                self.restricao = Some(Criterio::Recurso(recurso.trim().to_string()));
            }
            Perfil::Consultor { admin: true, .. } => {}
        }
        self
    }

    /// Cláusula WHERE (com espaço inicial) e parâmetros posicionais
    pub fn to_sql(&self) -> (String, Vec<SqlParam>) {
        let restricao = self.restricao.as_ref();
        let aplicados: Vec<&Criterio> = self
            .criterios
            .iter()
            .filter(|c| restricao.map_or(true, |r| !c.mesma_dimensao(r)))
            .chain(restricao)
            .collect();

        if aplicados.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut params = Vec::new();
        let condicoes: Vec<&str> = aplicados
            .into_iter()
            .map(|criterio| {
                criterio.parametros(&mut params);
                criterio.condicao()
            })
            .collect();

        (format!(" WHERE {}", condicoes.join(" AND ")), params)
    }

    fn com_texto(self, valor: &str, criterio: fn(String) -> Criterio) -> Self {
        let valor = valor.trim();
        if valor.is_empty() {
            return self;
        }
        self.com(criterio(valor.to_string()))
    }

    /// Última definição de uma dimensão vence, mantendo a posição original
    fn com(mut self, criterio: Criterio) -> Self {
        match self.criterios.iter_mut().find(|c| c.mesma_dimensao(&criterio)) {
            Some(existente) => *existente = criterio,
            None => self.criterios.push(criterio),
        }
        self
    }
}

const SELECT_APONTAMENTOS: &str = "SELECT A.COD_CHAMADO AS CHAMADO, C.COD_CLIENTE AS CLIENTE, \
A.RECURSO, C.STATUS, A.DATA, A.HORA_INICIO, A.HORA_FIM, A.OBSERVACAO \
FROM APONTAMENTO A \
JOIN CHAMADO C ON C.COD_CHAMADO = A.COD_CHAMADO";

/// SELECT completo dos apontamentos que passam pelo filtro
pub fn consulta_apontamentos(filtro: &FiltroApontamentos) -> (String, Vec<SqlParam>) {
    let (clausula, params) = filtro.to_sql();
    let sql = format!("{}{} ORDER BY A.DATA, A.HORA_INICIO", SELECT_APONTAMENTOS, clausula);
    (sql, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legado::FieldValue;
    use pretty_assertions::assert_eq;

    fn data(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_filtro_vazio() {
        let (sql, params) = FiltroApontamentos::new().to_sql();
        assert_eq!(sql, "");
        assert!(params.is_empty());
    }

    #[test]
    fn test_criterios_na_ordem() {
        let filtro = FiltroApontamentos::new()
            .periodo(data(2024, 3, 1), data(2024, 3, 31))
            .unwrap()
            .recurso("joao")
            .status("fechado");

        let (sql, params) = filtro.to_sql();

        assert_eq!(
            sql,
            " WHERE A.DATA BETWEEN ? AND ? AND UPPER(A.RECURSO) = UPPER(?) AND UPPER(C.STATUS) = UPPER(?)"
        );
        assert_eq!(
            params,
            vec![
                FieldValue::Date(data(2024, 3, 1)),
                FieldValue::Date(data(2024, 3, 31)),
                FieldValue::from("joao"),
                FieldValue::from("fechado"),
            ]
        );
    }

    #[test]
    fn test_periodo_invertido() {
        let err = FiltroApontamentos::new()
            .periodo(data(2024, 4, 1), data(2024, 3, 1))
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let mesmo_dia = FiltroApontamentos::new().periodo(data(2024, 4, 1), data(2024, 4, 1));
        assert!(mesmo_dia.is_ok());
    }

    #[test]
    fn test_valores_em_branco_ignorados() {
        let filtro = FiltroApontamentos::new().cliente("  ").recurso("").status("\t");
        assert!(filtro.is_empty());
    }

    #[test]
    fn test_ultima_definicao_vence() {
        let filtro = FiltroApontamentos::new()
            .cliente("0042")
            .status("ABERTO")
            .cliente(" 0099 ");

        assert_eq!(
            filtro.criterios(),
            &[
                Criterio::Cliente("0099".into()),
                Criterio::Status("ABERTO".into())
            ]
        );
    }

    #[test]
    fn test_escopo_cliente_sobrescreve_pedido() {
        let perfil = Perfil::Cliente {
            codigo: "0042".into(),
        };
        let (sql, params) = FiltroApontamentos::new()
            .cliente("0099")
            .escopo(&perfil)
            .to_sql();

        assert_eq!(sql, " WHERE C.COD_CLIENTE = ?");
        assert_eq!(params, vec![FieldValue::from("0042")]);
    }

    #[test]
    fn test_escopo_nao_e_ampliado_por_chamadas_posteriores() {
        let cliente = Perfil::Cliente {
            codigo: "0042".into(),
        };
        let (sql, params) = FiltroApontamentos::new()
            .escopo(&cliente)
            .cliente("0099")
            .status("ABERTO")
            .to_sql();

        assert_eq!(sql, " WHERE UPPER(C.STATUS) = UPPER(?) AND C.COD_CLIENTE = ?");
        assert_eq!(
            params,
            vec![FieldValue::from("ABERTO"), FieldValue::from("0042")]
        );

        let consultor = Perfil::Consultor {
            recurso: "MARIA".into(),
            admin: false,
        };
        let admin = Perfil::Consultor {
            recurso: "ANA".into(),
            admin: true,
        };
        let (_, params) = FiltroApontamentos::new()
            .escopo(&consultor)
            .recurso("JOAO")
            .escopo(&admin)
            .to_sql();

        assert_eq!(params, vec![FieldValue::from("MARIA")]);
    }

    #[test]
    fn test_escopo_cliente_sem_codigo_nao_libera() {
        let perfil = Perfil::Cliente { codigo: " ".into() };
        let filtro = FiltroApontamentos::new().escopo(&perfil);
        assert!(!filtro.is_empty());

        let (sql, params) = filtro.to_sql();

        assert_eq!(sql, " WHERE C.COD_CLIENTE = ?");
        assert_eq!(params, vec![FieldValue::from("")]);
    }

    #[test]
    fn test_escopo_consultor() {
        let consultor = Perfil::Consultor {
            recurso: "MARIA".into(),
            admin: false,
        };
        let admin = Perfil::Consultor {
            recurso: "ANA".into(),
            admin: true,
        };

        let restrito = FiltroApontamentos::new().recurso("JOAO").escopo(&consultor);
        let livre = FiltroApontamentos::new().recurso("JOAO").escopo(&admin);

        assert_eq!(restrito.restricao(), Some(&Criterio::Recurso("MARIA".into())));
        assert_eq!(restrito.to_sql().1, vec![FieldValue::from("MARIA")]);
        assert_eq!(livre.restricao(), None);
        assert_eq!(livre.to_sql().1, vec![FieldValue::from("JOAO")]);
    }

    #[test]
    fn test_consulta_completa() {
        let filtro = FiltroApontamentos::new().cliente("0042");
        let (sql, params) = consulta_apontamentos(&filtro);

        assert!(sql.starts_with("SELECT A.COD_CHAMADO AS CHAMADO"));
        assert!(sql.contains("ON C.COD_CHAMADO = A.COD_CHAMADO WHERE C.COD_CLIENTE = ?"));
        assert!(sql.ends_with(" ORDER BY A.DATA, A.HORA_INICIO"));
        assert_eq!(params, vec![FieldValue::from("0042")]);

        let (sem_filtro, _) = consulta_apontamentos(&FiltroApontamentos::new());
        assert!(sem_filtro.ends_with("A.COD_CHAMADO ORDER BY A.DATA, A.HORA_INICIO"));
    }
}
