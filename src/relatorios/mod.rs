//! Relatórios de apontamentos de horas sobre o banco legado

pub mod filtro;
pub mod horas;

pub use filtro::{consulta_apontamentos, Criterio, FiltroApontamentos, Perfil};
pub use horas::{agrupar, resumo_horas, Apontamento, ResumoHoras};
