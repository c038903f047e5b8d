// Recuperação de texto do banco legado Solutii
// Expõe módulos para uso em testes e binários

pub mod config;
pub mod legado;
pub mod relatorios;
pub mod utils;

pub use texto_legado;
