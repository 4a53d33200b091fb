pub mod planilha;
pub mod sourcing;
