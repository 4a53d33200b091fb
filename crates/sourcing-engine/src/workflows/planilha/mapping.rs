use std::collections::HashMap;
use std::sync::OnceLock;

use crate::workflows::sourcing::domain::Criterion;

/// Spreadsheet column recognised by the importers, after header normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    Id,
    Supplier,
    TaxId,
    TotalValue,
    Score(Criterion),
    Status,
    Lot,
    Description,
    Quantity,
    UnitValue,
    Criterion,
}

impl Column {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Supplier => "Fornecedor",
            Column::TaxId => "CNPJ",
            Column::TotalValue => "Valor Total",
            Column::Score(criterion) => criterion.label(),
            Column::Status => "Status",
            Column::Lot => "Lote",
            Column::Description => "Descrição",
            Column::Quantity => "Quantidade",
            Column::UnitValue => "Valor Unitário",
            Column::Criterion => "Critério",
        }
    }
}

static HEADER_MAP: OnceLock<HashMap<&'static str, Column>> = OnceLock::new();

pub(crate) fn column_for_normalized(header: &str) -> Option<Column> {
    header_map().get(header).copied()
}

fn header_map() -> &'static HashMap<&'static str, Column> {
    HEADER_MAP.get_or_init(|| {
        const HEADER_TO_COLUMN: &[(&str, Column)] = &[
            ("id", Column::Id),
            ("codigo", Column::Id),
            ("proposta", Column::Id),
            ("fornecedor", Column::Supplier),
            ("razao_social", Column::Supplier),
            ("cnpj", Column::TaxId),
            ("valor_total", Column::TotalValue),
            ("total", Column::TotalValue),
            ("preco", Column::Score(Criterion::Preco)),
            ("nota_preco", Column::Score(Criterion::Preco)),
            ("qualidade", Column::Score(Criterion::Qualidade)),
            ("nota_qualidade", Column::Score(Criterion::Qualidade)),
            ("prazo", Column::Score(Criterion::Prazo)),
            ("prazo_de_entrega", Column::Score(Criterion::Prazo)),
            ("tecnico", Column::Score(Criterion::Tecnico)),
            ("tecnica", Column::Score(Criterion::Tecnico)),
            ("comercial", Column::Score(Criterion::Comercial)),
            ("status", Column::Status),
            ("situacao", Column::Status),
            ("lote", Column::Lot),
            ("descricao", Column::Description),
            ("item", Column::Description),
            ("quantidade", Column::Quantity),
            ("qtd", Column::Quantity),
            ("valor_unitario", Column::UnitValue),
            ("preco_unitario", Column::UnitValue),
            ("criterio", Column::Criterion),
        ];

        HEADER_TO_COLUMN.iter().copied().collect()
    })
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(raw_header: &str) -> Option<Column> {
    column_for_normalized(&super::normalizer::normalize_header(raw_header))
}
