//! Bid spreadsheet ("planilha") import for proposals and adjudicated items.

mod mapping;
mod normalizer;
mod parser;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::debug;

use crate::workflows::sourcing::domain::{
    fold_label, AdjudicatedItem, Criterion, ItemId, LotId, Proposal, ProposalId, ProposalStatus,
    Supplier,
};
use mapping::Column;
use parser::{PlanilhaRow, PlanilhaSheet};

#[derive(Debug)]
pub enum ProposalImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
    InvalidAmount { line: u64, value: String },
    InvalidScore { line: u64, value: String },
    UnknownStatus { line: u64, value: String },
}

impl std::fmt::Display for ProposalImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalImportError::Io(err) => write!(f, "failed to read bid spreadsheet: {}", err),
            ProposalImportError::Csv(err) => write!(f, "invalid bid spreadsheet CSV: {}", err),
            ProposalImportError::MissingColumn(column) => {
                write!(f, "bid spreadsheet has no '{}' column", column)
            }
            ProposalImportError::InvalidAmount { line, value } => {
                write!(f, "line {}: '{}' is not a valid amount", line, value)
            }
            ProposalImportError::InvalidScore { line, value } => {
                write!(f, "line {}: '{}' is not a valid score", line, value)
            }
            ProposalImportError::UnknownStatus { line, value } => {
                write!(f, "line {}: unknown proposal status '{}'", line, value)
            }
        }
    }
}

impl std::error::Error for ProposalImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProposalImportError::Io(err) => Some(err),
            ProposalImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ProposalImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ProposalImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

fn require(sheet: &PlanilhaSheet, columns: &[Column]) -> Result<(), ProposalImportError> {
    match columns.iter().find(|column| !sheet.has(**column)) {
        Some(missing) => Err(ProposalImportError::MissingColumn(missing.label())),
        None => Ok(()),
    }
}

fn amount(row: &PlanilhaRow, column: Column) -> Result<Decimal, ProposalImportError> {
    let raw = row.cell(column).unwrap_or_default();
    normalizer::parse_money(raw).ok_or_else(|| ProposalImportError::InvalidAmount {
        line: row.line,
        value: raw.to_string(),
    })
}

fn supplier(row: &PlanilhaRow) -> Supplier {
    let legal_name = row.cell(Column::Supplier).unwrap_or_default();
    // without a CNPJ the legal name is the only identity available
    let tax_id = row.cell(Column::TaxId).unwrap_or(legal_name);
    Supplier::new(legal_name, tax_id)
}

fn status(row: &PlanilhaRow) -> Result<ProposalStatus, ProposalImportError> {
    let Some(raw) = row.cell(Column::Status) else {
        return Ok(ProposalStatus::Classificada);
    };
    match fold_label(raw).as_str() {
        "classificada" | "classificado" => Ok(ProposalStatus::Classificada),
        "desclassificada" | "desclassificado" => Ok(ProposalStatus::Desclassificada),
        "em_analise" | "analise" => Ok(ProposalStatus::EmAnalise),
        _ => Err(ProposalImportError::UnknownStatus {
            line: row.line,
            value: raw.to_string(),
        }),
    }
}

pub struct ProposalCsvImporter;

impl ProposalCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Proposal>, ProposalImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Proposal>, ProposalImportError> {
        let sheet = parser::parse_sheet(reader)?;
        require(&sheet, &[Column::Supplier, Column::TotalValue])?;

        let mut proposals = Vec::with_capacity(sheet.rows.len());
        for row in &sheet.rows {
            proposals.push(proposal_from_row(row)?);
        }

        debug!(proposals = proposals.len(), "bid spreadsheet imported");
        Ok(proposals)
    }
}

fn proposal_from_row(row: &PlanilhaRow) -> Result<Proposal, ProposalImportError> {
    let id = row
        .cell(Column::Id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("proposta-{}", row.line));

    let mut criteria = BTreeMap::new();
    for criterion in Criterion::ordered() {
        let Some(raw) = row.cell(Column::Score(criterion)) else {
            continue;
        };
        match normalizer::parse_score(raw) {
            Some(Ok(score)) => {
                criteria.insert(criterion, score);
            }
            _ => {
                return Err(ProposalImportError::InvalidScore {
                    line: row.line,
                    value: raw.to_string(),
                })
            }
        }
    }

    Ok(Proposal {
        id: ProposalId(id),
        supplier: supplier(row),
        total_value: amount(row, Column::TotalValue)?,
        criteria,
        status: status(row)?,
    })
}

pub struct ItemCsvImporter;

impl ItemCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AdjudicatedItem>, ProposalImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<AdjudicatedItem>, ProposalImportError> {
        let sheet = parser::parse_sheet(reader)?;
        require(
            &sheet,
            &[
                Column::Lot,
                Column::Supplier,
                Column::Quantity,
                Column::UnitValue,
            ],
        )?;

        let mut items = Vec::with_capacity(sheet.rows.len());
        for row in &sheet.rows {
            items.push(item_from_row(row)?);
        }

        debug!(items = items.len(), "item spreadsheet imported");
        Ok(items)
    }
}

fn item_from_row(row: &PlanilhaRow) -> Result<AdjudicatedItem, ProposalImportError> {
    let id = row
        .cell(Column::Id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("item-{}", row.line));
    let quantity = amount(row, Column::Quantity)?;
    let unit_value = amount(row, Column::UnitValue)?;
    let total_value = match row.cell(Column::TotalValue) {
        Some(_) => amount(row, Column::TotalValue)?,
        None => quantity.checked_mul(unit_value).ok_or_else(|| {
            ProposalImportError::InvalidAmount {
                line: row.line,
                value: format!("{} x {}", quantity, unit_value),
            }
        })?,
    };

    Ok(AdjudicatedItem {
        id: ItemId(id),
        lot_id: LotId(row.cell(Column::Lot).unwrap_or_default().to_string()),
        winner: supplier(row),
        description: row
            .cell(Column::Description)
            .unwrap_or_default()
            .to_string(),
        quantity,
        unit_value,
        total_value,
        criterion: row.cell(Column::Criterion).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn mapping_recognizes_accented_headers() {
        assert_eq!(
            mapping::lookup_for_tests("Preço"),
            Some(Column::Score(Criterion::Preco))
        );
        assert_eq!(
            mapping::lookup_for_tests("TÉCNICO"),
            Some(Column::Score(Criterion::Tecnico))
        );
        assert_eq!(
            mapping::lookup_for_tests("Valor Unitário"),
            Some(Column::UnitValue)
        );
        assert_eq!(mapping::lookup_for_tests("Observações"), None);
    }

    #[test]
    fn proposals_import_with_brazilian_formats() {
        let csv = "ID,Fornecedor,CNPJ,Valor Total,Preço,Qualidade,Prazo,Técnico,Comercial,Status,Observações\n\
p-1,TechCorp,12.345.678/0001-90,\"R$ 145.000,00\",\"8,5\",9,8,9.2,8.8,classificada,ok\n\
p-2,InnovaTech,23.456.789/0001-01,138000.00,9,8.5,7,,8.5,Em Análise,\n";
        let proposals = ProposalCsvImporter::from_reader(Cursor::new(csv)).expect("import");

        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].total_value, Decimal::new(145_000, 0));
        assert_eq!(proposals[0].score(Criterion::Preco), Some(8.5));
        assert_eq!(proposals[0].supplier.tax_id, "12.345.678/0001-90");
        assert_eq!(proposals[1].status, ProposalStatus::EmAnalise);
        assert_eq!(proposals[1].score(Criterion::Tecnico), None);
    }

    #[test]
    fn semicolon_exports_are_detected() {
        let csv = "Fornecedor;Valor Total;Preço\nTechCorp;145.000,00;8,5\n";
        let proposals = ProposalCsvImporter::from_reader(Cursor::new(csv)).expect("import");

        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].total_value, Decimal::new(145_000, 0));
        assert_eq!(proposals[0].score(Criterion::Preco), Some(8.5));
    }

    #[test]
    fn proposal_errors_report_the_line() {
        let csv = "Fornecedor,Valor Total,Preço\nTechCorp,muito,8\n";
        match ProposalCsvImporter::from_reader(Cursor::new(csv)) {
            Err(ProposalImportError::InvalidAmount { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "muito");
            }
            other => panic!("expected invalid amount, got {other:?}"),
        }

        let csv = "Fornecedor,Valor Total,Preço\nTechCorp,100,excelente\n";
        assert!(matches!(
            ProposalCsvImporter::from_reader(Cursor::new(csv)),
            Err(ProposalImportError::InvalidScore { .. })
        ));

        let csv = "Fornecedor,Valor Total,Status\nTechCorp,100,vencedora\n";
        assert!(matches!(
            ProposalCsvImporter::from_reader(Cursor::new(csv)),
            Err(ProposalImportError::UnknownStatus { .. })
        ));
    }

    #[test]
    fn generated_ids_and_identity_fallbacks() {
        let csv = "Fornecedor,Valor Total\nGlobal Supply,162000\n";
        let proposals = ProposalCsvImporter::from_reader(Cursor::new(csv)).expect("import");
        assert_eq!(proposals[0].id.0, "proposta-2");
        assert_eq!(proposals[0].supplier.tax_id, "Global Supply");
        assert_eq!(proposals[0].status, ProposalStatus::Classificada);
    }

    #[test]
    fn missing_required_columns_are_named() {
        let csv = "Fornecedor,Preço\nTechCorp,8\n";
        match ProposalCsvImporter::from_reader(Cursor::new(csv)) {
            Err(ProposalImportError::MissingColumn(column)) => assert_eq!(column, "Valor Total"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn items_derive_missing_totals() {
        let csv = "ID,Lote,Descrição,Fornecedor,CNPJ,Quantidade,Valor Unitário,Valor Total,Critério\n\
i-1,lote-1,Notebook,TechCorp,1,20,\"5.000,00\",,melhor_score\n\
i-2,lote-1,Monitor,TechCorp,1,30,1500,45000.00,\n";
        let items = ItemCsvImporter::from_reader(Cursor::new(csv)).expect("import");

        assert_eq!(items[0].total_value, Decimal::new(100_000, 0));
        assert_eq!(items[0].criterion.as_deref(), Some("melhor_score"));
        assert_eq!(items[1].total_value, Decimal::new(45_000, 0));
        assert_eq!(items[1].lot_id.0, "lote-1");
        assert_eq!(items[1].criterion, None);
    }

    #[test]
    fn item_totals_beyond_the_money_range_are_rejected() {
        let csv = "Lote,Fornecedor,Quantidade,Valor Unitário\n\
lote-1,TechCorp,1000000000000000,1000000000000000\n";
        match ItemCsvImporter::from_reader(Cursor::new(csv)) {
            Err(ProposalImportError::InvalidAmount { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected invalid amount, got {other:?}"),
        }
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = ItemCsvImporter::from_path("./does-not-exist.csv").expect_err("io error");
        match error {
            ProposalImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
