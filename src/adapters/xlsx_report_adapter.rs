//! Excel report adapter implementing ReportPort.
//!
//! One worksheet: a bold header row, then one row per product. Derived
//! fields are written as live formulas with the computed value cached, so
//! the sheet shows numbers before any recalculation and still updates when
//! a user edits the stock or a parameter.

use crate::domain::assembler::{AssembledRow, Cell, ReportField};
use crate::domain::error::ReplenishError;
use crate::ports::report_port::ReportPort;
use rust_xlsxwriter::{Format, Formula, Workbook, XlsxError};
use std::path::Path;
use std::str::FromStr;

const SHEET_NAME: &str = "Replenishment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            other => Err(format!("unsupported locale {:?}", other)),
        }
    }
}

pub fn label(field: ReportField, locale: Locale) -> &'static str {
    use ReportField::*;
    match locale {
        Locale::En => match field {
            ProductId => "Reference",
            Name => "Designation",
            LeadTimeDays => "Lead Time (days)",
            SafetyCoefficient => "Safety Coefficient",
            OrderFrequencyDays => "Order Frequency (days)",
            MeanDemand => "Mean Demand / day",
            DemandStddev => "Std Deviation",
            MinStock => "Minimum Stock",
            SafetyStock => "Safety Stock",
            ReorderThreshold => "Reorder Threshold",
            CurrentStock => "Current Stock",
            StockDelta => "Stock Delta",
            OrderQuantity => "Order Quantity",
        },
        Locale::Fr => match field {
            ProductId => "Référence",
            Name => "Désignation",
            LeadTimeDays => "Durée de Livraison (jours)",
            SafetyCoefficient => "Coefficient de Sécurité",
            OrderFrequencyDays => "Fréquence de Commande (jours)",
            MeanDemand => "Consommation Moyenne / jour",
            DemandStddev => "Ecart-type",
            MinStock => "Stock Minimum",
            SafetyStock => "Stock de Sécurité",
            ReorderThreshold => "Seuil de Commande",
            CurrentStock => "Stock Actuel",
            StockDelta => "Delta de Stock",
            OrderQuantity => "Quantité à Commander",
        },
    }
}

#[derive(Debug)]
pub struct XlsxReportAdapter {
    locale: Locale,
    hidden: Vec<ReportField>,
}

impl XlsxReportAdapter {
    pub fn new(locale: Locale, hidden: Vec<ReportField>) -> Self {
        Self { locale, hidden }
    }

    pub fn hidden(&self) -> &[ReportField] {
        &self.hidden
    }

    fn build(&self, rows: &[AssembledRow]) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        let bold = Format::new().set_bold();
        for field in ReportField::ALL {
            let text = label(field, self.locale);
            worksheet.write_string_with_format(0, field.column(), text, &bold)?;
            worksheet.set_column_width(field.column(), (text.chars().count() + 2) as f64)?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (i, row) in rows.iter().enumerate() {
            let sheet_row = i as u32 + 1;
            for field in ReportField::ALL {
                let col = field.column();
                match row.cell(field) {
                    Cell::Text(text) => {
                        worksheet.write_string(sheet_row, col, &text)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(sheet_row, col, value)?;
                    }
                    Cell::Formula { expression, cached } => {
                        let formula = Formula::new(expression).set_result(cached.to_string());
                        if field == ReportField::OrderQuantity {
                            worksheet.write_formula_with_format(sheet_row, col, formula, &bold)?;
                        } else {
                            worksheet.write_formula(sheet_row, col, formula)?;
                        }
                    }
                }
            }
        }

        for field in &self.hidden {
            worksheet.set_column_hidden(field.column())?;
        }

        Ok(workbook)
    }
}

impl ReportPort for XlsxReportAdapter {
    fn write(&self, rows: &[AssembledRow], output_path: &Path) -> Result<(), ReplenishError> {
        let mut workbook = self.build(rows).map_err(|e| ReplenishError::Report {
            reason: format!("failed to build workbook: {}", e),
        })?;
        workbook
            .save(output_path)
            .map_err(|e| ReplenishError::Report {
                reason: format!("failed to write {}: {}", output_path.display(), e),
            })
    }
}
