//! Result assembler.
//!
//! Packages reorder rows for output. In report mode the five derived fields
//! become spreadsheet formulas over the row's own input cells, so editing the
//! stock or a parameter in the sheet recomputes them. The formulas mirror
//! `calculate_reorder` exactly; the calculator itself never sees them.

use crate::domain::reorder::ReorderRow;
use std::fmt;

/// Output columns, in sheet order (A..M).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    ProductId,
    Name,
    LeadTimeDays,
    SafetyCoefficient,
    OrderFrequencyDays,
    MeanDemand,
    DemandStddev,
    MinStock,
    SafetyStock,
    ReorderThreshold,
    CurrentStock,
    StockDelta,
    OrderQuantity,
}

impl ReportField {
    pub const ALL: [ReportField; 13] = [
        ReportField::ProductId,
        ReportField::Name,
        ReportField::LeadTimeDays,
        ReportField::SafetyCoefficient,
        ReportField::OrderFrequencyDays,
        ReportField::MeanDemand,
        ReportField::DemandStddev,
        ReportField::MinStock,
        ReportField::SafetyStock,
        ReportField::ReorderThreshold,
        ReportField::CurrentStock,
        ReportField::StockDelta,
        ReportField::OrderQuantity,
    ];

    /// Zero-based column index.
    pub fn column(self) -> u16 {
        Self::ALL
            .iter()
            .position(|f| *f == self)
            .unwrap_or_default() as u16
    }

    /// Spreadsheet column letter.
    pub fn letter(self) -> char {
        (b'A' + self.column() as u8) as char
    }

    /// Machine name, matching the serialized field name of [`ReorderRow`].
    pub fn key(self) -> &'static str {
        match self {
            ReportField::ProductId => "product_id",
            ReportField::Name => "name",
            ReportField::LeadTimeDays => "lead_time_days",
            ReportField::SafetyCoefficient => "safety_coefficient",
            ReportField::OrderFrequencyDays => "order_frequency_days",
            ReportField::MeanDemand => "mean_demand",
            ReportField::DemandStddev => "demand_stddev",
            ReportField::MinStock => "min_stock",
            ReportField::SafetyStock => "safety_stock",
            ReportField::ReorderThreshold => "reorder_threshold",
            ReportField::CurrentStock => "current_stock",
            ReportField::StockDelta => "stock_delta",
            ReportField::OrderQuantity => "order_quantity",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL.into_iter().find(|f| f.key().eq_ignore_ascii_case(key))
    }

    pub fn is_derived(self) -> bool {
        matches!(
            self,
            ReportField::MinStock
                | ReportField::SafetyStock
                | ReportField::ReorderThreshold
                | ReportField::StockDelta
                | ReportField::OrderQuantity
        )
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Plain,
    Report,
}

/// A single rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// Formula text (leading `=`) plus the value it evaluates to.
    Formula { expression: String, cached: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFormulas {
    pub min_stock: String,
    pub safety_stock: String,
    pub reorder_threshold: String,
    pub stock_delta: String,
    pub order_quantity: String,
}

/// Formulas for the derived fields of the data row at 1-based sheet row `r`.
pub fn derived_formulas(r: u32) -> DerivedFormulas {
    use ReportField::*;
    let c = |field: ReportField| format!("{}{}", field.letter(), r);

    DerivedFormulas {
        min_stock: format!(
            "={}*({}+{})",
            c(MeanDemand),
            c(LeadTimeDays),
            c(OrderFrequencyDays)
        ),
        safety_stock: format!(
            "={}*{}*SQRT({}+{})",
            c(DemandStddev),
            c(SafetyCoefficient),
            c(LeadTimeDays),
            c(OrderFrequencyDays)
        ),
        reorder_threshold: format!("=ROUNDUP({}+{},0)", c(MinStock), c(SafetyStock)),
        stock_delta: format!("={}-{}", c(ReorderThreshold), c(CurrentStock)),
        order_quantity: format!(
            "=IF({delta}>=0,ROUNDUP({min}+{delta},0),0)",
            delta = c(StockDelta),
            min = c(MinStock)
        ),
    }
}

/// A reorder row laid out on a sheet, derived fields as formulas.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaRow {
    pub row: ReorderRow,
    /// 1-based sheet row (the header occupies row 1).
    pub sheet_row: u32,
    pub formulas: DerivedFormulas,
}

impl FormulaRow {
    pub fn new(row: ReorderRow, sheet_row: u32) -> Self {
        Self {
            row,
            sheet_row,
            formulas: derived_formulas(sheet_row),
        }
    }

    pub fn cell(&self, field: ReportField) -> Cell {
        let formula = |expression: &String, cached: f64| Cell::Formula {
            expression: expression.clone(),
            cached,
        };
        match field {
            ReportField::MinStock => formula(&self.formulas.min_stock, self.row.min_stock),
            ReportField::SafetyStock => formula(&self.formulas.safety_stock, self.row.safety_stock),
            ReportField::ReorderThreshold => {
                formula(&self.formulas.reorder_threshold, self.row.reorder_threshold)
            }
            ReportField::StockDelta => formula(&self.formulas.stock_delta, self.row.stock_delta),
            ReportField::OrderQuantity => {
                formula(&self.formulas.order_quantity, self.row.order_quantity)
            }
            other => value_cell(&self.row, other),
        }
    }
}

fn value_cell(row: &ReorderRow, field: ReportField) -> Cell {
    match field {
        ReportField::ProductId => Cell::Text(row.product_id.clone()),
        ReportField::Name => Cell::Text(row.name.clone()),
        ReportField::LeadTimeDays => Cell::Number(f64::from(row.lead_time_days)),
        ReportField::SafetyCoefficient => Cell::Number(row.safety_coefficient),
        ReportField::OrderFrequencyDays => Cell::Number(f64::from(row.order_frequency_days)),
        ReportField::MeanDemand => Cell::Number(row.mean_demand),
        ReportField::DemandStddev => Cell::Number(row.demand_stddev),
        ReportField::MinStock => Cell::Number(row.min_stock),
        ReportField::SafetyStock => Cell::Number(row.safety_stock),
        ReportField::ReorderThreshold => Cell::Number(row.reorder_threshold),
        ReportField::CurrentStock => Cell::Number(row.current_stock),
        ReportField::StockDelta => Cell::Number(row.stock_delta),
        ReportField::OrderQuantity => Cell::Number(row.order_quantity),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssembledRow {
    Numeric(ReorderRow),
    Formula(FormulaRow),
}

impl AssembledRow {
    pub fn reorder_row(&self) -> &ReorderRow {
        match self {
            AssembledRow::Numeric(row) => row,
            AssembledRow::Formula(formula_row) => &formula_row.row,
        }
    }

    pub fn cell(&self, field: ReportField) -> Cell {
        match self {
            AssembledRow::Numeric(row) => value_cell(row, field),
            AssembledRow::Formula(formula_row) => formula_row.cell(field),
        }
    }
}

/// Package rows in calculator order. Report rows start at sheet row 2.
pub fn assemble(rows: Vec<ReorderRow>, mode: OutputMode) -> Vec<AssembledRow> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match mode {
            OutputMode::Plain => AssembledRow::Numeric(row),
            OutputMode::Report => AssembledRow::Formula(FormulaRow::new(row, i as u32 + 2)),
        })
        .collect()
}
