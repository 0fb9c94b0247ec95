//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvAdapter, CsvStockAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::spreadsheet_adapter::{
    is_spreadsheet, SpreadsheetAdapter, SpreadsheetStockAdapter,
};
use crate::adapters::table_output::{render, OutputFormat};
use crate::adapters::xlsx_report_adapter::{Locale, XlsxReportAdapter};
use crate::domain::aggregator::{global_date_range, group_by_product, DateRange};
use crate::domain::assembler::{assemble, OutputMode};
use crate::domain::config_validation::{
    hidden_report_columns, resolve_parameters, validate_layout_config, validate_parameters_section,
    validate_report_config, ParameterOverrides, PARAMETERS, REPORT, SOURCE, STOCK,
};
use crate::domain::error::ReplenishError;
use crate::domain::layout::{split_list, NormalizePolicy, SourceLayout, StockLayout};
use crate::domain::normalizer::{normalize, DropCounts};
use crate::domain::pipeline::{run_pipeline, PipelineResult};
use crate::domain::reorder::ReorderParams;
use crate::domain::stock::StockLevels;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::RecordPort;
use crate::ports::report_port::ReportPort;
use crate::ports::stock_port::StockPort;

const DEFAULT_HIDDEN_COLUMNS: &str = "mean_demand,demand_stddev";

#[derive(Parser, Debug)]
#[command(
    name = "replenish",
    about = "Reorder thresholds and order quantities from consumption history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute reorder rows for every eligible product
    Compute(ComputeArgs),
    /// Show the date coverage of a consumption history
    Info {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, allow_negative_numbers = true)]
        window_size: Option<i64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// Consumption history (csv, xlsx, xlsm, xlsb, xls or ods)
    #[arg(short, long)]
    pub input: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long, allow_negative_numbers = true)]
    pub safety_coefficient: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub window_size: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lead_time: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub order_frequency: Option<i64>,
    /// Stock-on-hand table; overrides `[stock] path`
    #[arg(long)]
    pub stock: Option<PathBuf>,
    /// Write an Excel report with live formulas instead of plain rows
    #[arg(long, conflicts_with_all = ["format", "output"])]
    pub report: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// Plain output file; stdout when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ComputeArgs {
    pub fn overrides(&self) -> ParameterOverrides {
        ParameterOverrides {
            safety_coefficient: self.safety_coefficient,
            window_size: self.window_size,
            lead_time_days: self.lead_time,
            order_frequency_days: self.order_frequency,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Compute(args) => run_compute(&args),
        Command::Info {
            input,
            config,
            window_size,
        } => run_info(&input, config.as_deref(), window_size),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_configuration() => {
            eprintln!("configuration error: {e}");
            (&e).into()
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ReplenishError> {
    FileConfigAdapter::from_file(path).map_err(|e| ReplenishError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load the config file if one was given; otherwise every key falls back.
pub fn load_optional_config(path: Option<&Path>) -> Result<FileConfigAdapter, ReplenishError> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            load_config(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn string_or(config: &dyn ConfigPort, section: &str, key: &str, default: &str) -> String {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| default.to_string())
}

fn count(config: &dyn ConfigPort, section: &str, key: &str) -> usize {
    config.get_int(section, key, 0).max(0) as usize
}

pub fn build_source_layout(config: &dyn ConfigPort) -> SourceLayout {
    let defaults = SourceLayout::default();
    SourceLayout {
        product_id_column: string_or(
            config,
            SOURCE,
            "product_id_column",
            &defaults.product_id_column,
        ),
        product_name_column: string_or(
            config,
            SOURCE,
            "product_name_column",
            &defaults.product_name_column,
        ),
        date_column: string_or(config, SOURCE, "date_column", &defaults.date_column),
        quantity_column: string_or(config, SOURCE, "quantity_column", &defaults.quantity_column),
        skip_rows: count(config, SOURCE, "skip_rows"),
        skip_trailing_rows: count(config, SOURCE, "skip_trailing_rows"),
        sheet_index: count(config, SOURCE, "sheet"),
    }
}

pub fn build_normalize_policy(config: &dyn ConfigPort) -> NormalizePolicy {
    let mut policy = NormalizePolicy::default();
    if let Some(raw) = config.get_string(SOURCE, "date_sentinels") {
        policy.date_sentinels = split_list(&raw);
    }
    if let Some(raw) = config.get_string(SOURCE, "date_formats") {
        let formats = split_list(&raw);
        if !formats.is_empty() {
            policy.date_formats = formats;
        }
    }
    policy
}

pub fn build_stock_layout(config: &dyn ConfigPort) -> StockLayout {
    let defaults = StockLayout::default();
    StockLayout {
        product_id_column: string_or(
            config,
            STOCK,
            "product_id_column",
            &defaults.product_id_column,
        ),
        quantity_column: string_or(config, STOCK, "quantity_column", &defaults.quantity_column),
        skip_rows: count(config, STOCK, "skip_rows"),
        sheet_index: count(config, STOCK, "sheet"),
    }
}

pub fn build_report_adapter(config: &dyn ConfigPort) -> Result<XlsxReportAdapter, ReplenishError> {
    let locale = match config.get_string(REPORT, "locale") {
        Some(raw) => raw
            .parse::<Locale>()
            .map_err(|reason| ReplenishError::ConfigInvalid {
                section: REPORT.to_string(),
                key: "locale".to_string(),
                reason,
            })?,
        None => Locale::default(),
    };

    let hidden = hidden_report_columns(config, DEFAULT_HIDDEN_COLUMNS)?;
    Ok(XlsxReportAdapter::new(locale, hidden))
}

/// Pick the record reader by file extension; anything not a workbook is CSV.
pub fn record_port_for(path: &Path, layout: SourceLayout) -> Box<dyn RecordPort> {
    if is_spreadsheet(path) {
        Box::new(SpreadsheetAdapter::new(path.to_path_buf(), layout))
    } else {
        Box::new(CsvAdapter::new(path.to_path_buf(), layout))
    }
}

pub fn stock_port_for(path: &Path, layout: StockLayout) -> Box<dyn StockPort> {
    if is_spreadsheet(path) {
        Box::new(SpreadsheetStockAdapter::new(path.to_path_buf(), layout))
    } else {
        Box::new(CsvStockAdapter::new(path.to_path_buf(), layout))
    }
}

/// The `--stock` flag wins over `[stock] path`.
pub fn resolve_stock_path(flag: Option<&Path>, config: &dyn ConfigPort) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(|| {
        config
            .get_string(STOCK, "path")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    })
}

fn print_drop_summary(drops: &DropCounts) {
    if drops.total() == 0 {
        return;
    }
    eprintln!(
        "Dropped {} rows: {} missing product, {} missing date, {} malformed date, {} malformed quantity",
        drops.total(),
        drops.missing_product,
        drops.missing_date,
        drops.malformed_date,
        drops.malformed_quantity
    );
}

/// Read, clean and compute. Nothing is written here.
pub fn run_compute_pipeline(
    record_port: &dyn RecordPort,
    stock_port: Option<&dyn StockPort>,
    policy: &NormalizePolicy,
    params: &ReorderParams,
) -> Result<PipelineResult, ReplenishError> {
    let records = record_port.fetch_records()?;
    eprintln!("Read {} rows", records.len());

    let stock = match stock_port {
        Some(port) => {
            let levels = port.fetch_stock_levels()?;
            eprintln!("Read stock levels for {} products", levels.len());
            levels
        }
        None => StockLevels::new(),
    };

    let result = run_pipeline(&records, policy, params, &stock)?;

    print_drop_summary(&result.drops);
    for skipped in &result.skipped {
        eprintln!(
            "warning: skipping {} ({}): {} days of history, window is {}",
            skipped.product_id, skipped.product_name, skipped.span_days, params.window_size
        );
    }
    eprintln!(
        "Computed {} products from {} to {}",
        result.rows.len(),
        result.range.start,
        result.range.end
    );

    Ok(result)
}

/// Render plain rows completely, then write them in one go.
pub fn write_plain_output(
    result: &PipelineResult,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), ReplenishError> {
    let rows = assemble(result.rows.clone(), OutputMode::Plain);
    let bytes = render(&rows, format)?;
    match output {
        Some(path) => {
            fs::write(path, &bytes)?;
            eprintln!("Output written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

pub fn write_report(
    result: &PipelineResult,
    report_port: &dyn ReportPort,
    path: &Path,
) -> Result<(), ReplenishError> {
    let rows = assemble(result.rows.clone(), OutputMode::Report);
    report_port.write(&rows, path)?;
    eprintln!("Report written to {}", path.display());
    Ok(())
}

fn run_compute(args: &ComputeArgs) -> Result<(), ReplenishError> {
    let config = load_optional_config(args.config.as_deref())?;

    // Everything configurable is checked before the input is opened.
    let params = resolve_parameters(&args.overrides(), &config)?;
    validate_layout_config(&config)?;
    validate_report_config(&config)?;
    let report_adapter = match &args.report {
        Some(_) => Some(build_report_adapter(&config)?),
        None => None,
    };

    let layout = build_source_layout(&config);
    let policy = build_normalize_policy(&config);
    eprintln!("Loading records from {}", args.input.display());
    let record_port = record_port_for(&args.input, layout);

    let stock_port = resolve_stock_path(args.stock.as_deref(), &config).map(|path| {
        eprintln!("Loading stock levels from {}", path.display());
        stock_port_for(&path, build_stock_layout(&config))
    });

    let result =
        run_compute_pipeline(record_port.as_ref(), stock_port.as_deref(), &policy, &params)?;

    match (&args.report, &report_adapter) {
        (Some(path), Some(adapter)) => write_report(&result, adapter, path),
        _ => {
            let format = args.format.unwrap_or(FormatArg::Csv).into();
            write_plain_output(&result, format, args.output.as_deref())
        }
    }
}

/// Date coverage of one product in a history.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCoverage {
    pub product_id: String,
    pub product_name: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub observation_count: usize,
    /// Days from the first to the last observation.
    pub span_days: i64,
    pub eligible: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Coverage {
    pub range: DateRange,
    pub products: Vec<ProductCoverage>,
    pub drops: DropCounts,
}

pub fn collect_coverage(
    record_port: &dyn RecordPort,
    policy: &NormalizePolicy,
    window_size: Option<usize>,
) -> Result<Coverage, ReplenishError> {
    let records = record_port.fetch_records()?;
    let normalized = normalize(&records, policy);
    let range =
        global_date_range(&normalized.observations).ok_or(ReplenishError::NoObservations)?;

    let products = group_by_product(&normalized.observations)
        .into_iter()
        .filter_map(|group| {
            let first_date = group.start_date()?;
            let last_date = group.last_date()?;
            let span_days = (last_date - first_date).num_days();
            Some(ProductCoverage {
                product_id: group.product_id,
                product_name: group.product_name,
                first_date,
                last_date,
                observation_count: group.observation_count,
                span_days,
                eligible: window_size.map(|w| span_days >= w as i64),
            })
        })
        .collect();

    Ok(Coverage {
        range,
        products,
        drops: normalized.drops,
    })
}

/// Window for `info`: the flag, else `[parameters] window_size`, else none.
fn info_window(flag: Option<i64>, config: &dyn ConfigPort) -> Result<Option<usize>, ReplenishError> {
    let window = match flag {
        Some(w) => Some(w),
        None => config
            .get_string(PARAMETERS, "window_size")
            .and_then(|s| s.trim().parse::<i64>().ok()),
    };
    match window {
        Some(w) if w >= 1 => Ok(Some(w as usize)),
        Some(_) => Err(ReplenishError::ConfigInvalid {
            section: PARAMETERS.to_string(),
            key: "window_size".to_string(),
            reason: "window_size must be at least 1".to_string(),
        }),
        None => Ok(None),
    }
}

fn run_info(
    input: &Path,
    config_path: Option<&Path>,
    window_size: Option<i64>,
) -> Result<(), ReplenishError> {
    let config = load_optional_config(config_path)?;
    validate_layout_config(&config)?;
    validate_parameters_section(&config)?;
    let window = info_window(window_size, &config)?;

    eprintln!("Loading records from {}", input.display());
    let record_port = record_port_for(input, build_source_layout(&config));
    let coverage = collect_coverage(record_port.as_ref(), &build_normalize_policy(&config), window)?;
    print_drop_summary(&coverage.drops);

    println!(
        "range: {} to {} ({} days)",
        coverage.range.start,
        coverage.range.end,
        coverage.range.span_days()
    );
    for p in &coverage.products {
        let eligibility = match p.eligible {
            Some(true) => "eligible",
            Some(false) => "too short",
            None => "-",
        };
        println!(
            "{}\t{}\t{} to {}\t{} observations\t{} days\t{}",
            p.product_id,
            p.product_name,
            p.first_date,
            p.last_date,
            p.observation_count,
            p.span_days,
            eligibility
        );
    }
    eprintln!("{} products", coverage.products.len());
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), ReplenishError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(config_path)?;

    validate_parameters_section(&config)?;
    validate_layout_config(&config)?;
    validate_report_config(&config)?;

    eprintln!("\nParameters:");
    match resolve_parameters(&ParameterOverrides::default(), &config) {
        Ok(params) => {
            eprintln!("  safety_coefficient:   {}", params.safety_coefficient);
            eprintln!("  window_size:          {}", params.window_size);
            eprintln!("  lead_time_days:       {}", params.lead_time_days);
            eprintln!("  order_frequency_days: {}", params.order_frequency_days);
        }
        Err(ReplenishError::ConfigMissing { key, .. }) => {
            eprintln!("  {key} not set; pass it on the command line");
        }
        Err(e) => return Err(e),
    }

    let source = build_source_layout(&config);
    let policy = build_normalize_policy(&config);
    eprintln!("\nSource:");
    eprintln!(
        "  columns: {} | {} | {} | {}",
        source.product_id_column,
        source.product_name_column,
        source.date_column,
        source.quantity_column
    );
    eprintln!(
        "  skip_rows: {}, skip_trailing_rows: {}, sheet: {}",
        source.skip_rows, source.skip_trailing_rows, source.sheet_index
    );
    eprintln!("  date_formats: {}", policy.date_formats.join(", "));
    eprintln!("  date_sentinels: {}", policy.date_sentinels.join(", "));

    if let Some(path) = resolve_stock_path(None, &config) {
        let stock = build_stock_layout(&config);
        eprintln!("\nStock:");
        eprintln!("  path: {}", path.display());
        eprintln!(
            "  columns: {} | {}",
            stock.product_id_column, stock.quantity_column
        );
    }

    build_report_adapter(&config)?;
    eprintln!("\nConfiguration is valid.");
    Ok(())
}
