//! CLI integration tests for the compute, info and validate commands.
//!
//! Tests cover:
//! - Config resolution (layouts, parameters, report options)
//! - Pipeline orchestration with mock ports
//! - End-to-end runs over CSV and xlsx files on disk
//! - Exit codes and the no-partial-output guarantee

mod common;

use calamine::{open_workbook, Data, Reader, Xlsx};
use clap::Parser;
use common::*;
use replenish::adapters::file_config_adapter::FileConfigAdapter;
use replenish::cli::{self, Cli};
use replenish::domain::error::ReplenishError;
use replenish::domain::layout::NormalizePolicy;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

const HISTORY_CSV: &str = "Stock movements export\n\
Product Code,Product Name,Date,Quantity\n\
A1,Anchor,2024-01-01,4\n\
A1,Anchor,2024-01-02,4\n\
A1,Anchor,2024-01-03,4\n\
A1,Anchor,Unknown,9\n\
A1,Anchor,2024-01-10,4\n\
B2,Bolt,2024-01-01,100\n\
TOTAL,,,125\n";

const CONFIG_INI: &str = "[parameters]
safety_coefficient = 1.0
window_size = 7
lead_time_days = 2
order_frequency_days = 2

[source]
skip_rows = 1
skip_trailing_rows = 1
";

fn exit_code(code: ExitCode) -> String {
    format!("{code:?}")
}

fn expect_exit(code: ExitCode, expected: u8) {
    assert_eq!(exit_code(code), exit_code(ExitCode::from(expected)));
}

fn run_cli(args: &[&str]) -> ExitCode {
    let mut argv = vec!["replenish"];
    argv.extend_from_slice(args);
    cli::run(Cli::parse_from(argv))
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("history.csv"), HISTORY_CSV).unwrap();
        fs::write(dir.path().join("replenish.ini"), CONFIG_INI).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn write(&self, name: &str, content: &str) -> String {
        fs::write(self.dir.path().join(name), content).unwrap();
        self.path(name)
    }
}

mod config_resolution {
    use super::*;

    #[test]
    fn layout_and_policy_follow_config() {
        let config = FileConfigAdapter::from_string(
            "[source]\n\
             product_id_column = Reference\n\
             date_column = Last Sale Date\n\
             date_sentinels = Unknown, none\n\
             skip_rows = 12\n\
             skip_trailing_rows = 1\n",
        )
        .unwrap();

        let layout = cli::build_source_layout(&config);
        assert_eq!(layout.product_id_column, "Reference");
        assert_eq!(layout.date_column, "Last Sale Date");
        assert_eq!(layout.quantity_column, "quantity");
        assert_eq!(layout.skip_rows, 12);
        assert_eq!(layout.skip_trailing_rows, 1);

        let policy = cli::build_normalize_policy(&config);
        assert_eq!(policy.date_sentinels, vec!["Unknown", "none"]);
        assert_eq!(policy.date_formats, NormalizePolicy::default().date_formats);
    }

    #[test]
    fn stock_layout_defaults_to_valuated_quantity() {
        let layout = cli::build_stock_layout(&FileConfigAdapter::empty());
        assert_eq!(layout.product_id_column, "product code");
        assert_eq!(layout.quantity_column, "valuated quantity");
    }

    #[test]
    fn report_adapter_accepts_french_locale() {
        let config =
            FileConfigAdapter::from_string("[report]\nlocale = fr\nhidden_columns =\n").unwrap();
        assert!(cli::build_report_adapter(&config).is_ok());
    }
}

mod orchestration {
    use super::*;

    #[test]
    fn pipeline_reads_stock_through_port() {
        let records = MockRecordPort::new(vec![
            record("A", 1, 2.0),
            record("A", 2, 2.0),
            record("A", 3, 2.0),
        ]);
        let stock = MockStockPort::new(&[("A", 50.0)]);

        let result = cli::run_compute_pipeline(
            &records,
            Some(&stock),
            &NormalizePolicy::default(),
            &params(1.0, 2, 1, 1),
        )
        .unwrap();

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].current_stock, 50.0);
        assert_eq!(result.rows[0].order_quantity, 0.0);
    }

    #[test]
    fn source_failure_propagates() {
        let records = MockRecordPort::failing("disk on fire");
        let err = cli::run_compute_pipeline(
            &records,
            None,
            &NormalizePolicy::default(),
            &params(1.0, 2, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, ReplenishError::Source { reason } if reason == "disk on fire"));
    }

    #[test]
    fn coverage_reports_eligibility() {
        let records = MockRecordPort::new(vec![
            record("A", 1, 4.0),
            record("A", 10, 4.0),
            record("B", 1, 100.0),
            record("B", 1, 5.0),
        ]);
        let coverage =
            cli::collect_coverage(&records, &NormalizePolicy::default(), Some(7)).unwrap();

        assert_eq!(coverage.range.start, day(1));
        assert_eq!(coverage.range.end, day(10));
        assert_eq!(coverage.products.len(), 2);
        let a = &coverage.products[0];
        assert_eq!(a.product_id, "A");
        assert_eq!(a.span_days, 9);
        assert_eq!(a.eligible, Some(true));
        let b = &coverage.products[1];
        assert_eq!(b.observation_count, 2);
        assert_eq!(b.eligible, Some(false));
    }

    #[test]
    fn coverage_of_empty_history_fails() {
        let records = MockRecordPort::new(vec![record("A", 1, 1.0)]);
        let policy = NormalizePolicy {
            date_formats: vec!["%d.%m.%Y".to_string()],
            ..NormalizePolicy::default()
        };
        let err = cli::collect_coverage(&records, &policy, None).unwrap_err();
        assert!(matches!(err, ReplenishError::NoObservations));
    }
}

mod compute {
    use super::*;

    #[test]
    fn csv_end_to_end() {
        let ws = Workspace::new();
        let out = ws.path("out.csv");
        let code = run_cli(&[
            "compute",
            "--input",
            &ws.path("history.csv"),
            "--config",
            &ws.path("replenish.ini"),
            "--output",
            &out,
        ]);
        expect_exit(code, 0);

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("product_id,name,lead_time_days,"));
        assert!(lines[1].starts_with("A1,Anchor,2,1.0,2,"));
    }

    #[test]
    fn flags_override_config_and_json_output() {
        let ws = Workspace::new();
        let out = ws.path("out.json");
        let code = run_cli(&[
            "compute",
            "-i",
            &ws.path("history.csv"),
            "-c",
            &ws.path("replenish.ini"),
            "--window-size",
            "3",
            "--lead-time",
            "5",
            "--format",
            "json",
            "-o",
            &out,
        ]);
        expect_exit(code, 0);

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["product_id"], "A1");
        assert_eq!(rows[0]["lead_time_days"], 5);
        assert_eq!(rows[0]["order_frequency_days"], 2);
    }

    #[test]
    fn stock_file_lowers_the_order() {
        let ws = Workspace::new();
        let stock = ws.write("stock.csv", "Product Code,Valuated Quantity\nA1,1000\n");
        let out = ws.path("out.json");
        let code = run_cli(&[
            "compute",
            "-i",
            &ws.path("history.csv"),
            "-c",
            &ws.path("replenish.ini"),
            "--stock",
            &stock,
            "--format",
            "json",
            "-o",
            &out,
        ]);
        expect_exit(code, 0);

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value[0]["current_stock"], 1000.0);
        assert_eq!(value[0]["order_quantity"], 0.0);
    }

    #[test]
    fn spreadsheet_input() {
        let ws = Workspace::new();
        let input = ws.path("history.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, label) in ["Product Code", "Product Name", "Date", "Quantity"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *label).unwrap();
        }
        for (row, date) in ["2024-01-01", "2024-01-04", "2024-01-08"].iter().enumerate() {
            let r = row as u32 + 1;
            sheet.write_string(r, 0, "S9").unwrap();
            sheet.write_string(r, 1, "Spring").unwrap();
            sheet.write_string(r, 2, *date).unwrap();
            sheet.write_number(r, 3, 3.0).unwrap();
        }
        workbook.save(&input).unwrap();

        let out = ws.path("out.csv");
        let code = run_cli(&[
            "compute",
            "-i",
            &input,
            "--safety-coefficient",
            "1.5",
            "--window-size",
            "7",
            "--lead-time",
            "3",
            "--order-frequency",
            "7",
            "-o",
            &out,
        ]);
        expect_exit(code, 0);

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("S9,Spring,3,1.5,7,"));
    }

    #[test]
    fn french_report_carries_formulas() {
        let ws = Workspace::new();
        let config = ws.write(
            "report.ini",
            &format!("{}\n[report]\nlocale = fr\n", CONFIG_INI),
        );
        let report = ws.path("reorder.xlsx");
        let code = run_cli(&[
            "compute",
            "-i",
            &ws.path("history.csv"),
            "-c",
            &config,
            "--report",
            &report,
        ]);
        expect_exit(code, 0);

        let mut workbook: Xlsx<_> = open_workbook(&report).unwrap();
        let values = workbook.worksheet_range("Replenishment").unwrap();
        assert_eq!(values.get_value((0, 0)), Some(&Data::String("Référence".into())));
        assert_eq!(values.get_value((1, 0)), Some(&Data::String("A1".into())));

        let formulas = workbook.worksheet_formula("Replenishment").unwrap();
        let min_stock = formulas.get_value((1, 7)).cloned().unwrap_or_default();
        assert!(min_stock.contains("F2*(C2+E2)"));
        let order = formulas.get_value((1, 12)).cloned().unwrap_or_default();
        assert!(order.contains("IF(L2>=0,ROUNDUP(H2+L2,0),0)"));
    }
}

mod failures {
    use super::*;

    #[test]
    fn missing_parameter_is_a_config_error() {
        let ws = Workspace::new();
        let out = ws.path("out.csv");
        let code = run_cli(&["compute", "-i", &ws.path("history.csv"), "-o", &out]);
        expect_exit(code, 2);
        assert!(!Path::new(&out).exists());
    }

    #[test]
    fn negative_window_is_rejected_before_reading() {
        let ws = Workspace::new();
        let code = run_cli(&[
            "compute",
            "-i",
            &ws.path("does-not-exist.csv"),
            "-c",
            &ws.path("replenish.ini"),
            "--window-size",
            "-1",
        ]);
        expect_exit(code, 2);
    }

    #[test]
    fn short_history_writes_nothing() {
        let ws = Workspace::new();
        let out = ws.path("out.csv");
        let code = run_cli(&[
            "compute",
            "-i",
            &ws.path("history.csv"),
            "-c",
            &ws.path("replenish.ini"),
            "--window-size",
            "30",
            "-o",
            &out,
        ]);
        expect_exit(code, 5);
        assert!(!Path::new(&out).exists());
    }

    #[test]
    fn missing_input_is_a_source_error() {
        let ws = Workspace::new();
        let code = run_cli(&[
            "compute",
            "-i",
            &ws.path("does-not-exist.csv"),
            "-c",
            &ws.path("replenish.ini"),
        ]);
        expect_exit(code, 3);
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let ws = Workspace::new();
        let code = run_cli(&[
            "compute",
            "-i",
            &ws.path("history.csv"),
            "-c",
            &ws.path("nope.ini"),
        ]);
        expect_exit(code, 2);
    }
}

mod info_and_validate {
    use super::*;

    #[test]
    fn info_succeeds_on_csv() {
        let ws = Workspace::new();
        let code = run_cli(&[
            "info",
            "-i",
            &ws.path("history.csv"),
            "-c",
            &ws.path("replenish.ini"),
        ]);
        expect_exit(code, 0);
    }

    #[test]
    fn validate_accepts_full_config() {
        let ws = Workspace::new();
        let code = run_cli(&["validate", "-c", &ws.path("replenish.ini")]);
        expect_exit(code, 0);
    }

    #[test]
    fn validate_accepts_config_without_parameters() {
        let ws = Workspace::new();
        let config = ws.write("layout.ini", "[source]\nskip_rows = 2\n");
        let code = run_cli(&["validate", "-c", &config]);
        expect_exit(code, 0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let ws = Workspace::new();
        for content in [
            "[parameters]\nwindow_size = 0\n",
            "[parameters]\nsafety_coefficient = lots\n",
            "[source]\nskip_rows = -1\n",
            "[source]\nproduct_name_column =\n",
            "[report]\nlocale = de\n",
            "[report]\nhidden_columns = reorder_threshold\n",
        ] {
            let config = ws.write("bad.ini", content);
            let code = run_cli(&["validate", "-c", &config]);
            expect_exit(code, 2);
        }
    }
}
