//! Configuration validation.
//!
//! Run parameters come from the command line first and the `[parameters]`
//! section second; a parameter found in neither is an error. Layout and
//! report sections only carry optional keys and are range-checked here.

use crate::domain::assembler::ReportField;
use crate::domain::error::ReplenishError;
use crate::domain::layout::split_list;
use crate::domain::reorder::ReorderParams;
use crate::ports::config_port::ConfigPort;

pub const PARAMETERS: &str = "parameters";
pub const SOURCE: &str = "source";
pub const STOCK: &str = "stock";
pub const REPORT: &str = "report";

pub const SUPPORTED_LOCALES: &[&str] = &["en", "fr"];

/// Parameter values given on the command line, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterOverrides {
    pub safety_coefficient: Option<f64>,
    pub window_size: Option<i64>,
    pub lead_time_days: Option<i64>,
    pub order_frequency_days: Option<i64>,
}

pub fn resolve_parameters(
    overrides: &ParameterOverrides,
    config: &dyn ConfigPort,
) -> Result<ReorderParams, ReplenishError> {
    let safety_coefficient = match overrides.safety_coefficient {
        Some(v) => v,
        None => required_double(config, "safety_coefficient")?,
    };
    let window_size = match overrides.window_size {
        Some(v) => v,
        None => required_int(config, "window_size")?,
    };
    let lead_time_days = match overrides.lead_time_days {
        Some(v) => v,
        None => required_int(config, "lead_time_days")?,
    };
    let order_frequency_days = match overrides.order_frequency_days {
        Some(v) => v,
        None => required_int(config, "order_frequency_days")?,
    };

    ReorderParams::new(
        safety_coefficient,
        window_size,
        lead_time_days,
        order_frequency_days,
    )
}

fn required_value(config: &dyn ConfigPort, key: &str) -> Result<String, ReplenishError> {
    match config.get_string(PARAMETERS, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ReplenishError::ConfigMissing {
            section: PARAMETERS.to_string(),
            key: key.to_string(),
        }),
    }
}

fn required_double(config: &dyn ConfigPort, key: &str) -> Result<f64, ReplenishError> {
    let raw = required_value(config, key)?;
    raw.parse().map_err(|_| ReplenishError::ConfigInvalid {
        section: PARAMETERS.to_string(),
        key: key.to_string(),
        reason: format!("expected a number, got {:?}", raw),
    })
}

fn required_int(config: &dyn ConfigPort, key: &str) -> Result<i64, ReplenishError> {
    let raw = required_value(config, key)?;
    raw.parse().map_err(|_| ReplenishError::ConfigInvalid {
        section: PARAMETERS.to_string(),
        key: key.to_string(),
        reason: format!("expected a whole number of days, got {:?}", raw),
    })
}

/// Validate the optional layout and report sections.
pub fn validate_layout_config(config: &dyn ConfigPort) -> Result<(), ReplenishError> {
    for key in ["skip_rows", "skip_trailing_rows", "sheet"] {
        validate_count(config, SOURCE, key)?;
    }
    for key in ["skip_rows", "sheet"] {
        validate_count(config, STOCK, key)?;
    }
    for key in ["product_id_column", "product_name_column", "date_column", "quantity_column"] {
        validate_not_blank(config, SOURCE, key)?;
    }
    for key in ["product_id_column", "quantity_column", "path"] {
        validate_not_blank(config, STOCK, key)?;
    }
    validate_date_formats(config)?;
    Ok(())
}

pub fn validate_report_config(config: &dyn ConfigPort) -> Result<(), ReplenishError> {
    validate_locale(config)?;
    validate_hidden_columns(config)?;
    Ok(())
}

/// Check whichever `[parameters]` keys are present without requiring any.
pub fn validate_parameters_section(config: &dyn ConfigPort) -> Result<(), ReplenishError> {
    let present = |key: &str| {
        config
            .get_string(PARAMETERS, key)
            .is_some_and(|s| !s.trim().is_empty())
    };

    let safety_coefficient = if present("safety_coefficient") {
        required_double(config, "safety_coefficient")?
    } else {
        0.0
    };
    let mut days = [1_i64, 0, 0];
    for (slot, key) in days
        .iter_mut()
        .zip(["window_size", "lead_time_days", "order_frequency_days"])
    {
        if present(key) {
            *slot = required_int(config, key)?;
        }
    }

    ReorderParams::new(safety_coefficient, days[0], days[1], days[2]).map(|_| ())
}

fn validate_count(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), ReplenishError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 0 => Ok(()),
        _ => Err(ReplenishError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{} must be a non-negative integer", key),
        }),
    }
}

fn validate_not_blank(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), ReplenishError> {
    match config.get_string(section, key) {
        Some(s) if s.trim().is_empty() => Err(ReplenishError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{} must not be empty", key),
        }),
        _ => Ok(()),
    }
}

fn validate_date_formats(config: &dyn ConfigPort) -> Result<(), ReplenishError> {
    let Some(raw) = config.get_string(SOURCE, "date_formats") else {
        return Ok(());
    };
    if split_list(&raw).is_empty() {
        return Err(ReplenishError::ConfigInvalid {
            section: SOURCE.to_string(),
            key: "date_formats".to_string(),
            reason: "at least one date format is required".to_string(),
        });
    }
    Ok(())
}

fn validate_locale(config: &dyn ConfigPort) -> Result<(), ReplenishError> {
    let Some(locale) = config.get_string(REPORT, "locale") else {
        return Ok(());
    };
    if SUPPORTED_LOCALES.contains(&locale.trim().to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ReplenishError::ConfigInvalid {
            section: REPORT.to_string(),
            key: "locale".to_string(),
            reason: format!(
                "unsupported locale {:?} (expected one of {})",
                locale,
                SUPPORTED_LOCALES.join(", ")
            ),
        })
    }
}

fn validate_hidden_columns(config: &dyn ConfigPort) -> Result<(), ReplenishError> {
    hidden_report_columns(config, "").map(|_| ())
}

/// Columns listed in `[report] hidden_columns`, or in `default` when the key
/// is absent. Only input columns can be hidden.
pub fn hidden_report_columns(
    config: &dyn ConfigPort,
    default: &str,
) -> Result<Vec<ReportField>, ReplenishError> {
    let raw = config
        .get_string(REPORT, "hidden_columns")
        .unwrap_or_else(|| default.to_string());
    let invalid = |reason: String| ReplenishError::ConfigInvalid {
        section: REPORT.to_string(),
        key: "hidden_columns".to_string(),
        reason,
    };

    let mut hidden = Vec::new();
    for key in split_list(&raw) {
        match ReportField::from_key(&key) {
            Some(field) if field.is_derived() => {
                return Err(invalid(format!(
                    "{} is a computed column and cannot be hidden",
                    key
                )));
            }
            Some(field) => hidden.push(field),
            None => return Err(invalid(format!("unknown column {:?}", key))),
        }
    }
    Ok(hidden)
}
