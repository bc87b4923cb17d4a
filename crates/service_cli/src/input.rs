//! Loading surcharge rows from disk.
//!
//! The format is chosen by extension: `.json` holds an array of rows,
//! `.csv` has a header line naming the row fields.

use std::path::Path;

use surcharge_core::types::SurchargeRow;
use tracing::{debug, info};

use crate::{CliError, Result};

/// Row filter shared by the output commands.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    /// Keep only this market
    pub market: Option<String>,
    /// Keep only this fuel category
    pub fuel_category: Option<String>,
    /// Keep only this carrier
    pub carrier: Option<String>,
}

impl RowFilter {
    fn accepts(&self, row: &SurchargeRow) -> bool {
        fn eq(want: &Option<String>, got: &str) -> bool {
            want.as_deref().map_or(true, |w| w.eq_ignore_ascii_case(got))
        }
        eq(&self.market, &row.market)
            && eq(&self.fuel_category, &row.fuel_category)
            && eq(&self.carrier, &row.carrier)
    }
}

/// Read all rows from `path`.
pub fn load_rows(path: &str) -> Result<Vec<SurchargeRow>> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(CliError::FileNotFound(path.to_string()));
    }

    let ext = p
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "json" => {
            let content = std::fs::read_to_string(p)?;
            serde_json::from_str::<Vec<SurchargeRow>>(&content)?
        }
        "csv" => {
            let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(p)?;
            reader
                .deserialize::<SurchargeRow>()
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        other => return Err(CliError::UnsupportedFormat(other.to_string())),
    };

    info!(path, rows = rows.len(), "loaded surcharge rows");
    Ok(rows)
}

/// Read rows from `path` and keep those accepted by `filter`.
pub fn load_filtered(path: &str, filter: &RowFilter) -> Result<Vec<SurchargeRow>> {
    let rows: Vec<SurchargeRow> = load_rows(path)?
        .into_iter()
        .filter(|r| filter.accepts(r))
        .collect();
    debug!(kept = rows.len(), "rows after filter");
    Ok(rows)
}
