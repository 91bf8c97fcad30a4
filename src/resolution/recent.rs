use super::{keep_highest, ResolutionFunction, ValuePair};
use crate::dataset::Dataset;
use crate::error::StrategyWarning;
use crate::types::DATE_FIELD;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default `date` format of provenance entries, e.g. `05 Nov 2013 10:00:00 +0100`.
pub const DEFAULT_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

/// Keep the value(s) from the most recently dated provenance entry.
///
/// Contributions whose date is missing or unparsable are left out of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MostRecent {
    #[serde(default)]
    pub select_first: bool,
    /// chrono format string for the provenance `date` field.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for MostRecent {
    fn default() -> Self {
        Self {
            select_first: false,
            date_format: default_date_format(),
        }
    }
}

impl MostRecent {
    /// Parse a date with the configured format. Formats without an offset are read as UTC;
    /// formats without a time of day as midnight.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_str(text, &self.date_format) {
            return Some(dt.naive_utc());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, &self.date_format) {
            return Some(dt);
        }
        NaiveDate::parse_from_str(text, &self.date_format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

impl ResolutionFunction for MostRecent {
    fn name(&self) -> &'static str {
        "most_recent"
    }

    fn apply(&self, dataset: &Dataset, pairs: &[ValuePair]) -> Result<Vec<ValuePair>, StrategyWarning> {
        let mut dated = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let Some(text) = dataset.provenance_field(&pair.provenance, DATE_FIELD) else {
                warn!(provenance = %pair.provenance, "Provenance has no date, contribution ignored");
                continue;
            };
            match self.parse_date(&text) {
                Some(date) => dated.push((date, pair)),
                None => warn!(
                    provenance = %pair.provenance,
                    date = %text,
                    format = %self.date_format,
                    "Unparsable provenance date, contribution ignored"
                ),
            }
        }

        if dated.is_empty() && !pairs.is_empty() {
            return Err(StrategyWarning::NoParsableDate {
                format: self.date_format.clone(),
            });
        }
        Ok(keep_highest(&dated, self.select_first))
    }
}
