//! Fix output formatting for display and export
//!
//! Screens showing a captured tree location use the text form; the JSON form
//! is what gets attached to a tree record.

use crate::core::{GpsFix, COORDINATE_DECIMALS};
use crate::validation::AccuracyBand;
use serde::{Deserialize, Serialize};

/// Flattened, serializable view of a fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedFix {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    pub accuracy_band: AccuracyBand,
    /// Capture time (milliseconds since epoch)
    pub timestamp_ms: u64,
}

impl From<&GpsFix> for FormattedFix {
    fn from(fix: &GpsFix) -> Self {
        Self {
            latitude_deg: fix.lat(),
            longitude_deg: fix.lon(),
            altitude_m: fix.alt(),
            accuracy_m: fix.accuracy_m(),
            accuracy_band: AccuracyBand::from_accuracy(fix.accuracy_m()),
            timestamp_ms: fix.timestamp_ms(),
        }
    }
}

/// Renders a fix into a string representation
pub trait FixFormatter {
    fn format(&self, fix: &GpsFix) -> String;
}

/// Human-readable single line, e.g. `39.309196, 26.685394 ±8.0 m (good)`
pub struct TextFormatter {
    /// Decimal places for accuracy and altitude
    pub precision: usize,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self { precision: 1 }
    }
}

impl FixFormatter for TextFormatter {
    fn format(&self, fix: &GpsFix) -> String {
        let decimals = COORDINATE_DECIMALS as usize;
        let mut out = format!("{:.*}, {:.*}", decimals, fix.lat(), decimals, fix.lon());

        if let Some(alt) = fix.alt() {
            out.push_str(&format!(" alt {:.*} m", self.precision, alt));
        }

        let band = AccuracyBand::from_accuracy(fix.accuracy_m());
        match fix.accuracy_m() {
            Some(acc) => out.push_str(&format!(" ±{:.*} m ({})", self.precision, acc, band)),
            None => out.push_str(&format!(" ({})", band)),
        }

        out
    }
}

/// JSON object built from `FormattedFix`
#[derive(Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl FixFormatter for JsonFormatter {
    fn format(&self, fix: &GpsFix) -> String {
        let formatted = FormattedFix::from(fix);
        let result = if self.pretty {
            serde_json::to_string_pretty(&formatted)
        } else {
            serde_json::to_string(&formatted)
        };
        // Plain numeric struct; serialization has no failure path here
        result.unwrap_or_default()
    }
}
