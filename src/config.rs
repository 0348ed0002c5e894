//! Scan configuration.
//!
//! Options are an explicit value passed into the scanner constructor; the
//! crate keeps no global state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Options for one scanner instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanOptions {
    /// Overall deadline for each `scan_catalog` call.
    ///
    /// Checked cooperatively between row reads; `None` means no deadline.
    #[serde(default, with = "duration_millis")]
    pub deadline: Option<Duration>,

    /// Fetch best-effort per-table record counts.
    ///
    /// Count failures never fail the scan; they surface as warnings.
    #[serde(default = "default_true")]
    pub fetch_record_counts: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            deadline: None,
            fetch_record_counts: true,
        }
    }
}

impl ScanOptions {
    /// Options with a deadline and everything else at defaults.
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::default()
        }
    }
}

fn default_true() -> bool {
    true
}

/// Serialize the optional deadline as integer milliseconds.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let millis: Option<u64> = Option::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
