//! Evaluation context and the process-wide compatibility mode

use std::sync::atomic::{AtomicU8, Ordering};

use chrono::NaiveDate;

/// Which numeric conventions the financial functions follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compatibility {
    /// Match the spreadsheet application
    #[default]
    Excel,
    /// Match the numpy-financial conventions
    Python,
}

impl Compatibility {
    fn to_u8(self) -> u8 {
        match self {
            Compatibility::Excel => 0,
            Compatibility::Python => 1,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Compatibility::Python,
            _ => Compatibility::Excel,
        }
    }
}

static COMPATIBILITY: AtomicU8 = AtomicU8::new(0);

/// The process-wide compatibility mode
pub fn compatibility() -> Compatibility {
    Compatibility::from_u8(COMPATIBILITY.load(Ordering::Acquire))
}

/// Set the process-wide compatibility mode
///
/// Meant for the start-up phase; contexts snapshot the mode when created.
pub fn set_compatibility(mode: Compatibility) {
    COMPATIBILITY.store(mode.to_u8(), Ordering::Release);
}

/// Per-call context handed to every function
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    compatibility: Compatibility,
    today: Option<NaiveDate>,
}

impl EvaluationContext {
    /// Create a context using the current process-wide settings
    pub fn new() -> Self {
        Self {
            compatibility: compatibility(),
            today: None,
        }
    }

    pub fn with_compatibility(mut self, mode: Compatibility) -> Self {
        self.compatibility = mode;
        self
    }

    /// Pin the date `TODAY()` reports
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn compatibility(&self) -> Compatibility {
        self.compatibility
    }

    /// The pinned date, or the local calendar date
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_overrides() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let ctx = EvaluationContext::new()
            .with_compatibility(Compatibility::Python)
            .with_today(date);
        assert_eq!(ctx.compatibility(), Compatibility::Python);
        assert_eq!(ctx.today(), date);
    }

    #[test]
    fn test_mode_encoding() {
        for mode in [Compatibility::Excel, Compatibility::Python] {
            assert_eq!(Compatibility::from_u8(mode.to_u8()), mode);
        }
    }
}
