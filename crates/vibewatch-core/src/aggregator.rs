//! Per-session severity tally, risk index and verdict.
//!
//! The risk index is the weighted mean of severity codes,
//! `(normal*1 + alert*2 + failure*3) / total`, so it lies in `[1, 3]` once
//! any sample is recorded and is defined as `0` for an empty session.

use serde::{Deserialize, Serialize};

use crate::classifier::Severity;

/// Risk index at or above which a session is Critical.
pub const CRITICAL_THRESHOLD: f64 = 2.5;
/// Risk index at or above which a session is Caution.
pub const CAUTION_THRESHOLD: f64 = 1.5;

/// Classification counts for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionCounts {
    pub normal: u64,
    pub alert: u64,
    pub failure: u64,
}

impl SessionCounts {
    pub fn total(&self) -> u64 {
        self.normal + self.alert + self.failure
    }

    pub fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Normal => self.normal,
            Severity::Alert => self.alert,
            Severity::Failure => self.failure,
        }
    }
}

/// Session-level judgment tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictTier {
    GoodCondition,
    Caution,
    Critical,
}

impl VerdictTier {
    /// Map a risk index to a tier.
    pub fn from_risk_index(risk_index: f64) -> Self {
        if risk_index >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if risk_index >= CAUTION_THRESHOLD {
            Self::Caution
        } else {
            Self::GoodCondition
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Self::GoodCondition => {
                "Vibration stayed within normal limits. The appliance can stay in service."
            }
            Self::Caution => {
                "Elevated vibration during the session. Inspect the load, blade assembly and mounting before the next run."
            }
            Self::Critical => {
                "Sustained critical vibration. Take the appliance out of service and schedule maintenance."
            }
        }
    }
}

impl std::fmt::Display for VerdictTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoodCondition => write!(f, "good condition"),
            Self::Caution => write!(f, "caution"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Final judgment for a stopped session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub tier: VerdictTier,
    pub risk_index: f64,
    pub recommendation: String,
    pub counts: SessionCounts,
}

/// Accumulates severities for the active session.
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    counts: SessionCounts,
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero all counters. Called once when a session starts.
    pub fn reset(&mut self) {
        self.counts = SessionCounts::default();
    }

    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Normal => self.counts.normal += 1,
            Severity::Alert => self.counts.alert += 1,
            Severity::Failure => self.counts.failure += 1,
        }
    }

    pub fn counts(&self) -> SessionCounts {
        self.counts
    }

    pub fn risk_index(&self) -> f64 {
        risk_index(&self.counts)
    }

    /// Build the verdict from the current counts. Does not modify state, so
    /// repeated calls without an intervening `record` agree.
    pub fn finalize(&self) -> Verdict {
        let risk_index = self.risk_index();
        let tier = VerdictTier::from_risk_index(risk_index);
        Verdict {
            tier,
            risk_index,
            recommendation: tier.recommendation().to_string(),
            counts: self.counts,
        }
    }
}

/// Weighted mean severity code; `0.0` when nothing was recorded.
pub fn risk_index(counts: &SessionCounts) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }
    let weighted = counts.normal * Severity::Normal.code() as u64
        + counts.alert * Severity::Alert.code() as u64
        + counts.failure * Severity::Failure.code() as u64;
    weighted as f64 / total as f64
}
