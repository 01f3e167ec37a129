//! Prediction label.

use serde::{Deserialize, Serialize};

/// Final classification of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Phishing,
    Legitimate,
}

impl Prediction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Phishing => "phishing",
            Prediction::Legitimate => "legitimate",
        }
    }

    /// Binary coding used by the ensemble vote (phishing = 1).
    pub fn as_binary(&self) -> f64 {
        match self {
            Prediction::Phishing => 1.0,
            Prediction::Legitimate => 0.0,
        }
    }

    pub fn is_phishing(&self) -> bool {
        matches!(self, Prediction::Phishing)
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Prediction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phishing" => Ok(Prediction::Phishing),
            "legitimate" => Ok(Prediction::Legitimate),
            other => Err(format!("unknown prediction label: {}", other)),
        }
    }
}
