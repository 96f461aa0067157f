use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Replay a past alert from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatAlertRequest {
    pub name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Fire a styled preview alert from the customization page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewAlertRequest {
    /// Comment text to preview; the server substitutes a default when absent.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub effect: Option<String>,
}
