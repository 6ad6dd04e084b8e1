//! Structured documents returned by the analysis service.
//!
//! The wire shape is externally defined and loosely specified, so every
//! section and every field is optional and unknown fields are carried
//! through untouched. Consumers read what is present and fall back to
//! defaults — nothing here validates the interior beyond "is valid JSON".

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// KID document
// ═══════════════════════════════════════════

/// Key information section of a KID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInformation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guarantor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_amount: Option<String>,
}

/// One cost line (entry cost, exit cost, management fee, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Percentage of invested amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Risk section. The indicator arrives as a string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_indicator: Option<String>,
}

impl RiskSection {
    /// Summary risk indicator on the regulatory 1-7 scale, when the wire
    /// value parses and is in range.
    pub fn level(&self) -> Option<u8> {
        let level: u8 = self.risk_indicator.as_deref()?.trim().parse().ok()?;
        (1..=7).contains(&level).then_some(level)
    }
}

/// One performance scenario row. Holding-period values keep whatever
/// shape the service produced (typically period label → number).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScenario {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(flatten)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

/// The structured KID payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KidDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<KeyInformation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub costs: Vec<CostEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risks: Option<RiskSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performance_scenarios: Vec<PerformanceScenario>,
    /// Sections this model does not know about, preserved as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl KidDocument {
    /// Interpret a raw result payload, defaulting to an empty document
    /// when the payload is not an object of the expected shape.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn risk_level(&self) -> Option<u8> {
        self.risks.as_ref()?.level()
    }

    /// Sum of all cost percentages that carry a value.
    pub fn total_costs(&self) -> f64 {
        self.costs.iter().filter_map(|c| c.value).sum()
    }
}

// ═══════════════════════════════════════════
// Annual report metrics
// ═══════════════════════════════════════════

/// Company identification extracted from an annual report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
}

/// Headline financials extracted from an annual report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_per_share: Option<f64>,
}

/// The structured annual-report payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualReportMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_info: Option<CompanyInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_metrics: Option<FinancialMetrics>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AnnualReportMetrics {
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}
