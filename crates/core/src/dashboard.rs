//! Dashboard Summary Model
//!
//! Roll-up verdict the analysis emits once enough topics are researched:
//! fair market rent, recommendation texts, and how the property sits inside
//! the user's portfolio. Arrives as a single `dashboard` stream event and is
//! replaced wholesale on every delivery.
//!
//! Every field defaults so that a partial payload (early pipeline versions
//! emit only `fair_market_rent`) still parses.

use serde::{Deserialize, Serialize};

/// Negotiation guidance block of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Recommendations {
    #[serde(default)]
    pub ideal_term: String,
    #[serde(default)]
    pub ideal_term_reasoning: String,
    #[serde(default)]
    pub negotiation_leverage: String,
    #[serde(default)]
    pub negotiation_leverage_reasoning: String,
    #[serde(default)]
    pub renewals: String,
    #[serde(default)]
    pub renewals_reasoning: String,
}

/// How this property's rent compares inside the user's portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PortfolioContext {
    #[serde(default)]
    pub this_property_rent: f64,
    #[serde(default)]
    pub portfolio_avg_rent: f64,
    /// Signed percentage difference against the portfolio average.
    #[serde(default)]
    pub comparison_pct: f64,
    #[serde(default)]
    pub comparison_text: String,
}

/// The property under analysis, echoed back verbatim from the start form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PropertyInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub leasable_area: String,
    #[serde(default)]
    pub current_base_rent: String,
}

/// Aggregated analysis verdict. Replaces any previously held summary
/// wholesale when a `dashboard` event arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DashboardSummary {
    /// Estimated fair market rent for the property, per area unit.
    #[serde(default)]
    pub fair_market_rent: f64,

    /// Confidence in the estimate, 0-100.
    #[serde(default)]
    pub confidence_score: u32,

    #[serde(default)]
    pub summary_text: Option<String>,

    #[serde(default)]
    pub recommendations: Recommendations,

    #[serde(default)]
    pub portfolio_context: PortfolioContext,

    /// Which generator produced the recommendation texts
    /// ("openai", "anthropic", or "fallback").
    #[serde(default)]
    pub recommendations_source: String,

    /// Present when the service splices the start-form property into the
    /// dashboard payload (restore responses do this).
    #[serde(default)]
    pub property: Option<PropertyInfo>,
}
