//! Analysis Request Models
//!
//! Data structures for starting an analysis session: the perspective to
//! analyze from, the property facts, and the generator preference.

use serde::{Deserialize, Serialize};

/// Perspective the analysis is run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tenant,
    Landlord,
    Broker,
}

impl Default for Role {
    fn default() -> Self {
        Self::Tenant
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tenant => "tenant",
            Role::Landlord => "landlord",
            Role::Broker => "broker",
        }
    }
}

/// Which LLM backs recommendation generation. The service accepts both and
/// normalizes anything unknown to OpenAI, so this enum does the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Anthropic,
}

impl From<String> for LlmProvider {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => LlmProvider::Anthropic,
            _ => LlmProvider::OpenAi,
        }
    }
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
        }
    }
}

/// Everything needed to start an analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Perspective to analyze from
    pub analyze_as: Role,
    /// Property display name
    pub property_name: String,
    /// Street address used for market research
    pub address: String,
    /// Leasable area, as entered (units are the user's)
    pub leasable_area: String,
    /// Current base rent, as entered
    pub current_base_rent: String,
    /// Pasted lease text, if the user provided one
    pub document_text: Option<String>,
    /// Generator preference
    pub llm_provider: LlmProvider,
}

impl AnalyzeRequest {
    /// Create a request with the required property facts and default
    /// perspective/provider.
    pub fn new(
        property_name: impl Into<String>,
        address: impl Into<String>,
        leasable_area: impl Into<String>,
        current_base_rent: impl Into<String>,
    ) -> Self {
        Self {
            analyze_as: Role::default(),
            property_name: property_name.into(),
            address: address.into(),
            leasable_area: leasable_area.into(),
            current_base_rent: current_base_rent.into(),
            document_text: None,
            llm_provider: LlmProvider::default(),
        }
    }

    /// Set the analysis perspective
    pub fn analyzing_as(mut self, role: Role) -> Self {
        self.analyze_as = role;
        self
    }

    /// Attach pasted lease text
    pub fn with_document_text(mut self, text: impl Into<String>) -> Self {
        self.document_text = Some(text.into());
        self
    }

    /// Set the generator preference
    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.llm_provider = provider;
        self
    }

    /// Validate the request before submission
    pub fn validate(&self) -> Result<(), String> {
        if self.property_name.trim().is_empty() {
            return Err("Property name is required".to_string());
        }
        if self.address.trim().is_empty() {
            return Err("Address is required".to_string());
        }
        Ok(())
    }

    /// Form fields for the start endpoint (urlencoded body).
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("analyze_as", self.analyze_as.as_str().to_string()),
            ("property_name", self.property_name.clone()),
            ("address", self.address.clone()),
            ("leasable_area", self.leasable_area.clone()),
            ("current_base_rent", self.current_base_rent.clone()),
            ("llm_provider", self.llm_provider.as_str().to_string()),
        ];
        if let Some(text) = &self.document_text {
            form.push(("document_text", text.clone()));
        }
        form
    }
}
