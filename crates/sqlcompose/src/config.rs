use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How parameter placeholders are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterStyle {
    /// `?`
    #[default]
    QuestionMark,
    /// `$1`, `$2`, ...
    Dollar,
}

/// Configuration for rendering statements to SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Wrap all identifiers in double quotes.
    pub quote_identifiers: bool,
    /// Render column references as `relation.column`.
    pub qualify_columns: bool,
    pub parameter_style: ParameterStyle,
}

impl SerializerConfig {
    /// Load a config from a json object. Missing keys take their default
    /// values.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn with_quote_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = quote;
        self
    }

    pub fn with_qualify_columns(mut self, qualify: bool) -> Self {
        self.qualify_columns = qualify;
        self
    }

    pub fn with_parameter_style(mut self, style: ParameterStyle) -> Self {
        self.parameter_style = style;
        self
    }
}
