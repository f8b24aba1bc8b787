//! Content patterns applied to string scalars regardless of their key.
//!
//! All patterns compile onto the `regex` crate, which has no backtracking and
//! matches in time linear to the input. Custom patterns are additionally
//! capped in compiled size so a hostile policy file cannot blow up memory.

use crate::{RedactionError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Upper bound on the compiled program size of a single pattern.
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Upper bound on the lazy DFA cache of a single pattern.
pub const PATTERN_DFA_SIZE_LIMIT: usize = 1 << 21;

/// JSON Web Token (three base64url segments, header and payload start with `eyJ`).
pub const JWT_PATTERN: &str = r"eyJ[A-Za-z0-9_-]+\.eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+";

/// `Bearer <token>` as found in Authorization headers.
pub const BEARER_TOKEN_PATTERN: &str = r"(?i)\bbearer\s+[A-Za-z0-9\-._~+/]+=*";

/// `key=value`, `secret: value`, `password=value` style fragments.
pub const SECRET_ASSIGNMENT_PATTERN: &str =
    r#"(?i)(?:api[_-]?key|secret|token|passw(?:or)?d|pwd)\s*[=:]\s*[^\s&,;"']+"#;

/// Card numbers written as four groups of four digits.
pub const CARD_NUMBER_PATTERN: &str = r"\b\d{4}[ -]?\d{4}[ -]?\d{4}[ -]?\d{4}\b";

/// Digit runs long enough to be a bank account or national-ID number.
pub const LONG_DIGIT_RUN_PATTERN: &str = r"\b\d{10,}\b";

/// Email addresses.
pub const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

/// A named content pattern as it appears in a policy file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPattern {
    /// Name of the pattern (used in error messages).
    pub name: String,

    /// Regex source.
    pub pattern: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ContentPattern {
    /// Create a pattern with a name and regex source.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Compile the pattern with the engine's size limits.
    pub fn compile(&self) -> Result<Regex> {
        RegexBuilder::new(&self.pattern)
            .size_limit(PATTERN_SIZE_LIMIT)
            .dfa_size_limit(PATTERN_DFA_SIZE_LIMIT)
            .build()
            .map_err(|e| RedactionError::PatternError {
                name: self.name.clone(),
                message: e.to_string(),
            })
    }
}

/// The built-in content patterns, in evaluation order.
///
/// Token-shaped patterns run before the digit patterns so a JWT or bearer
/// token is replaced as a whole rather than piecewise.
pub fn default_patterns() -> Vec<ContentPattern> {
    vec![
        ContentPattern::new("jwt", JWT_PATTERN).with_description("JSON Web Token"),
        ContentPattern::new("bearer_token", BEARER_TOKEN_PATTERN)
            .with_description("Bearer credential"),
        ContentPattern::new("secret_assignment", SECRET_ASSIGNMENT_PATTERN)
            .with_description("key=value / secret=value fragment"),
        ContentPattern::new("card_number", CARD_NUMBER_PATTERN)
            .with_description("Payment card number"),
        ContentPattern::new("long_digit_run", LONG_DIGIT_RUN_PATTERN)
            .with_description("Bank account or national-ID number"),
        ContentPattern::new("email", EMAIL_PATTERN).with_description("Email address"),
    ]
}

/// A pattern ready to run.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    pub(crate) name: String,
    pub(crate) regex: Regex,
}

impl CompiledPattern {
    pub(crate) fn from_pattern(pattern: &ContentPattern) -> Result<Self> {
        Ok(Self {
            name: pattern.name.clone(),
            regex: pattern.compile()?,
        })
    }
}
