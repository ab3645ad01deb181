use base64::{engine::general_purpose, Engine as _};
use regex::Regex;
use sha2::{Digest, Sha256};

#[allow(clippy::unwrap_used)]
mod patterns {
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref EMAIL_REGEX: Regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
        // Cartão Nacional de Saúde: 15 digits, checked before shorter numeric patterns.
        pub static ref CNS_REGEX: Regex = Regex::new(r"\b\d{3}\s?\d{4}\s?\d{4}\s?\d{4}\b").unwrap();
        pub static ref CPF_REGEX: Regex = Regex::new(r"\b\d{3}\.?\d{3}\.?\d{3}-?\d{2}\b").unwrap();
        pub static ref PHONE_REGEX: Regex = Regex::new(r"(?:\+55\s?)?(?:\(\d{2}\)|\b\d{2})\s?9?\d{4}[-\s]?\d{4}\b").unwrap();
        pub static ref RECORD_REGEX: Regex = Regex::new(r"(?i)\b(?:prontu[aá]rio|mrn)\s*:?\s*\d+").unwrap();
    }
}

use patterns::*;

/// PHI redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_health_cards: bool,
    pub redact_cpf: bool,
    pub redact_phones: bool,
    pub redact_record_numbers: bool,
    /// Replace values with a short hash so the same value correlates across log lines.
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_health_cards: true,
            redact_cpf: true,
            redact_phones: true,
            redact_record_numbers: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// Redacts identifiers from free text (transcripts) before it is logged.
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = self.replace(&EMAIL_REGEX, &result, "EMAIL", |email| {
                let (user, domain) = email.split_once('@').unwrap_or((email, ""));
                format!(
                    "{}***@{}***",
                    user.chars().next().unwrap_or('*'),
                    domain.chars().next().unwrap_or('*')
                )
            });
        }

        if self.config.redact_record_numbers {
            result = self.replace(&RECORD_REGEX, &result, "PRONTUARIO", |_| {
                "PRONTUARIO[REDACTED]".to_string()
            });
        }

        if self.config.redact_health_cards {
            result = self.replace(&CNS_REGEX, &result, "CNS", |_| "CNS[REDACTED]".to_string());
        }

        if self.config.redact_cpf {
            result = self.replace(&CPF_REGEX, &result, "CPF", |_| "***.***.***-**".to_string());
        }

        if self.config.redact_phones {
            result = self.replace(&PHONE_REGEX, &result, "PHONE", |_| "(**) *****-****".to_string());
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn replace(
        &self,
        pattern: &Regex,
        text: &str,
        label: &str,
        mask: impl Fn(&str) -> String,
    ) -> String {
        pattern
            .replace_all(text, |caps: &regex::Captures| {
                let matched = caps.get(0).map_or("", |m| m.as_str());
                if self.config.hash_for_correlation {
                    format!("{label}[{}]", Self::hash_value(matched))
                } else {
                    mask(matched)
                }
            })
            .to_string()
    }

    fn hash_value(value: &str) -> String {
        let digest = Sha256::digest(value.as_bytes());
        // First 8 bytes keep the tag short
        general_purpose::STANDARD.encode(digest.get(..8).unwrap_or_default())
    }
}
