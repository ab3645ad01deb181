//! Patient context attached to a spoken note.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{PipelineError, PipelineResult};

/// Where the note is being dictated. Every field is optional on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientContext {
    pub bed: Option<u32>,
    pub patient_id: Option<String>,
    pub unit: Option<String>,
}

/// Fallback applied when a request carries neither bed nor patient id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDefaults {
    pub bed: u32,
    pub unit: String,
    /// Reject context-less requests instead of defaulting them.
    pub require_context: bool,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self {
            bed: 8,
            unit: "UTI 1".to_string(),
            require_context: false,
        }
    }
}

fn positive_bed(value: &Value) -> Option<u32> {
    let bed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(bed).ok().filter(|bed| *bed > 0)
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl PatientContext {
    pub fn has_target(&self) -> bool {
        self.bed.is_some() || self.patient_id.is_some()
    }

    /// Parse the embedded JSON context blob. Unknown fields are ignored;
    /// beds must be positive integers (numbers or numeric strings).
    pub fn from_json_blob(blob: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(blob)?;
        Ok(Self {
            bed: value.get("bed").and_then(positive_bed),
            patient_id: value.get("patientId").and_then(non_empty_text),
            unit: value.get("unit").and_then(non_empty_text),
        })
    }

    /// Merge the request's hints: the JSON blob first, then query parameters,
    /// which win when they carry a usable value.
    pub fn from_hints(
        query_bed: Option<&str>,
        query_patient_id: Option<&str>,
        blob: Option<&str>,
    ) -> Self {
        let mut context = match blob.filter(|b| !b.trim().is_empty()) {
            Some(blob) => Self::from_json_blob(blob).unwrap_or_else(|err| {
                warn!(error = %err, "Ignoring unparsable patientContext");
                Self::default()
            }),
            None => Self::default(),
        };

        if let Some(bed) = query_bed.and_then(|b| positive_bed(&Value::String(b.to_string()))) {
            context.bed = Some(bed);
        }
        if let Some(patient_id) = query_patient_id.map(str::trim).filter(|id| !id.is_empty()) {
            context.patient_id = Some(patient_id.to_string());
        }

        context
    }

    /// Effective context for the pipeline: default bed when no target is
    /// known (or reject, if configured), default unit whenever missing.
    pub fn with_defaults(mut self, defaults: &ContextDefaults) -> PipelineResult<Self> {
        if !self.has_target() {
            if defaults.require_context {
                return Err(PipelineError::Validation(
                    "Missing patient context: provide bed or patientId".to_string(),
                ));
            }
            self.bed = Some(defaults.bed);
        }
        if self.unit.as_deref().map_or(true, |unit| unit.trim().is_empty()) {
            self.unit = Some(defaults.unit.clone());
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hints_get_fallback_bed_and_unit() {
        let context = PatientContext::from_hints(None, None, None)
            .with_defaults(&ContextDefaults::default())
            .unwrap();
        assert_eq!(context.bed, Some(8));
        assert_eq!(context.unit.as_deref(), Some("UTI 1"));
        assert_eq!(context.patient_id, None);
    }

    #[test]
    fn test_patient_id_alone_skips_bed_default() {
        let context = PatientContext::from_hints(None, Some("p-7"), None)
            .with_defaults(&ContextDefaults::default())
            .unwrap();
        assert_eq!(context.bed, None);
        assert_eq!(context.patient_id.as_deref(), Some("p-7"));
        assert_eq!(context.unit.as_deref(), Some("UTI 1"));
    }

    #[test]
    fn test_query_overrides_blob() {
        let blob = r#"{"bed": 2, "patientId": "p-1", "unit": "UTI 2"}"#;
        let context = PatientContext::from_hints(Some("4"), Some("p-4"), Some(blob));
        assert_eq!(context.bed, Some(4));
        assert_eq!(context.patient_id.as_deref(), Some("p-4"));
        assert_eq!(context.unit.as_deref(), Some("UTI 2"));
    }

    #[test]
    fn test_unusable_query_bed_keeps_blob_bed() {
        let blob = r#"{"bed": "3"}"#;
        assert_eq!(PatientContext::from_hints(Some("0"), None, Some(blob)).bed, Some(3));
        assert_eq!(PatientContext::from_hints(Some("abc"), None, Some(blob)).bed, Some(3));
    }

    #[test]
    fn test_malformed_blob_is_ignored() {
        let context = PatientContext::from_hints(Some("5"), None, Some("{not json"));
        assert_eq!(context.bed, Some(5));
        assert_eq!(context.patient_id, None);
    }

    #[test]
    fn test_require_context_rejects_missing_target() {
        let defaults = ContextDefaults {
            require_context: true,
            ..ContextDefaults::default()
        };
        let err = PatientContext::default().with_defaults(&defaults).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        let ok = PatientContext::from_hints(Some("2"), None, None).with_defaults(&defaults);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_wire_shape_uses_nulls() {
        let context = PatientContext {
            bed: Some(8),
            patient_id: None,
            unit: Some("UTI 1".into()),
        };
        assert_eq!(
            serde_json::to_value(&context).unwrap(),
            serde_json::json!({"bed": 8, "patientId": null, "unit": "UTI 1"})
        );
    }
}
