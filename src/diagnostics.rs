//! Non-fatal warnings collected during compilation.

use serde::Serialize;

/// A warning with enough context to locate its cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Canonical name of the type being compiled when the warning was raised.
    pub type_name: String,
    /// Field the warning concerns, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered, deduplicated warning list for one compilation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning unless one with the same text exists.
    pub fn warn(&mut self, type_name: &str, field: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        if self.warnings.iter().any(|w| w.message == message) {
            return;
        }
        self.warnings.push(Warning {
            type_name: type_name.to_string(),
            field: field.map(String::from),
            message,
        });
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// Deliver warnings to the log, prefixed with the root's simple name.
pub fn report(root: &str, warnings: &[Warning]) {
    for warning in warnings {
        match &warning.field {
            Some(field) => tracing::warn!(
                type_name = %warning.type_name,
                field = %field,
                "{}: {}",
                root,
                warning.message
            ),
            None => tracing::warn!(
                type_name = %warning.type_name,
                "{}: {}",
                root,
                warning.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_by_text() {
        let mut diags = Diagnostics::new();
        diags.warn("com.example.A", Some("x"), "Missing description on field x");
        diags.warn("com.example.B", Some("x"), "Missing description on field x");
        diags.warn("com.example.A", None, "Unsupported Type: com.example.C");
        assert_eq!(diags.len(), 2);

        let warnings = diags.into_warnings();
        assert_eq!(warnings[0].type_name, "com.example.A");
        assert_eq!(warnings[1].field, None);
    }

    #[test]
    fn display_is_message() {
        let warning = Warning {
            type_name: "com.example.A".into(),
            field: None,
            message: "something odd".into(),
        };
        assert_eq!(warning.to_string(), "something odd");
    }
}
