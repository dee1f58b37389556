use serde::Deserialize;

/// Settings for an [`EvaluationContext`](crate::EvaluationContext) and the REPL
/// around it. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    /// How deeply evaluation may nest before failing with a recursion error.
    pub max_depth: usize,
    pub prompt: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_depth: 10_000,
            prompt: "lispy> ".to_owned(),
        }
    }
}

impl InterpreterConfig {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() -> anyhow::Result<()> {
        let config = InterpreterConfig::from_json(r#"{"max_depth": 64}"#)?;
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.prompt, "lispy> ");
        assert_eq!(InterpreterConfig::from_json("{}")?, InterpreterConfig::default());
        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(InterpreterConfig::from_json(r#"{"max_dpeth": 64}"#).is_err());
    }
}
