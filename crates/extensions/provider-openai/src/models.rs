//! OpenAI model definitions.

use webvision_protocols::ModelDefinition;

/// Models known to work with the browser tool palette.
pub fn get_models() -> Vec<ModelDefinition> {
    vec![
        ModelDefinition::new("gpt-4o", "GPT-4o").with_vision(),
        ModelDefinition::new("gpt-4o-mini", "GPT-4o Mini").with_vision(),
        ModelDefinition::new("gpt-4.1", "GPT-4.1")
            .with_context_length(1_047_576)
            .with_vision(),
        ModelDefinition::new("gpt-4-turbo", "GPT-4 Turbo").with_vision(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_not_empty() {
        assert!(!get_models().is_empty());
    }

    #[test]
    fn test_gpt4o_capabilities() {
        let models = get_models();
        let gpt4o = models.iter().find(|m| m.id == "gpt-4o").unwrap();
        assert!(gpt4o.supports_vision);
        assert!(gpt4o.supports_tools);
        assert_eq!(gpt4o.context_length, 128_000);
    }
}
