#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl Model {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Model every session talks to unless the operator configures another one.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

pub fn default_openai_models() -> Vec<Model> {
    vec![
        Model::from_id("gpt-4").with_description("Paper tutor default"),
        Model::from_id("gpt-4-32k").with_description("Long-context GPT-4 for full papers"),
        Model::from_id("gpt-4o").with_description("High quality general model"),
        Model::from_id("gpt-4o-mini").with_description("Balanced cost/performance"),
    ]
}
