use or_core::{Error, Result, TextModel};
use std::sync::Arc;
use crate::Config;

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Dummy,
    OpenAi,
}

impl ModelKind {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "dummy" => Ok(Self::Dummy),
            "openai" => Ok(Self::OpenAi),
            other => Err(Error::Config(format!("Unknown model backend: {}", other))),
        }
    }
}

pub fn create_model(kind: ModelKind, config: Config) -> Result<Arc<dyn TextModel>> {
    let model: Arc<dyn TextModel> = match kind {
        ModelKind::Dummy => Arc::new(DummyModel::new()),
        ModelKind::OpenAi => Arc::new(OpenAiModel::new(config)?),
    };
    tracing::info!("🤖 Using {} model", model.name());
    Ok(model)
}
