use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub object: &'static str,
    pub data: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: &'static str,
    pub created: u64,
    pub owned_by: String,
}

impl ModelsResponse {
    /// Both lanes serve the same model, so the list always has one entry.
    pub fn single(model: &str) -> Self {
        Self {
            object: "list",
            data: vec![ModelInfo {
                id: model.to_string(),
                object: "model",
                created: 0,
                owned_by: "stt-lanes".to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
