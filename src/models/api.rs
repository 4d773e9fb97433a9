use serde::{ Deserialize, Serialize };

pub const DEFAULT_CONVERSATION_ID: &str = "default";

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    /// Missing or blank ids share the `"default"` conversation.
    pub fn conversation_id(&self) -> &str {
        self.conversation_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_ID)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_defaults() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(req.conversation_id(), "default");

        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi","conversation_id":""}"#).unwrap();
        assert_eq!(req.conversation_id(), "default");

        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi","conversation_id":"abc"}"#).unwrap();
        assert_eq!(req.conversation_id(), "abc");
    }
}
