use serde::{ Deserialize, Serialize };
use serde_json::{ json, Map, Value };

/// A single `create` mutation for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    document: Map<String, Value>,
}

impl Mutation {
    pub fn create(doc_type: &str) -> Self {
        let mut document = Map::new();
        document.insert("_type".to_string(), Value::String(doc_type.to_string()));
        Self { document }
    }

    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.document.insert(name.to_string(), value.into());
        self
    }

    pub fn doc_type(&self) -> Option<&str> {
        self.document.get("_type").and_then(Value::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.document.get(name)
    }

    pub fn to_payload(&self) -> Value {
        json!({ "mutations": [{ "create": self.document }] })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResult {
    pub fn created(id: Option<String>) -> Self {
        Self { success: true, id, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, id: None, error: Some(error.into()) }
    }
}
