//! Tools the real-estate agent can call.
//!
//! The table of tool definitions is static; [`ToolRegistry`] binds it to a
//! document store and dispatches calls by name.

pub mod contact;
pub mod property;

use log::warn;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::{ Deserialize, Serialize };
use serde_json::{ json, Value };
use std::sync::Arc;

use crate::sanity::DocumentStore;

pub const SEARCH_PROPERTIES: &str = "search_real_estate_properties";
pub const PROPERTY_DETAILS: &str = "get_property_details";
pub const SAVE_LEAD: &str = "save_user_lead";
pub const PROPERTY_INQUIRY: &str = "inquire_about_property";
pub const PROPERTY_TYPES: &str = "get_available_property_types";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("invalid arguments for '{tool}': {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode result of '{tool}': {source}")]
    Encode {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

fn contact_properties() -> Value {
    json!({
        "name": { "type": "string", "description": "User's full name" },
        "email": { "type": "string", "description": "User's email address" },
        "phone": { "type": "string", "description": "User's phone number" },
        "message": { "type": "string", "description": "User's message or inquiry" }
    })
}

static DEFINITIONS: Lazy<Vec<ToolDefinition>> = Lazy::new(|| {
    let mut inquiry_properties = contact_properties();
    inquiry_properties["property_id"] = json!({
        "type": "string",
        "description": "The ID of the property being inquired about"
    });

    vec![
        ToolDefinition {
            name: SEARCH_PROPERTIES.to_string(),
            description: "Search for real estate properties based on filters. Returns up to 5 matching listings.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "property_type": {
                        "type": "string",
                        "description": "Type of property (e.g., \"House\", \"Apartment\", \"Condo\", \"Land\")"
                    },
                    "min_price": { "type": "integer", "description": "Minimum price in dollars" },
                    "max_price": { "type": "integer", "description": "Maximum price in dollars" }
                }
            }),
        },
        ToolDefinition {
            name: PROPERTY_DETAILS.to_string(),
            description: "Get detailed information about a specific property.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "property_id": { "type": "string", "description": "The unique ID of the property" }
                },
                "required": ["property_id"]
            }),
        },
        ToolDefinition {
            name: SAVE_LEAD.to_string(),
            description: "Save a user's contact information and inquiry as a lead.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": contact_properties(),
                "required": ["name", "email", "phone", "message"]
            }),
        },
        ToolDefinition {
            name: PROPERTY_INQUIRY.to_string(),
            description: "Save an inquiry about a specific property.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": inquiry_properties,
                "required": ["property_id", "name", "email", "phone", "message"]
            }),
        },
        ToolDefinition {
            name: PROPERTY_TYPES.to_string(),
            description: "Get all available property types in the database.".to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        }
    ]
});

pub fn definitions() -> &'static [ToolDefinition] {
    &DEFINITIONS
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

fn encode<T: Serialize>(tool: &str, result: T) -> Result<Value, ToolError> {
    serde_json::to_value(result).map_err(|source| ToolError::Encode {
        tool: tool.to_string(),
        source,
    })
}

#[derive(Clone)]
pub struct ToolRegistry {
    store: Arc<dyn DocumentStore>,
}

impl ToolRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn definitions(&self) -> &'static [ToolDefinition] {
        definitions()
    }

    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let store = self.store.as_ref();
        match name {
            SEARCH_PROPERTIES => {
                let args = parse_args(name, arguments)?;
                encode(name, property::search_real_estate_properties(store, args).await)
            }
            PROPERTY_DETAILS => {
                let args = parse_args(name, arguments)?;
                encode(name, property::get_property_details(store, args).await)
            }
            SAVE_LEAD => {
                let args = parse_args(name, arguments)?;
                encode(name, contact::save_user_lead(store, args).await)
            }
            PROPERTY_INQUIRY => {
                let args = parse_args(name, arguments)?;
                encode(name, contact::inquire_about_property(store, args).await)
            }
            PROPERTY_TYPES => encode(name, property::get_available_property_types(store).await),
            unknown => {
                warn!("Agent requested unknown tool '{}'", unknown);
                Err(ToolError::UnknownTool(unknown.to_string()))
            }
        }
    }
}
