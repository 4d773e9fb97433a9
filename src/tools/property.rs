use log::{ info, warn };
use serde::de::{ self, Deserializer };
use serde::{ Deserialize, Serialize };
use serde_json::{ Number, Value };

use crate::models::property::{ PropertyDetail, PropertyDocument, PropertySummary };
use crate::sanity::catalog::{ self, PropertyFilter };
use crate::sanity::DocumentStore;

pub const MAX_SEARCH_RESULTS: usize = 5;
const NO_MATCHES: &str = "No properties found matching your criteria.";
const NOT_FOUND: &str = "Property not found.";

#[derive(Debug, Default, Deserialize)]
pub struct SearchArgs {
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "price")]
    pub min_price: Option<Number>,
    #[serde(default, deserialize_with = "price")]
    pub max_price: Option<Number>,
}

/// Accepts prices as integers, floats or numeric strings. Whole amounts are
/// normalised to integers, so `500000.0` and `"500000"` both become `500000`.
fn price<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error> where D: Deserializer<'de> {
    let parsed = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => {
            return Err(de::Error::custom(format!("expected a price, got {}", other)));
        }
    };
    let amount = parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| <D::Error as de::Error>::custom("price is not a finite number"))?;

    if amount.fract() == 0.0 && amount.abs() < (i64::MAX as f64) {
        Ok(Some(Number::from(amount as i64)))
    } else {
        Ok(Number::from_f64(amount))
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub properties: Vec<PropertySummary>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsArgs {
    pub property_id: String,
}

#[derive(Debug, Serialize)]
pub struct DetailsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyDetail>,
}

#[derive(Debug, Serialize)]
pub struct PropertyTypesResponse {
    pub success: bool,
    pub property_types: Vec<String>,
}

fn parse_document(raw: Value) -> Option<PropertyDocument> {
    match serde_json::from_value::<PropertyDocument>(raw) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!("Skipping malformed property document: {}", e);
            None
        }
    }
}

pub async fn search_real_estate_properties(
    store: &dyn DocumentStore,
    args: SearchArgs
) -> SearchResponse {
    info!(
        "Searching properties: type={:?}, min={:?}, max={:?}",
        args.property_type,
        args.min_price,
        args.max_price
    );

    let filter = PropertyFilter {
        property_type: args.property_type,
        min_price: args.min_price,
        max_price: args.max_price,
    };
    let properties: Vec<PropertySummary> = catalog
        ::search_properties(store, &filter).await
        .into_iter()
        .filter_map(parse_document)
        .take(MAX_SEARCH_RESULTS)
        .map(|doc| doc.summary())
        .collect();

    if properties.is_empty() {
        return SearchResponse {
            success: true,
            count: 0,
            message: Some(NO_MATCHES.to_string()),
            properties,
        };
    }

    SearchResponse {
        success: true,
        count: properties.len(),
        message: None,
        properties,
    }
}

pub async fn get_property_details(store: &dyn DocumentStore, args: DetailsArgs) -> DetailsResponse {
    info!("Fetching property details: {}", args.property_id);

    match catalog::get_property_by_id(store, &args.property_id).await.and_then(parse_document) {
        Some(doc) =>
            DetailsResponse {
                success: true,
                message: None,
                property: Some(doc.detail()),
            },
        None =>
            DetailsResponse {
                success: false,
                message: Some(NOT_FOUND.to_string()),
                property: None,
            },
    }
}

pub async fn get_available_property_types(store: &dyn DocumentStore) -> PropertyTypesResponse {
    info!("Fetching property types");
    PropertyTypesResponse {
        success: true,
        property_types: catalog::get_all_property_types(store).await,
    }
}
