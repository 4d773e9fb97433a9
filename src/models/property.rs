use serde::de::DeserializeOwned;
use serde::{ Deserialize, Deserializer, Serialize };
use serde_json::{ Number, Value };

pub const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Reads one field, turning a value of the wrong shape into `None` instead of
/// rejecting the whole document.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where D: Deserializer<'de>, T: DeserializeOwned
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A `property` document as stored in Sanity. Every field is optional since
/// the studio only enforces title and price, and a mistyped field is dropped
/// on its own.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDocument {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub beds: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pub baths: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pub sqft: Option<Number>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub year_built: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub id: Option<String>,
    pub title: Option<String>,
    pub price: Option<Number>,
    pub location: String,
    pub bedrooms: Option<Number>,
    pub bathrooms: Option<Number>,
    pub area: Option<Number>,
    pub property_type: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail {
    pub id: Option<String>,
    pub title: Option<String>,
    pub price: Option<Number>,
    pub location: String,
    pub bedrooms: Option<Number>,
    pub bathrooms: Option<Number>,
    pub area: Option<Number>,
    pub property_type: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub year_built: Option<Number>,
    pub status: Option<String>,
}

impl PropertyDocument {
    /// `"City, State"`, dropping separators when either side is missing.
    pub fn location(&self) -> String {
        format!(
            "{}, {}",
            self.city.as_deref().unwrap_or_default(),
            self.state.as_deref().unwrap_or_default()
        )
            .trim_matches(|c| c == ',' || c == ' ')
            .to_string()
    }

    pub fn summary(&self) -> PropertySummary {
        let description = self.description
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(DESCRIPTION_PREVIEW_CHARS)
            .collect();

        PropertySummary {
            id: self.id.clone(),
            title: self.title.clone(),
            price: self.price.clone(),
            location: self.location(),
            bedrooms: self.beds.clone(),
            bathrooms: self.baths.clone(),
            area: self.sqft.clone(),
            property_type: self.property_type.clone(),
            description,
        }
    }

    pub fn detail(&self) -> PropertyDetail {
        PropertyDetail {
            id: self.id.clone(),
            title: self.title.clone(),
            price: self.price.clone(),
            location: self.location(),
            bedrooms: self.beds.clone(),
            bathrooms: self.baths.clone(),
            area: self.sqft.clone(),
            property_type: self.property_type.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            year_built: self.year_built.clone(),
            status: self.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> PropertyDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn location_strips_missing_parts() {
        assert_eq!(doc(json!({ "city": "Austin", "state": "TX" })).location(), "Austin, TX");
        assert_eq!(doc(json!({ "city": "Austin" })).location(), "Austin");
        assert_eq!(doc(json!({ "state": "TX" })).location(), "TX");
        assert_eq!(doc(json!({})).location(), "");
    }

    #[test]
    fn mistyped_fields_are_dropped_individually() {
        let d = doc(
            json!({ "_id": "p7", "title": "Loft", "beds": "3", "price": null, "city": ["Austin"], "state": "TX" })
        );
        assert_eq!(d.id.as_deref(), Some("p7"));
        assert_eq!(d.title.as_deref(), Some("Loft"));
        assert!(d.beds.is_none());
        assert!(d.price.is_none());
        assert_eq!(d.location(), "TX");
    }

    #[test]
    fn summary_truncates_by_characters() {
        let long = "é".repeat(250);
        let summary = doc(json!({ "description": long })).summary();
        assert_eq!(summary.description.chars().count(), DESCRIPTION_PREVIEW_CHARS);
    }

    #[test]
    fn detail_keeps_full_description_and_camel_case_keys() {
        let long = "x".repeat(500);
        let d = doc(
            json!({ "_id": "p1", "yearBuilt": 1999, "sqft": 1800, "description": long, "type": "Condo" })
        ).detail();
        assert_eq!(d.description.as_deref().map(str::len), Some(500));

        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["yearBuilt"], json!(1999));
        assert_eq!(value["area"], json!(1800));
        assert_eq!(value["propertyType"], json!("Condo"));
    }
}
