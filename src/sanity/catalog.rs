//! Property catalogue queries and contact mutations.

use chrono::{ SecondsFormat, Utc };
use log::warn;
use serde_json::{ json, Number, Value };
use std::collections::BTreeSet;

use super::{ DocumentStore, GroqQuery, Mutation, MutationResult, Predicate };

pub const PROPERTY_TYPE: &str = "property";
pub const LEAD_TYPE: &str = "lead";
pub const INQUIRY_TYPE: &str = "propertyInquiry";
pub const LEAD_SOURCE: &str = "AI Chatbot";
pub const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub property_type: Option<String>,
    pub min_price: Option<Number>,
    pub max_price: Option<Number>,
}

/// Zero is treated as "no bound", like an absent price.
fn price_bound(price: &Option<Number>) -> Option<Number> {
    price.clone().filter(|p| p.as_f64().is_some_and(|v| v != 0.0))
}

impl PropertyFilter {
    fn to_query(&self) -> GroqQuery {
        let property_type = self.property_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Predicate::eq("type", t));
        let min_price = price_bound(&self.min_price).map(|p| Predicate::gte("price", p));
        let max_price = price_bound(&self.max_price).map(|p| Predicate::lte("price", p));

        GroqQuery::documents(PROPERTY_TYPE)
            .filter_opt(property_type)
            .filter_opt(min_price)
            .filter_opt(max_price)
            .order_by("_createdAt desc")
            .range(0, SEARCH_LIMIT)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

fn submitted_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub async fn search_properties(store: &dyn DocumentStore, filter: &PropertyFilter) -> Vec<Value> {
    let result = store.fetch(&filter.to_query()).await;
    if result.is_unavailable() {
        warn!("Property search could not reach the document store; reporting no matches");
    }
    result.into_documents()
}

pub async fn get_property_by_id(store: &dyn DocumentStore, property_id: &str) -> Option<Value> {
    let query = GroqQuery::documents(PROPERTY_TYPE)
        .filter(Predicate::eq("_id", property_id))
        .first();
    store.fetch(&query).await.into_documents().into_iter().next()
}

pub async fn get_all_property_types(store: &dyn DocumentStore) -> Vec<String> {
    let query = GroqQuery::documents(PROPERTY_TYPE).project(&["type"]);
    let types: BTreeSet<String> = store
        .fetch(&query).await
        .into_documents()
        .iter()
        .filter_map(|doc| doc.get("type").and_then(Value::as_str))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    types.into_iter().collect()
}

pub async fn save_lead(store: &dyn DocumentStore, contact: &Contact) -> MutationResult {
    let mutation = Mutation::create(LEAD_TYPE)
        .field("name", contact.name.as_str())
        .field("email", contact.email.as_str())
        .field("phone", contact.phone.as_str())
        .field("message", contact.message.as_str())
        .field("source", LEAD_SOURCE)
        .field("submittedAt", submitted_at());
    store.mutate(mutation).await
}

pub async fn save_property_inquiry(
    store: &dyn DocumentStore,
    property_id: &str,
    contact: &Contact
) -> MutationResult {
    let mutation = Mutation::create(INQUIRY_TYPE)
        .field("property", json!({ "_type": "reference", "_ref": property_id }))
        .field("name", contact.name.as_str())
        .field("email", contact.email.as_str())
        .field("phone", contact.phone.as_str())
        .field("message", contact.message.as_str())
        .field("submittedAt", submitted_at());
    store.mutate(mutation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanity::testing::RecordingStore;

    #[test]
    fn empty_filter_values_are_not_applied() {
        let filter = PropertyFilter {
            property_type: Some("  ".into()),
            min_price: Some(Number::from(0)),
            max_price: None,
        };
        assert_eq!(
            filter.to_query().render(),
            "*[_type == $p0] | order(_createdAt desc) [0...10]"
        );
    }

    #[test]
    fn all_filters_are_conjunctive() {
        let filter = PropertyFilter {
            property_type: Some("Condo".into()),
            min_price: Some(Number::from(100000)),
            max_price: Some(Number::from(500000)),
        };
        assert_eq!(
            filter.to_query().render(),
            "*[_type == $p0 && type == $p1 && price >= $p2 && price <= $p3] | order(_createdAt desc) [0...10]"
        );
    }

    #[test]
    fn negative_bounds_are_still_applied() {
        let filter = PropertyFilter {
            property_type: None,
            min_price: Some(Number::from(-1)),
            max_price: None,
        };
        let query = filter.to_query();
        assert_eq!(query.render(), "*[_type == $p0 && price >= $p1] | order(_createdAt desc) [0...10]");
        assert_eq!(query.params()[1], ("$p1".to_string(), "-1".to_string()));
    }

    #[tokio::test]
    async fn property_types_are_deduplicated() {
        let store = RecordingStore::with_documents(
            vec![
                json!({ "type": "Condo" }),
                json!({ "type": "Land" }),
                json!({ "type": "Condo" }),
                json!({ "type": null }),
                json!({ "type": "" }),
                json!({})
            ]
        );
        assert_eq!(get_all_property_types(&store).await, vec!["Condo", "Land"]);
    }

    #[tokio::test]
    async fn lead_mutation_carries_source_and_timestamp() {
        let store = RecordingStore::with_documents(Vec::new());
        let contact = Contact {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            phone: "555-0100".into(),
            message: "Call me".into(),
        };
        let result = save_lead(&store, &contact).await;
        assert!(result.success);

        let mutations = store.mutations.lock().unwrap();
        let m = &mutations[0];
        assert_eq!(m.doc_type(), Some(LEAD_TYPE));
        assert_eq!(m.get("source"), Some(&json!(LEAD_SOURCE)));
        let ts = m.get("submittedAt").and_then(Value::as_str).unwrap();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[tokio::test]
    async fn inquiry_references_property() {
        let store = RecordingStore::with_documents(Vec::new());
        save_property_inquiry(&store, "prop-7", &Contact::default()).await;
        let mutations = store.mutations.lock().unwrap();
        assert_eq!(mutations[0].doc_type(), Some(INQUIRY_TYPE));
        assert_eq!(
            mutations[0].get("property"),
            Some(&json!({ "_type": "reference", "_ref": "prop-7" }))
        );
    }
}
