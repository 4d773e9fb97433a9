//! Remote document store access (Sanity content lake).
//!
//! Reads never fail towards callers: a broken transport shows up as
//! [`QueryResult::Unavailable`], which degrades to "no documents" through
//! [`QueryResult::into_documents`]. Writes report failure through
//! [`MutationResult`].

pub mod catalog;
mod client;
pub mod mutation;
pub mod query;

use async_trait::async_trait;
use serde_json::Value;

pub use client::{ SanityClient, SanityConfig };
pub use mutation::{ Mutation, MutationResult };
pub use query::{ GroqQuery, Predicate };

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request to document store failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("document store returned HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("malformed document store response: {0}")]
    Decode(String),
    #[error("invalid document store configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Documents(Vec<Value>),
    Unavailable(String),
}

impl QueryResult {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, QueryResult::Unavailable(_))
    }

    pub fn into_documents(self) -> Vec<Value> {
        match self {
            QueryResult::Documents(docs) => docs,
            QueryResult::Unavailable(_) => Vec::new(),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, query: &GroqQuery) -> QueryResult;

    async fn mutate(&self, mutation: Mutation) -> MutationResult;
}
