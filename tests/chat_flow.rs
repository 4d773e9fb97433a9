use async_trait::async_trait;
use axum::body::{ to_bytes, Body };
use axum::http::{ Request, StatusCode };
use serde_json::{ json, Value };
use std::sync::{ Arc, Mutex };
use tower::ServiceExt;

use realty_agent::agent::ChatAgent;
use realty_agent::history::{ HistoryStore, MemoryHistoryStore, MAX_HISTORY_LEN };
use realty_agent::llm::{ AgentDefinition, AgentError, AgentRuntime, RunResult };
use realty_agent::sanity::{ DocumentStore, GroqQuery, Mutation, MutationResult, QueryResult };
use realty_agent::server::api::router;
use realty_agent::tools::{ ToolRegistry, SEARCH_PROPERTIES };

/// Catalog with two houses; remembers every rendered query and its params.
#[derive(Default)]
struct Catalog {
    queries: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

#[async_trait]
impl DocumentStore for Catalog {
    async fn fetch(&self, query: &GroqQuery) -> QueryResult {
        self.queries.lock().unwrap().push((query.render(), query.params()));
        QueryResult::Documents(
            vec![
                json!({
                    "_id": "p1",
                    "title": "Craftsman Bungalow",
                    "price": 450000,
                    "city": "Austin",
                    "state": "TX",
                    "beds": 3,
                    "baths": 2,
                    "type": "House",
                    "description": "Charming home."
                }),
                json!({
                    "_id": "p2",
                    "title": "Ranch House",
                    "price": 399000,
                    "city": "Round Rock",
                    "state": "TX",
                    "beds": 3,
                    "type": "House"
                })
            ]
        )
    }

    async fn mutate(&self, _mutation: Mutation) -> MutationResult {
        MutationResult::failed("read-only catalog")
    }
}

/// Stands in for the model: searches for houses under 500000 and reports
/// how many it found.
#[derive(Default)]
struct SearchingRuntime {
    inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl AgentRuntime for SearchingRuntime {
    async fn run(&self, agent: &AgentDefinition, input: &str) -> Result<RunResult, AgentError> {
        self.inputs.lock().unwrap().push(input.to_string());
        let found = agent.tools
            .call(SEARCH_PROPERTIES, json!({ "property_type": "House", "max_price": 500000 })).await
            .map_err(|e| AgentError::Other(e.to_string()))?;
        Ok(RunResult {
            final_output: format!("I found {} homes for you.", found["count"]),
            tool_calls: 1,
        })
    }
}

async fn post_chat(app: &axum::Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn chat_turns_search_and_remember_context() {
    let catalog = Arc::new(Catalog::default());
    let runtime = Arc::new(SearchingRuntime::default());
    let history = Arc::new(MemoryHistoryStore::new(MAX_HISTORY_LEN));
    let definition = AgentDefinition {
        name: "ScottJ_RealEstateBot".into(),
        instructions: "Help buyers find homes.".into(),
        model: "gemini-2.5-flash".into(),
        tools: Arc::new(ToolRegistry::new(catalog.clone())),
    };
    let agent = Arc::new(ChatAgent::new(runtime.clone(), definition, history.clone()));
    let app = router(agent, "http://localhost:3001");

    let first = "Find me a 3 bedroom house under 500000";
    let (status, body) = post_chat(
        &app,
        json!({ "message": first, "conversation_id": "abc" })
    ).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversation_id"], "abc");
    assert_eq!(body["response"], "I found 2 homes for you.");

    {
        let queries = catalog.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        let (text, params) = &queries[0];
        assert!(text.contains("type == $p1"));
        assert!(text.contains("price <= $p2"));
        assert!(params.contains(&("$p1".to_string(), "\"House\"".to_string())));
        assert!(params.contains(&("$p2".to_string(), "500000".to_string())));
    }

    let stored = history.get_or_create("abc").await.unwrap().messages;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].content, first);
    assert_eq!(stored[1].content, "I found 2 homes for you.");

    let (status, _) = post_chat(
        &app,
        json!({ "message": "What about in Austin?", "conversation_id": "abc" })
    ).await;
    assert_eq!(status, StatusCode::OK);

    let inputs = runtime.inputs.lock().unwrap().clone();
    assert_eq!(inputs[0], first);
    assert!(inputs[1].starts_with("Context from previous messages: "));
    assert!(inputs[1].contains(&format!("User said: {}. ", first)));
    assert!(inputs[1].contains("You replied: I found 2 homes for you.... "));
    assert!(inputs[1].ends_with("\n\nCurrent user message: What about in Austin?"));
    assert_eq!(history.get_or_create("abc").await.unwrap().messages.len(), 4);
}
