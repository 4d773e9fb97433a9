use async_trait::async_trait;
use log::{ debug, info, warn };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use serde_json::{ json, Value };
use uuid::Uuid;

use super::{ AgentDefinition, AgentError, AgentRuntime, RunResult };
use crate::tools::ToolDefinition;

/// Runs agents against any OpenAI-compatible `chat/completions` endpoint
/// (Gemini's compatibility layer by default), executing tool calls locally
/// until the model answers in plain text.
pub struct OpenAIAgentRuntime {
    http: HttpClient,
    completions_url: String,
    max_turns: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAIMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl OpenAIMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool_result(tool_call_id: &str, content: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAIToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: OpenAIFunctionCall,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAIFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Serialize)]
struct OpenAITool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [OpenAIMessage],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAITool<'a>>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

impl OpenAIAgentRuntime {
    pub fn new(api_key: &str, base_url: &str, max_turns: usize) -> Result<Self, AgentError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e|
                AgentError::Other(format!("Invalid API key format: {}", e))
            )?
        );

        let http = HttpClient::builder().default_headers(headers).build()?;

        let base = base_url.trim_end_matches('/');
        let completions_url = if base.ends_with("/chat/completions") {
            base.to_string()
        } else {
            format!("{}/chat/completions", base)
        };

        Ok(Self {
            http,
            completions_url,
            max_turns: max_turns.max(1),
        })
    }

    async fn complete(
        &self,
        agent: &AgentDefinition,
        messages: &[OpenAIMessage]
    ) -> Result<OpenAIMessage, AgentError> {
        let req = OpenAIChatRequest {
            model: &agent.model,
            messages,
            tools: agent.tools
                .definitions()
                .iter()
                .map(|function| OpenAITool { kind: "function", function })
                .collect(),
        };

        let resp = self.http.post(&self.completions_url).json(&req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Status { status: status.as_u16(), body });
        }

        resp
            .json::<OpenAIResponse>().await?
            .choices.into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(AgentError::EmptyResponse)
    }

    async fn execute_tool_call(&self, agent: &AgentDefinition, call: &OpenAIToolCall) -> String {
        let arguments = if call.function.arguments.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&call.function.arguments) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Tool '{}' got unparseable arguments: {}", call.function.name, e);
                    return json!({ "error": format!("arguments are not valid JSON: {}", e) }).to_string();
                }
            }
        };

        match agent.tools.call(&call.function.name, arguments).await {
            Ok(output) => output.to_string(),
            Err(e) => {
                warn!("Tool call failed: {}", e);
                json!({ "error": e.to_string() }).to_string()
            }
        }
    }
}

#[async_trait]
impl AgentRuntime for OpenAIAgentRuntime {
    async fn run(&self, agent: &AgentDefinition, input: &str) -> Result<RunResult, AgentError> {
        info!(
            "Running agent '{}' → model={} url={}",
            agent.name,
            agent.model,
            self.completions_url
        );

        let mut messages = vec![
            OpenAIMessage::text("system", &agent.instructions),
            OpenAIMessage::text("user", input)
        ];
        let mut tool_calls = 0;

        for turn in 0..self.max_turns {
            let mut reply = self.complete(agent, &messages).await?;
            let calls = reply.tool_calls.take().unwrap_or_default();

            if calls.is_empty() {
                debug!("Agent '{}' finished after {} turn(s)", agent.name, turn + 1);
                return Ok(RunResult {
                    final_output: reply.content.unwrap_or_default(),
                    tool_calls,
                });
            }

            let calls: Vec<OpenAIToolCall> = calls
                .into_iter()
                .map(|mut call| {
                    if call.id.is_empty() {
                        call.id = format!("call_{}", Uuid::new_v4().simple());
                    }
                    call
                })
                .collect();

            reply.tool_calls = Some(calls.clone());
            messages.push(reply);

            for call in &calls {
                debug!("Agent '{}' calls {}({})", agent.name, call.function.name, call.function.arguments);
                let output = self.execute_tool_call(agent, call).await;
                messages.push(OpenAIMessage::tool_result(&call.id, output));
                tool_calls += 1;
            }
        }

        Err(AgentError::MaxTurnsExceeded(self.max_turns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanity::testing::RecordingStore;
    use crate::tools::ToolRegistry;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{ Json, Router };
    use std::sync::atomic::{ AtomicUsize, Ordering };
    use std::sync::{ Arc, Mutex };

    #[derive(Clone)]
    struct Script {
        replies: Arc<Vec<Value>>,
        next: Arc<AtomicUsize>,
        requests: Arc<Mutex<Vec<Value>>>,
    }

    async fn completions(State(script): State<Script>, Json(body): Json<Value>) -> impl IntoResponse {
        script.requests.lock().unwrap().push(body);
        let i = script.next.fetch_add(1, Ordering::SeqCst);
        let reply = script.replies[i.min(script.replies.len() - 1)].clone();
        Json(reply)
    }

    async fn spawn(replies: Vec<Value>) -> (String, Script) {
        let script = Script {
            replies: Arc::new(replies),
            next: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/v1beta/openai/chat/completions", post(completions))
            .with_state(script.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1beta/openai/", addr), script)
    }

    fn agent(store: Arc<RecordingStore>) -> AgentDefinition {
        AgentDefinition {
            name: "TestBot".into(),
            instructions: "Be helpful.".into(),
            model: "gemini-2.5-flash".into(),
            tools: Arc::new(ToolRegistry::new(store)),
        }
    }

    fn tool_call_reply(name: &str, arguments: &str) -> Value {
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": name, "arguments": arguments }
                    }]
                }
            }]
        })
    }

    fn text_reply(text: &str) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": text } }] })
    }

    #[test]
    fn completions_url_is_normalised() {
        let a = OpenAIAgentRuntime::new("k", "https://host/v1beta/openai/", 10).unwrap();
        assert_eq!(a.completions_url, "https://host/v1beta/openai/chat/completions");
        let b = OpenAIAgentRuntime::new("k", "https://host/v1/chat/completions", 10).unwrap();
        assert_eq!(b.completions_url, "https://host/v1/chat/completions");
    }

    #[tokio::test]
    async fn plain_answer_needs_one_round_trip() {
        let (url, script) = spawn(vec![text_reply("Hello from Scott J. Realtor Group")]).await;
        let runtime = OpenAIAgentRuntime::new("key", &url, 10).unwrap();
        let store = Arc::new(RecordingStore::with_documents(Vec::new()));

        let result = runtime.run(&agent(store), "hi").await.unwrap();

        assert_eq!(result.final_output, "Hello from Scott J. Realtor Group");
        assert_eq!(result.tool_calls, 0);
        let requests = script.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["messages"][0]["role"], "system");
        assert_eq!(requests[0]["messages"][1]["content"], "hi");
        assert_eq!(requests[0]["tools"].as_array().unwrap().len(), 5);
        assert_eq!(requests[0]["tools"][0]["type"], "function");
    }

    #[tokio::test]
    async fn tool_calls_are_executed_and_fed_back() {
        let (url, script) = spawn(
            vec![
                tool_call_reply(
                    "search_real_estate_properties",
                    r#"{"property_type":"House","max_price":500000}"#
                ),
                text_reply("I found no matching homes.")
            ]
        ).await;
        let runtime = OpenAIAgentRuntime::new("key", &url, 10).unwrap();
        let store = Arc::new(RecordingStore::with_documents(Vec::new()));

        let result = runtime.run(&agent(store.clone()), "Find me a house").await.unwrap();

        assert_eq!(result.final_output, "I found no matching homes.");
        assert_eq!(result.tool_calls, 1);
        assert_eq!(store.query_count(), 1);

        let requests = script.requests.lock().unwrap();
        let second = requests[1]["messages"].as_array().unwrap();
        assert_eq!(second.len(), 4);
        assert_eq!(second[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(second[3]["role"], "tool");
        assert_eq!(second[3]["tool_call_id"], "call_1");
        let tool_output: Value = serde_json::from_str(second[3]["content"].as_str().unwrap()).unwrap();
        assert_eq!(tool_output["count"], 0);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_the_model() {
        let (url, script) = spawn(
            vec![tool_call_reply("book_flight", "{}"), text_reply("Sorry, I can't do that.")]
        ).await;
        let runtime = OpenAIAgentRuntime::new("key", &url, 10).unwrap();
        let store = Arc::new(RecordingStore::with_documents(Vec::new()));

        let result = runtime.run(&agent(store), "book a flight").await.unwrap();

        assert_eq!(result.final_output, "Sorry, I can't do that.");
        let requests = script.requests.lock().unwrap();
        let tool_msg = &requests[1]["messages"][3];
        assert!(tool_msg["content"].as_str().unwrap().contains("unknown tool"));
    }

    #[tokio::test]
    async fn endless_tool_calls_hit_the_turn_limit() {
        let (url, _) = spawn(vec![tool_call_reply("get_available_property_types", "")]).await;
        let runtime = OpenAIAgentRuntime::new("key", &url, 3).unwrap();
        let store = Arc::new(RecordingStore::with_documents(Vec::new()));

        let err = runtime.run(&agent(store.clone()), "loop").await.unwrap_err();

        assert!(matches!(err, AgentError::MaxTurnsExceeded(3)));
        assert_eq!(store.query_count(), 3);
    }

    #[tokio::test]
    async fn http_errors_surface() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") })
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let runtime = OpenAIAgentRuntime::new("key", &format!("http://{}", addr), 10).unwrap();
        let store = Arc::new(RecordingStore::with_documents(Vec::new()));

        let err = runtime.run(&agent(store), "hi").await.unwrap_err();
        assert!(matches!(err, AgentError::Status { status: 401, .. }));
    }
}
