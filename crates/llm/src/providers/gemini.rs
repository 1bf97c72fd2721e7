//! Gemini backend — strict free limits, last resort in priority order
//!
//! The only provider here with native function calling, so it also carries
//! the model-initiated tool strategy: declarations go out with the request
//! and a returned `functionCall` is dispatched and answered in one
//! follow-up round.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use agrivoice_core::{
    ChatBackend, ChatMessage, ChatOptions, ChatOutcome, ChatRole, ProviderError, ProviderId,
    Result, ToolDefinition, ToolDispatcher, ToolUsage,
};

use super::{classify_status, classify_transport, http_client};

/// Gemini configuration
#[derive(Debug, Clone)]
pub struct GeminiProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for GeminiProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Gemini chat backend with native tool calling
pub struct GeminiBackend {
    client: Client,
    config: GeminiProviderConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiProviderConfig) -> Result<Self> {
        let client = http_client(config.timeout)?;
        Ok(Self { client, config })
    }

    fn generate_url(&self, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, api_key
        )
    }

    /// Gemini has no system role in `contents`; assistant turns are `model`
    fn wire_contents(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|message| {
                let role = match message.role {
                    ChatRole::Assistant => "model",
                    ChatRole::System | ChatRole::User => "user",
                };
                json!({ "role": role, "parts": [{ "text": message.content }] })
            })
            .collect()
    }

    fn request_body(
        &self,
        contents: &[Value],
        options: &ChatOptions,
        tools: &[ToolDefinition],
    ) -> Value {
        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": options.temperature,
                "maxOutputTokens": options.max_tokens,
            },
        });
        if let Some(system) = options.system_prompt.as_deref() {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        if !tools.is_empty() {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }
        body
    }

    async fn generate(&self, body: &Value, api_key: &str) -> std::result::Result<Value, ProviderError> {
        let response = self
            .client
            .post(self.generate_url(api_key))
            .json(body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, text));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    /// First candidate's content, or an error when the model returned none
    fn candidate_content(response: &Value) -> std::result::Result<&Value, ProviderError> {
        response
            .pointer("/candidates/0/content")
            .ok_or_else(|| ProviderError::InvalidResponse("no candidates".into()))
    }

    fn concat_text(content: &Value) -> String {
        content
            .pointer("/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }

    fn function_calls(content: &Value) -> Vec<(String, Value)> {
        content
            .pointer("/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("functionCall"))
                    .filter_map(|call| {
                        let name = call.get("name")?.as_str()?.to_string();
                        let args = call.get("args").cloned().unwrap_or(json!({}));
                        Some((name, args))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn api_key(&self) -> std::result::Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Auth("GEMINI_API_KEY not set".into()))
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> std::result::Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let contents = Self::wire_contents(messages);
        let body = self.request_body(&contents, options, &[]);
        let response = self.generate(&body, api_key).await?;
        let content = Self::candidate_content(&response)?;
        let text = Self::concat_text(content);
        if text.is_empty() {
            return Err(ProviderError::InvalidResponse("empty candidate text".into()));
        }
        Ok(text)
    }

    fn supports_native_tools(&self) -> bool {
        true
    }

    /// One declaration → functionCall → functionResponse round. The model
    /// picks the tool; the dispatcher runs it; a second request produces
    /// the grounded final text.
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
        tools: &[ToolDefinition],
        dispatcher: &dyn ToolDispatcher,
    ) -> std::result::Result<ChatOutcome, ProviderError> {
        if tools.is_empty() {
            return self.chat(messages, options).await.map(ChatOutcome::text_only);
        }

        let api_key = self.api_key()?;
        let mut contents = Self::wire_contents(messages);
        let body = self.request_body(&contents, options, tools);
        let response = self.generate(&body, api_key).await?;
        let content = Self::candidate_content(&response)?;

        let calls = Self::function_calls(content);
        if calls.is_empty() {
            let text = Self::concat_text(content);
            if text.is_empty() {
                return Err(ProviderError::InvalidResponse("empty candidate text".into()));
            }
            return Ok(ChatOutcome::text_only(text));
        }

        // Tools never fail; an unknown name still gets a well-formed reply
        // so the model can recover.
        let mut usage = Vec::with_capacity(calls.len());
        let mut response_parts = Vec::with_capacity(calls.len());
        for (name, args) in calls {
            let output = match dispatcher.dispatch(&name, args.clone()).await {
                Some(output) => output.value,
                None => json!({ "error": format!("unknown tool: {name}") }),
            };
            response_parts.push(json!({
                "functionResponse": { "name": name, "response": output }
            }));
            usage.push(ToolUsage::new(name, args).with_result(
                response_parts
                    .last()
                    .and_then(|p| p.pointer("/functionResponse/response"))
                    .cloned()
                    .unwrap_or(Value::Null),
            ));
        }

        contents.push(content.clone());
        contents.push(json!({ "role": "user", "parts": response_parts }));

        let followup = self.request_body(&contents, options, tools);
        let response = self.generate(&followup, api_key).await?;
        let content = Self::candidate_content(&response)?;
        let text = Self::concat_text(content);
        if text.is_empty() {
            return Err(ProviderError::InvalidResponse("empty candidate text".into()));
        }
        Ok(ChatOutcome { text, tool_usage: usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_map_roles() {
        let messages = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let contents = GeminiBackend::wire_contents(&messages);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
    }

    #[test]
    fn body_includes_system_and_tools() {
        let backend = GeminiBackend::new(GeminiProviderConfig::default()).unwrap();
        let options = ChatOptions::default().with_system_prompt("answer in Kannada");
        let tools = vec![ToolDefinition {
            name: "get_weather".into(),
            description: "weather".into(),
            parameters: json!({"type": "object"}),
        }];
        let body = backend.request_body(&[], &options, &tools);
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "answer in Kannada"
        );
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "get_weather"
        );
    }

    #[test]
    fn extracts_text_and_function_calls() {
        let content = json!({
            "role": "model",
            "parts": [
                { "text": "Checking the weather. " },
                { "functionCall": { "name": "get_weather", "args": { "city": "Mysore" } } }
            ]
        });
        assert_eq!(GeminiBackend::concat_text(&content), "Checking the weather. ");
        let calls = GeminiBackend::function_calls(&content);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "get_weather");
        assert_eq!(calls[0].1["city"], "Mysore");
    }

    #[tokio::test]
    async fn chat_without_key_is_auth_error() {
        let backend = GeminiBackend::new(GeminiProviderConfig::default()).unwrap();
        let err = backend
            .chat(&[ChatMessage::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Auth(_)));
    }
}
