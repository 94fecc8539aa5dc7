//! Chat engine using mistral.rs
//!
//! Owns the model, the tool set, and a tokio runtime it blocks on, so the
//! conversation loop can stay synchronous. The tool-invocation loop is
//! deliberately unbounded: the model keeps querying until it has an answer.

use crate::db::Database;
use crate::llm::config::{LlmConfig, QuantizationType};
use crate::llm::context::{ChatHistory, MessageRole, ToolInvocation};
use crate::llm::prompts::SYSTEM_PROMPT;
use crate::llm::tools::{query_tool_descriptor, DatabaseTool};
use crate::llm::ChatBackend;
use crate::{Result, WellspokenError};
use mistralrs::{
    CalledFunction, IsqType, Model, PagedAttentionMetaBuilder, RequestBuilder, TextMessageRole,
    TextModelBuilder, Tool, ToolCallResponse, ToolCallType, ToolChoice,
};
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// LLM orchestration wrapper with automatic tool invocation
pub struct ChatEngine {
    runtime: Runtime,
    model: Model,
    tools: Vec<Tool>,
    database_tool: DatabaseTool,
    system_prompt: String,
}

impl ChatEngine {
    /// Load the model and register the database query tool
    pub fn new(config: LlmConfig, db: Database) -> Result<Self> {
        let runtime = Runtime::new().map_err(|e| {
            WellspokenError::InferenceError(format!("Failed to create tokio runtime: {}", e))
        })?;

        info!("Initializing chat engine with model: {}", config.model_id);

        let model = runtime.block_on(build_model(&config))?;

        info!("Chat engine initialized");

        Ok(Self {
            runtime,
            model,
            tools: vec![query_tool_descriptor()],
            database_tool: DatabaseTool::new(db),
            system_prompt: SYSTEM_PROMPT.to_string(),
        })
    }

    /// Rebuild the wire-format request from the full history
    fn build_request(&self, history: &ChatHistory) -> RequestBuilder {
        let mut request = RequestBuilder::new()
            .add_message(TextMessageRole::System, &self.system_prompt)
            .set_tools(self.tools.clone())
            .set_tool_choice(ToolChoice::Auto);

        for msg in history.messages() {
            request = match msg.role {
                MessageRole::System => request.add_message(TextMessageRole::System, &msg.content),
                MessageRole::User => request.add_message(TextMessageRole::User, &msg.content),
                MessageRole::Assistant if !msg.tool_calls.is_empty() => request
                    .add_message_with_tool_call(
                        TextMessageRole::Assistant,
                        &msg.content,
                        msg.tool_calls.iter().map(to_wire_call).collect(),
                    ),
                MessageRole::Assistant => {
                    request.add_message(TextMessageRole::Assistant, &msg.content)
                }
                MessageRole::Tool => request.add_tool_message(
                    &msg.content,
                    msg.tool_call_id.clone().unwrap_or_default(),
                ),
            };
        }

        request
    }
}

impl ChatBackend for ChatEngine {
    /// Send one user turn and return the final assistant text.
    ///
    /// The history is mutated in place with every intermediate turn: the
    /// user message, any assistant tool-call turns, the tool results, and
    /// the final assistant answer.
    fn message(&mut self, user_input: &str, history: &mut ChatHistory) -> Result<String> {
        history.add_user_message(user_input);

        loop {
            let request = self.build_request(history);

            let response = self
                .runtime
                .block_on(self.model.send_chat_request(request))
                .map_err(|e| {
                    WellspokenError::InferenceError(format!("Chat request failed: {}", e))
                })?;

            let message = response
                .choices
                .first()
                .map(|c| &c.message)
                .ok_or_else(|| {
                    WellspokenError::InferenceError("Model returned no choices".to_string())
                })?;

            let tool_calls: Vec<ToolInvocation> = message
                .tool_calls
                .clone()
                .unwrap_or_default()
                .iter()
                .map(from_wire_call)
                .collect();

            if tool_calls.is_empty() {
                let content = message.content.clone().unwrap_or_default();
                history.add_assistant_message(&content);
                return Ok(content);
            }

            debug!("Model requested {} tool call(s)", tool_calls.len());
            history.add_assistant_tool_calls(
                message.content.clone().unwrap_or_default(),
                tool_calls.clone(),
            );

            for call in &tool_calls {
                info!(
                    "tool {} called with parameters {}",
                    call.name, call.arguments
                );
                let result = self.database_tool.dispatch(&call.name, &call.arguments);
                history.add_tool_message(result, &call.id);
            }
        }
    }
}

async fn build_model(config: &LlmConfig) -> Result<Model> {
    let isq_type = match config.quantization {
        QuantizationType::None => None,
        QuantizationType::Q4K => Some(IsqType::Q4K),
        QuantizationType::Q8_0 => Some(IsqType::Q8_0),
        QuantizationType::Q4_0 => Some(IsqType::Q4_0),
    };

    let mut builder = TextModelBuilder::new(&config.model_id);

    if let Some(isq) = isq_type {
        builder = builder.with_isq(isq);
    }

    if config.enable_logging {
        builder = builder.with_logging();
    }

    builder = builder
        .with_paged_attn(|| {
            PagedAttentionMetaBuilder::default()
                .with_block_size(32)
                .build()
        })
        .map_err(|e| {
            WellspokenError::InferenceError(format!("Failed to configure paged attention: {}", e))
        })?;

    builder
        .build()
        .await
        .map_err(|e| WellspokenError::ModelLoadError(format!("Failed to load model: {}", e)))
}

fn to_wire_call(call: &ToolInvocation) -> ToolCallResponse {
    ToolCallResponse {
        id: call.id.clone(),
        tp: ToolCallType::Function,
        function: CalledFunction {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        },
    }
}

fn from_wire_call(call: &ToolCallResponse) -> ToolInvocation {
    ToolInvocation {
        id: call.id.clone(),
        name: call.function.name.clone(),
        arguments: call.function.arguments.clone(),
    }
}
