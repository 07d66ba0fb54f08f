//! Bounded tool-calling loop around the language model.
//!
//! ```text
//! AwaitingModel --plain text--> Done
//!       |  ^
//! tool calls |  tool results appended
//!       v  |
//!  ExecutingTools
//! ```
//!
//! Each model call is one round. When `max_rounds` is used up before the
//! model answers, the loop stops with a fixed apology.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{ConversationMessage, Metadata};
use crate::domain::ports::{GenerationParams, LanguageModel};
use crate::services::retrieval_tool::{RetrievalTool, SearchLog};
use crate::services::tool_protocol::{parse_tool_calls, system_prompt, ParsedCall, ToolName};

/// Answer returned when the round budget runs out.
pub const ROUND_LIMIT_MESSAGE: &str = "I could not complete this request within the allowed number of steps. Please try rephrasing your question.";

pub const DEFAULT_MAX_ROUNDS: usize = 6;

#[derive(Debug)]
enum AgentState {
    AwaitingModel,
    ExecutingTools(Vec<ParsedCall>),
    Done(String),
}

/// Result of one agent run.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub answer: String,
    pub search_results: SearchLog,
    /// Model calls made.
    pub rounds: usize,
    pub tokens_used: u64,
    pub round_limit_reached: bool,
}

impl AgentOutcome {
    /// Diagnostic metadata attached to the assistant reply.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("agentic".to_string(), json!(true));
        metadata.insert(
            "search_results_count".to_string(),
            json!(self.search_results.len()),
        );
        metadata.insert("rounds".to_string(), json!(self.rounds));
        metadata.insert("tokens_used".to_string(), json!(self.tokens_used));
        metadata.insert(
            "round_limit_reached".to_string(),
            json!(self.round_limit_reached),
        );
        metadata.insert("finish_reason".to_string(), json!("stop"));
        metadata
    }
}

pub struct AgentLoop {
    model: Arc<dyn LanguageModel>,
    tool: Arc<RetrievalTool>,
    params: GenerationParams,
    max_rounds: usize,
}

impl AgentLoop {
    pub fn new(model: Arc<dyn LanguageModel>, tool: Arc<RetrievalTool>) -> Self {
        Self {
            model,
            tool,
            params: GenerationParams {
                temperature: 0.1,
                max_tokens: 4000,
            },
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn tool(&self) -> &RetrievalTool {
        &self.tool
    }

    async fn execute(&self, call: ParsedCall, log: &mut SearchLog) -> ConversationMessage {
        match call {
            ParsedCall::Known(call) => {
                if call.name == ToolName::DecoyAlias {
                    warn!(
                        "model called '{}' instead of '{}', running search",
                        ToolName::DecoyAlias,
                        ToolName::SearchDocuments
                    );
                }
                let output = self.tool.search(call.query(), log).await;
                ConversationMessage::user(format!(
                    "Tool result ({}):\n{output}",
                    ToolName::SearchDocuments
                ))
            }
            ParsedCall::Unknown(name) => {
                warn!(tool = %name, "model requested an unknown tool");
                ConversationMessage::user(format!(
                    "Tool error: unknown tool '{name}'. The only available tool is '{}'.",
                    ToolName::SearchDocuments
                ))
            }
        }
    }

    /// Answer `query` given the prior conversation.
    ///
    /// Model failures propagate; retrieval failures are fed back to the
    /// model as tool output.
    #[instrument(skip(self, history), fields(history_len = history.len()))]
    pub async fn run(
        &self,
        query: &str,
        history: &[ConversationMessage],
    ) -> DomainResult<AgentOutcome> {
        info!("agent start: processing query");

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ConversationMessage::system(system_prompt()));
        messages.extend_from_slice(history);
        messages.push(ConversationMessage::user(query));

        let mut log = SearchLog::new();
        let mut rounds = 0;
        let mut tokens_used = 0u64;
        let mut round_limit_reached = false;
        let mut state = AgentState::AwaitingModel;

        let answer = loop {
            state = match state {
                AgentState::AwaitingModel if rounds >= self.max_rounds => {
                    warn!(rounds, "round limit reached without a final answer");
                    round_limit_reached = true;
                    AgentState::Done(ROUND_LIMIT_MESSAGE.to_string())
                }
                AgentState::AwaitingModel => {
                    rounds += 1;
                    debug!(round = rounds, "calling model");
                    let generation = self.model.generate(&messages, self.params).await?;
                    tokens_used += u64::from(generation.tokens_used);

                    let calls = parse_tool_calls(&generation.text);
                    if calls.is_empty() {
                        AgentState::Done(generation.text.trim().to_string())
                    } else {
                        debug!(round = rounds, calls = calls.len(), "model requested tools");
                        messages.push(ConversationMessage::assistant(generation.text));
                        AgentState::ExecutingTools(calls)
                    }
                }
                AgentState::ExecutingTools(calls) => {
                    for call in calls {
                        let message = self.execute(call, &mut log).await;
                        messages.push(message);
                    }
                    AgentState::AwaitingModel
                }
                AgentState::Done(answer) => break answer,
            };
        };

        let preview: String = answer.chars().take(100).collect();
        info!(rounds, search_results = log.len(), "agent end: {preview}");

        Ok(AgentOutcome {
            answer,
            search_results: log,
            rounds,
            tokens_used,
            round_limit_reached,
        })
    }
}
