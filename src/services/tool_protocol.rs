//! Tag-based tool-call protocol between the agent loop and the model.
//!
//! The model requests a tool by replying with a tag block:
//!
//! ```text
//! <search_documents><query>vector databases</query></search_documents>
//! ```
//!
//! Tag names are matched against a closed set. `tool_name`, the placeholder
//! shown in the prompt's format example, is accepted as an alias of
//! `search_documents` because some models copy it literally.

use std::collections::BTreeMap;
use std::fmt;

/// Tools the agent loop understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    /// The retrieval tool.
    SearchDocuments,
    /// Placeholder name from the prompt example, routed to retrieval.
    DecoyAlias,
}

impl ToolName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchDocuments => "search_documents",
            Self::DecoyAlias => "tool_name",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "search_documents" => Some(Self::SearchDocuments),
            "tool_name" => Some(Self::DecoyAlias),
            _ => None,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognised tool request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub name: ToolName,
    pub args: BTreeMap<String, String>,
}

impl ToolCall {
    /// Search query: the `query` argument, else `param1`, else empty.
    pub fn query(&self) -> &str {
        ["query", "param1"]
            .iter()
            .filter_map(|key| self.args.get(*key))
            .find(|value| !value.is_empty())
            .map_or("", String::as_str)
    }
}

/// A tag block found in a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCall {
    Known(ToolCall),
    /// Tool-shaped block whose name is outside the closed set.
    Unknown(String),
}

const TOOL_GUIDE: &str = "\
TOOLS:
search_documents: Search the document collection. Parameters: query (str)

To use a tool, reply with only the tool call, written in this format:
<tool_name><param1>value</param1></tool_name>
Tool results are sent back to you as a message. When you have enough \
information, reply with the final answer as plain text without any tags.";

/// System prompt for RAG turns.
pub fn system_prompt() -> String {
    format!(
        "You are an expert Document Analysis Agent.\n\
         Your goal is to answer questions using ONLY the information you retrieve with 'search_documents'.\n\n\
         GUIDELINES:\n\
         1. Always call 'search_documents' before answering.\n\
         2. If the retrieved documents don't contain the answer, say that you don't know.\n\
         3. Keep your answers factual and grounded in the retrieved sources.\n\
         4. If the user uses foul or offensive language, politely decline to answer.\n\
         5. Call the tool by its real name, 'search_documents'. Do not use 'tool_name'.\n\n\
         {TOOL_GUIDE}"
    )
}

fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Opening tag starting at the `<` at byte `start`: its name and the byte
/// offset just past `>`.
fn open_tag(text: &str, start: usize) -> Option<(&str, usize)> {
    let rest = text.get(start + 1..)?;
    let end = rest.find('>')?;
    let name = &rest[..end];
    is_tag_name(name).then_some((name, start + 1 + end + 1))
}

/// Parse a body made only of `<param>value</param>` tags.
///
/// Returns `None` when anything else appears in the body.
fn parse_params(body: &str) -> Option<BTreeMap<String, String>> {
    let mut args = BTreeMap::new();
    let mut rest = body.trim_start();
    while !rest.is_empty() {
        if !rest.starts_with('<') {
            return None;
        }
        let (name, value_start) = open_tag(rest, 0)?;
        let close = format!("</{name}>");
        let value_len = rest[value_start..].find(&close)?;
        let value = &rest[value_start..value_start + value_len];
        if value.contains('<') {
            return None;
        }
        args.insert(name.to_string(), value.trim().to_string());
        rest = rest[value_start + value_len + close.len()..].trim_start();
    }
    Some(args)
}

fn known_args(body: &str) -> BTreeMap<String, String> {
    if let Some(args) = parse_params(body) {
        return args;
    }
    let bare = body.trim();
    let mut args = BTreeMap::new();
    if !bare.is_empty() && !bare.contains('<') {
        args.insert("query".to_string(), bare.to_string());
    }
    args
}

/// Tool calls in `text`, in order of appearance.
///
/// Unknown tags count as calls only when their body is made of parameter
/// tags; anything else is ordinary markup and is skipped.
pub fn parse_tool_calls(text: &str) -> Vec<ParsedCall> {
    let mut calls = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('<') {
        let start = pos + offset;
        let Some((name, body_start)) = open_tag(text, start) else {
            pos = start + 1;
            continue;
        };
        let close = format!("</{name}>");
        let Some(body_len) = text[body_start..].find(&close) else {
            pos = body_start;
            continue;
        };
        let body = &text[body_start..body_start + body_len];
        let after = body_start + body_len + close.len();

        match ToolName::parse(name) {
            Some(tool) => {
                calls.push(ParsedCall::Known(ToolCall {
                    name: tool,
                    args: known_args(body),
                }));
                pos = after;
            }
            None => match parse_params(body) {
                Some(args) if !args.is_empty() => {
                    calls.push(ParsedCall::Unknown(name.to_string()));
                    pos = after;
                }
                _ => pos = body_start,
            },
        }
    }

    calls
}
