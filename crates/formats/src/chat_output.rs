use serde::{Deserialize, Serialize};

/// The `result` field of a chat-history response: one block of text, or the
/// individual messages the service produced while summarizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatHistoryOutput {
    Text(String),
    Fragments(Vec<String>),
}

/// Body of a chat-history response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub result: ChatHistoryOutput,
}
