//! Chat wire bodies and the client-side transcript.

use serde::{Deserialize, Serialize};

/// Who authored a message in the transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The person using the client.
    User,
    /// The support coach answering through the backend.
    Assistant,
}

impl Sender {
    /// Wire/display identifier for the sender.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl TryFrom<&str> for Sender {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "assistant" | "bot" => Ok(Self::Assistant),
            _ => Err("invalid sender"),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// Trimmed user text.
    pub message: String,
    /// Groups requests from one client run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Whether to search uploaded documents.
    pub use_rag: bool,
    /// Requested model provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Locale code the reply should be written in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// A document excerpt the backend cited for a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    /// Name of the uploaded document.
    pub source: String,
    /// Index of the chunk inside that document.
    pub chunk: u64,
}

/// Successful body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// Reply text.
    pub response: String,
    /// Cited excerpts; absent or `null` when retrieval was off.
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    /// Provider that produced the reply.
    #[serde(default)]
    pub provider: Option<String>,
}

/// One bubble in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author of the bubble.
    pub sender: Sender,
    /// Displayed text.
    pub text: String,
    /// Citations, already capped; empty for user bubbles.
    pub sources: Vec<Source>,
    /// Provider that answered, for assistant bubbles.
    pub provider: Option<String>,
}

impl ChatMessage {
    /// A message typed by the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            sources: Vec::new(),
            provider: None,
        }
    }

    /// A reply rendered for the assistant.
    #[must_use]
    pub fn assistant(
        text: impl Into<String>,
        sources: Vec<Source>,
        provider: Option<String>,
    ) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            sources,
            provider,
        }
    }

    /// Citation lines in display order, numbered from one.
    #[must_use]
    pub fn source_lines(&self) -> Vec<String> {
        self.sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                format!("{}. {} (chunk {})", index + 1, source.source, source.chunk)
            })
            .collect()
    }
}

/// Keeps at most `limit` leading sources.
#[must_use]
pub fn cap_sources(sources: Option<Vec<Source>>, limit: usize) -> Vec<Source> {
    let mut sources = sources.unwrap_or_default();
    sources.truncate(limit);
    sources
}

/// Handle for a loading placeholder shown while a reply is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingId(u64);

/// Ordered chat history plus the transient typing indicator.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    loading: Option<LoadingId>,
    next_loading: u64,
}

impl Transcript {
    /// Empty transcript with no placeholder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user bubble.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
    }

    /// Appends an assistant bubble.
    pub fn push_assistant(
        &mut self,
        text: impl Into<String>,
        sources: Vec<Source>,
        provider: Option<String>,
    ) {
        self.messages
            .push(ChatMessage::assistant(text, sources, provider));
    }

    /// Shows the loading placeholder, replacing any previous one.
    pub fn begin_loading(&mut self) -> LoadingId {
        self.next_loading += 1;
        let id = LoadingId(self.next_loading);
        self.loading = Some(id);
        id
    }

    /// Removes the placeholder if it is still the one identified by `id`.
    pub fn end_loading(&mut self, id: LoadingId) {
        if self.loading == Some(id) {
            self.loading = None;
        }
    }

    /// Whether the typing indicator is showing.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Bubbles in order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent bubble.
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of bubbles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been said yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
