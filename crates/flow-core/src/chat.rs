//! Writing assistant client
//!
//! Thin client for the generative-language REST API backing the chat
//! sidebar. A session is a system prompt plus the running turn history; the
//! current document text is injected into each user turn so the model can
//! answer questions about it.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::compact_text;

/// Default assistant model.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const ASSISTANT_PROMPT: &str = "You are a helpful, creative writing assistant integrated into a \
minimalist freewriting editor called Flow. Help the user with their writing, offer suggestions, \
summarize text, or just chat to unblock creative flow. Be concise. The user is in a flow state, \
so don't overwhelm them.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("The assistant is not configured for this build.")]
    NotConfigured,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Assistant API error: {0}")]
    Api(String),
    #[error("The assistant returned an empty response.")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize)]
struct Turn {
    role: Role,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

/// One conversation with the assistant.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_instruction: String,
    history: Vec<Turn>,
}

/// Client for the assistant backend.
pub struct ChatClient {
    api_key: String,
    model: String,
    client: Client,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Result<Self, ChatError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ChatError::NotConfigured);
        }
        Ok(Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            client: Client::builder().build()?,
        })
    }

    /// Start a session; extra instructions are appended to the base prompt.
    #[must_use]
    pub fn create_session(&self, extra_instruction: &str) -> ChatSession {
        let system_instruction = if extra_instruction.trim().is_empty() {
            ASSISTANT_PROMPT.to_string()
        } else {
            format!("{ASSISTANT_PROMPT}\n\n{}", extra_instruction.trim())
        };
        ChatSession {
            system_instruction,
            history: Vec::new(),
        }
    }

    /// Send a message, returning the assistant's reply.
    ///
    /// The history only grows on success, so a failed turn can simply be
    /// retried.
    pub async fn send_message(
        &self,
        session: &mut ChatSession,
        message: &str,
        document_context: &str,
    ) -> Result<String, ChatError> {
        let prompt = build_prompt(message, document_context);
        let mut turns = session.history.clone();
        turns.push(Turn {
            role: Role::User,
            parts: vec![Part { text: prompt.clone() }],
        });

        let request = GenerateRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: session.system_instruction.clone(),
                }],
            },
            contents: turns,
        };

        let url = format!(
            "{API_BASE}/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let response = self.client.post(url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api(format!(
                "HTTP {}: {}",
                status.as_u16(),
                compact_text(&body)
            )));
        }

        let payload = response.json::<GenerateResponse>().await?;
        let reply = payload.first_text().ok_or(ChatError::EmptyResponse)?;

        session.history.push(Turn {
            role: Role::User,
            parts: vec![Part { text: prompt }],
        });
        session.history.push(Turn {
            role: Role::Model,
            parts: vec![Part {
                text: reply.clone(),
            }],
        });
        Ok(reply)
    }
}

/// Inject the current document into the user turn.
fn build_prompt(message: &str, document_context: &str) -> String {
    if document_context.trim().is_empty() {
        return message.to_string();
    }
    format!(
        "[Current Document Content]:\n\"\"\"\n{document_context}\n\"\"\"\n\n[User Request]:\n{message}"
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    contents: Vec<Turn>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
    }
}
