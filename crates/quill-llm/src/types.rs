//! Wire types for the `generateContent` endpoint.
//!
//! Requests carry a single user turn: `contents[0].parts[0].text`.
//! Every level of the response is optional so that a body missing any
//! segment still parses; [`GenerateContentResponse::extract`] then reports
//! which segment was absent.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

impl GenerateContentRequest {
    /// Wrap a compiled prompt in the request envelope.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
        }
    }

    /// The prompt text, for logging and test assertions.
    pub fn prompt(&self) -> Option<&str> {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<CandidateContent>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The response segment found missing during extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingField {
    /// No `candidates` array, or an empty one.
    Candidates,
    /// First candidate has no `content`.
    Content,
    /// Content has no `parts`, or an empty array.
    Parts,
    /// First part has no `text`.
    Text,
}

impl MissingField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Candidates => "candidates",
            Self::Content => "content",
            Self::Parts => "parts",
            Self::Text => "text",
        }
    }
}

/// Outcome of reading `candidates[0].content.parts[0].text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    Present(String),
    Missing(MissingField),
}

impl Extraction {
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Present(text) => Some(text),
            Self::Missing(_) => None,
        }
    }
}

impl GenerateContentResponse {
    /// Build a response carrying one candidate with one text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: Some(vec![Candidate {
                content: Some(CandidateContent {
                    parts: Some(vec![ResponsePart {
                        text: Some(text.into()),
                    }]),
                }),
            }]),
        }
    }

    pub fn extract(&self) -> Extraction {
        match self.first_text() {
            Ok(text) => Extraction::Present(text.to_string()),
            Err(missing) => Extraction::Missing(missing),
        }
    }

    /// Borrowing form of [`extract`](Self::extract).
    pub fn first_text(&self) -> Result<&str, MissingField> {
        let candidate = self
            .candidates
            .as_deref()
            .and_then(<[Candidate]>::first)
            .ok_or(MissingField::Candidates)?;
        let content = candidate.content.as_ref().ok_or(MissingField::Content)?;
        let part = content
            .parts
            .as_deref()
            .and_then(<[ResponsePart]>::first)
            .ok_or(MissingField::Parts)?;
        part.text.as_deref().ok_or(MissingField::Text)
    }
}
