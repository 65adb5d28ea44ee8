//! `/chat` wire types. Client → server form payloads, server → client JSON.

use serde::{Deserialize, Deserializer, Serialize};

/// Multipart part carrying an uploaded PDF.
pub const PDF_FIELD: &str = "pdf_file";

/// Client → server: URL-encoded chat message (`message=<text>`).
#[derive(Debug, Clone, Serialize)]
pub struct MessageForm<'a> {
    pub message: &'a str,
}

impl<'a> MessageForm<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

/// Emotion state attached to a character reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CharacterEmotion {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub emotion: String,
    #[serde(default)]
    pub arousal: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
}

impl CharacterEmotion {
    pub fn new(emotion: impl Into<String>) -> Self {
        Self {
            emotion: emotion.into(),
            arousal: None,
            valence: None,
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One persona listed after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub name: String,
    pub summary: String,
}

impl CharacterSummary {
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PlainReplyBody {
    response: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CharacterReplyBody {
    character: String,
    response: String,
    #[serde(default)]
    emotion: Option<CharacterEmotion>,
}

#[derive(Debug, Clone, Deserialize)]
struct UploadBody {
    response: String,
    characters: Vec<CharacterSummary>,
}

/// One decoded `/chat` response. Which variants are possible depends on
/// the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatResponse {
    Error(String),
    PlainReply(String),
    CharacterReply {
        character: String,
        response: String,
        emotion: CharacterEmotion,
    },
    UploadResult {
        response: String,
        characters: Vec<CharacterSummary>,
    },
}

impl ChatResponse {
    /// Decodes the reply to a chat message.
    pub fn from_chat_json(value: &serde_json::Value) -> Result<Self, String> {
        if let Some(err) = Self::error_from(value)? {
            return Ok(err);
        }
        if is_present(value, "character") {
            let m: CharacterReplyBody =
                serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
            return Ok(ChatResponse::CharacterReply {
                character: m.character,
                response: m.response,
                emotion: m.emotion.unwrap_or_default(),
            });
        }
        let m: PlainReplyBody =
            serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
        Ok(ChatResponse::PlainReply(m.response))
    }

    /// Decodes the reply to a PDF upload.
    pub fn from_upload_json(value: &serde_json::Value) -> Result<Self, String> {
        if let Some(err) = Self::error_from(value)? {
            return Ok(err);
        }
        let m: UploadBody = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
        Ok(ChatResponse::UploadResult {
            response: m.response,
            characters: m.characters,
        })
    }

    /// `error` short-circuits every other field.
    fn error_from(value: &serde_json::Value) -> Result<Option<Self>, String> {
        if !value.is_object() {
            return Err("response is not a JSON object".into());
        }
        if !is_present(value, "error") {
            return Ok(None);
        }
        let error = match &value["error"] {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(Some(ChatResponse::Error(error)))
    }
}

/// Null, `false`, zero and empty-string fields count as absent.
fn is_present(value: &serde_json::Value, key: &str) -> bool {
    match value.get(key) {
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}
