//! Assistant data model — wire types for the remote Assistants API.
//!
//! The local `Assistant` is a cached copy of remote state. It becomes stale
//! the instant another client mutates the same id remotely; this crate does
//! no revalidation beyond its own writes.

use serde::{Deserialize, Serialize};

/// Model ids offered when creating or editing an assistant. Advisory only;
/// the remote API is the authority on what it accepts.
pub const MODELS: &[&str] = &[
    "gpt-4o-mini",
    "gpt-4o",
    "gpt-4-turbo",
    "gpt-4",
    "gpt-3.5-turbo",
    "gpt-4o-mini-2024-07-18",
    "gpt-4o-2024-08-06",
    "gpt-4o-2024-05-13",
    "gpt-4-turbo-preview",
    "gpt-4-turbo-2024-04-09",
    "gpt-4-1106-preview",
    "gpt-4-0613",
    "gpt-4-0125-preview",
    "gpt-3.5-turbo-16k",
    "gpt-3.5-turbo-1106",
    "gpt-3.5-turbo-0125",
];

/// Model used for new assistants when the draft leaves it unset.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// A tool attached to an assistant, externally tagged on the wire as
/// `{"type": "retrieval"}` etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    Retrieval,
    CodeInterpreter,
    Function { function: ToolFunction },
}

/// A user-defined function tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFunction {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the function arguments; passed through opaquely.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Response format constraint kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormatKind {
    Text,
    JsonObject,
    JsonSchema,
}

impl std::str::FromStr for ResponseFormatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json_object" => Ok(Self::JsonObject),
            "json_schema" => Ok(Self::JsonSchema),
            other => Err(format!("Unknown response format: {other}")),
        }
    }
}

/// Response format, `{"type": "text"}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: ResponseFormatKind,
}

impl Default for ResponseFormat {
    fn default() -> Self {
        Self {
            kind: ResponseFormatKind::Text,
        }
    }
}

/// An assistant as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    /// Remote-assigned id, immutable and unique within the collection.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub file_ids: Vec<String>,
    #[serde(default)]
    pub response_format: ResponseFormat,
    /// Advisory range [0, 2]; not clamped locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Advisory range [0, 1]; not clamped locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

/// A draft for a new assistant, as collected from the user.
///
/// `instructions` defaults to empty and `model` to [`DEFAULT_MODEL`] when the
/// draft leaves them unset.
#[derive(Debug, Clone, Default)]
pub struct AssistantDraft {
    pub name: String,
    pub instructions: Option<String>,
    pub model: Option<String>,
}

/// Create payload sent to the remote API.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAssistant {
    pub name: String,
    pub instructions: String,
    pub model: String,
}

/// Update payload: the full mutable field set, keyed by id at the transport
/// level. Optional fields are omitted from the body entirely when absent,
/// never sent as null.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateAssistant {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<Tool>,
    pub file_ids: Vec<String>,
    pub response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl UpdateAssistant {
    /// Build the full mutable field set from a local assistant copy.
    pub fn from_assistant(assistant: &Assistant) -> Self {
        Self {
            name: assistant.name.clone(),
            instructions: assistant.instructions.clone(),
            model: assistant.model.clone(),
            tools: assistant.tools.clone(),
            file_ids: assistant.file_ids.clone(),
            response_format: assistant.response_format,
            description: assistant.description.clone(),
            temperature: assistant.temperature,
            top_p: assistant.top_p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Assistant {
        Assistant {
            id: "asst_1".into(),
            name: "Helper".into(),
            description: None,
            model: "gpt-4o-mini".into(),
            instructions: "Be helpful.".into(),
            tools: vec![Tool::CodeInterpreter],
            file_ids: vec![],
            response_format: ResponseFormat::default(),
            temperature: None,
            top_p: None,
        }
    }

    #[test]
    fn tools_are_externally_tagged() {
        let json = serde_json::to_value(vec![
            Tool::Retrieval,
            Tool::CodeInterpreter,
            Tool::Function {
                function: ToolFunction {
                    name: "lookup".into(),
                    description: "Look something up".into(),
                    parameters: json!({"type": "object"}),
                },
            },
        ])
        .unwrap();

        assert_eq!(json[0], json!({"type": "retrieval"}));
        assert_eq!(json[1], json!({"type": "code_interpreter"}));
        assert_eq!(json[2]["type"], "function");
        assert_eq!(json[2]["function"]["name"], "lookup");
    }

    #[test]
    fn assistant_deserializes_from_api_shape() {
        let raw = json!({
            "id": "asst_abc",
            "object": "assistant",
            "created_at": 1_700_000_000,
            "name": "Helper",
            "model": "gpt-4o",
            "instructions": "Answer briefly.",
            "tools": [{"type": "retrieval"}],
            "file_ids": ["file-1"],
            "response_format": {"type": "json_object"},
            "temperature": 0.7
        });

        let assistant: Assistant = serde_json::from_value(raw).unwrap();
        assert_eq!(assistant.id, "asst_abc");
        assert_eq!(assistant.tools, vec![Tool::Retrieval]);
        assert_eq!(assistant.response_format.kind, ResponseFormatKind::JsonObject);
        assert_eq!(assistant.temperature, Some(0.7));
        assert_eq!(assistant.top_p, None);
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let raw = json!({"id": "asst_x", "name": "Bare", "model": "gpt-4"});
        let assistant: Assistant = serde_json::from_value(raw).unwrap();
        assert_eq!(assistant.instructions, "");
        assert!(assistant.tools.is_empty());
        assert!(assistant.file_ids.is_empty());
        assert_eq!(assistant.response_format.kind, ResponseFormatKind::Text);
    }

    #[test]
    fn update_payload_omits_absent_optionals() {
        let payload = UpdateAssistant::from_assistant(&sample());
        let json = serde_json::to_value(&payload).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("description"));
        assert!(!object.contains_key("temperature"));
        assert!(!object.contains_key("top_p"));
        assert_eq!(object["name"], "Helper");
        assert_eq!(object["response_format"], json!({"type": "text"}));
    }

    #[test]
    fn update_payload_keeps_present_optionals() {
        let mut assistant = sample();
        assistant.description = Some("A helper".into());
        assistant.temperature = Some(1.2);

        let json = serde_json::to_value(UpdateAssistant::from_assistant(&assistant)).unwrap();
        assert_eq!(json["description"], "A helper");
        assert_eq!(json["temperature"], 1.2);
        assert!(!json.as_object().unwrap().contains_key("top_p"));
    }
}
