//! Chat history items exchanged with the chatbot endpoints.

use serde::{Deserialize, Serialize};

/// Author of a chat item.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Produced by the assistant.
    Assistant,
    /// Typed by the user.
    User,
}

impl Role {
    /// Short speaker label used when rendering a transcript.
    pub fn speaker(self) -> &'static str {
        match self {
            Role::Assistant => "AI",
            Role::User => "You",
        }
    }
}

/// Kind of content a chat item carries.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatType {
    /// Plain text.
    #[default]
    Text,
    /// URL of a generated image.
    Image,
    /// Source code.
    Code,
}

/// One entry of an append-only, server-ordered chat history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatItem {
    /// Who wrote the item.
    pub role: Role,
    /// Message body.
    pub content: String,
    /// How `content` should be interpreted.
    #[serde(rename = "type", default)]
    pub kind: ChatType,
}

impl ChatItem {
    /// A plain-text item from the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: ChatType::Text,
        }
    }

    /// A plain-text item from the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind: ChatType::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_format_is_lowercase() {
        let item = ChatItem::assistant("hi");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["type"], "text");
    }

    #[test]
    fn missing_type_defaults_to_text() {
        let item: ChatItem = serde_json::from_str(r#"{"role":"user","content":"x"}"#).unwrap();
        assert_eq!(item.kind, ChatType::Text);
        assert_eq!(item.role, Role::User);
    }

    #[test]
    fn speaker_labels() {
        assert_eq!(Role::Assistant.speaker(), "AI");
        assert_eq!(Role::User.speaker(), "You");
        assert_eq!("image".parse::<ChatType>().unwrap(), ChatType::Image);
    }
}
