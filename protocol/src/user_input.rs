use serde::Deserialize;
use serde::Serialize;

/// A single piece of user input delivered by the composer.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserInput {
    /// Message text exactly as it was in the composer when submitted.
    Text { text: String },
}

impl UserInput {
    pub fn text(text: impl Into<String>) -> Self {
        UserInput::Text { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_serializes_with_type_tag() {
        let json = serde_json::to_string(&UserInput::text("hello")).expect("serialize");
        assert_eq!(json, r#"{"type":"text","text":"hello"}"#);
    }

    #[test]
    fn text_keeps_surrounding_whitespace() {
        let parsed: UserInput =
            serde_json::from_str(r#"{"type":"text","text":"  hi \n"}"#).expect("deserialize");
        assert_eq!(parsed, UserInput::text("  hi \n"));
    }
}
