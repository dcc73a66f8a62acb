use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ChatRole {
    User => "user",
    Assistant => "assistant",
});

str_enum!(EvidenceKind {
    Document => "document",
    ChatSession => "chat_session",
    Transcription => "transcription",
});

impl ChatRole {
    /// Speaker label used when a transcript is rendered into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn evidence_kind_round_trip() {
        for kind in [
            EvidenceKind::Document,
            EvidenceKind::ChatSession,
            EvidenceKind::Transcription,
        ] {
            assert_eq!(EvidenceKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn chat_role_serializes_snake_case() {
        let json = serde_json::to_string(&ChatRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let role: ChatRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, ChatRole::User);
    }

    #[test]
    fn invalid_enum_returns_error() {
        let result = EvidenceKind::from_str("voicemail");
        assert!(matches!(result, Err(DatabaseError::InvalidEnum { .. })));
    }
}
