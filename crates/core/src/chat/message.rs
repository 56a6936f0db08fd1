use chrono::{DateTime, Utc};
use nexus_llm::{ProviderMessage, Role as ProviderRole};

/// Opening assistant line every transcript starts with.
pub const GREETING_TEXT: &str = "Hello! I am Nexus AI. How can I assist you today?";

/// Stable identifier for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(pub u64);

impl TurnId {
    /// Creates a typed turn identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn to_provider(self) -> ProviderRole {
        match self {
            Self::User => ProviderRole::User,
            Self::Assistant => ProviderRole::Assistant,
        }
    }
}

/// One immutable message in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub id: TurnId,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn to_provider_message(&self) -> ProviderMessage {
        ProviderMessage::new(self.role.to_provider(), self.text.clone())
    }
}

/// Append-only ordered history of turns.
///
/// Never empty: construction seeds the assistant greeting. Ids are strictly
/// increasing and timestamps never go backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub(crate) fn seeded(greeting_id: TurnId) -> Self {
        Self {
            turns: vec![Turn {
                id: greeting_id,
                role: Role::Assistant,
                text: GREETING_TEXT.to_string(),
                created_at: Utc::now(),
            }],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Relabels every turn into provider vocabulary, in order.
    pub fn history(&self) -> Vec<ProviderMessage> {
        self.turns.iter().map(Turn::to_provider_message).collect()
    }

    pub(crate) fn append(&mut self, id: TurnId, role: Role, text: impl Into<String>) -> &Turn {
        let now = Utc::now();
        let created_at = match self.turns.last() {
            Some(previous) if previous.created_at > now => previous.created_at,
            _ => now,
        };

        debug_assert!(self.turns.last().is_none_or(|previous| previous.id < id));

        self.turns.push(Turn {
            id,
            role,
            text: text.into(),
            created_at,
        });
        let index = self.turns.len() - 1;
        &self.turns[index]
    }
}
