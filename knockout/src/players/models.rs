//! Player records: identity, logo and soft-delete flag.

use serde::{Deserialize, Deserializer, Serialize};

/// Player ID type
pub type PlayerId = i64;

/// A registered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Store-assigned identifier
    pub id: PlayerId,
    /// Unique display name
    pub nick: String,
    /// Optional image reference
    pub logo_url: Option<String>,
    /// Inactive players keep their history but cannot enroll
    pub active: bool,
}

/// Fields needed to register a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub nick: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewPlayer {
    /// Active player without a logo
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            logo_url: None,
            active: true,
        }
    }

    pub fn with_logo(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Partial update of a player.
///
/// `None` leaves a field untouched. For `logo_url` the outer `Option` says
/// whether the field was supplied at all, so `Some(None)` clears the logo
/// while an omitted field keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default, deserialize_with = "present_field")]
    pub logo_url: Option<Option<String>>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Marks a field that appeared in the payload, even as `null`.
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl PlayerUpdate {
    /// True when the update would not change anything
    pub fn is_empty(&self) -> bool {
        self.nick.is_none() && self.logo_url.is_none() && self.active.is_none()
    }

    /// Apply the supplied fields to `player`
    pub fn apply(&self, player: &mut Player) {
        if let Some(nick) = &self.nick {
            player.nick = nick.clone();
        }
        if let Some(logo_url) = &self.logo_url {
            player.logo_url = logo_url.clone();
        }
        if let Some(active) = self.active {
            player.active = active;
        }
    }
}
