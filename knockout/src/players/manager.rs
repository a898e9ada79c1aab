//! Player registry.

use super::errors::{PlayerError, PlayerResult};
use super::models::{NewPlayer, Player, PlayerId, PlayerUpdate};
use crate::db::{PlayerRepository, SharedStore, StoreError};

/// Longest nick the schema stores
pub const MAX_NICK_LEN: usize = 64;

/// Player manager
#[derive(Clone)]
pub struct PlayerManager {
    store: SharedStore,
}

impl PlayerManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Register a new player
    ///
    /// # Errors
    ///
    /// * `PlayerError::InvalidNick` - Nick is blank or too long
    /// * `PlayerError::NickTaken` - Another player already uses the nick
    pub async fn create_player(&self, player: NewPlayer) -> PlayerResult<Player> {
        let player = NewPlayer {
            nick: validate_nick(&player.nick)?,
            ..player
        };

        let created = self
            .store
            .insert_player(&player)
            .await
            .map_err(|e| nick_error(e, &player.nick))?;

        log::info!("Registered player {} ({})", created.id, created.nick);
        Ok(created)
    }

    /// Get a player by ID
    pub async fn get_player(&self, player_id: PlayerId) -> PlayerResult<Player> {
        self.store
            .find_player(player_id)
            .await?
            .ok_or(PlayerError::NotFound(player_id))
    }

    /// All players ordered by ID
    pub async fn list_players(&self) -> PlayerResult<Vec<Player>> {
        Ok(self.store.list_players().await?)
    }

    /// Apply the supplied fields and leave the rest untouched
    pub async fn update_player(
        &self,
        player_id: PlayerId,
        mut changes: PlayerUpdate,
    ) -> PlayerResult<Player> {
        if let Some(nick) = &changes.nick {
            changes.nick = Some(validate_nick(nick)?);
        }
        if changes.is_empty() {
            return self.get_player(player_id).await;
        }

        let nick = changes.nick.clone().unwrap_or_default();
        self.store
            .update_player(player_id, &changes)
            .await
            .map_err(|e| nick_error(e, &nick))?
            .ok_or(PlayerError::NotFound(player_id))
    }

    /// Flip the active flag
    ///
    /// Deactivated players keep their enrollments and match history.
    pub async fn toggle_active(&self, player_id: PlayerId) -> PlayerResult<Player> {
        let player = self
            .store
            .toggle_player_active(player_id)
            .await?
            .ok_or(PlayerError::NotFound(player_id))?;

        log::info!(
            "Player {} is now {}",
            player.id,
            if player.active { "active" } else { "inactive" }
        );
        Ok(player)
    }
}

fn validate_nick(nick: &str) -> PlayerResult<String> {
    let nick = nick.trim();
    if nick.is_empty() {
        return Err(PlayerError::InvalidNick("nick must not be blank".to_string()));
    }
    if nick.chars().count() > MAX_NICK_LEN {
        return Err(PlayerError::InvalidNick(format!(
            "nick must be at most {MAX_NICK_LEN} characters"
        )));
    }
    Ok(nick.to_string())
}

fn nick_error(err: StoreError, nick: &str) -> PlayerError {
    match err {
        StoreError::Duplicate(_) => PlayerError::NickTaken(nick.to_string()),
        other => PlayerError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use std::sync::Arc;

    fn manager() -> PlayerManager {
        PlayerManager::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_validate_nick() {
        assert_eq!(validate_nick("  chun li ").unwrap(), "chun li");
        assert!(matches!(validate_nick("   "), Err(PlayerError::InvalidNick(_))));
        assert!(validate_nick(&"x".repeat(MAX_NICK_LEN)).is_ok());
        assert!(validate_nick(&"x".repeat(MAX_NICK_LEN + 1)).is_err());
    }

    #[tokio::test]
    async fn test_create_trims_and_rejects_duplicates() {
        let players = manager();
        let created = players.create_player(NewPlayer::new(" guile ")).await.unwrap();
        assert_eq!(created.nick, "guile");
        assert!(created.active);

        let err = players.create_player(NewPlayer::new("guile")).await.unwrap_err();
        assert!(matches!(err, PlayerError::NickTaken(ref nick) if nick == "guile"));
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_record() {
        let players = manager();
        let created = players.create_player(NewPlayer::new("blanka")).await.unwrap();
        let same = players
            .update_player(created.id, PlayerUpdate::default())
            .await
            .unwrap();
        assert_eq!(same, created);

        let err = players
            .update_player(42, PlayerUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PlayerError::NotFound(42)));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_flag() {
        let players = manager();
        let created = players.create_player(NewPlayer::new("dhalsim")).await.unwrap();
        assert!(!players.toggle_active(created.id).await.unwrap().active);
        assert!(players.toggle_active(created.id).await.unwrap().active);
    }
}
