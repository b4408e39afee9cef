use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Player, PlayerId, Record};

/// Which of the two team slots in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSlot {
    #[serde(rename = "teamA")]
    TeamA,
    #[serde(rename = "teamB")]
    TeamB,
}

impl TeamSlot {
    pub fn opponent(self) -> Self {
        match self {
            TeamSlot::TeamA => TeamSlot::TeamB,
            TeamSlot::TeamB => TeamSlot::TeamA,
        }
    }

    /// Single-letter code used by the share encoding
    pub fn code(self) -> &'static str {
        match self {
            TeamSlot::TeamA => "A",
            TeamSlot::TeamB => "B",
        }
    }
}

impl std::fmt::Display for TeamSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamSlot::TeamA => write!(f, "teamA"),
            TeamSlot::TeamB => write!(f, "teamB"),
        }
    }
}

/// An ordered roster. Insertion order is the display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            players: Vec::new(),
        }
    }

    /// Appends a fresh player and returns it.
    pub fn add_player(&mut self, name: impl Into<String>) -> &mut Player {
        self.players.push(Player::new(name));
        let last = self.players.len() - 1;
        &mut self.players[last]
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Case-insensitive lookup
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        let wanted = name.trim().to_lowercase();
        self.players
            .iter()
            .find(|p| p.name.trim().to_lowercase() == wanted)
    }

    /// Players not yet dismissed
    pub fn available_batters(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.is_available_to_bat()).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Record for Team {
    fn refresh_derived(&mut self) {
        self.players.iter_mut().for_each(Player::refresh_derived);
    }
}
