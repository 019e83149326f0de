use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::tile_map::map_parameters::Age;

/// Identifies a player. The id doubles as the bit position inside
/// [`PlayerMask`], so at most 32 players are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

bitflags! {
    /// Per-tile discovery mask, one bit per player.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PlayerMask: u32 {}
}

impl PlayerMask {
    pub fn single(player: PlayerId) -> Self {
        Self::from_bits_retain(1 << (player.0 as u32 & 31))
    }

    pub fn contains_player(self, player: PlayerId) -> bool {
        self.intersects(Self::single(player))
    }

    pub fn insert_player(&mut self, player: PlayerId) {
        *self |= Self::single(player);
    }
}

/// Turn context supplied by the session driving the core: whose turn it is
/// and which age the session has reached. The age gates which resources are
/// eligible during map generation.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext {
    pub current_player: PlayerId,
    pub age: Age,
}

impl TurnContext {
    pub fn new(current_player: PlayerId, age: Age) -> Self {
        Self {
            current_player,
            age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_mask_tracks_individual_players() {
        let mut mask = PlayerMask::default();
        assert!(!mask.contains_player(PlayerId(3)));

        mask.insert_player(PlayerId(3));
        assert!(mask.contains_player(PlayerId(3)));
        assert!(!mask.contains_player(PlayerId(0)));

        mask.insert_player(PlayerId(0));
        assert!(mask.contains_player(PlayerId(0)));
        assert!(mask.contains_player(PlayerId(3)));
    }
}
