use std::ops::RangeInclusive;

use game_types::PlayerId;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::GameError;

pub const NICKNAME_LENGTH: RangeInclusive<usize> = 3..=20;
pub const PASSWORD_LENGTH: RangeInclusive<usize> = 6..=20;

const HASH_SEPARATOR: char = '$';

/// A registered account. `id` stays `0` until the player is first persisted.
///
/// Identity is deliberately not exposed through `PartialEq`; use
/// [`Player::same_identity`].
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    nickname: String,
    password_hash: String,
    score: i32,
}

impl Player {
    pub fn new(nickname: impl Into<String>, password: &str) -> Result<Self, GameError> {
        let nickname = nickname.into();
        if !NICKNAME_LENGTH.contains(&nickname.chars().count()) {
            return Err(GameError::InvalidNickname);
        }
        if !PASSWORD_LENGTH.contains(&password.chars().count()) {
            return Err(GameError::InvalidPassword);
        }

        Ok(Self {
            id: 0,
            nickname,
            password_hash: hash_password(&Uuid::new_v4().simple().to_string(), password),
            score: 0,
        })
    }

    /// Rehydrates a player from storage without re-validating it.
    pub fn restore(id: PlayerId, nickname: String, password_hash: String, score: i32) -> Self {
        Self {
            id,
            nickname,
            password_hash,
            score,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Called by the persistence layer once the store has assigned a key.
    pub fn assign_id(&mut self, id: PlayerId) {
        self.id = id;
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn add_score(&mut self) {
        self.score += 1;
    }

    pub fn dec_score(&mut self) {
        self.score -= 1;
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        match self.password_hash.split_once(HASH_SEPARATOR) {
            Some((salt, _)) => hash_password(salt, candidate) == self.password_hash,
            None => false,
        }
    }

    /// True only for two persisted players with the same id.
    pub fn same_identity(&self, other: &Player) -> bool {
        self.is_persisted() && self.id == other.id
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    format!("{salt}{HASH_SEPARATOR}{digest:x}")
}
