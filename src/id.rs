//! Card identifiers, printed as 11 character base64 strings.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const ENCODED_LEN: usize = 11;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl CardId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn random() -> Self {
        Self(rand::random())
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn encode(self) -> [u8; ENCODED_LEN] {
        let mut data = self.0;
        let mut res = [0u8; ENCODED_LEN];
        for i in &mut res {
            *i = ALPHABET[(data >> 58) as usize];
            data <<= 6;
        }
        res
    }

    /// The last character only carries four bits, so its low two bits are
    /// ignored.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != ENCODED_LEN {
            return None;
        }
        let mut res = 0u64;
        for (idx, c) in data.iter().enumerate() {
            let position = ALPHABET.iter().position(|e| e == c)?;
            if idx == ENCODED_LEN - 1 {
                res <<= 4;
                res |= (position >> 2) as u64;
            } else {
                res <<= 6;
                res |= position as u64;
            }
        }
        Some(Self(res))
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.encode();
        // ALPHABET is ASCII
        f.write_str(std::str::from_utf8(&encoded).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for CardId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix("__").unwrap_or(trimmed);
        Self::decode(trimmed.as_bytes()).ok_or_else(|| ValidationError::InvalidCardId(s.to_string()))
    }
}

impl Serialize for CardId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CardId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
