use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::RoomCodeError;

const CODE_LEN: usize = 4;

/// Four-digit rendezvous code identifying a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomCode(u16);

impl RoomCode {
    /// Draw a fresh code in 1000..=9999 so it never has a leading zero.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        RoomCode(rng.random_range(1000..=9999))
    }

    /// Parse user input. Surrounding whitespace is ignored; anything other
    /// than exactly four ASCII digits is rejected.
    pub fn parse(input: &str) -> Result<Self, RoomCodeError> {
        let trimmed = input.trim();
        if trimmed.len() != CODE_LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RoomCodeError::Invalid(input.to_string()));
        }
        trimmed
            .parse()
            .map(RoomCode)
            .map_err(|_| RoomCodeError::Invalid(input.to_string()))
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for RoomCode {
    type Err = RoomCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomCode::parse(s)
    }
}
