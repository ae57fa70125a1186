//! Review ratings.

use crate::error::{WordwiseError, WordwiseResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};

/// Answers faster than this are rated [`Rating::Easy`].
const EASY_RESPONSE: Duration = Duration::from_secs(2);
/// Answers faster than this (but not easy) are rated [`Rating::Good`].
const GOOD_RESPONSE: Duration = Duration::from_secs(5);

/// Self-reported recall quality on the 1-4 scale.
///
/// - Again (1): forgotten
/// - Hard (2): recalled with serious effort
/// - Good (3): recalled normally
/// - Easy (4): recalled effortlessly
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    /// All ratings in ascending order.
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Numeric value on the 1-4 scale.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Parse a numeric rating, rejecting anything outside 1..=4.
    pub fn from_value(value: i64) -> WordwiseResult<Self> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(WordwiseError::invalid_rating(other)),
        }
    }

    /// Parse user input that is either a number ("3") or a name ("good").
    pub fn from_input(input: &str) -> WordwiseResult<Self> {
        let input = input.trim();
        if let Ok(value) = input.parse::<i64>() {
            return Self::from_value(value);
        }
        // Fractions and numbers too large for i64 are still ratings, just bad ones.
        if input.parse::<f64>().is_ok_and(f64::is_finite) {
            return Err(WordwiseError::invalid_rating(input));
        }
        input
            .parse::<Rating>()
            .map_err(|_| WordwiseError::validation(format!("unknown rating '{}'", input)))
    }

    /// Whether this rating counts as a successful recall for streak purposes.
    pub fn is_pass(self) -> bool {
        self >= Rating::Good
    }

    /// Signed distance from [`Rating::Good`]: -2, -1, 0, +1.
    pub fn offset_from_good(self) -> f64 {
        f64::from(self.value()) - 3.0
    }

    /// Derive a rating from a typed-answer practice attempt.
    ///
    /// Wrong answers are `Again`; correct answers are graded by response time.
    pub fn from_answer(correct: bool, response_time: Duration) -> Self {
        if !correct {
            return Rating::Again;
        }
        if response_time < EASY_RESPONSE {
            Rating::Easy
        } else if response_time < GOOD_RESPONSE {
            Rating::Good
        } else {
            Rating::Hard
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl TryFrom<i64> for Rating {
    type Error = WordwiseError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::from_value(value)
    }
}

impl TryFrom<u8> for Rating {
    type Error = WordwiseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::from_value(i64::from(value))
    }
}

/// Compare a typed answer against the expected word, ignoring case and
/// surrounding whitespace.
pub fn answers_match(expected: &str, given: &str) -> bool {
    expected.trim().to_lowercase() == given.trim().to_lowercase()
}
