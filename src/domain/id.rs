//! Numeric task identifiers
//!
//! Ids are positive integers handed out by the store from a counter that
//! starts at 1. They are written as plain numbers in JSON and on the
//! command line (`todo done 3`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID: expected a positive integer, got '{0}'")]
    InvalidTaskId(String),
}

/// Task ID, always >= 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TaskId(u32);

impl TaskId {
    /// The first id a fresh store hands out
    pub const FIRST: TaskId = TaskId(1);

    /// Creates an ID from a raw value, rejecting zero
    pub fn new(value: u32) -> Result<Self, IdError> {
        if value == 0 {
            return Err(IdError::InvalidTaskId(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Returns the raw numeric value
    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns the id following this one, `None` past `u32::MAX`
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value: u32 = s
            .parse()
            .map_err(|_| IdError::InvalidTaskId(s.to_string()))?;
        Self::new(value).map_err(|_| IdError::InvalidTaskId(s.to_string()))
    }
}

impl TryFrom<u32> for TaskId {
    type Error = IdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for u32 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_id() {
        let id: TaskId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn parse_trims_whitespace() {
        let id: TaskId = "  7 ".parse().unwrap();
        assert_eq!(id.get(), 7);
    }

    #[test]
    fn reject_zero_and_garbage() {
        assert!("0".parse::<TaskId>().is_err());
        assert!("-3".parse::<TaskId>().is_err());
        assert!("abc".parse::<TaskId>().is_err());
        assert!("".parse::<TaskId>().is_err());
    }

    #[test]
    fn next_increments() {
        assert_eq!(TaskId::FIRST.next().map(TaskId::get), Some(2));
    }

    #[test]
    fn next_stops_at_the_largest_id() {
        let last = TaskId::new(u32::MAX).unwrap();
        assert_eq!(last.next(), None);
    }

    #[test]
    fn serde_as_plain_number() {
        let id = TaskId::new(5).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "5");

        let parsed: TaskId = serde_json::from_str("5").unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_str::<TaskId>("0").is_err());
    }

    #[test]
    fn ordering_is_numeric() {
        let a = TaskId::new(2).unwrap();
        let b = TaskId::new(10).unwrap();
        assert!(a < b);
    }
}
