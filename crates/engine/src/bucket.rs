//! The two sub-accounts every user holds, and the pair of balances they carry.

use std::{fmt, str::FromStr};

use crate::{EngineError, Money};

/// One of the two buckets held per account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    Current,
    Savings,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Current, Bucket::Savings];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Savings => "savings",
        }
    }

    /// The opposite bucket of the same account.
    pub fn other(self) -> Bucket {
        match self {
            Self::Current => Self::Savings,
            Self::Savings => Self::Current,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Bucket {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "current" | "c" => Ok(Self::Current),
            "savings" | "s" => Ok(Self::Savings),
            other => Err(EngineError::InvalidInput(format!(
                "bucket must be 'current' or 'savings', got '{other}'"
            ))),
        }
    }
}

impl FromStr for Bucket {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Balances of both buckets for one account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Balances {
    pub current: Money,
    pub savings: Money,
}

impl Balances {
    pub fn new(current: Money, savings: Money) -> Self {
        Self { current, savings }
    }

    pub fn get(&self, bucket: Bucket) -> Money {
        match bucket {
            Bucket::Current => self.current,
            Bucket::Savings => self.savings,
        }
    }
}
