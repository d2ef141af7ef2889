use serde::{Deserialize, Serialize};
use std::fmt;

/// Flow instance lifecycle status
///
/// Serialized as its integer code, which is also what the recorder
/// reports in the `status` field of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum FlowStatus {
    /// Instance created but not yet started
    NotStarted,

    /// Instance is executing steps
    Active,

    /// Instance finished successfully
    Completed,

    /// Instance was cancelled before completion
    Cancelled,

    /// Instance failed
    Failed,
}

impl FlowStatus {
    /// Integer code reported to the collector
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            FlowStatus::NotStarted => 0,
            FlowStatus::Active => 100,
            FlowStatus::Completed => 500,
            FlowStatus::Cancelled => 600,
            FlowStatus::Failed => 700,
        }
    }

    /// Parse a status from its integer code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(FlowStatus::NotStarted),
            100 => Some(FlowStatus::Active),
            500 => Some(FlowStatus::Completed),
            600 => Some(FlowStatus::Cancelled),
            700 => Some(FlowStatus::Failed),
            _ => None,
        }
    }

    /// Whether the instance can no longer change status
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FlowStatus::Completed | FlowStatus::Cancelled | FlowStatus::Failed
        )
    }
}

impl From<FlowStatus> for i32 {
    fn from(status: FlowStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i32> for FlowStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        FlowStatus::from_code(code).ok_or_else(|| format!("unknown flow status code: {}", code))
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}
