use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// The three operations the remote user directory exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DirectoryOperation {
    ListUsers,
    LikeUser { user_id: UserId },
    DislikeUser { user_id: UserId },
}

impl DirectoryOperation {
    /// Path segments relative to the directory base URL.
    pub fn path_segments(&self) -> Vec<&str> {
        match self {
            Self::ListUsers => vec!["users"],
            Self::LikeUser { user_id } => vec!["users", user_id.as_str(), "like"],
            Self::DislikeUser { user_id } => vec!["users", user_id.as_str(), "dislike"],
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::ListUsers)
    }
}

impl fmt::Display for DirectoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListUsers => f.write_str("GET users"),
            Self::LikeUser { user_id } => write!(f, "POST users/{user_id}/like"),
            Self::DislikeUser { user_id } => write!(f, "POST users/{user_id}/dislike"),
        }
    }
}
