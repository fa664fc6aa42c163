//! Interfaces to the host application.
//!
//! The engine never talks to a server or reads board state itself. Whatever
//! it needs (who may search whom, how names are shown, adding someone to a
//! board) comes in through these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::suggestions::Candidate;

/// A user known to the host
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    /// Avatar image reference, resolved by the host
    pub avatar_ref: String,
    pub is_bot: bool,
    pub is_guest: bool,
}

impl Member {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Change who belongs to the board and with which role
    ManageBoardRoles,
}

pub trait PermissionChecker: Send + Sync {
    fn has_permission(&self, permission: Permission) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardType {
    /// Anyone on the team can find and join the board
    Open,
    Private,
}

/// The board the edited card belongs to, as seen by the current user
#[derive(Debug, Clone, PartialEq)]
pub struct BoardContext {
    pub board_type: BoardType,
    pub current_user_is_guest: bool,
    /// Users who are already members of the board
    pub members: Vec<Member>,
}

impl BoardContext {
    pub fn is_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|member| member.id == member_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Member search failed: {0}")]
    Remote(String),
    #[error("Search source unavailable")]
    Unavailable,
}

/// Team-wide user search
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn search_members(&self, term: &str) -> Result<Vec<Member>, SearchError>;
}

/// How the host prefers names to be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameDisplay {
    #[default]
    Username,
    /// Nickname, falling back to the full name
    Nickname,
    FullName,
}

pub trait DisplayNameFormatter: Send + Sync {
    fn format_display_name(&self, member: &Member, display: NameDisplay) -> String;
}

/// The usual display-name rules: fall back to the username whenever the
/// preferred field is blank
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNameFormatter;

impl DisplayNameFormatter for StandardNameFormatter {
    fn format_display_name(&self, member: &Member, display: NameDisplay) -> String {
        let preferred = match display {
            NameDisplay::Username => String::new(),
            NameDisplay::Nickname if !member.nickname.trim().is_empty() => {
                member.nickname.trim().to_string()
            }
            NameDisplay::Nickname | NameDisplay::FullName => member.full_name(),
        };
        if preferred.is_empty() {
            member.username.clone()
        } else {
            preferred
        }
    }
}

/// Asks the user whether a non-member should be added to the board
///
/// The answer comes back later through
/// [`EditorController::resolve_member_proposal`](crate::EditorController::resolve_member_proposal).
pub trait BoardMembership {
    fn propose_member(&self, candidate: &Candidate);
}
