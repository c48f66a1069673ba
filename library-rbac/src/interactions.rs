//! # Interactions
//!
//! Interactive features an end user can perform on a catalog resource.
//! Access to every interaction is decided by user type alone.

use serde::{Deserialize, Serialize};

use crate::user_types::UserType;

/// Interactive features on a resource.
///
/// - **Favorite**: Bookmark a resource
/// - **Note**: Attach a private note
/// - **UpcomingCase**: Schedule a resource against an upcoming case
/// - **Rate**: Submit a rating
/// - **Suggest**: Suggest a new resource for the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    /// Bookmark a resource.
    Favorite,

    /// Attach a private note to a resource.
    Note,

    /// Add a resource to an upcoming case.
    ///
    /// Upcoming cases can be pushed to a connected calendar.
    UpcomingCase,

    /// Rate a resource.
    Rate,

    /// Suggest a resource for curation.
    Suggest,
}

impl Interaction {
    /// Get the string representation of the interaction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interaction::Favorite => "favorite",
            Interaction::Note => "note",
            Interaction::UpcomingCase => "upcoming_case",
            Interaction::Rate => "rate",
            Interaction::Suggest => "suggest",
        }
    }

    /// Parse interaction from string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use library_rbac::Interaction;
    ///
    /// assert_eq!(Interaction::parse("favorite"), Some(Interaction::Favorite));
    /// assert_eq!(Interaction::parse("bookmark"), Some(Interaction::Favorite)); // Alias
    /// assert_eq!(Interaction::parse("rating"), Some(Interaction::Rate)); // Alias
    /// assert_eq!(Interaction::parse("share"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "favorite" | "favourite" | "bookmark" => Some(Interaction::Favorite),
            "note" | "notes" | "annotate" => Some(Interaction::Note),
            "upcoming_case" | "upcoming-case" | "case" => Some(Interaction::UpcomingCase),
            "rate" | "rating" => Some(Interaction::Rate),
            "suggest" | "suggestion" => Some(Interaction::Suggest),
            _ => None,
        }
    }

    /// Get all interactions.
    pub fn all() -> Vec<Self> {
        vec![
            Interaction::Favorite,
            Interaction::Note,
            Interaction::UpcomingCase,
            Interaction::Rate,
            Interaction::Suggest,
        ]
    }

    /// Check if the data produced by this interaction is private to the user.
    pub fn is_private(&self) -> bool {
        matches!(self, Interaction::Note | Interaction::UpcomingCase | Interaction::Favorite)
    }

    /// Check if a user of the given type may perform this interaction.
    ///
    /// Every interaction requires a user type from the allow-list; an
    /// absent user type denies all of them.
    ///
    /// # Example
    ///
    /// ```
    /// use library_rbac::{Interaction, UserType};
    ///
    /// assert!(Interaction::Rate.permitted_for(Some(UserType::Student)));
    /// assert!(!Interaction::Rate.permitted_for(None));
    /// ```
    pub fn permitted_for(&self, user_type: Option<UserType>) -> bool {
        user_type.is_some()
    }
}
