//! # User Types
//!
//! The end-user category recorded at onboarding. User type is the axis that
//! gates interactive features; it is independent of [`crate::Role`].

use serde::{Deserialize, Serialize};

/// End-user category.
///
/// The variants are the complete allow-list of user types permitted to use
/// interactive features. Any value outside this list never becomes a
/// `UserType`, so holding one is itself the interaction grant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Practicing surgeon.
    Surgeon,
    /// Attending physician.
    Attending,
    /// Trainee (generic).
    Trainee,
    /// Resident in training.
    Resident,
    /// Fellow in training.
    Fellow,
    /// Industry representative.
    Industry,
    /// Medical student.
    Student,
    /// Any other clinician or staff member.
    Other,
}

impl UserType {
    /// Get the string representation of the user type.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Surgeon => "surgeon",
            UserType::Attending => "attending",
            UserType::Trainee => "trainee",
            UserType::Resident => "resident",
            UserType::Fellow => "fellow",
            UserType::Industry => "industry",
            UserType::Student => "student",
            UserType::Other => "other",
        }
    }

    /// Parse a user type, trimming whitespace and ignoring case.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse
    ///
    /// # Returns
    ///
    /// `Some(UserType)` if the normalized value is on the allow-list,
    /// `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use library_rbac::UserType;
    ///
    /// assert_eq!(UserType::parse("Surgeon "), Some(UserType::Surgeon));
    /// assert_eq!(UserType::parse("FELLOW"), Some(UserType::Fellow));
    /// assert_eq!(UserType::parse("administrator"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "surgeon" => Some(UserType::Surgeon),
            "attending" => Some(UserType::Attending),
            "trainee" => Some(UserType::Trainee),
            "resident" => Some(UserType::Resident),
            "fellow" => Some(UserType::Fellow),
            "industry" => Some(UserType::Industry),
            "student" => Some(UserType::Student),
            "other" => Some(UserType::Other),
            _ => None,
        }
    }

    /// Get all user types on the allow-list.
    pub fn all() -> Vec<Self> {
        vec![
            UserType::Surgeon,
            UserType::Attending,
            UserType::Trainee,
            UserType::Resident,
            UserType::Fellow,
            UserType::Industry,
            UserType::Student,
            UserType::Other,
        ]
    }

    /// Check if this user type is still in training.
    pub fn is_in_training(&self) -> bool {
        matches!(
            self,
            UserType::Trainee | UserType::Resident | UserType::Fellow | UserType::Student
        )
    }

    /// Check if this user type represents industry (company representatives).
    pub fn is_industry(&self) -> bool {
        matches!(self, UserType::Industry)
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
