//! Specialty reference data
//!
//! Specialties and subspecialties are curated by administrators and
//! read-only for end users. Names are matched case-insensitively throughout
//! the library.

use serde::{Deserialize, Serialize};

/// Top-level medical specialty (e.g. "Orthopaedic Surgery", "Podiatry").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Specialty {
    /// Specialty ID
    pub id: String,

    /// Display name
    pub name: String,
}

impl Specialty {
    /// Creates a new specialty.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Check if this specialty's name matches `name`, ignoring case and
    /// surrounding whitespace.
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    /// Check if this specialty has any subspecialty in `subspecialties`.
    ///
    /// Some specialties (Podiatry) have no subspecialty tier at all.
    pub fn has_subspecialty_tier(&self, subspecialties: &[Subspecialty]) -> bool {
        subspecialties.iter().any(|s| s.specialty_id == self.id)
    }
}

/// Subspecialty within a specialty (e.g. "Foot and Ankle", "Generalist").
///
/// # Examples
///
/// ```
/// use library_catalog::Subspecialty;
///
/// let sub = Subspecialty::new("fa-123", "Foot and Ankle", "ortho");
/// assert!(sub.is_named("foot and ankle"));
/// assert!(sub.belongs_to("ortho"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subspecialty {
    /// Subspecialty ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Owning specialty
    pub specialty_id: String,
}

impl Subspecialty {
    /// Creates a new subspecialty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        specialty_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialty_id: specialty_id.into(),
        }
    }

    /// Check if this subspecialty's name matches `name`, ignoring case and
    /// surrounding whitespace.
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    /// Check if this subspecialty belongs to the given specialty.
    pub fn belongs_to(&self, specialty_id: &str) -> bool {
        self.specialty_id == specialty_id
    }
}

/// Compare two reference-data names case-insensitively, ignoring
/// surrounding whitespace.
///
/// # Examples
///
/// ```
/// use library_catalog::specialty::names_match;
///
/// assert!(names_match("Generalist", " generalist"));
/// assert!(!names_match("Orthopaedic Surgery", "Orthopedic Surgery"));
/// ```
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
