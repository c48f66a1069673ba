//! # Reference Lookup
//!
//! The collaborator the resolver uses to turn specialty and subspecialty
//! ids into names, and to search them by name.
//!
//! Implementations are backed by the persistent store (see the
//! `library-store` crate) or, for tests and offline use, by
//! [`InMemoryReference`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use library_catalog::{Specialty, Subspecialty};

/// An `{ id, name }` pair from a reference table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NamedRef {
    /// Row id
    pub id: String,
    /// Display name
    pub name: String,
}

impl NamedRef {
    /// Creates a new reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&Specialty> for NamedRef {
    fn from(specialty: &Specialty) -> Self {
        Self::new(specialty.id.clone(), specialty.name.clone())
    }
}

impl From<&Subspecialty> for NamedRef {
    fn from(subspecialty: &Subspecialty) -> Self {
        Self::new(subspecialty.id.clone(), subspecialty.name.clone())
    }
}

/// Reference lookup errors.
///
/// A missing row is not an error: lookups return `Ok(None)` for it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The backing store could not be reached
    #[error("Lookup transport failure: {0}")]
    Transport(String),

    /// The backing store answered with something unusable
    #[error("Malformed lookup response: {0}")]
    Malformed(String),
}

/// Reference-data lookup used by the resolver.
///
/// Name searches are case-insensitive and return the first match.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Fetch a specialty by id.
    async fn specialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError>;

    /// Fetch a subspecialty by id.
    async fn subspecialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError>;

    /// Find a specialty by name.
    async fn find_specialty_by_name(&self, name: &str) -> Result<Option<NamedRef>, LookupError>;

    /// Find a subspecialty of `specialty_id` by name.
    async fn find_subspecialty_by_name(
        &self,
        specialty_id: &str,
        name: &str,
    ) -> Result<Option<NamedRef>, LookupError>;
}

#[async_trait]
impl<T: ReferenceLookup + ?Sized> ReferenceLookup for &T {
    async fn specialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
        (**self).specialty(id).await
    }

    async fn subspecialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
        (**self).subspecialty(id).await
    }

    async fn find_specialty_by_name(&self, name: &str) -> Result<Option<NamedRef>, LookupError> {
        (**self).find_specialty_by_name(name).await
    }

    async fn find_subspecialty_by_name(
        &self,
        specialty_id: &str,
        name: &str,
    ) -> Result<Option<NamedRef>, LookupError> {
        (**self).find_subspecialty_by_name(specialty_id, name).await
    }
}

#[async_trait]
impl<T: ReferenceLookup + ?Sized> ReferenceLookup for Arc<T> {
    async fn specialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
        (**self).specialty(id).await
    }

    async fn subspecialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
        (**self).subspecialty(id).await
    }

    async fn find_specialty_by_name(&self, name: &str) -> Result<Option<NamedRef>, LookupError> {
        (**self).find_specialty_by_name(name).await
    }

    async fn find_subspecialty_by_name(
        &self,
        specialty_id: &str,
        name: &str,
    ) -> Result<Option<NamedRef>, LookupError> {
        (**self).find_subspecialty_by_name(specialty_id, name).await
    }
}

/// Reference lookup over in-memory tables.
///
/// # Examples
///
/// ```
/// use library_catalog::{Specialty, Subspecialty};
/// use library_visibility::InMemoryReference;
///
/// let reference = InMemoryReference::new()
///     .with_specialty(Specialty::new("ortho", "Orthopedic Surgery"))
///     .with_subspecialty(Subspecialty::new("fa-123", "Foot and Ankle", "ortho"));
///
/// assert_eq!(reference.specialties().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryReference {
    specialties: Vec<Specialty>,
    subspecialties: Vec<Subspecialty>,
}

impl InMemoryReference {
    /// Creates empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a lookup over existing tables.
    pub fn from_tables(specialties: Vec<Specialty>, subspecialties: Vec<Subspecialty>) -> Self {
        Self {
            specialties,
            subspecialties,
        }
    }

    /// Add a specialty.
    pub fn with_specialty(mut self, specialty: Specialty) -> Self {
        self.specialties.push(specialty);
        self
    }

    /// Add a subspecialty.
    pub fn with_subspecialty(mut self, subspecialty: Subspecialty) -> Self {
        self.subspecialties.push(subspecialty);
        self
    }

    /// Specialty table.
    pub fn specialties(&self) -> &[Specialty] {
        &self.specialties
    }

    /// Subspecialty table.
    pub fn subspecialties(&self) -> &[Subspecialty] {
        &self.subspecialties
    }
}

#[async_trait]
impl ReferenceLookup for InMemoryReference {
    async fn specialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
        Ok(self
            .specialties
            .iter()
            .find(|s| s.id == id)
            .map(NamedRef::from))
    }

    async fn subspecialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
        Ok(self
            .subspecialties
            .iter()
            .find(|s| s.id == id)
            .map(NamedRef::from))
    }

    async fn find_specialty_by_name(&self, name: &str) -> Result<Option<NamedRef>, LookupError> {
        Ok(self
            .specialties
            .iter()
            .find(|s| s.is_named(name))
            .map(NamedRef::from))
    }

    async fn find_subspecialty_by_name(
        &self,
        specialty_id: &str,
        name: &str,
    ) -> Result<Option<NamedRef>, LookupError> {
        Ok(self
            .subspecialties
            .iter()
            .find(|s| s.belongs_to(specialty_id) && s.is_named(name))
            .map(NamedRef::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> InMemoryReference {
        InMemoryReference::new()
            .with_specialty(Specialty::new("ortho", "Orthopaedic Surgery"))
            .with_specialty(Specialty::new("pod", "Podiatry"))
            .with_subspecialty(Subspecialty::new("fa", "Foot and Ankle", "ortho"))
            .with_subspecialty(Subspecialty::new("fa-other", "Foot and Ankle", "pod"))
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let reference = reference();
        assert_eq!(
            reference.specialty("pod").await.unwrap(),
            Some(NamedRef::new("pod", "Podiatry"))
        );
        assert_eq!(reference.subspecialty("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_name_search_is_case_insensitive() {
        let reference = reference();
        let found = reference
            .find_specialty_by_name("ORTHOPAEDIC surgery")
            .await
            .unwrap();
        assert_eq!(found.map(|r| r.id), Some("ortho".to_string()));
    }

    #[tokio::test]
    async fn test_subspecialty_search_scoped_to_specialty() {
        let reference = reference();
        let found = reference
            .find_subspecialty_by_name("ortho", "foot and ankle")
            .await
            .unwrap();
        assert_eq!(found.map(|r| r.id), Some("fa".to_string()));

        let none = reference
            .find_subspecialty_by_name("cardio", "foot and ankle")
            .await
            .unwrap();
        assert!(none.is_none());
    }
}
