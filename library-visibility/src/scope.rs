//! # Scope Resolution
//!
//! Computes which slice of the catalog a profile sees.
//!
//! ## Rules
//!
//! 1. A profile with a subspecialty sees that subspecialty, unless the
//!    subspecialty is the *Generalist* sentinel, which sees everything.
//! 2. A profile with only a specialty sees everything, unless the specialty
//!    is *Podiatry*: podiatrists are remapped to the *Foot and Ankle*
//!    subspecialty of Orthopaedic (or Orthopedic) Surgery.
//! 3. A profile with neither sees everything.
//!
//! Reference data that cannot be resolved (a missing row or a failing
//! lookup) collapses to the configured [`FallbackPolicy`]. Resolution never
//! returns an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use library_catalog::specialty::names_match;
use library_catalog::Profile;

use crate::config::{FallbackPolicy, ResolverConfig};
use crate::lookup::{NamedRef, ReferenceLookup};

/// The catalog slice a profile sees.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Scope {
    /// Whether every subspecialty is visible
    pub load_all: bool,

    /// The subspecialty to filter by when not loading everything
    pub effective_subspecialty_id: Option<String>,
}

impl Scope {
    /// Catalog-wide scope.
    pub fn all() -> Self {
        Self {
            load_all: true,
            effective_subspecialty_id: None,
        }
    }

    /// Scope limited to one subspecialty.
    pub fn subspecialty(id: impl Into<String>) -> Self {
        Self {
            load_all: false,
            effective_subspecialty_id: Some(id.into()),
        }
    }

    /// Scope that admits nothing.
    pub fn nothing() -> Self {
        Self {
            load_all: false,
            effective_subspecialty_id: None,
        }
    }

    /// Check if this scope admits nothing.
    pub fn is_empty(&self) -> bool {
        !self.load_all && self.effective_subspecialty_id.is_none()
    }

    /// Subspecialty filter for catalog queries, if any.
    pub fn subspecialty_filter(&self) -> Option<&str> {
        if self.load_all {
            None
        } else {
            self.effective_subspecialty_id.as_deref()
        }
    }
}

/// Resolves profiles to scopes using a reference lookup.
///
/// # Examples
///
/// ```
/// use library_catalog::{Profile, Specialty, Subspecialty};
/// use library_visibility::{InMemoryReference, Scope, ScopeResolver};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let reference = InMemoryReference::new()
///     .with_specialty(Specialty::new("pod", "Podiatry"))
///     .with_specialty(Specialty::new("ortho", "Orthopedic Surgery"))
///     .with_subspecialty(Subspecialty::new("fa-123", "Foot and Ankle", "ortho"));
///
/// let resolver = ScopeResolver::new(reference);
/// let profile = Profile::new("u1", "u1@example.com").with_specialty("pod");
///
/// assert_eq!(resolver.resolve_scope(&profile).await, Scope::subspecialty("fa-123"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ScopeResolver<L> {
    lookup: L,
    config: ResolverConfig,
}

impl<L: ReferenceLookup> ScopeResolver<L> {
    /// Creates a resolver with the default configuration.
    pub fn new(lookup: L) -> Self {
        Self::with_config(lookup, ResolverConfig::default())
    }

    /// Creates a resolver with an explicit configuration.
    pub fn with_config(lookup: L, config: ResolverConfig) -> Self {
        Self { lookup, config }
    }

    /// Get the resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Get the reference lookup.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Resolve the catalog scope for a profile.
    ///
    /// Every lookup is awaited before branching on its result. The same
    /// profile and reference data always yield the same scope.
    #[instrument(skip(self, profile), fields(profile_id = %profile.id))]
    pub async fn resolve_scope(&self, profile: &Profile) -> Scope {
        if let Some(subspecialty_id) = present(profile.subspecialty_id.as_deref()) {
            return self.resolve_subspecialty(subspecialty_id).await;
        }

        if let Some(specialty_id) = present(profile.specialty_id.as_deref()) {
            return self.resolve_specialty(specialty_id).await;
        }

        debug!("No specialty or subspecialty, loading all");
        Scope::all()
    }

    async fn resolve_subspecialty(&self, subspecialty_id: &str) -> Scope {
        match self.lookup.subspecialty(subspecialty_id).await {
            Ok(Some(sub)) if names_match(&sub.name, &self.config.generalist_name) => {
                debug!(subspecialty_id, "Generalist subspecialty, loading all");
                Scope::all()
            }
            Ok(Some(_)) => Scope::subspecialty(subspecialty_id),
            Ok(None) => self.fallback("subspecialty not found", subspecialty_id),
            Err(e) => {
                warn!(error = %e, subspecialty_id, "Subspecialty lookup failed");
                self.fallback("subspecialty lookup failed", subspecialty_id)
            }
        }
    }

    async fn resolve_specialty(&self, specialty_id: &str) -> Scope {
        match self.lookup.specialty(specialty_id).await {
            Ok(Some(specialty)) if names_match(&specialty.name, &self.config.podiatry_name) => {
                self.resolve_podiatry(specialty_id).await
            }
            Ok(Some(_)) => {
                debug!(specialty_id, "Specialty without subspecialty, loading all");
                Scope::all()
            }
            Ok(None) => self.fallback("specialty not found", specialty_id),
            Err(e) => {
                warn!(error = %e, specialty_id, "Specialty lookup failed");
                self.fallback("specialty lookup failed", specialty_id)
            }
        }
    }

    /// Map a podiatrist to the foot-and-ankle subspecialty of the first
    /// orthopaedic specialty found.
    async fn resolve_podiatry(&self, specialty_id: &str) -> Scope {
        let orthopaedic = match self.find_orthopaedic().await {
            Ok(Some(found)) => found,
            Ok(None) => return self.fallback("orthopaedic specialty not found", specialty_id),
            Err(reason) => return self.fallback(reason, specialty_id),
        };

        match self
            .lookup
            .find_subspecialty_by_name(&orthopaedic.id, &self.config.foot_and_ankle_name)
            .await
        {
            Ok(Some(foot_and_ankle)) => {
                debug!(
                    specialty_id,
                    effective_subspecialty_id = %foot_and_ankle.id,
                    "Podiatry remapped to foot and ankle"
                );
                Scope::subspecialty(foot_and_ankle.id)
            }
            Ok(None) => self.fallback("foot and ankle subspecialty not found", &orthopaedic.id),
            Err(e) => {
                warn!(error = %e, specialty_id = %orthopaedic.id, "Subspecialty search failed");
                self.fallback("foot and ankle lookup failed", &orthopaedic.id)
            }
        }
    }

    async fn find_orthopaedic(&self) -> Result<Option<NamedRef>, &'static str> {
        for name in &self.config.orthopaedic_names {
            match self.lookup.find_specialty_by_name(name).await {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, name = %name, "Specialty search failed");
                    return Err("orthopaedic lookup failed");
                }
            }
        }
        Ok(None)
    }

    fn fallback(&self, reason: &str, id: &str) -> Scope {
        warn!(
            id,
            reason,
            policy = self.config.fallback.as_str(),
            "Unresolved reference data, applying fallback"
        );
        match self.config.fallback {
            FallbackPolicy::FailOpen => Scope::all(),
            FallbackPolicy::FailClosed => Scope::nothing(),
        }
    }
}

/// Resolve a profile's scope with the default configuration.
pub async fn resolve_scope<L: ReferenceLookup + ?Sized>(profile: &Profile, lookup: &L) -> Scope {
    ScopeResolver::new(lookup).resolve_scope(profile).await
}

fn present(id: Option<&str>) -> Option<&str> {
    id.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{InMemoryReference, LookupError};
    use async_trait::async_trait;
    use library_catalog::{Specialty, Subspecialty};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn reference() -> InMemoryReference {
        InMemoryReference::new()
            .with_specialty(Specialty::new("podiatry-id", "Podiatry"))
            .with_specialty(Specialty::new("ortho-us", "Orthopedic Surgery"))
            .with_specialty(Specialty::new("cardio", "Cardiothoracic Surgery"))
            .with_subspecialty(Subspecialty::new("fa-123", "Foot and Ankle", "ortho-us"))
            .with_subspecialty(Subspecialty::new("hand-1", "Hand", "ortho-us"))
            .with_subspecialty(Subspecialty::new("gen-1", "Generalist", "ortho-us"))
    }

    fn profile() -> Profile {
        Profile::new("u1", "u1@example.com")
    }

    /// Lookup that fails every call.
    struct Unreachable;

    #[async_trait]
    impl ReferenceLookup for Unreachable {
        async fn specialty(&self, _: &str) -> Result<Option<NamedRef>, LookupError> {
            Err(LookupError::Transport("connection refused".into()))
        }
        async fn subspecialty(&self, _: &str) -> Result<Option<NamedRef>, LookupError> {
            Err(LookupError::Transport("connection refused".into()))
        }
        async fn find_specialty_by_name(&self, _: &str) -> Result<Option<NamedRef>, LookupError> {
            Err(LookupError::Transport("connection refused".into()))
        }
        async fn find_subspecialty_by_name(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Option<NamedRef>, LookupError> {
            Err(LookupError::Transport("connection refused".into()))
        }
    }

    /// In-memory lookup that counts name searches.
    struct Counting {
        inner: InMemoryReference,
        searches: AtomicUsize,
    }

    #[async_trait]
    impl ReferenceLookup for Counting {
        async fn specialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
            self.inner.specialty(id).await
        }
        async fn subspecialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
            self.inner.subspecialty(id).await
        }
        async fn find_specialty_by_name(&self, name: &str) -> Result<Option<NamedRef>, LookupError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            self.inner.find_specialty_by_name(name).await
        }
        async fn find_subspecialty_by_name(
            &self,
            specialty_id: &str,
            name: &str,
        ) -> Result<Option<NamedRef>, LookupError> {
            self.inner.find_subspecialty_by_name(specialty_id, name).await
        }
    }

    #[tokio::test]
    async fn test_podiatry_maps_to_foot_and_ankle_us_spelling() {
        let resolver = ScopeResolver::new(reference());
        let scope = resolver
            .resolve_scope(&profile().with_specialty("podiatry-id"))
            .await;

        assert!(!scope.load_all);
        assert_eq!(scope.effective_subspecialty_id.as_deref(), Some("fa-123"));
    }

    #[tokio::test]
    async fn test_podiatry_prefers_british_spelling() {
        let reference = reference()
            .with_specialty(Specialty::new("ortho-uk", "Orthopaedic Surgery"))
            .with_subspecialty(Subspecialty::new("fa-uk", "foot and ankle", "ortho-uk"));
        let counting = Counting {
            inner: reference,
            searches: AtomicUsize::new(0),
        };

        let scope = resolve_scope(&profile().with_specialty("podiatry-id"), &counting).await;

        assert_eq!(scope, Scope::subspecialty("fa-uk"));
        assert_eq!(counting.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generalist_loads_all() {
        let resolver = ScopeResolver::new(reference());
        let scope = resolver
            .resolve_scope(&profile().with_subspecialty("gen-1"))
            .await;

        assert_eq!(scope, Scope::all());
    }

    #[tokio::test]
    async fn test_subspecialty_takes_precedence_over_specialty() {
        let resolver = ScopeResolver::new(reference());
        let scope = resolver
            .resolve_scope(
                &profile()
                    .with_specialty("podiatry-id")
                    .with_subspecialty("hand-1"),
            )
            .await;

        assert_eq!(scope, Scope::subspecialty("hand-1"));
    }

    #[tokio::test]
    async fn test_no_placement_loads_all() {
        let resolver = ScopeResolver::with_config(
            reference(),
            ResolverConfig::default().with_fallback(FallbackPolicy::FailClosed),
        );
        assert_eq!(resolver.resolve_scope(&profile()).await, Scope::all());
    }

    #[tokio::test]
    async fn test_blank_ids_are_absent() {
        let resolver = ScopeResolver::new(Unreachable);
        let scope = resolver
            .resolve_scope(&profile().with_subspecialty("  ").with_specialty(""))
            .await;
        assert_eq!(scope, Scope::all());
    }

    #[tokio::test]
    async fn test_non_podiatry_specialty_loads_all() {
        let resolver = ScopeResolver::new(reference());
        let scope = resolver
            .resolve_scope(&profile().with_specialty("cardio"))
            .await;
        assert_eq!(scope, Scope::all());
    }

    #[tokio::test]
    async fn test_missing_rows_fail_open() {
        let resolver = ScopeResolver::new(reference());

        for p in [
            profile().with_subspecialty("deleted-sub"),
            profile().with_specialty("deleted-spec"),
        ] {
            assert_eq!(resolver.resolve_scope(&p).await, Scope::all());
        }
    }

    #[tokio::test]
    async fn test_podiatry_without_orthopaedics_fails_open() {
        let reference = InMemoryReference::new()
            .with_specialty(Specialty::new("podiatry-id", "PODIATRY"));
        let scope = resolve_scope(&profile().with_specialty("podiatry-id"), &reference).await;
        assert_eq!(scope, Scope::all());
    }

    #[tokio::test]
    async fn test_podiatry_without_foot_and_ankle_fails_open() {
        let reference = InMemoryReference::new()
            .with_specialty(Specialty::new("podiatry-id", "Podiatry"))
            .with_specialty(Specialty::new("ortho", "Orthopaedic Surgery"))
            .with_subspecialty(Subspecialty::new("hand", "Hand", "ortho"));
        let scope = resolve_scope(&profile().with_specialty("podiatry-id"), &reference).await;
        assert_eq!(scope, Scope::all());
    }

    #[tokio::test]
    async fn test_transport_failure_fails_open() {
        let resolver = ScopeResolver::new(Unreachable);

        for p in [
            profile().with_subspecialty("fa-123"),
            profile().with_specialty("podiatry-id"),
        ] {
            assert_eq!(resolver.resolve_scope(&p).await, Scope::all());
        }
    }

    #[tokio::test]
    async fn test_fail_closed_policy() {
        let resolver = ScopeResolver::with_config(
            Unreachable,
            ResolverConfig::default().with_fallback(FallbackPolicy::FailClosed),
        );
        let scope = resolver
            .resolve_scope(&profile().with_subspecialty("fa-123"))
            .await;

        assert_eq!(scope, Scope::nothing());
        assert!(scope.is_empty());
        assert!(scope.subspecialty_filter().is_none());
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let resolver = ScopeResolver::new(reference());
        let p = profile().with_specialty("podiatry-id");

        let first = resolver.resolve_scope(&p).await;
        let second = resolver.resolve_scope(&p).await;
        assert_eq!(first, second);
    }

    #[test]
    fn test_scope_filter() {
        assert_eq!(Scope::all().subspecialty_filter(), None);
        assert_eq!(Scope::subspecialty("x").subspecialty_filter(), Some("x"));
        assert!(!Scope::all().is_empty());
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn flip_case(name: &str, mask: &[bool]) -> String {
        name.chars()
            .zip(mask.iter().cycle())
            .map(|(c, upper)| {
                if *upper {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_generalist_any_case_any_id(
            id in "[a-z0-9-]{1,16}",
            mask in proptest::collection::vec(any::<bool>(), 1..10),
        ) {
            let name = flip_case("Generalist", &mask);
            let reference = InMemoryReference::new()
                .with_subspecialty(Subspecialty::new(id.clone(), name, "any"));

            let scope = block_on(resolve_scope(&profile().with_subspecialty(id), &reference));
            prop_assert_eq!(scope, Scope::all());
        }

        #[test]
        fn prop_unresolvable_never_narrows(
            specialty in proptest::option::of("[a-z]{1,8}"),
            subspecialty in proptest::option::of("[a-z]{1,8}"),
        ) {
            let mut p = profile();
            p.specialty_id = specialty;
            p.subspecialty_id = subspecialty;

            let empty = block_on(resolve_scope(&p, &InMemoryReference::new()));
            let failing = block_on(resolve_scope(&p, &Unreachable));
            prop_assert_eq!(empty, Scope::all());
            prop_assert_eq!(failing, Scope::all());
        }

        #[test]
        fn prop_podiatry_any_case(mask in proptest::collection::vec(any::<bool>(), 1..10)) {
            let reference = InMemoryReference::new()
                .with_specialty(Specialty::new("p", flip_case("Podiatry", &mask)))
                .with_specialty(Specialty::new("o", flip_case("Orthopedic Surgery", &mask)))
                .with_subspecialty(Subspecialty::new("fa", flip_case("Foot and Ankle", &mask), "o"));

            let scope = block_on(resolve_scope(&profile().with_specialty("p"), &reference));
            prop_assert_eq!(scope, Scope::subspecialty("fa"));
        }
    }
}
