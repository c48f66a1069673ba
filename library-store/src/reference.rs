//! Reference lookups against the backend tables.

use crate::client::{StoreClient, StoreError};
use crate::query;
use async_trait::async_trait;
use library_visibility::{LookupError, NamedRef, ReferenceLookup};
use tracing::debug;

const SPECIALTIES: &str = "specialties";
const SUBSPECIALTIES: &str = "subspecialties";
const COLUMNS: &str = "id,name";

impl From<StoreError> for LookupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidResponse(message) => LookupError::Malformed(message),
            other => LookupError::Transport(other.to_string()),
        }
    }
}

/// [`ReferenceLookup`] over the `specialties` and `subspecialties` tables.
///
/// Name searches use `ilike` without wildcards and take the first row by
/// id, so repeated searches return the same row.
#[derive(Debug, Clone)]
pub struct RestReferenceLookup {
    client: StoreClient,
}

impl RestReferenceLookup {
    /// Create a lookup over a client.
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Get the underlying client.
    pub fn client(&self) -> &StoreClient {
        &self.client
    }
}

#[async_trait]
impl ReferenceLookup for RestReferenceLookup {
    async fn specialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
        debug!(specialty_id = %id, "Fetching specialty");
        Ok(self
            .client
            .select_one(SPECIALTIES, COLUMNS, &[("id", query::eq(id))])
            .await?)
    }

    async fn subspecialty(&self, id: &str) -> Result<Option<NamedRef>, LookupError> {
        debug!(subspecialty_id = %id, "Fetching subspecialty");
        Ok(self
            .client
            .select_one(SUBSPECIALTIES, COLUMNS, &[("id", query::eq(id))])
            .await?)
    }

    async fn find_specialty_by_name(&self, name: &str) -> Result<Option<NamedRef>, LookupError> {
        debug!(name = %name, "Searching specialty");
        Ok(self
            .client
            .select_one(
                SPECIALTIES,
                COLUMNS,
                &[
                    ("name", query::ilike_exact(name)),
                    ("order", query::asc("id")),
                ],
            )
            .await?)
    }

    async fn find_subspecialty_by_name(
        &self,
        specialty_id: &str,
        name: &str,
    ) -> Result<Option<NamedRef>, LookupError> {
        debug!(specialty_id = %specialty_id, name = %name, "Searching subspecialty");
        Ok(self
            .client
            .select_one(
                SUBSPECIALTIES,
                COLUMNS,
                &[
                    ("specialty_id", query::eq(specialty_id)),
                    ("name", query::ilike_exact(name)),
                    ("order", query::asc("id")),
                ],
            )
            .await?)
    }
}
