//! Profile reads.

use crate::client::{StoreClient, StoreResult};
use crate::query;
use library_catalog::Profile;
use library_visibility::profile_from_value;
use serde_json::Value;
use tracing::instrument;

/// Fetch a profile row by id.
///
/// Rows go through the lenient profile boundary, so malformed role or user
/// type columns never fail the read.
#[instrument(skip(client))]
pub async fn fetch_profile(client: &StoreClient, id: &str) -> StoreResult<Option<Profile>> {
    let row: Option<Value> = client.select_one("profiles", "*", &[("id", query::eq(id))]).await?;
    Ok(profile_from_value(row.as_ref()))
}
