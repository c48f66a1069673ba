//! Active-company queries.

use crate::client::{StoreClient, StoreResult};
use crate::query;
use library_catalog::{ActiveCompanySet, Company, RepContact};
use library_visibility::Scope;
use tracing::{debug, instrument};

const CONTACT_COLUMNS: &str = "id,company_id,subspecialty_id,name,email,phone";

/// Companies with at least one rep contact in `scope`.
///
/// A subspecialty scope counts only contacts for that subspecialty; a
/// catalog-wide scope counts every contact; an empty scope yields an empty
/// set without touching the backend.
#[instrument(skip(client))]
pub async fn fetch_active_companies(client: &StoreClient, scope: &Scope) -> StoreResult<ActiveCompanySet> {
    if scope.is_empty() {
        return Ok(ActiveCompanySet::new());
    }

    let filter = scope.subspecialty_filter();
    let mut contact_filters = Vec::new();
    if let Some(subspecialty_id) = filter {
        contact_filters.push(("subspecialty_id", query::eq(subspecialty_id)));
    }
    let contacts: Vec<RepContact> = client
        .select("company_contacts", CONTACT_COLUMNS, &contact_filters)
        .await?;

    if contacts.is_empty() {
        debug!("No rep contacts in scope");
        return Ok(ActiveCompanySet::new());
    }

    let mut company_ids: Vec<&str> = contacts.iter().map(|c| c.company_id.as_str()).collect();
    company_ids.sort_unstable();
    company_ids.dedup();

    let companies: Vec<Company> = client
        .select("companies", "id,name", &[("id", query::in_list(company_ids))])
        .await?;

    let active = ActiveCompanySet::from_contacts(&companies, &contacts, filter);
    debug!(contacts = contacts.len(), active = active.len(), "Resolved active companies");
    Ok(active)
}
