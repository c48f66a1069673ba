//! Companies, representatives and inquiries
//!
//! Industry companies register representative contacts per subspecialty.
//! A company is *active* for a scope when it has at least one contact there,
//! and only then can users send an inquiry about one of its products.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::resource::Resource;

/// An industry company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Company {
    /// Company ID
    pub id: String,
    /// Display name, as it appears on resources
    pub name: String,
}

impl Company {
    /// Creates a new company.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A company representative registered for a subspecialty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepContact {
    /// Contact ID
    pub id: String,
    /// Employing company
    pub company_id: String,
    /// Subspecialty the representative covers
    pub subspecialty_id: String,
    /// Representative name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
}

/// Company names with at least one representative in the current scope.
///
/// Names are compared case-insensitively, ignoring surrounding whitespace.
/// Sets built from contact rows also remember which subspecialties each
/// company covers; names inserted directly cover every subspecialty.
///
/// # Examples
///
/// ```
/// use library_catalog::ActiveCompanySet;
///
/// let active: ActiveCompanySet = ["Acme Ortho"].into_iter().collect();
/// assert!(active.contains("acme ortho "));
/// assert!(!active.contains("Other Co"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveCompanySet {
    names: HashMap<String, Coverage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Coverage {
    Any,
    Subspecialties(HashSet<String>),
}

impl ActiveCompanySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a company name active in every subspecialty. Blank names are
    /// ignored.
    pub fn insert(&mut self, name: &str) {
        let key = normalize(name);
        if !key.is_empty() {
            self.names.insert(key, Coverage::Any);
        }
    }

    /// Add a company name active in one subspecialty. Blank names are
    /// ignored.
    pub fn insert_for(&mut self, name: &str, subspecialty_id: &str) {
        let key = normalize(name);
        if key.is_empty() {
            return;
        }
        match self
            .names
            .entry(key)
            .or_insert_with(|| Coverage::Subspecialties(HashSet::new()))
        {
            Coverage::Any => {}
            Coverage::Subspecialties(subs) => {
                subs.insert(subspecialty_id.to_string());
            }
        }
    }

    /// Check if a company name is active anywhere in the set.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&normalize(name))
    }

    /// Check if a company name has a representative for `subspecialty_id`.
    ///
    /// ```
    /// use library_catalog::{ActiveCompanySet, Company, RepContact};
    ///
    /// let companies = [Company::new("c1", "Acme Ortho")];
    /// let contacts = [RepContact {
    ///     id: "r1".into(),
    ///     company_id: "c1".into(),
    ///     subspecialty_id: "fa-123".into(),
    ///     name: "Pat".into(),
    ///     email: "pat@acme.example".into(),
    ///     phone: None,
    /// }];
    /// let active = ActiveCompanySet::from_contacts(&companies, &contacts, None);
    ///
    /// assert!(active.contains_in("Acme Ortho", "fa-123"));
    /// assert!(!active.contains_in("Acme Ortho", "hand"));
    /// ```
    pub fn contains_in(&self, name: &str, subspecialty_id: &str) -> bool {
        match self.names.get(&normalize(name)) {
            Some(Coverage::Any) => true,
            Some(Coverage::Subspecialties(subs)) => subs.contains(subspecialty_id),
            None => false,
        }
    }

    /// Build the set from company and contact tables.
    ///
    /// With `subspecialty_id` set, only contacts covering that subspecialty
    /// count. With `None` (catalog-wide scope), any contact counts. Either
    /// way each company is recorded against the subspecialties its
    /// contacts cover.
    pub fn from_contacts(
        companies: &[Company],
        contacts: &[RepContact],
        subspecialty_id: Option<&str>,
    ) -> Self {
        let names: HashMap<&str, &str> = companies
            .iter()
            .map(|company| (company.id.as_str(), company.name.as_str()))
            .collect();

        let mut set = Self::new();
        for contact in contacts
            .iter()
            .filter(|c| subspecialty_id.map_or(true, |sub| c.subspecialty_id == sub))
        {
            if let Some(name) = names.get(contact.company_id.as_str()) {
                set.insert_for(name, &contact.subspecialty_id);
            }
        }
        set
    }
    /// Number of active companies.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if no company is active.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for ActiveCompanySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl FromIterator<String> for ActiveCompanySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(&name);
        }
        set
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A user's question to a company about a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepInquiry {
    /// Inquiry ID
    pub id: Uuid,
    /// Resource the inquiry was sent from
    pub resource_id: String,
    /// Company addressed
    pub company_name: String,
    /// Product asked about
    pub product_name: String,
    /// Sending user
    pub user_id: String,
    /// Message body
    pub message: String,
    /// When the inquiry was sent
    pub created_at: DateTime<Utc>,
}

impl RepInquiry {
    /// Create an inquiry about a resource's product.
    ///
    /// # Errors
    ///
    /// - `MissingField("company_name")` / `MissingField("product_name")` if
    ///   the resource lacks either
    /// - `MissingField("message")` if the message is blank
    pub fn new(
        resource: &Resource,
        user_id: impl Into<String>,
        message: impl Into<String>,
    ) -> CatalogResult<Self> {
        let company = resource
            .company()
            .ok_or(CatalogError::MissingField("company_name"))?;
        let product = resource
            .product()
            .ok_or(CatalogError::MissingField("product_name"))?;

        let message = message.into().trim().to_string();
        if message.is_empty() {
            return Err(CatalogError::MissingField("message"));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            resource_id: resource.id.clone(),
            company_name: company.to_string(),
            product_name: product.to_string(),
            user_id: user_id.into(),
            message,
            created_at: Utc::now(),
        })
    }
}
