//! User profiles
//!
//! A profile carries the two classification axes (role and user type) and
//! the specialty/subspecialty the user practices in. Profile rows arrive as
//! loosely-typed JSON from the backend; deserialization here is the one
//! place where those values are validated. Unknown roles become
//! [`Role::User`], unknown or non-string user types become `None`, and
//! non-string or blank ids become `None`.

use chrono::{DateTime, Utc};
use library_rbac::{Role, UserType};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::specialty::Subspecialty;

/// Column names and the camelCase spellings older clients write.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("full_name", "fullName"),
    ("user_type", "userType"),
    ("specialty_id", "specialtyId"),
    ("subspecialty_id", "subspecialtyId"),
    ("onboarding_complete", "onboardingComplete"),
    ("created_at", "createdAt"),
    ("updated_at", "updatedAt"),
];

/// A library user's profile.
///
/// Profile attributes are set once at onboarding and afterwards changed
/// only through settings. The role is never changed by either path; it is
/// assigned by a super admin.
///
/// # Examples
///
/// ```
/// use library_catalog::Profile;
/// use library_rbac::{Role, UserType};
/// use serde_json::json;
///
/// let profile = Profile::from_json(&json!({
///     "id": "user-1",
///     "role": "Specialty_Admin",
///     "userType": "Surgeon ",
///     "specialty_id": "ortho",
///     "subspecialty_id": 42,
/// }));
///
/// assert_eq!(profile.role, Role::SpecialtyAdmin);
/// assert_eq!(profile.user_type, Some(UserType::Surgeon));
/// assert_eq!(profile.specialty_id.as_deref(), Some("ortho"));
/// assert!(profile.subspecialty_id.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Profile {
    /// Profile ID (same as the auth user ID)
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,

    /// Email address
    #[serde(deserialize_with = "lenient::string")]
    pub email: Option<String>,

    /// Full name
    #[serde(alias = "fullName", deserialize_with = "lenient::string")]
    pub full_name: Option<String>,

    /// Administrative role
    #[serde(deserialize_with = "lenient::role")]
    pub role: Role,

    /// End-user category; `None` when missing or not on the allow-list
    #[serde(alias = "userType", deserialize_with = "lenient::user_type")]
    pub user_type: Option<UserType>,

    /// Specialty ID
    #[serde(alias = "specialtyId", deserialize_with = "lenient::string")]
    pub specialty_id: Option<String>,

    /// Subspecialty ID
    #[serde(alias = "subspecialtyId", deserialize_with = "lenient::string")]
    pub subspecialty_id: Option<String>,

    /// Whether onboarding has been completed
    #[serde(alias = "onboardingComplete", deserialize_with = "lenient::flag")]
    pub onboarding_complete: bool,

    /// Creation timestamp
    #[serde(alias = "createdAt", deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    /// Last update timestamp
    #[serde(alias = "updatedAt", deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Creates a new, not yet onboarded profile.
    ///
    /// # Arguments
    ///
    /// * `id` - The auth user ID
    /// * `email` - The user's email address
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: Some(email.into()),
            created_at: Some(now),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    /// Build a profile from an arbitrary JSON value.
    ///
    /// Never fails: anything that is not an object yields an empty profile
    /// (no role, no user type, no specialty). When a row carries both the
    /// snake_case and the camelCase spelling of a column, the snake_case
    /// value is used.
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut row = object.clone();
        for (column, alias) in COLUMN_ALIASES {
            if let Some(aliased) = row.remove(*alias) {
                if row.contains_key(*column) {
                    debug!(column = %column, alias = %alias, "Profile row carries both spellings");
                } else {
                    row.insert(column.to_string(), aliased);
                }
            }
        }

        match serde_json::from_value(Value::Object(row)) {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Unreadable profile row");
                Self::default()
            }
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the user type.
    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = Some(user_type);
        self
    }

    /// Set the specialty.
    pub fn with_specialty(mut self, specialty_id: impl Into<String>) -> Self {
        self.specialty_id = Some(specialty_id.into());
        self
    }

    /// Set the subspecialty.
    pub fn with_subspecialty(mut self, subspecialty_id: impl Into<String>) -> Self {
        self.subspecialty_id = Some(subspecialty_id.into());
        self
    }

    /// Complete onboarding.
    ///
    /// Requires a user type and a specialty. The subspecialty is optional
    /// because some specialties have no subspecialty tier.
    ///
    /// # Errors
    ///
    /// - `AlreadyOnboarded` if onboarding was completed before
    /// - `MissingField` if the user type or specialty is absent
    pub fn complete_onboarding(&mut self, submission: OnboardingSubmission) -> CatalogResult<()> {
        if self.onboarding_complete {
            return Err(CatalogError::AlreadyOnboarded);
        }

        let user_type = submission
            .user_type
            .ok_or(CatalogError::MissingField("user_type"))?;
        let specialty_id = non_blank(submission.specialty_id)
            .ok_or(CatalogError::MissingField("specialty_id"))?;

        self.user_type = Some(user_type);
        self.specialty_id = Some(specialty_id);
        self.subspecialty_id = non_blank(submission.subspecialty_id);
        if let Some(name) = non_blank(submission.full_name) {
            self.full_name = Some(name);
        }
        self.onboarding_complete = true;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Apply a settings change.
    ///
    /// Changing the specialty without naming a new subspecialty clears the
    /// old subspecialty, which belonged to the previous specialty. A new
    /// subspecialty must belong to the (possibly new) specialty.
    ///
    /// # Arguments
    ///
    /// * `settings` - The requested changes
    /// * `subspecialties` - Subspecialty reference table used for validation
    ///
    /// # Errors
    ///
    /// - `UnknownReference` if the subspecialty does not exist
    /// - `InvalidValue` if the subspecialty belongs to another specialty
    pub fn apply_settings(
        &mut self,
        settings: ProfileSettings,
        subspecialties: &[Subspecialty],
    ) -> CatalogResult<()> {
        let mut specialty_id = self.specialty_id.clone();
        let mut subspecialty_id = self.subspecialty_id.clone();

        if let Some(new_id) = non_blank(settings.specialty_id) {
            if specialty_id.as_deref() != Some(new_id.as_str()) {
                subspecialty_id = None;
            }
            specialty_id = Some(new_id);
        }

        if let Some(sub_id) = non_blank(settings.subspecialty_id) {
            let sub = subspecialties
                .iter()
                .find(|s| s.id == sub_id)
                .ok_or_else(|| CatalogError::UnknownReference {
                    kind: "subspecialty",
                    id: sub_id.clone(),
                })?;

            if specialty_id.as_deref() != Some(sub.specialty_id.as_str()) {
                return Err(CatalogError::InvalidValue {
                    field: "subspecialty_id",
                    message: format!("{} does not belong to the selected specialty", sub_id),
                });
            }
            subspecialty_id = Some(sub_id);
        } else if settings.clear_subspecialty {
            subspecialty_id = None;
        }

        // Validated; nothing below can fail
        self.specialty_id = specialty_id;
        self.subspecialty_id = subspecialty_id;
        if let Some(user_type) = settings.user_type {
            self.user_type = Some(user_type);
        }
        if let Some(name) = non_blank(settings.full_name) {
            self.full_name = Some(name);
        }
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// Answers collected by the onboarding flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardingSubmission {
    /// Selected user type
    pub user_type: Option<UserType>,
    /// Selected specialty
    pub specialty_id: Option<String>,
    /// Selected subspecialty, if the specialty has any
    pub subspecialty_id: Option<String>,
    /// Name entered during onboarding
    pub full_name: Option<String>,
}

/// Changes requested from the settings page.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSettings {
    /// New user type
    pub user_type: Option<UserType>,
    /// New specialty
    pub specialty_id: Option<String>,
    /// New subspecialty
    pub subspecialty_id: Option<String>,
    /// Remove the subspecialty (ignored when `subspecialty_id` is set)
    #[serde(default)]
    pub clear_subspecialty: bool,
    /// New full name
    pub full_name: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Lenient field deserializers for profile rows.
///
/// Each one reads an arbitrary JSON value and maps anything unexpected to
/// the field's "absent" value instead of failing.
mod lenient {
    use super::*;

    fn raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
        Option::<Value>::deserialize(deserializer)
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(raw(deserializer)?
            .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty()))
    }

    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(string(deserializer)?.unwrap_or_default())
    }

    pub fn role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Role, D::Error> {
        Ok(raw(deserializer)?
            .and_then(|v| v.as_str().and_then(Role::parse))
            .unwrap_or_default())
    }

    pub fn user_type<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<UserType>, D::Error> {
        Ok(raw(deserializer)?.and_then(|v| v.as_str().and_then(UserType::parse)))
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(matches!(raw(deserializer)?, Some(Value::Bool(true))))
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(raw(deserializer)?.and_then(|v| serde_json::from_value(v).ok()))
    }
}
