//! Catalog resources
//!
//! Videos, articles and documents describing surgical techniques. A
//! resource belongs to one category; it carries no visibility attribute of
//! its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::reorder::Positioned;

/// Resource media kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Technique video
    Video,
    /// Journal or web article
    Article,
    /// Technique guide or other document
    Document,
}

impl ResourceKind {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Video => "video",
            ResourceKind::Article => "article",
            ResourceKind::Document => "document",
        }
    }

    /// Parse from string, accepting common aliases.
    ///
    /// ```
    /// use library_catalog::ResourceKind;
    ///
    /// assert_eq!(ResourceKind::parse("PDF"), Some(ResourceKind::Document));
    /// assert_eq!(ResourceKind::parse("youtube"), Some(ResourceKind::Video));
    /// assert_eq!(ResourceKind::parse("podcast"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "video" | "videos" | "youtube" | "vimeo" => Some(ResourceKind::Video),
            "article" | "articles" | "paper" => Some(ResourceKind::Article),
            "document" | "documents" | "pdf" | "guide" => Some(ResourceKind::Document),
            _ => None,
        }
    }
}

/// A catalog resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Resource ID
    pub id: String,

    /// Title
    pub title: String,

    /// Media kind
    pub kind: ResourceKind,

    /// Owning category (also called procedure in older rows)
    #[serde(alias = "procedure_id")]
    pub category_id: String,

    /// Manufacturer or sponsor company
    #[serde(default)]
    pub company_name: Option<String>,

    /// Product featured in the resource
    #[serde(default)]
    pub product_name: Option<String>,

    /// Whether the resource is industry-sponsored
    #[serde(default)]
    pub is_sponsored: bool,

    /// Link to the content
    #[serde(default)]
    pub url: Option<String>,

    /// Thumbnail in object storage
    #[serde(default)]
    pub image_url: Option<String>,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,

    /// Sort position within the category
    #[serde(default)]
    pub position: i32,
}

impl Resource {
    /// Creates a new resource in a category.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: ResourceKind,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            category_id: category_id.into(),
            company_name: None,
            product_name: None,
            is_sponsored: false,
            url: None,
            image_url: None,
            description: None,
            position: 0,
        }
    }

    /// Set the company and product featured in this resource.
    pub fn with_product(mut self, company: impl Into<String>, product: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self.product_name = Some(product.into());
        self
    }

    /// Mark the resource as sponsored.
    pub fn sponsored(mut self) -> Self {
        self.is_sponsored = true;
        self
    }

    /// Set the sort position.
    pub fn with_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Company name, if present and not blank.
    pub fn company(&self) -> Option<&str> {
        self.company_name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Product name, if present and not blank.
    pub fn product(&self) -> Option<&str> {
        self.product_name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Check if both company and product names are present.
    pub fn has_company_and_product(&self) -> bool {
        self.company().is_some() && self.product().is_some()
    }
}

impl Positioned for Resource {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

/// A user's rating of a resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rating {
    /// Rating ID
    pub id: Uuid,
    /// Rated resource
    pub resource_id: String,
    /// Rating user
    pub user_id: String,
    /// Stars, 1 through 5
    pub stars: u8,
    /// When the rating was submitted
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Lowest accepted star count.
    pub const MIN_STARS: u8 = 1;
    /// Highest accepted star count.
    pub const MAX_STARS: u8 = 5;

    /// Create a rating, validating the star count.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if `stars` is outside 1..=5
    pub fn new(
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
        stars: u8,
    ) -> CatalogResult<Self> {
        if !(Self::MIN_STARS..=Self::MAX_STARS).contains(&stars) {
            return Err(CatalogError::InvalidValue {
                field: "stars",
                message: format!("expected 1-5, got {}", stars),
            });
        }

        Ok(Self {
            id: Uuid::now_v7(),
            resource_id: resource_id.into(),
            user_id: user_id.into(),
            stars,
            created_at: Utc::now(),
        })
    }
}

/// Aggregate of a resource's ratings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingSummary {
    /// Number of ratings
    pub count: u32,
    /// Mean star count (0.0 when there are no ratings)
    pub average: f64,
}

impl RatingSummary {
    /// Summarize a set of ratings.
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let total: u32 = ratings.iter().map(|r| u32::from(r.stars)).sum();
        let count = ratings.len() as u32;
        Self {
            count,
            average: f64::from(total) / f64::from(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_and_product_presence() {
        let bare = Resource::new("r1", "Bunionectomy", ResourceKind::Video, "c1");
        assert!(!bare.has_company_and_product());

        let full = bare.clone().with_product("Acme Ortho", "Plate System");
        assert!(full.has_company_and_product());
        assert_eq!(full.company(), Some("Acme Ortho"));

        let mut blank_product = full.clone();
        blank_product.product_name = Some("   ".to_string());
        assert!(!blank_product.has_company_and_product());
    }

    #[test]
    fn test_resource_deserializes_procedure_alias() {
        let resource: Resource = serde_json::from_value(json!({
            "id": "r1",
            "title": "Lapidus",
            "kind": "video",
            "procedure_id": "cat-9",
            "is_sponsored": true,
        }))
        .unwrap();

        assert_eq!(resource.category_id, "cat-9");
        assert!(resource.is_sponsored);
        assert!(resource.company_name.is_none());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new("r1", "u1", 1).is_ok());
        assert!(Rating::new("r1", "u1", 5).is_ok());
        assert!(matches!(
            Rating::new("r1", "u1", 0),
            Err(CatalogError::InvalidValue { field: "stars", .. })
        ));
        assert!(Rating::new("r1", "u1", 6).is_err());
    }

    #[test]
    fn test_rating_summary() {
        let ratings = vec![
            Rating::new("r1", "u1", 5).unwrap(),
            Rating::new("r1", "u2", 4).unwrap(),
            Rating::new("r1", "u3", 3).unwrap(),
        ];
        let summary = RatingSummary::from_ratings(&ratings);
        assert_eq!(summary.count, 3);
        assert!((summary.average - 4.0).abs() < f64::EPSILON);

        assert_eq!(RatingSummary::from_ratings(&[]), RatingSummary::default());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(ResourceKind::parse("Article"), Some(ResourceKind::Article));
        assert_eq!(ResourceKind::parse("guide"), Some(ResourceKind::Document));
        assert_eq!(ResourceKind::Video.as_str(), "video");
    }
}
