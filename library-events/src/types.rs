//! Event types for the session feed and analytics
//!
//! Session events announce sign-in state and profile changes so that every
//! consumer of the current profile (the visibility scope included) can
//! re-resolve. Analytics events record what users do with resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Where an event originated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// The browsing client
    Web,
    /// The admin console
    Admin,
    /// The backend (auth service, database triggers)
    Backend,
}

impl EventSource {
    /// Get the topic segment for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Web => "web",
            EventSource::Admin => "admin",
            EventSource::Backend => "backend",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "web" | "client" => Some(EventSource::Web),
            "admin" => Some(EventSource::Admin),
            "backend" | "server" => Some(EventSource::Backend),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event envelope.
///
/// All events are wrapped in this envelope which provides metadata
/// for routing, tracing, and processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Event type (e.g., "session.signed_in", "resource.viewed")
    pub event_type: String,

    /// Source of the event
    pub source: EventSource,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Profile that triggered the event
    pub user_id: Option<String>,

    /// Correlation ID for tracing
    pub correlation_id: Option<String>,

    /// Event version for schema evolution
    pub version: u32,

    /// Event payload
    pub payload: serde_json::Value,

    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Event {
    /// Create a new event.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The event type string
    /// * `source` - Where the event originated
    /// * `payload` - The event payload
    pub fn new(event_type: impl Into<String>, source: EventSource, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            source,
            timestamp: Utc::now(),
            user_id: None,
            correlation_id: None,
            version: 1,
            payload,
            metadata: HashMap::new(),
        }
    }

    /// Set user context.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set correlation ID.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Add metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get the topic for this event.
    ///
    /// Topics are structured as: `{source}.{event_type}`
    pub fn topic(&self) -> String {
        format!("{}.{}", self.source.as_str(), self.event_type)
    }

    /// Get the category of this event, if known.
    pub fn category(&self) -> Option<EventCategory> {
        EventCategory::from_event_type(&self.event_type)
    }

    /// Parse the payload into a specific type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Event categories for filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Sign-in state changes
    Session,
    /// Profile and onboarding changes
    Profile,
    /// Interactions with resources
    Engagement,
    /// Searches
    Search,
    /// Contact with industry reps
    Outreach,
}

impl EventCategory {
    /// Parse from event type string.
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        let prefix = event_type.split('.').next()?;
        match prefix {
            "session" | "token" => Some(EventCategory::Session),
            "profile" | "onboarding" => Some(EventCategory::Profile),
            "resource" | "note" | "upcoming_case" | "rating" => Some(EventCategory::Engagement),
            "search" => Some(EventCategory::Search),
            "rep" | "inquiry" => Some(EventCategory::Outreach),
            _ => None,
        }
    }
}

fn payload_of<T: Serialize>(event: &T) -> serde_json::Value {
    serde_json::to_value(event).unwrap_or(serde_json::Value::Null)
}

// ============================================================================
// Session Events
// ============================================================================

/// Session and profile change events.
///
/// Consumers holding a resolved visibility scope re-resolve on
/// `profile.updated` and `onboarding.completed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A user signed in
    SignedIn { user_id: String, provider: String },
    /// A user signed out
    SignedOut { user_id: String },
    /// The access token was refreshed
    TokenRefreshed {
        user_id: String,
        expires_at: DateTime<Utc>,
    },
    /// Profile fields changed through settings
    ProfileUpdated {
        profile_id: String,
        changed: Vec<String>,
    },
    /// Onboarding form was submitted
    OnboardingCompleted {
        profile_id: String,
        user_type: String,
        specialty_id: String,
        subspecialty_id: Option<String>,
    },
}

impl SessionEvent {
    /// Profile the event concerns.
    pub fn user_id(&self) -> &str {
        match self {
            SessionEvent::SignedIn { user_id, .. }
            | SessionEvent::SignedOut { user_id }
            | SessionEvent::TokenRefreshed { user_id, .. } => user_id,
            SessionEvent::ProfileUpdated { profile_id, .. }
            | SessionEvent::OnboardingCompleted { profile_id, .. } => profile_id,
        }
    }

    /// Check whether consumers must re-resolve profile-derived state.
    pub fn invalidates_profile(&self) -> bool {
        !matches!(self, SessionEvent::TokenRefreshed { .. })
    }

    /// Convert to generic event.
    pub fn to_event(&self) -> Event {
        let event_type = match self {
            SessionEvent::SignedIn { .. } => "session.signed_in",
            SessionEvent::SignedOut { .. } => "session.signed_out",
            SessionEvent::TokenRefreshed { .. } => "session.token_refreshed",
            SessionEvent::ProfileUpdated { .. } => "profile.updated",
            SessionEvent::OnboardingCompleted { .. } => "onboarding.completed",
        };
        Event::new(event_type, EventSource::Backend, payload_of(self)).with_user(self.user_id())
    }
}

// ============================================================================
// Analytics Events
// ============================================================================

/// User activity recorded for the admin analytics dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    /// A resource detail page was opened
    ResourceViewed {
        resource_id: String,
        category_id: String,
    },
    /// A resource was added to or removed from favorites
    ResourceFavorited { resource_id: String, favorited: bool },
    /// A personal note was saved on a resource
    NoteSaved { resource_id: String },
    /// A resource was attached to an upcoming case
    UpcomingCaseAdded {
        resource_id: String,
        case_date: Option<DateTime<Utc>>,
    },
    /// A star rating was submitted
    RatingSubmitted { resource_id: String, stars: u8 },
    /// A rep inquiry was sent
    RepInquirySent {
        resource_id: String,
        company_name: String,
    },
    /// A catalog search ran
    SearchPerformed { query: String, result_count: usize },
}

impl AnalyticsEvent {
    /// Resource the event concerns, if any.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            AnalyticsEvent::ResourceViewed { resource_id, .. }
            | AnalyticsEvent::ResourceFavorited { resource_id, .. }
            | AnalyticsEvent::NoteSaved { resource_id }
            | AnalyticsEvent::UpcomingCaseAdded { resource_id, .. }
            | AnalyticsEvent::RatingSubmitted { resource_id, .. }
            | AnalyticsEvent::RepInquirySent { resource_id, .. } => Some(resource_id),
            AnalyticsEvent::SearchPerformed { .. } => None,
        }
    }

    /// Convert to generic event attributed to `user_id`.
    pub fn to_event(&self, user_id: impl Into<String>) -> Event {
        let event_type = match self {
            AnalyticsEvent::ResourceViewed { .. } => "resource.viewed",
            AnalyticsEvent::ResourceFavorited { .. } => "resource.favorited",
            AnalyticsEvent::NoteSaved { .. } => "note.saved",
            AnalyticsEvent::UpcomingCaseAdded { .. } => "upcoming_case.added",
            AnalyticsEvent::RatingSubmitted { .. } => "rating.submitted",
            AnalyticsEvent::RepInquirySent { .. } => "rep.inquiry_sent",
            AnalyticsEvent::SearchPerformed { .. } => "search.performed",
        };
        Event::new(event_type, EventSource::Web, payload_of(self)).with_user(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let payload = serde_json::json!({"key": "value"});
        let event = Event::new("test.event", EventSource::Web, payload)
            .with_user("user-1")
            .with_correlation_id("req-9");

        assert_eq!(event.event_type, "test.event");
        assert_eq!(event.source, EventSource::Web);
        assert_eq!(event.user_id.as_deref(), Some("user-1"));
        assert_eq!(event.version, 1);
    }

    #[test]
    fn test_event_topic() {
        let event = Event::new("resource.viewed", EventSource::Web, serde_json::json!({}));
        assert_eq!(event.topic(), "web.resource.viewed");
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(EventSource::parse(" Backend "), Some(EventSource::Backend));
        assert_eq!(EventSource::parse("client"), Some(EventSource::Web));
        assert_eq!(EventSource::parse("mobile"), None);
    }

    #[test]
    fn test_session_event() {
        let event = SessionEvent::SignedIn {
            user_id: "user-1".to_string(),
            provider: "email".to_string(),
        }
        .to_event();

        assert_eq!(event.event_type, "session.signed_in");
        assert_eq!(event.source, EventSource::Backend);
        assert_eq!(event.user_id.as_deref(), Some("user-1"));
        assert_eq!(event.payload["type"], "signed_in");
    }

    #[test]
    fn test_session_event_payload_round_trips() {
        let original = SessionEvent::OnboardingCompleted {
            profile_id: "user-1".to_string(),
            user_type: "surgeon".to_string(),
            specialty_id: "spec-ortho".to_string(),
            subspecialty_id: None,
        };
        let parsed: SessionEvent = original.to_event().parse_payload().unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_token_refresh_keeps_profile_state() {
        let refreshed = SessionEvent::TokenRefreshed {
            user_id: "user-1".to_string(),
            expires_at: Utc::now(),
        };
        assert!(!refreshed.invalidates_profile());

        let updated = SessionEvent::ProfileUpdated {
            profile_id: "user-1".to_string(),
            changed: vec!["subspecialty_id".to_string()],
        };
        assert!(updated.invalidates_profile());
        assert_eq!(updated.to_event().event_type, "profile.updated");
    }

    #[test]
    fn test_analytics_event() {
        let rating = AnalyticsEvent::RatingSubmitted {
            resource_id: "res-1".to_string(),
            stars: 4,
        };
        let event = rating.to_event("user-1");
        assert_eq!(event.event_type, "rating.submitted");
        assert_eq!(event.source, EventSource::Web);
        assert_eq!(event.payload["stars"], 4);
        assert_eq!(rating.resource_id(), Some("res-1"));

        let search = AnalyticsEvent::SearchPerformed {
            query: "bunion".to_string(),
            result_count: 3,
        };
        assert_eq!(search.resource_id(), None);
        assert_eq!(search.to_event("user-1").topic(), "web.search.performed");
    }

    #[test]
    fn test_event_category() {
        assert_eq!(
            EventCategory::from_event_type("session.signed_in"),
            Some(EventCategory::Session)
        );
        assert_eq!(
            EventCategory::from_event_type("upcoming_case.added"),
            Some(EventCategory::Engagement)
        );
        assert_eq!(
            EventCategory::from_event_type("rep.inquiry_sent"),
            Some(EventCategory::Outreach)
        );
        assert_eq!(EventCategory::from_event_type("billing.paid"), None);
    }
}
