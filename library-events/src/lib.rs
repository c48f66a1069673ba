//! # Library Events
//!
//! Session feed and analytics events for the surgical technique library.
//!
//! ## Overview
//!
//! The library-events crate handles:
//! - **Event Types**: Session changes and user activity
//! - **Event Bus**: Publish/subscribe messaging
//! - **Shared Subscriptions**: One bus subscription per purpose, fanned out
//!   to every consumer
//!
//! ## Features
//!
//! - `memory` (default): In-memory event bus
//!
//! ## Usage
//!
//! ### Publishing Events
//!
//! ```rust,no_run
//! use library_events::{AnalyticsEvent, EventBus, MemoryEventBus};
//!
//! async fn publish_example() {
//!     let bus = MemoryEventBus::new();
//!
//!     let viewed = AnalyticsEvent::ResourceViewed {
//!         resource_id: "res-1".to_string(),
//!         category_id: "cat-bunion".to_string(),
//!     };
//!
//!     bus.publish(viewed.to_event("user-1")).await.unwrap();
//! }
//! ```
//!
//! ### Sharing the Session Feed
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use library_events::{MemoryEventBus, SubscriptionPurpose, SubscriptionRegistry};
//!
//! async fn subscribe_example() {
//!     let registry = SubscriptionRegistry::new(Arc::new(MemoryEventBus::new()));
//!
//!     // Both leases share one bus subscription
//!     let mut header = registry.acquire(&SubscriptionPurpose::session_changes()).await.unwrap();
//!     let _sidebar = registry.acquire(&SubscriptionPurpose::session_changes()).await.unwrap();
//!
//!     while let Ok(event) = header.recv().await {
//!         println!("Session change: {}", event.event_type);
//!     }
//! }
//! ```
//!
//! ## Topic Patterns
//!
//! Topics are structured as `{source}.{event_type}`:
//! - `backend.session.signed_in` - Specific event
//! - `backend.session.*` - All sign-in state changes
//! - `*.resource.#` - Resource events from any source
//! - `#` - All events
//!
//! Wildcards:
//! - `*` matches exactly one segment
//! - `#` matches zero or more segments

pub mod bus;
pub mod registry;
pub mod types;

// Re-export main types
pub use bus::{EventBus, EventBusError, EventBusResult, EventBusStats, EventHandler, MemoryEventBus, Subscription};
pub use registry::{SubscriptionLease, SubscriptionPurpose, SubscriptionRegistry};
pub use types::{AnalyticsEvent, Event, EventCategory, EventSource, SessionEvent};
