//! Subscriber-side handlers for review events.

use std::collections::HashSet;
use std::sync::Mutex;

use uuid::Uuid;

use catalog_core::error::DomainError;
use catalog_core::publisher::DomainEventSubscriber;

use crate::domain::events::REVIEW_CREATED_EVENT_TYPE;

/// Topic on which catalog service events travel.
pub const CATALOG_SERVICE_TOPIC: &str = "CatalogService";

/// Tracks event ids already handled, so redelivered events can be dropped.
#[derive(Debug, Default)]
struct SeenEvents {
    ids: Mutex<HashSet<Uuid>>,
}

impl SeenEvents {
    /// Returns `true` exactly once per event id.
    fn first_sighting(&self, event_id: Uuid) -> bool {
        self.ids
            .lock()
            .expect("seen events lock poisoned")
            .insert(event_id)
    }
}

/// Registers the catalog service handler on `subscriber`.
///
/// Delivery is at-least-once, so the handler drops events whose id it has
/// already seen before reacting.
///
/// # Errors
///
/// Returns the subscriber's error when registration fails.
pub async fn register_catalog_event_handler(
    subscriber: &dyn DomainEventSubscriber,
) -> Result<(), DomainError> {
    let seen = SeenEvents::default();
    subscriber
        .subscribe(
            CATALOG_SERVICE_TOPIC,
            Box::new(move |event| {
                if !seen.first_sighting(event.event_id()) {
                    tracing::debug!(event_id = %event.event_id(), "duplicate event dropped");
                    return;
                }
                match event.event_type() {
                    REVIEW_CREATED_EVENT_TYPE => {
                        tracing::info!(
                            review_id = %event.aggregate_id(),
                            book_id = ?event.event_body().get("book_id"),
                            "review created"
                        );
                    }
                    other => {
                        tracing::debug!(
                            event_type = other,
                            review_id = %event.aggregate_id(),
                            "review event received"
                        );
                    }
                }
            }),
        )
        .await
}
