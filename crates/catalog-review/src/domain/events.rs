//! Domain events for reviews.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use catalog_core::clock::Clock;
use catalog_core::error::DomainError;
use catalog_core::event::DomainEvent;

/// Emitted when a review is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreated {
    /// The review identifier.
    pub review_id: Uuid,
    /// The reviewed book's identifier.
    pub book_id: String,
    /// The reviewer's display name.
    pub name: String,
    /// The star rating.
    pub rating: u8,
    /// The comment text, if one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Emitted when the reviewer's name is corrected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewNameUpdated {
    /// The new reviewer name.
    pub name: String,
}

/// Emitted when the star rating is revised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRatingUpdated {
    /// The new star rating.
    pub rating: u8,
}

/// Emitted when the comment text is edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCommentEdited {
    /// The new comment text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Emitted when the review is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDeleted {}

/// Aggregate type under which review events are stored.
pub const REVIEW_AGGREGATE_TYPE: &str = "Review";

/// Event type identifier for [`ReviewCreated`].
pub const REVIEW_CREATED_EVENT_TYPE: &str = "Created";

/// Event type identifier for [`ReviewNameUpdated`].
pub const REVIEW_NAME_UPDATED_EVENT_TYPE: &str = "NameUpdated";

/// Event type identifier for [`ReviewRatingUpdated`].
pub const REVIEW_RATING_UPDATED_EVENT_TYPE: &str = "RatingUpdated";

/// Event type identifier for [`ReviewCommentEdited`].
pub const REVIEW_COMMENT_EDITED_EVENT_TYPE: &str = "CommentEdited";

/// Event type identifier for [`ReviewDeleted`].
pub const REVIEW_DELETED_EVENT_TYPE: &str = "Deleted";

/// Event payload variants for the review aggregate.
#[derive(Debug, Clone)]
pub enum ReviewEvent {
    /// A review has been created.
    Created(ReviewCreated),
    /// The reviewer's name has been corrected.
    NameUpdated(ReviewNameUpdated),
    /// The star rating has been revised.
    RatingUpdated(ReviewRatingUpdated),
    /// The comment text has been edited.
    CommentEdited(ReviewCommentEdited),
    /// The review has been deleted.
    Deleted(ReviewDeleted),
}

impl ReviewEvent {
    /// Returns the `event_type` identifier for this variant.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Created(_) => REVIEW_CREATED_EVENT_TYPE,
            Self::NameUpdated(_) => REVIEW_NAME_UPDATED_EVENT_TYPE,
            Self::RatingUpdated(_) => REVIEW_RATING_UPDATED_EVENT_TYPE,
            Self::CommentEdited(_) => REVIEW_COMMENT_EDITED_EVENT_TYPE,
            Self::Deleted(_) => REVIEW_DELETED_EVENT_TYPE,
        }
    }

    /// Serializes this variant's fields into an event body.
    #[must_use]
    pub fn to_body(&self) -> Value {
        // Serialization of derived Serialize types to Value is infallible.
        match self {
            Self::Created(body) => serde_json::to_value(body),
            Self::NameUpdated(body) => serde_json::to_value(body),
            Self::RatingUpdated(body) => serde_json::to_value(body),
            Self::CommentEdited(body) => serde_json::to_value(body),
            Self::Deleted(body) => serde_json::to_value(body),
        }
        .expect("review event body serialization is infallible")
    }

    /// Wraps this event in a persistable envelope for `aggregate_id`,
    /// timestamped from `clock`.
    #[must_use]
    pub fn into_domain_event(self, aggregate_id: Uuid, clock: &dyn Clock) -> DomainEvent {
        DomainEvent::create(
            aggregate_id,
            REVIEW_AGGREGATE_TYPE,
            self.event_type(),
            self.to_body(),
            clock,
        )
    }

    /// Decodes a stored envelope back into a review event.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedEvent`] if the envelope's
    /// `event_type` is unknown or its body does not match that type's
    /// schema.
    pub fn try_from_domain(event: &DomainEvent) -> Result<Self, DomainError> {
        let body = event.event_body().clone();
        match event.event_type() {
            REVIEW_CREATED_EVENT_TYPE => serde_json::from_value(body).map(Self::Created),
            REVIEW_NAME_UPDATED_EVENT_TYPE => serde_json::from_value(body).map(Self::NameUpdated),
            REVIEW_RATING_UPDATED_EVENT_TYPE => {
                serde_json::from_value(body).map(Self::RatingUpdated)
            }
            REVIEW_COMMENT_EDITED_EVENT_TYPE => {
                serde_json::from_value(body).map(Self::CommentEdited)
            }
            REVIEW_DELETED_EVENT_TYPE => serde_json::from_value(body).map(Self::Deleted),
            unknown => {
                return Err(DomainError::MalformedEvent(format!(
                    "unknown event type: {unknown}"
                )));
            }
        }
        .map_err(|error| DomainError::MalformedEvent(format!("undecodable event body: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use catalog_test_support::FixedClock;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    #[test]
    fn test_created_body_keeps_snake_case_field_names() {
        let event = ReviewEvent::Created(ReviewCreated {
            review_id: Uuid::new_v4(),
            book_id: "9784798126708".to_string(),
            name: "山田太郎".to_string(),
            rating: 4,
            comment: Some("とても面白かったです".to_string()),
        });

        let body = event.to_body();

        assert_eq!(body["book_id"], json!("9784798126708"));
        assert_eq!(body["name"], json!("山田太郎"));
        assert_eq!(body["rating"], json!(4));
        assert_eq!(body["comment"], json!("とても面白かったです"));
    }

    #[test]
    fn test_created_body_omits_an_absent_comment() {
        let event = ReviewEvent::Created(ReviewCreated {
            review_id: Uuid::new_v4(),
            book_id: "9784798126708".to_string(),
            name: "山田太郎".to_string(),
            rating: 4,
            comment: None,
        });

        assert!(event.to_body().get("comment").is_none());
    }

    #[test]
    fn test_deleted_body_is_an_empty_object() {
        assert_eq!(ReviewEvent::Deleted(ReviewDeleted {}).to_body(), json!({}));
    }

    #[test]
    fn test_envelope_round_trip_preserves_the_event() {
        let aggregate_id = Uuid::new_v4();
        let event = ReviewEvent::NameUpdated(ReviewNameUpdated {
            name: "佐藤花子".to_string(),
        });

        let envelope = event.into_domain_event(aggregate_id, &clock());
        let decoded = ReviewEvent::try_from_domain(&envelope).unwrap();

        assert_eq!(envelope.aggregate_type(), REVIEW_AGGREGATE_TYPE);
        assert_eq!(envelope.event_type(), REVIEW_NAME_UPDATED_EVENT_TYPE);
        match decoded {
            ReviewEvent::NameUpdated(body) => assert_eq!(body.name, "佐藤花子"),
            other => panic!("expected NameUpdated, got {other:?}"),
        }
    }

    #[test]
    fn test_try_from_domain_rejects_unknown_event_types() {
        let envelope = DomainEvent::create(
            Uuid::new_v4(),
            REVIEW_AGGREGATE_TYPE,
            "Archived",
            json!({}),
            &clock(),
        );

        let result = ReviewEvent::try_from_domain(&envelope);

        match result {
            Err(DomainError::MalformedEvent(message)) => {
                assert!(message.contains("Archived"));
            }
            other => panic!("expected MalformedEvent, got {other:?}"),
        }
    }

    #[test]
    fn test_try_from_domain_rejects_mismatched_bodies() {
        let envelope = DomainEvent::create(
            Uuid::new_v4(),
            REVIEW_AGGREGATE_TYPE,
            REVIEW_CREATED_EVENT_TYPE,
            json!({ "rating": "four" }),
            &clock(),
        );

        let result = ReviewEvent::try_from_domain(&envelope);

        assert!(matches!(result, Err(DomainError::MalformedEvent(_))));
    }
}
