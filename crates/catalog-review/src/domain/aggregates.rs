//! The review aggregate root.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use catalog_core::aggregate::{Aggregate, UncommittedEvents};
use catalog_core::clock::Clock;
use catalog_core::error::DomainError;
use catalog_core::event::DomainEvent;

use super::events::{
    REVIEW_AGGREGATE_TYPE, REVIEW_CREATED_EVENT_TYPE, ReviewCommentEdited, ReviewCreated,
    ReviewDeleted, ReviewEvent, ReviewNameUpdated, ReviewRatingUpdated,
};
use super::values::{BookId, Comment, Rating, ReviewId, ReviewerName};

/// Folded state of a review.
#[derive(Debug, Clone)]
struct ReviewState {
    review_id: ReviewId,
    book_id: BookId,
    name: ReviewerName,
    rating: Rating,
    comment: Option<Comment>,
    deleted: bool,
}

/// Folds one event into the state accumulated so far.
///
/// `None` stands for "no history yet", so the first event must be `Created`.
/// A deleted review is terminal: any later event is absorbed without field
/// changes, which keeps replay total over every history the write side can
/// produce. Field values are re-validated through the value object
/// constructors, so a fold only succeeds on data a live aggregate would have
/// accepted.
fn apply(state: Option<ReviewState>, event: &ReviewEvent) -> Result<ReviewState, DomainError> {
    match (state, event) {
        (None, ReviewEvent::Created(body)) => Ok(ReviewState {
            review_id: ReviewId::from_uuid(body.review_id),
            book_id: BookId::new(body.book_id.clone())?,
            name: ReviewerName::new(body.name.clone())?,
            rating: Rating::new(body.rating)?,
            comment: body.comment.clone().map(Comment::new).transpose()?,
            deleted: false,
        }),
        (None, other) => Err(DomainError::MalformedEvent(format!(
            "history must start with {REVIEW_CREATED_EVENT_TYPE}, got {}",
            other.event_type()
        ))),
        (Some(state), _) if state.deleted => Ok(state),
        (Some(_), ReviewEvent::Created(_)) => Err(DomainError::MalformedEvent(
            "duplicate Created event".to_string(),
        )),
        (Some(mut state), ReviewEvent::NameUpdated(body)) => {
            state.name = ReviewerName::new(body.name.clone())?;
            Ok(state)
        }
        (Some(mut state), ReviewEvent::RatingUpdated(body)) => {
            state.rating = Rating::new(body.rating)?;
            Ok(state)
        }
        (Some(mut state), ReviewEvent::CommentEdited(body)) => {
            if let Some(comment) = &body.comment {
                state.comment = Some(Comment::new(comment.clone())?);
            }
            Ok(state)
        }
        (Some(mut state), ReviewEvent::Deleted(_)) => {
            state.deleted = true;
            Ok(state)
        }
    }
}

fn recommendation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            "[『「]([^』」]+)[』」][^。]{0,30}(?:読む|読んだ|学ぶ|学んだ|必要|推奨|おすすめ|良い|いい|理解)",
        )
        .expect("recommendation pattern is a valid constant regex")
    })
}

/// A book review.
///
/// State changes go through the event log: every mutation records an event
/// in the uncommitted buffer and folds it into the current state with the
/// same function replay uses. A live instance and one reconstructed from
/// its stored history are therefore indistinguishable.
#[derive(Debug)]
pub struct Review {
    state: ReviewState,
    uncommitted: UncommittedEvents,
}

impl Review {
    /// Creates a review, recording its `Created` event.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if the event body built from the
    /// given values fails validation on fold.
    pub fn create(
        book_id: BookId,
        name: ReviewerName,
        rating: Rating,
        comment: Option<Comment>,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let review_id = ReviewId::new();
        let event = ReviewEvent::Created(ReviewCreated {
            review_id: review_id.as_uuid(),
            book_id: book_id.as_str().to_string(),
            name: name.as_str().to_string(),
            rating: rating.value(),
            comment: comment.as_ref().map(|c| c.as_str().to_string()),
        });
        let state = apply(None, &event)?;
        let mut review = Self {
            state,
            uncommitted: UncommittedEvents::new(),
        };
        review.record(event, clock);
        Ok(review)
    }

    /// Replaces the reviewer's name.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if the review is deleted.
    pub fn update_name(
        &mut self,
        name: ReviewerName,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_not_deleted()?;
        self.apply_and_record(
            ReviewEvent::NameUpdated(ReviewNameUpdated {
                name: name.as_str().to_string(),
            }),
            clock,
        )
    }

    /// Replaces the star rating.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if the review is deleted.
    pub fn update_rating(&mut self, rating: Rating, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_not_deleted()?;
        self.apply_and_record(
            ReviewEvent::RatingUpdated(ReviewRatingUpdated {
                rating: rating.value(),
            }),
            clock,
        )
    }

    /// Replaces the comment text.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if the review is deleted.
    pub fn edit_comment(&mut self, comment: Comment, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_not_deleted()?;
        self.apply_and_record(
            ReviewEvent::CommentEdited(ReviewCommentEdited {
                comment: Some(comment.as_str().to_string()),
            }),
            clock,
        )
    }

    /// Marks the review deleted. Deleting twice is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if the review is already deleted.
    pub fn delete(&mut self, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_not_deleted()?;
        self.apply_and_record(ReviewEvent::Deleted(ReviewDeleted {}), clock)
    }

    /// Returns the review identifier.
    #[must_use]
    pub fn review_id(&self) -> ReviewId {
        self.state.review_id
    }

    /// Returns the reviewed book's identifier.
    #[must_use]
    pub fn book_id(&self) -> &BookId {
        &self.state.book_id
    }

    /// Returns the reviewer's name.
    #[must_use]
    pub fn name(&self) -> &ReviewerName {
        &self.state.name
    }

    /// Returns the star rating.
    #[must_use]
    pub fn rating(&self) -> Rating {
        self.state.rating
    }

    /// Returns the comment, if one exists.
    #[must_use]
    pub fn comment(&self) -> Option<&Comment> {
        self.state.comment.as_ref()
    }

    /// Returns `true` once the review has been deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.state.deleted
    }

    /// Whether the review clears `threshold` on combined quality.
    ///
    /// Without a comment the rating quality alone is compared. With one,
    /// the rating counts for 70% and the comment for 30%.
    #[must_use]
    pub fn is_trustworthy(&self, threshold: f64) -> bool {
        let rating_quality = self.state.rating.quality_factor();
        match &self.state.comment {
            None => rating_quality >= threshold,
            Some(comment) => rating_quality * 0.7 + comment.quality_factor() * 0.3 >= threshold,
        }
    }

    /// Extracts book titles the comment recommends.
    ///
    /// A title counts when it is quoted in 『』 or 「」 and followed within
    /// 30 characters, without crossing a 。 sentence boundary, by a
    /// recommendation phrase. Titles are deduplicated in first-occurrence
    /// order.
    #[must_use]
    pub fn recommended_books(&self) -> Vec<String> {
        let Some(comment) = &self.state.comment else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut titles = Vec::new();
        for captures in recommendation_pattern().captures_iter(comment.as_str()) {
            if let Some(title) = captures.get(1) {
                let title = title.as_str().to_string();
                if seen.insert(title.clone()) {
                    titles.push(title);
                }
            }
        }
        titles
    }

    fn apply_and_record(&mut self, event: ReviewEvent, clock: &dyn Clock) -> Result<(), DomainError> {
        let next = apply(Some(self.state.clone()), &event)?;
        self.state = next;
        self.record(event, clock);
        Ok(())
    }

    fn record(&mut self, event: ReviewEvent, clock: &dyn Clock) {
        let domain_event = event.into_domain_event(self.state.review_id.as_uuid(), clock);
        self.uncommitted.record(domain_event);
    }

    fn ensure_not_deleted(&self) -> Result<(), DomainError> {
        if self.state.deleted {
            return Err(DomainError::Validation(
                "cannot modify a deleted review".to_string(),
            ));
        }
        Ok(())
    }
}

impl Aggregate for Review {
    const AGGREGATE_TYPE: &'static str = REVIEW_AGGREGATE_TYPE;

    fn aggregate_id(&self) -> Uuid {
        self.state.review_id.as_uuid()
    }

    fn uncommitted_events(&self) -> &[DomainEvent] {
        self.uncommitted.as_slice()
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted.clear();
    }

    fn reconstruct(history: Vec<DomainEvent>) -> Result<Self, DomainError> {
        let (first, rest) = history.split_first().ok_or(DomainError::EmptyHistory)?;
        let mut state = apply(None, &ReviewEvent::try_from_domain(first)?)?;
        for event in rest {
            state = apply(Some(state), &ReviewEvent::try_from_domain(event)?)?;
        }
        Ok(Self {
            state,
            uncommitted: UncommittedEvents::new(),
        })
    }
}
