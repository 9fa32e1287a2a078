//! Command handlers for reviews.
//!
//! Each handler validates command fields into value objects, then runs the
//! aggregate and persists its buffered events in one atomic append.

use uuid::Uuid;

use catalog_core::clock::Clock;
use catalog_core::error::DomainError;
use catalog_core::repository::{EventStore, EventStoreRepository};

use crate::domain::aggregates::Review;
use crate::domain::commands::{AddReview, DeleteReview, EditReview};
use crate::domain::values::{BookId, Comment, Rating, ReviewerName};

/// Handles [`AddReview`]: creates the review and persists its `Created`
/// event. Returns the new review's identifier.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] when a field is invalid, or the
/// store's error when the append fails.
pub async fn handle_add_review(
    command: &AddReview,
    clock: &dyn Clock,
    repository: &dyn EventStoreRepository,
) -> Result<Uuid, DomainError> {
    let book_id = BookId::new(command.book_id.clone())?;
    let name = ReviewerName::new(command.name.clone())?;
    let rating = Rating::new(command.rating)?;
    let comment = command.comment.clone().map(Comment::new).transpose()?;

    let mut review = Review::create(book_id, name, rating, comment, clock)?;
    repository.store(&mut review).await?;

    Ok(review.review_id().as_uuid())
}

/// Handles [`EditReview`]: applies every supplied field to the review and
/// persists the resulting events as one batch. Nothing is persisted when
/// any field fails.
///
/// # Errors
///
/// Returns [`DomainError::AggregateNotFound`] when the review does not
/// exist and [`DomainError::Validation`] when a field is invalid or the
/// review is deleted.
pub async fn handle_edit_review(
    command: &EditReview,
    clock: &dyn Clock,
    repository: &dyn EventStoreRepository,
) -> Result<(), DomainError> {
    let mut review: Review = repository
        .find(command.review_id)
        .await?
        .ok_or(DomainError::AggregateNotFound(command.review_id))?;

    if let Some(name) = &command.name {
        review.update_name(ReviewerName::new(name.clone())?, clock)?;
    }
    if let Some(rating) = command.rating {
        review.update_rating(Rating::new(rating)?, clock)?;
    }
    if let Some(comment) = &command.comment {
        review.edit_comment(Comment::new(comment.clone())?, clock)?;
    }

    repository.store(&mut review).await
}

/// Handles [`DeleteReview`]: marks the review deleted and persists the
/// `Deleted` event.
///
/// # Errors
///
/// Returns [`DomainError::AggregateNotFound`] when the review does not
/// exist and [`DomainError::Validation`] when it is already deleted.
pub async fn handle_delete_review(
    command: &DeleteReview,
    clock: &dyn Clock,
    repository: &dyn EventStoreRepository,
) -> Result<(), DomainError> {
    let mut review: Review = repository
        .find(command.review_id)
        .await?
        .ok_or(DomainError::AggregateNotFound(command.review_id))?;

    review.delete(clock)?;
    repository.store(&mut review).await
}
