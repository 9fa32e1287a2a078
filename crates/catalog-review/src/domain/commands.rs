//! Commands accepted by the review application services.

use uuid::Uuid;

/// Command to add a new review.
#[derive(Debug, Clone)]
pub struct AddReview {
    /// The reviewed book's identifier.
    pub book_id: String,
    /// The reviewer's display name.
    pub name: String,
    /// The star rating.
    pub rating: u8,
    /// The comment text, if any.
    pub comment: Option<String>,
}

/// Command to edit an existing review. Fields left as `None` are unchanged.
#[derive(Debug, Clone)]
pub struct EditReview {
    /// The review to edit.
    pub review_id: Uuid,
    /// The replacement reviewer name, if any.
    pub name: Option<String>,
    /// The replacement star rating, if any.
    pub rating: Option<u8>,
    /// The replacement comment text, if any.
    pub comment: Option<String>,
}

/// Command to delete a review.
#[derive(Debug, Clone)]
pub struct DeleteReview {
    /// The review to delete.
    pub review_id: Uuid,
}
