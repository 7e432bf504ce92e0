//! Domain services for the review workflow.
//!
//! Services contain business logic that operates on domain models. Each takes
//! its store handles at construction and the acting user on every call.

pub mod assignment;
pub mod authorization;
pub mod listing;
pub mod notification;
pub mod payment;
pub mod transition;

#[cfg(test)]
mod testing;

pub use assignment::{AssignmentResolver, ClaimOutcome, OpenedRequest};
pub use authorization::{can_mutate, can_read, check_mutate, check_read, listing_scope};
pub use listing::RequestQueries;
pub use notification::{
    MockNotificationService, NotificationResult, NotificationService, NotificationType,
    RequestDecidedPayload,
};
pub use payment::{payment_required, PaymentCoupling};
pub use transition::{validate_transition, StatusTransitionEngine};
