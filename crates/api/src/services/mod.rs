//! Infrastructure services wired into the domain.

pub mod notification;

pub use notification::LogNotificationService;
