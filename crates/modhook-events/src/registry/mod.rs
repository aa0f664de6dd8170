//! Subscriber storage
//!
//! - [`HandlerTable`]: one subscriber's handlers, keyed by event type
//! - [`SubscriberSet`]: insertion-ordered subscribers plus the deferred
//!   removal buffer
//!
//! Nothing in this module invokes a handler; dispatch lives in
//! [`crate::dispatcher`].

pub mod handlers;
pub mod subscribers;

pub use handlers::{ErasedHandler, HandlerResult, HandlerTable};
pub use subscribers::SubscriberSet;
