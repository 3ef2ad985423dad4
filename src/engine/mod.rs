//! Discovery engine: the filter pipeline over the event collection.
//!
//! Pure synchronous computation, no suspension points. [`FilterEngine`]
//! runs the ordered predicate stages from [`stages`], the stable date
//! sort, and the post-sort geo gate.

pub mod filter;
pub mod stages;

pub use filter::FilterEngine;
