//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod event_dto;
pub mod geo_dto;
pub mod saved_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use geo_dto::*;
pub use saved_dto::*;
