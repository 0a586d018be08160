//! Wire protocol for the CRACKTHRU API.
//!
//! This crate defines the "language" the client and the backend speak:
//!
//! - **Types** ([`UserProfile`], [`Enrollment`], [`ApiResponse`], etc.):
//!   the JSON bodies that travel over HTTP.
//! - **Endpoints** ([`endpoints`]): the API paths and the expiry code.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how bodies are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ApiResponse) → Session (user state)
//! ```

mod codec;
pub mod endpoints;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ApiResponse, CourseSummary, Credentials, EnrollRequest, Enrollment,
    EnrollmentStatus, FieldError, SignupForm, UserProfile,
};
