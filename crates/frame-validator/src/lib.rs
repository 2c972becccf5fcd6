//! Frame Validation
//!
//! Decides which assembled frames are trustworthy enough to publish.

mod error;
mod validator;

pub use error::RejectReason;
pub use validator::{FrameValidator, ValidationConfig, DEFAULT_COORDINATE_LIMIT};
