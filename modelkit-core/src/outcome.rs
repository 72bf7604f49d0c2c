//! Normalized success and error outcomes produced by resource operations.
//!
//! Every operation ends by producing exactly one [`ResourceOutcome`]; the
//! transport layer maps it to a wire response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code reported when a failure carries no usable diagnostic.
pub const UNEXPECTED_CODE: &str = "undefined";
/// Error message reported when a failure carries no usable diagnostic.
pub const UNEXPECTED_MESSAGE: &str = "Unexpected failure";

/// A machine-readable error code paired with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorBody { code: code.into(), message: message.into() }
    }

    /// The generic fallback body for failures without a usable diagnostic.
    /// Its code and message intentionally differ from each other.
    pub fn unexpected() -> Self {
        Self::new(UNEXPECTED_CODE, UNEXPECTED_MESSAGE)
    }
}

/// The single outcome every resource operation resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOutcome {
    /// Success with a body (status 200).
    Ok(Value),
    /// Resource created (status 201), body is the stored model.
    Created(Value),
    /// Success without a body (status 204).
    NoContent,
    /// Client-correctable failure (status 400).
    BadRequest(ErrorBody),
    /// Target not found (status 404).
    NotFound(ErrorBody),
}

impl ResourceOutcome {
    /// The HTTP-style status code of this outcome.
    pub fn status(&self) -> u16 {
        match self {
            ResourceOutcome::Ok(_) => 200,
            ResourceOutcome::Created(_) => 201,
            ResourceOutcome::NoContent => 204,
            ResourceOutcome::BadRequest(_) => 400,
            ResourceOutcome::NotFound(_) => 404,
        }
    }

    /// The success body, if this outcome carries one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ResourceOutcome::Ok(body) | ResourceOutcome::Created(body) => Some(body),
            _ => None,
        }
    }

    /// The error body, if this outcome is a failure.
    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            ResourceOutcome::BadRequest(error) | ResourceOutcome::NotFound(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statuses_match_outcome_variants() {
        assert_eq!(ResourceOutcome::Ok(json!({})).status(), 200);
        assert_eq!(ResourceOutcome::Created(json!({})).status(), 201);
        assert_eq!(ResourceOutcome::NoContent.status(), 204);
        assert_eq!(ResourceOutcome::BadRequest(ErrorBody::unexpected()).status(), 400);
        assert_eq!(ResourceOutcome::NotFound(ErrorBody::unexpected()).status(), 404);
    }

    #[test]
    fn unexpected_body_has_distinct_code_and_message() {
        let body = ErrorBody::unexpected();

        assert_ne!(body.code, body.message);
    }
}
