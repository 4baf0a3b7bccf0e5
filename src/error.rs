//! Error taxonomy for the controller.
//!
//! Every error is handled at the action boundary that produced it; nothing
//! propagates to a global handler or crashes the page.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UiError {
    /// CSRF token absent from the document. The request is never sent.
    #[error("csrf token is missing from the document")]
    MissingCsrfToken,

    /// The triggering element lacks a required identifying attribute.
    #[error("element is missing the {0} attribute")]
    MissingAttribute(&'static str),

    /// Non-success HTTP status.
    #[error("request failed with status {0}")]
    Status(u16),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The document is not available.
    #[error("document is not available")]
    NoDocument,
}

impl From<gloo_net::Error> for UiError {
    fn from(err: gloo_net::Error) -> Self {
        UiError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_the_status() {
        assert_eq!(UiError::Status(403).to_string(), "request failed with status 403");
    }

    #[test]
    fn missing_attribute_names_the_attribute() {
        assert_eq!(
            UiError::MissingAttribute("data-task-id").to_string(),
            "element is missing the data-task-id attribute"
        );
    }
}
