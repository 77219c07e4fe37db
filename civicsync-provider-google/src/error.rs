use civicsync_core::remote::protocol::ErrorKind;
use thiserror::Error;

/// The stored credentials can't be used; the user must run `civicsync auth` again.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct AuthRequired(pub String);

/// Classify a failure so civicsync can stop early on lost credentials.
pub fn error_kind(error: &anyhow::Error) -> ErrorKind {
    if error.downcast_ref::<AuthRequired>().is_some() {
        return ErrorKind::Auth;
    }

    // google-calendar surfaces HTTP errors as text
    let unauthorized = error.chain().any(|cause| {
        let text = cause.to_string();
        text.contains("401") || text.contains("invalid_grant") || text.contains("Unauthorized")
    });

    if unauthorized {
        ErrorKind::Auth
    } else {
        ErrorKind::Other
    }
}
