use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Everything a view-model can fail with. `Server` and `Transport` together
/// form the network-or-server catch-all; `SessionExpired` is raised by the
/// HTTP layer for any 401 after it has already cleared the session.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("not permitted for this user")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("session expired")]
    SessionExpired,

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Text for the auto-dismissing notification shown to the user.
    pub fn toast_message(&self) -> String {
        match self {
            ClientError::Unauthenticated => "Please log in first".into(),
            ClientError::Unauthorized => "You are not allowed to do that".into(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::NotFound => "Not found".into(),
            ClientError::InvalidCredentials => "Invalid email or password".into(),
            ClientError::SessionExpired => "Session expired. Please log in again.".into(),
            ClientError::Server { .. } | ClientError::Transport(_) => {
                "Something went wrong. Please try again.".into()
            }
            ClientError::InvalidUrl(_) => "Invalid link".into(),
            ClientError::Storage(_) => "Could not save your session".into(),
        }
    }

    pub fn is_network_or_server(&self) -> bool {
        matches!(self, ClientError::Server { .. } | ClientError::Transport(_))
    }
}

/// Flattens field errors into one message, ordered by field name so the
/// same form always produces the same text.
impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");

        ClientError::Validation(message)
    }
}
