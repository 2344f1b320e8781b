use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Sign-in was cancelled")]
    SignInCancelled,

    #[error("Sign-in failed: {0}")]
    SignInFailed(String),

    #[error("Network error occurred during sign-in")]
    NetworkError,

    #[error("No network connection. Check your connection and try again")]
    NoNetwork,

    #[error("Invalid sign-in credentials")]
    InvalidCredentials,

    #[error("Sign-in is not configured: set auth.client_id in the config file")]
    ConfigurationError,

    #[error("Unknown error occurred during sign-in")]
    Unknown,
}
