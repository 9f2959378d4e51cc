use crate::{common::money::Money, store::StorageError};

/// The message shown for failures the user cannot fix by editing their input.
pub const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("failed to read or write a file: {0}")]
    OpenInput(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("process error: {0}")]
    Process(String),

    /// Malformed or missing user input.
    #[error("invalid input: {0}")]
    Validation(String),
    /// A transfer or withdrawal asked for more than the source holds.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Money, available: Money },
    /// A box, transaction, event or photo id that does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A box still holding money cannot be deleted.
    #[error("box {id} still holds {balance}")]
    NonZeroBalance { id: String, balance: Money },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// Credentials were rejected or no user is signed in.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Whether the error is resolved by the user changing their request.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::OpenInput(_)
                | AppError::Csv(_)
                | AppError::Parse(_)
                | AppError::Validation(_)
                | AppError::InsufficientFunds { .. }
                | AppError::NotFound(_)
                | AppError::NonZeroBalance { .. }
        )
    }

    /// The blocking message for the person who triggered the action.
    ///
    /// Storage and auth failures are logged here and replaced with a generic
    /// retry prompt.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InsufficientFunds { .. } => {
                format!("You do not have enough balance. ({self})")
            }
            AppError::NonZeroBalance { balance, .. } => format!(
                "This box still holds {balance}. Withdraw the money or close the box instead."
            ),
            AppError::Auth(_) => {
                tracing::error!("{self}");
                "Could not authenticate. Check your email and password and try again.".to_owned()
            }
            error if error.is_user_facing() => error.to_string(),
            error => {
                tracing::error!("an unexpected error occurred: {error}");
                RETRY_MESSAGE.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_and_funds_errors_are_user_facing() {
        assert!(AppError::validation("amount must be positive").is_user_facing());
        assert!(
            AppError::InsufficientFunds {
                requested: Money::new(150_000),
                available: Money::new(140_600),
            }
            .is_user_facing()
        );
        assert!(AppError::NotFound("box 1".into()).is_user_facing());
    }

    #[test]
    fn storage_errors_get_the_generic_retry_message() {
        let error = AppError::Storage(StorageError::Conflict {
            key: "balance".into(),
        });

        assert!(!error.is_user_facing());
        assert_eq!(error.user_message(), RETRY_MESSAGE);
    }

    #[test]
    fn insufficient_funds_message_mentions_both_amounts() {
        let error = AppError::InsufficientFunds {
            requested: Money::new(150_000),
            available: Money::new(140_600),
        };

        let message = error.user_message();
        assert!(message.contains("1500.00"));
        assert!(message.contains("1406.00"));
    }

    #[test]
    fn auth_errors_do_not_leak_details() {
        let error = AppError::Auth("wrong password for a@b.c".into());

        assert!(!error.user_message().contains("a@b.c"));
    }
}
