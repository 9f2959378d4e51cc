use crate::common::{error::AppError, money::Money};

/// Number of times a mutation is re-run after losing a version race.
pub const DEFAULT_COMMIT_RETRIES: u32 = 3;

/// Settings shared by every wallet operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Main balance used while no `balance` record has been written yet.
    pub opening_balance: Money,
    /// How often a conflicting commit is retried before giving up.
    pub commit_retries: u32,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            opening_balance: Money::zero(),
            commit_retries: DEFAULT_COMMIT_RETRIES,
        }
    }
}

impl WalletConfig {
    /// Fails when `opening_balance` is negative; zero is allowed.
    pub fn with_opening_balance(mut self, opening_balance: Money) -> Result<Self, AppError> {
        if opening_balance < Money::zero() {
            return Err(AppError::validation(format!(
                "opening balance must not be negative, got {opening_balance}"
            )));
        }

        self.opening_balance = opening_balance;
        Ok(self)
    }

    pub fn with_commit_retries(mut self, commit_retries: u32) -> Self {
        self.commit_retries = commit_retries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_balance_accepts_zero_and_positive_amounts() {
        let config = WalletConfig::default()
            .with_opening_balance(Money::new(135_600))
            .unwrap();
        assert_eq!(config.opening_balance, Money::new(135_600));

        let config = WalletConfig::default()
            .with_opening_balance(Money::zero())
            .unwrap();
        assert_eq!(config.opening_balance, Money::zero());
    }

    #[test]
    fn negative_opening_balance_is_rejected() {
        let result = WalletConfig::default().with_opening_balance(Money::new(-1));

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
