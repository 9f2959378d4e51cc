use serde::{Deserialize, Serialize};

use crate::common::money::Money;

/// A named sub-balance ("caixinha") carved out of the main balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsBox {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub balance: Money,
}

impl SavingsBox {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            balance: Money::zero(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.balance.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_defaults_to_zero_when_absent() {
        let json = r#"{"name":"Viagem","id":"1729350000000"}"#;

        let savings_box: SavingsBox = serde_json::from_str(json).unwrap();

        assert_eq!(savings_box.balance, Money::zero());
        assert!(savings_box.is_empty());
    }
}
