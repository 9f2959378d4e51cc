use serde::{Deserialize, Serialize};

use crate::common::money::Money;

/// One entry of the wallet history. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: Money,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    #[serde(default)]
    pub source: TxSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    /// Money received into the main balance.
    Deposit,
    /// Main balance moved into a box.
    Subtract,
    /// Money sent out of the main balance.
    Transfer,
    /// Box money moved back into the main balance.
    Add,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxSource {
    #[default]
    None,
    Caixa,
}

impl TxType {
    pub fn is_credit(&self) -> bool {
        matches!(self, TxType::Deposit | TxType::Add)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Deposit => "deposit",
            TxType::Subtract => "subtract",
            TxType::Transfer => "transfer",
            TxType::Add => "add",
        }
    }
}

impl TxSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxSource::None => "none",
            TxSource::Caixa => "caixa",
        }
    }
}

impl Transaction {
    pub fn new(
        id: String,
        amount: Money,
        tx_type: TxType,
        source: TxSource,
        description: Option<String>,
        date: String,
    ) -> Self {
        Self {
            id,
            amount,
            tx_type,
            source,
            description,
            date,
        }
    }

    /// The amount with the sign of its effect on the main balance.
    pub fn signed_amount(&self) -> Money {
        if self.tx_type.is_credit() {
            self.amount
        } else {
            Money::zero() - self.amount
        }
    }
}
