use crate::common::money::Money;

/// A wallet mutation sent from a caller (CLI, script reader) to the processor.
///
/// Box targets hold either a box id or, failing that, an exact box name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCommand {
    Deposit { amount: Money, description: String },
    Transfer { amount: Money, description: String },
    DeleteTransactions { ids: Vec<String> },
    CreateBox { name: String },
    FundBox { target: String, amount: Money },
    WithdrawFromBox { target: String, amount: Money },
    DeleteBox { target: String },
    CloseBox { target: String },
}
