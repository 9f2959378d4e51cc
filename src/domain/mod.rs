pub mod ledger;
pub mod savings_box;
pub mod transaction;
