use time::OffsetDateTime;

use crate::{
    common::{error::AppError, money::Money},
    domain::{
        ledger::Ledger,
        transaction::{TxSource, TxType},
    },
    worker::handlers::{BoxMovement, credit, debit, find_box, record, require_positive},
};

/// Move `amount` from the main balance into a box.
pub fn handle(
    ledger: &mut Ledger,
    now: OffsetDateTime,
    target: &str,
    amount: Money,
) -> Result<BoxMovement, AppError> {
    let amount = require_positive(amount)?;
    let index = find_box(ledger, target)?;

    let main_balance = debit(ledger.balance, amount)?;
    let box_balance = credit(ledger.boxes[index].balance, amount)?;

    ledger.balance = main_balance;
    ledger.boxes[index].balance = box_balance;
    let name = ledger.boxes[index].name.clone();

    let transaction = record(
        ledger,
        now,
        amount,
        TxType::Subtract,
        TxSource::Caixa,
        Some(name),
    );

    Ok(BoxMovement {
        savings_box: ledger.boxes[index].clone(),
        transaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::savings_box::SavingsBox,
        worker::handlers::test_utils::{money, now},
    };

    fn ledger_with_trip(main: &str) -> Ledger {
        let mut ledger = Ledger::with_balance(money(main));
        ledger
            .boxes
            .push(SavingsBox::new("1".into(), "Trip".into()));
        ledger
    }

    #[test]
    fn funding_moves_money_out_of_the_main_balance() {
        let mut ledger = ledger_with_trip("1000");

        let movement = handle(&mut ledger, now(), "1", money("200.00")).unwrap();

        assert_eq!(ledger.balance(), money("800"));
        assert_eq!(movement.savings_box.balance, money("200.00"));
        assert_eq!(movement.transaction.tx_type, TxType::Subtract);
        assert_eq!(movement.transaction.source, TxSource::Caixa);
        assert_eq!(movement.transaction.description.as_deref(), Some("Trip"));
        assert_eq!(ledger.total_funds(), money("1000"));
    }

    #[test]
    fn funding_by_name_works() {
        let mut ledger = ledger_with_trip("10");

        handle(&mut ledger, now(), "Trip", money("10")).unwrap();

        assert_eq!(ledger.boxes()[0].balance, money("10"));
    }

    #[test]
    fn funding_more_than_the_main_balance_fails() {
        let mut ledger = ledger_with_trip("50");

        let result = handle(&mut ledger, now(), "1", money("50.01"));

        assert!(matches!(result, Err(AppError::InsufficientFunds { .. })));
        assert_eq!(ledger.balance(), money("50"));
        assert!(ledger.boxes()[0].is_empty());
        assert!(ledger.txs.is_empty());
    }

    #[test]
    fn funding_an_unknown_box_fails() {
        let mut ledger = ledger_with_trip("50");

        let result = handle(&mut ledger, now(), "Car", money("5"));

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(ledger.balance(), money("50"));
    }
}
