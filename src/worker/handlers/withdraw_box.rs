use time::OffsetDateTime;

use crate::{
    common::{error::AppError, money::Money},
    domain::{
        ledger::Ledger,
        transaction::{TxSource, TxType},
    },
    worker::handlers::{BoxMovement, credit, debit, find_box, record, require_positive},
};

/// Move `amount` out of a box back into the main balance.
pub fn handle(
    ledger: &mut Ledger,
    now: OffsetDateTime,
    target: &str,
    amount: Money,
) -> Result<BoxMovement, AppError> {
    let amount = require_positive(amount)?;
    let index = find_box(ledger, target)?;
    withdraw_at(ledger, now, index, amount)
}

pub(crate) fn withdraw_at(
    ledger: &mut Ledger,
    now: OffsetDateTime,
    index: usize,
    amount: Money,
) -> Result<BoxMovement, AppError> {
    let box_balance = debit(ledger.boxes[index].balance, amount)?;
    let main_balance = credit(ledger.balance, amount)?;

    ledger.boxes[index].balance = box_balance;
    ledger.balance = main_balance;
    let name = ledger.boxes[index].name.clone();

    let transaction = record(ledger, now, amount, TxType::Add, TxSource::Caixa, Some(name));

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
        worker::handlers::{
            fund_box,
            test_utils::{money, now},
        },
    };

    #[test]
    fn fund_then_withdraw_round_trips() {
        let mut ledger = Ledger::with_balance(money("500"));
        ledger
            .boxes
            .push(SavingsBox::new("1".into(), "Trip".into()));

        fund_box::handle(&mut ledger, now(), "1", money("100")).unwrap();
        let movement = handle(&mut ledger, now(), "1", money("100")).unwrap();

        assert_eq!(movement.savings_box.balance, Money::zero());
        assert_eq!(movement.transaction.tx_type, TxType::Add);
        assert_eq!(movement.transaction.source, TxSource::Caixa);
        assert_eq!(ledger.balance(), money("500"));
        assert_eq!(ledger.txs.len(), 2);
    }

    #[test]
    fn withdrawing_more_than_the_box_holds_fails() {
        let mut ledger = Ledger::with_balance(money("500"));
        let mut trip = SavingsBox::new("1".into(), "Trip".into());
        trip.balance = money("30");
        ledger.boxes.push(trip);

        let result = handle(&mut ledger, now(), "Trip", money("31"));

        match result {
            Err(AppError::InsufficientFunds { available, .. }) => {
                assert_eq!(available, money("30"))
            }
            other => panic!("expected insufficient funds, got {other:?}"),
        }
        assert_eq!(ledger.balance(), money("500"));
        assert_eq!(ledger.boxes()[0].balance, money("30"));
    }

    #[test]
    fn withdrawing_from_an_unknown_box_fails() {
        let mut ledger = Ledger::new();

        assert!(matches!(
            handle(&mut ledger, now(), "nope", money("1")),
            Err(AppError::NotFound(_))
        ));
    }
}
