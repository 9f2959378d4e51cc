use time::OffsetDateTime;

use crate::{
    common::{clock::unix_millis, error::AppError},
    domain::{ledger::Ledger, savings_box::SavingsBox},
    worker::handlers::require_text,
};

pub fn handle(
    ledger: &mut Ledger,
    now: OffsetDateTime,
    name: &str,
) -> Result<SavingsBox, AppError> {
    let name = require_text(name, "box name")?;

    let savings_box = SavingsBox::new(ledger.fresh_id(unix_millis(now)), name);
    ledger.boxes.push(savings_box.clone());

    Ok(savings_box)
}
