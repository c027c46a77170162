//! Per-currency totals of a child's kafalas.
//!
//! Amounts are summed per currency in a single pass; amounts in different
//! currencies are never added together. The summary is a pure function of the
//! input and is recomputed on every read.

use rust_decimal::Decimal;
use shared::{Currency, KafalaSummary};

use super::models::Kafala;

/// Sum kafala amounts grouped by currency. Totals saturate at
/// `Decimal::MAX` instead of overflowing.
pub fn summarize<'a, I>(kafalas: I) -> KafalaSummary
where
    I: IntoIterator<Item = &'a Kafala>,
{
    let mut ils = Decimal::ZERO;
    let mut usd = Decimal::ZERO;
    let mut jod = Decimal::ZERO;
    let mut count = 0;

    for kafala in kafalas {
        let running = match kafala.currency {
            Currency::ILS => &mut ils,
            Currency::USD => &mut usd,
            Currency::JOD => &mut jod,
        };
        *running = running.saturating_add(kafala.amount);
        count += 1;
    }

    KafalaSummary {
        totals: [(Currency::ILS, ils), (Currency::USD, usd), (Currency::JOD, jod)]
            .into_iter()
            .collect(),
        count,
    }
}

/// Plain sum of all amounts regardless of currency.
///
/// Only used to check that [`summarize`] accounts for every record.
pub fn sum_amounts<'a, I>(kafalas: I) -> Decimal
where
    I: IntoIterator<Item = &'a Kafala>,
{
    kafalas
        .into_iter()
        .fold(Decimal::ZERO, |acc, k| acc.saturating_add(k.amount))
}
