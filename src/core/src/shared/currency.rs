use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyValue {
    pub amount: f64,
    pub currency: Currency,
}

impl CurrencyValue {
    pub fn new(amount: f64, currency: Currency) -> Self {
        CurrencyValue { amount, currency }
    }

    pub fn zero() -> Self {
        CurrencyValue::new(0.0, Currency::Usd)
    }
}

impl AddAssign<f64> for CurrencyValue {
    fn add_assign(&mut self, amount: f64) {
        self.amount += amount;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Usd,
}
