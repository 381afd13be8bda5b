use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One week of purchase history for a customer-item pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub customer: String,
    pub item_code: String,
    pub item_name: String,
    pub week_end_date: NaiveDate,
    pub quantity: f64,
}

impl Observation {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.customer, &self.item_code)
    }

    pub fn item_key(&self) -> ItemKey {
        ItemKey::new(&self.customer, &self.item_code, &self.item_name)
    }
}

/// Join key for buying-cycle and purchase-count tables.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub customer: String,
    pub item_code: String,
}

impl PairKey {
    pub fn new(customer: impl Into<String>, item_code: impl Into<String>) -> Self {
        Self { customer: customer.into(), item_code: item_code.into() }
    }
}

/// Join key for historical metrics, which also split on item name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub customer: String,
    pub item_code: String,
    pub item_name: String,
}

impl ItemKey {
    pub fn new(
        customer: impl Into<String>,
        item_code: impl Into<String>,
        item_name: impl Into<String>,
    ) -> Self {
        Self { customer: customer.into(), item_code: item_code.into(), item_name: item_name.into() }
    }
}
