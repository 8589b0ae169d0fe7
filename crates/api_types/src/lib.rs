use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod expense {
    use super::*;

    /// The rule governing how an expense's amount is divided.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SplitMethod {
        Equal,
        Exact,
        Percentage,
        Shares,
    }

    /// A participant and its raw share input.
    ///
    /// `share` is an exact amount, a percentage or a number of share units
    /// depending on the split method; it is omitted for `equal`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ParticipantShare {
        pub name: String,
        pub share: Option<f64>,
    }

    /// Request body for creating an expense, and for replacing one via a
    /// full-field update.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub amount: f64,
        pub description: String,
        pub paid_by: String,
        pub split_method: SplitMethod,
        pub participants: Vec<ParticipantShare>,
        pub date: Option<DateTime<FixedOffset>>,
    }

    /// Query parameters for listing expenses.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub page: Option<u64>,
        pub size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub amount: f64,
        pub description: String,
        pub paid_by: String,
        pub split_method: SplitMethod,
        pub participants: Vec<ParticipantShare>,
        pub date: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub total: u64,
        pub page: u64,
        pub size: u64,
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod settlement {
    use super::*;

    /// Net position per person: positive = the group owes them money.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: BTreeMap<String, f64>,
    }

    /// A suggested payment from `payer` to `receiver`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub payer: String,
        pub receiver: String,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementsResponse {
        pub settlements: Vec<SettlementView>,
    }
}

pub mod people {
    use super::*;

    /// Distinct person names across all expenses, sorted alphabetically.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PeopleResponse {
        pub people: Vec<String>,
    }
}
