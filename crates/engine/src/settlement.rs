//! Balance accumulation and debt settlement planning.
//!
//! Balances are a pure fold over the expense history: the payer is credited
//! the full amount, every participant is debited their obligation. The
//! planner then matches the largest debtor against the largest creditor
//! greedily. That does not guarantee the theoretical minimum number of
//! transactions (NP-hard in general), but it zeroes all balances in at most
//! `debtors + creditors - 1` payments, which is plenty for real group sizes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    ResultEngine,
    allocator::allocate,
    expenses::Expense,
    rounding::{EPSILON, round2},
};

/// Net position per person across all expenses.
///
/// Positive means the group owes them money, negative means they owe the
/// group. Values are rounded to 2 decimals.
pub type Balance = BTreeMap<String, f64>;

/// A suggested payment from `payer` to `receiver`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementTransaction {
    pub payer: String,
    pub receiver: String,
    pub amount: f64,
}

/// Folds the expense history into net balances.
///
/// Accumulation is commutative, so the order of `expenses` does not matter.
pub fn compute_balances(expenses: &[Expense]) -> ResultEngine<Balance> {
    let mut balances = expenses.iter().try_fold(Balance::new(), |mut acc, expense| -> ResultEngine<Balance> {
        let obligations = allocate(expense)?;
        *acc.entry(expense.paid_by.clone()).or_default() += expense.amount;
        for (name, obligation) in obligations {
            *acc.entry(name).or_default() -= obligation;
        }
        Ok(acc)
    })?;

    for balance in balances.values_mut() {
        *balance = round2(*balance);
    }
    Ok(balances)
}

/// Plans payments that zero out `balances`.
///
/// People with equal amounts are ordered by name (the `Balance` map iterates
/// alphabetically and the sort is stable), so the output is reproducible.
/// Already-settled input yields an empty list.
pub fn plan_settlements(balances: &Balance) -> Vec<SettlementTransaction> {
    let mut debtors: Vec<(&str, f64)> = Vec::new();
    let mut creditors: Vec<(&str, f64)> = Vec::new();
    for (name, balance) in balances {
        if *balance < -EPSILON {
            debtors.push((name, -balance));
        } else if *balance > EPSILON {
            creditors.push((name, *balance));
        }
    }
    debtors.sort_by(|a, b| b.1.total_cmp(&a.1));
    creditors.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut settlements = Vec::new();
    let mut debtor_idx = 0;
    let mut creditor_idx = 0;

    while debtor_idx < debtors.len() && creditor_idx < creditors.len() {
        let (debtor, owed) = debtors[debtor_idx];
        let (creditor, due) = creditors[creditor_idx];
        let payment = owed.min(due);

        if payment > EPSILON {
            settlements.push(SettlementTransaction {
                payer: debtor.to_string(),
                receiver: creditor.to_string(),
                amount: round2(payment),
            });
            debtors[debtor_idx].1 = owed - payment;
            creditors[creditor_idx].1 = due - payment;
        }

        if debtors[debtor_idx].1 <= EPSILON {
            debtor_idx += 1;
        }
        if creditors[creditor_idx].1 <= EPSILON {
            creditor_idx += 1;
        }
    }

    settlements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expenses::{Participant, SplitMethod};
    use chrono::Utc;
    use uuid::Uuid;

    fn expense(
        amount: f64,
        paid_by: &str,
        method: SplitMethod,
        participants: &[(&str, Option<f64>)],
    ) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            amount,
            description: "test".to_string(),
            paid_by: paid_by.to_string(),
            split_method: method,
            participants: participants
                .iter()
                .map(|(name, share)| Participant {
                    name: name.to_string(),
                    share: *share,
                })
                .collect(),
            date: Utc::now(),
        }
    }

    fn balance(entries: &[(&str, f64)]) -> Balance {
        entries
            .iter()
            .map(|(name, amount)| (name.to_string(), *amount))
            .collect()
    }

    /// Replays settlements on top of balances; everyone must end at ~0.
    fn assert_settles(balances: &Balance, settlements: &[SettlementTransaction]) {
        let mut replay = balances.clone();
        for tx in settlements {
            assert!(tx.amount > EPSILON);
            *replay.entry(tx.payer.clone()).or_default() += tx.amount;
            *replay.entry(tx.receiver.clone()).or_default() -= tx.amount;
        }
        for (name, residual) in replay {
            assert!(
                residual.abs() < 1e-5,
                "{name} left with residual balance {residual}"
            );
        }
    }

    #[test]
    fn balances_sum_to_zero() {
        let expenses = vec![
            expense(
                60.0,
                "Alice",
                SplitMethod::Equal,
                &[("Alice", None), ("Bob", None), ("Carol", None)],
            ),
            expense(
                30.0,
                "Bob",
                SplitMethod::Exact,
                &[
                    ("Alice", Some(10.0)),
                    ("Bob", Some(10.0)),
                    ("Carol", Some(10.0)),
                ],
            ),
        ];
        let balances = compute_balances(&expenses).unwrap();
        let total: f64 = balances.values().sum();
        assert!(total.abs() < 1e-5);
    }

    #[test]
    fn single_expense_balances() {
        let expenses = vec![expense(
            60.0,
            "Alice",
            SplitMethod::Equal,
            &[("Alice", None), ("Bob", None), ("Carol", None)],
        )];
        let balances = compute_balances(&expenses).unwrap();
        assert_eq!(balances["Alice"], 40.0);
        assert_eq!(balances["Bob"], -20.0);
        assert_eq!(balances["Carol"], -20.0);
    }

    #[test]
    fn no_expenses_no_balances() {
        assert!(compute_balances(&[]).unwrap().is_empty());
    }

    #[test]
    fn settled_balances_need_no_transactions() {
        let balances = balance(&[("Alice", 0.0), ("Bob", 0.0)]);
        assert!(plan_settlements(&balances).is_empty());
    }

    #[test]
    fn single_debt_is_paid_directly() {
        let balances = balance(&[("Alice", 25.0), ("Bob", -25.0)]);
        let settlements = plan_settlements(&balances);
        assert_eq!(
            settlements,
            vec![SettlementTransaction {
                payer: "Bob".to_string(),
                receiver: "Alice".to_string(),
                amount: 25.0,
            }]
        );
    }

    #[test]
    fn largest_debtor_pays_largest_creditor_first() {
        let balances = balance(&[
            ("Alice", 50.0),
            ("Bob", 10.0),
            ("Carol", -40.0),
            ("Dave", -20.0),
        ]);
        let settlements = plan_settlements(&balances);
        assert_eq!(settlements.len(), 3);
        assert_eq!(settlements[0].payer, "Carol");
        assert_eq!(settlements[0].receiver, "Alice");
        assert_eq!(settlements[0].amount, 40.0);
        assert_settles(&balances, &settlements);
    }

    #[test]
    fn equal_amounts_break_ties_by_name() {
        let balances = balance(&[("Zoe", -10.0), ("Ann", -10.0), ("Max", 20.0)]);
        let settlements = plan_settlements(&balances);
        assert_eq!(settlements[0].payer, "Ann");
        assert_eq!(settlements[1].payer, "Zoe");
        assert_settles(&balances, &settlements);
    }

    #[test]
    fn transaction_total_matches_outstanding_debt() {
        let balances = balance(&[
            ("Alice", 12.5),
            ("Bob", 7.5),
            ("Carol", -11.0),
            ("Dave", -9.0),
        ]);
        let settlements = plan_settlements(&balances);
        let paid: f64 = settlements.iter().map(|tx| tx.amount).sum();
        assert!((paid - 20.0).abs() < 1e-5);
        assert_settles(&balances, &settlements);
    }

    #[test]
    fn end_to_end_three_expense_scenario() {
        let expenses = vec![
            expense(
                60.0,
                "Alice",
                SplitMethod::Equal,
                &[("Alice", None), ("Bob", None), ("Carol", None)],
            ),
            expense(
                30.0,
                "Bob",
                SplitMethod::Exact,
                &[
                    ("Alice", Some(10.0)),
                    ("Bob", Some(10.0)),
                    ("Carol", Some(10.0)),
                ],
            ),
            expense(
                15.0,
                "Carol",
                SplitMethod::Percentage,
                &[
                    ("Alice", Some(50.0)),
                    ("Bob", Some(30.0)),
                    ("Carol", Some(20.0)),
                ],
            ),
        ];

        let balances = compute_balances(&expenses).unwrap();
        assert_eq!(balances["Alice"], 22.5);
        assert_eq!(balances["Bob"], -4.5);
        assert_eq!(balances["Carol"], -18.0);

        let settlements = plan_settlements(&balances);
        assert_eq!(
            settlements,
            vec![
                SettlementTransaction {
                    payer: "Carol".to_string(),
                    receiver: "Alice".to_string(),
                    amount: 18.0,
                },
                SettlementTransaction {
                    payer: "Bob".to_string(),
                    receiver: "Alice".to_string(),
                    amount: 4.5,
                },
            ]
        );
        assert_settles(&balances, &settlements);
    }
}
