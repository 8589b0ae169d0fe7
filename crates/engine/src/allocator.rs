//! Per-expense share allocation.
//!
//! Given one expense, computes the monetary obligation of every participant.
//! Currency rounding to 2 decimals is lossy, so every method reconciles the
//! sum explicitly instead of relying on floating-point exactness: the
//! rounding remainder goes to the first participant in declared order (for
//! `shares`, the first participant with a positive share). If the sum is
//! still off afterwards, one last nudge goes to the payer; past that the
//! allocator reports a defect in itself.

use std::collections::BTreeMap;

use crate::{
    EngineError, ResultEngine,
    expenses::{Expense, Participant, SplitMethod},
    rounding::{SUM_TOLERANCE, round2},
};

/// Obligations for one expense, keyed by participant name.
///
/// Duplicate participant names merge additively, so the sum invariant holds
/// regardless of how the list was written.
pub type ObligationMap = BTreeMap<String, f64>;

/// Computes each participant's obligation for `expense`.
///
/// The returned map sums to `expense.amount` within `1e-5`; failing that is
/// an [`EngineError::Invariant`], never a silently "close enough" result.
pub fn allocate(expense: &Expense) -> ResultEngine<ObligationMap> {
    if expense.amount <= 0.0 {
        return Err(EngineError::Validation("amount must be > 0".to_string()));
    }
    if expense.participants.is_empty() {
        return Err(EngineError::Validation(
            "cannot split among zero participants".to_string(),
        ));
    }

    let mut obligations = match expense.split_method {
        SplitMethod::Equal => split_equal(expense.amount, &expense.participants),
        SplitMethod::Exact => split_exact(&expense.participants)?,
        SplitMethod::Percentage => split_percentage(expense.amount, &expense.participants)?,
        SplitMethod::Shares => split_shares(expense.amount, &expense.participants)?,
    };

    let total: f64 = obligations.values().sum();
    if (total - expense.amount).abs() > SUM_TOLERANCE {
        // Second-stage reconciliation: nudge the payer, if they take part.
        if let Some(obligation) = obligations.get_mut(&expense.paid_by) {
            let diff = round2(expense.amount - total);
            *obligation = round2(*obligation + diff);
        }
        let total: f64 = obligations.values().sum();
        if (total - expense.amount).abs() > SUM_TOLERANCE {
            return Err(EngineError::Invariant(format!(
                "allocated shares sum to {total} instead of {}",
                expense.amount
            )));
        }
    }

    Ok(obligations)
}

fn split_equal(amount: f64, participants: &[Participant]) -> ObligationMap {
    let base = round2(amount / participants.len() as f64);
    let remainder = round2(amount - base * participants.len() as f64);

    let mut obligations = ObligationMap::new();
    for participant in participants {
        *obligations.entry(participant.name.clone()).or_default() += base;
    }
    add_to(&mut obligations, &participants[0].name, remainder);
    obligations
}

fn split_exact(participants: &[Participant]) -> ResultEngine<ObligationMap> {
    let mut obligations = ObligationMap::new();
    for participant in participants {
        let share = required_share(participant, "exact")?;
        *obligations.entry(participant.name.clone()).or_default() += round2(share);
    }
    Ok(obligations)
}

fn split_percentage(amount: f64, participants: &[Participant]) -> ResultEngine<ObligationMap> {
    let mut obligations = ObligationMap::new();
    let mut allocated = 0.0;
    for participant in participants {
        let share = required_share(participant, "percentage")?;
        if share <= 0.0 {
            return Err(EngineError::Validation(format!(
                "percentage for \"{}\" must be positive",
                participant.name
            )));
        }
        let obligation = round2(amount * share / 100.0);
        *obligations.entry(participant.name.clone()).or_default() += obligation;
        allocated += obligation;
    }
    add_to(&mut obligations, &participants[0].name, round2(amount - allocated));
    Ok(obligations)
}

fn split_shares(amount: f64, participants: &[Participant]) -> ResultEngine<ObligationMap> {
    let mut total_units = 0.0;
    for participant in participants {
        let units = required_share(participant, "shares")?;
        if units < 0.0 {
            return Err(EngineError::Validation(format!(
                "share units for \"{}\" must not be negative",
                participant.name
            )));
        }
        total_units += units;
    }
    if total_units == 0.0 {
        return Err(EngineError::Validation(
            "total share units cannot be zero".to_string(),
        ));
    }

    let mut obligations = ObligationMap::new();
    let mut allocated = 0.0;
    for participant in participants {
        let units = required_share(participant, "shares")?;
        let obligation = round2(amount * units / total_units);
        *obligations.entry(participant.name.clone()).or_default() += obligation;
        allocated += obligation;
    }

    // The remainder goes to the first participant holding positive units;
    // validation guarantees one exists, but fall back to the list head.
    let receiver = participants
        .iter()
        .find(|p| p.share.is_some_and(|s| s > 0.0))
        .unwrap_or(&participants[0]);
    add_to(&mut obligations, &receiver.name, round2(amount - allocated));
    Ok(obligations)
}

fn required_share(participant: &Participant, method: &str) -> ResultEngine<f64> {
    participant.share.ok_or_else(|| {
        EngineError::Validation(format!(
            "{method} share not provided for participant \"{}\"",
            participant.name
        ))
    })
}

fn add_to(obligations: &mut ObligationMap, name: &str, diff: f64) {
    if diff != 0.0 {
        let entry = obligations.entry(name.to_string()).or_default();
        *entry = round2(*entry + diff);
    }
}
