//! Expense primitives.
//!
//! An `Expense` records an amount paid by one person on behalf of a group,
//! together with the split method and the raw share inputs needed to compute
//! each participant's obligation. Obligations are never persisted; they are
//! recomputed on demand by the allocator.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, rounding::EPSILON};

/// The rule governing how an expense's amount is divided among participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    Equal,
    Exact,
    Percentage,
    Shares,
}

impl SplitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Exact => "exact",
            Self::Percentage => "percentage",
            Self::Shares => "shares",
        }
    }
}

impl TryFrom<&str> for SplitMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "exact" => Ok(Self::Exact),
            "percentage" => Ok(Self::Percentage),
            "shares" => Ok(Self::Shares),
            other => Err(EngineError::Validation(format!(
                "invalid split method: {other}"
            ))),
        }
    }
}

/// One participant of an expense with its raw share input.
///
/// The meaning of `share` depends on the split method: an exact amount, a
/// percentage, or a number of share units. It is absent for `equal`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub share: Option<f64>,
}

/// Input for creating an expense or replacing one via full-field update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: f64,
    pub description: String,
    pub paid_by: String,
    pub split_method: SplitMethod,
    pub participants: Vec<Participant>,
    pub date: Option<DateTime<Utc>>,
}

impl NewExpense {
    /// Validates the write-time invariants, before anything is persisted.
    pub fn validate(&self) -> ResultEngine<()> {
        if self.amount <= 0.0 {
            return Err(EngineError::Validation("amount must be > 0".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(EngineError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        if self.participants.is_empty() {
            return Err(EngineError::Validation(
                "participants must not be empty".to_string(),
            ));
        }
        if !self.participants.iter().any(|p| p.name == self.paid_by) {
            return Err(EngineError::Validation(format!(
                "the payer \"{}\" must be in the participants list",
                self.paid_by
            )));
        }

        match self.split_method {
            // Shares are computed, nothing to check up front.
            SplitMethod::Equal => {}
            SplitMethod::Exact => {
                let total = self.share_sum()?;
                if (total - self.amount).abs() >= EPSILON {
                    return Err(EngineError::Validation(format!(
                        "for an exact split the share sum ({total}) must equal the amount ({})",
                        self.amount
                    )));
                }
            }
            SplitMethod::Percentage => {
                let total = self.share_sum()?;
                if (total - 100.0).abs() >= EPSILON {
                    return Err(EngineError::Validation(format!(
                        "for a percentage split the shares must sum to 100, got {total}"
                    )));
                }
                for participant in &self.participants {
                    let share = participant.share.unwrap_or_default();
                    if share <= 0.0 || share > 100.0 {
                        return Err(EngineError::Validation(format!(
                            "percentage for \"{}\" must be in (0, 100]",
                            participant.name
                        )));
                    }
                }
            }
            SplitMethod::Shares => {
                for participant in &self.participants {
                    match participant.share {
                        Some(share) if share > 0.0 => {}
                        _ => {
                            return Err(EngineError::Validation(format!(
                                "share units for \"{}\" must be a positive number",
                                participant.name
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn share_sum(&self) -> ResultEngine<f64> {
        self.participants.iter().try_fold(0.0, |acc, participant| {
            let share = participant.share.ok_or_else(|| {
                EngineError::Validation(format!(
                    "{} share not provided for participant \"{}\"",
                    self.split_method.as_str(),
                    participant.name
                ))
            })?;
            Ok(acc + share)
        })
    }
}

/// A validated, persisted expense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: f64,
    pub description: String,
    pub paid_by: String,
    pub split_method: SplitMethod,
    pub participants: Vec<Participant>,
    pub date: DateTime<Utc>,
}

impl Expense {
    /// Builds an expense from validated input, assigning a fresh id and
    /// defaulting the date to now.
    pub fn new(input: NewExpense) -> ResultEngine<Self> {
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            amount: input.amount,
            description: input.description,
            paid_by: input.paid_by,
            split_method: input.split_method,
            participants: input.participants,
            date: input.date.unwrap_or_else(Utc::now),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub paid_by: String,
    pub split_method: String,
    /// Participant list serialized as JSON.
    pub participants: String,
    pub date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let participants: Vec<Participant> =
            serde_json::from_str(&model.participants).map_err(|err| {
                EngineError::Invariant(format!("stored participants are not valid JSON: {err}"))
            })?;
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::Invariant("stored expense id is not a UUID".to_string()))?;

        Ok(Self {
            id,
            amount: model.amount,
            description: model.description,
            paid_by: model.paid_by,
            split_method: SplitMethod::try_from(model.split_method.as_str())?,
            participants,
            date: model.date,
        })
    }
}

impl TryFrom<&Expense> for ActiveModel {
    type Error = EngineError;

    fn try_from(expense: &Expense) -> Result<Self, Self::Error> {
        let participants = serde_json::to_string(&expense.participants).map_err(|err| {
            EngineError::Invariant(format!("failed to serialize participants: {err}"))
        })?;

        Ok(Self {
            id: ActiveValue::Set(expense.id.to_string()),
            amount: ActiveValue::Set(expense.amount),
            description: ActiveValue::Set(expense.description.clone()),
            paid_by: ActiveValue::Set(expense.paid_by.clone()),
            split_method: ActiveValue::Set(expense.split_method.as_str().to_string()),
            participants: ActiveValue::Set(participants),
            date: ActiveValue::Set(expense.date),
        })
    }
}
