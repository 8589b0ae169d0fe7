use std::collections::BTreeSet;

use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

pub use allocator::{ObligationMap, allocate};
pub use error::EngineError;
pub use expenses::{Expense, NewExpense, Participant, SplitMethod};
pub use rounding::{EPSILON, SUM_TOLERANCE, round2};
pub use settlement::{Balance, SettlementTransaction, compute_balances, plan_settlements};

mod allocator;
mod error;
mod expenses;
mod rounding;
mod settlement;

type ResultEngine<T> = Result<T, EngineError>;

/// The shared-expense ledger.
///
/// Holds only the database connection: obligations, balances and settlement
/// plans are recomputed per call from the full expense history, so there is
/// no cached state to keep consistent across invocations.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Validates and persists a new expense.
    pub async fn create_expense(&self, input: NewExpense) -> ResultEngine<Expense> {
        let expense = Expense::new(input)?;
        expenses::ActiveModel::try_from(&expense)?
            .insert(&self.database)
            .await?;
        tracing::debug!(id = %expense.id, "expense created");
        Ok(expense)
    }

    /// Returns one expense by id.
    pub async fn expense(&self, id: Uuid) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        Expense::try_from(model)
    }

    /// Lists expenses by date descending, newest first.
    ///
    /// `page` is 1-based. Returns the page plus the total expense count.
    pub async fn list_expenses(&self, page: u64, size: u64) -> ResultEngine<(Vec<Expense>, u64)> {
        let total = expenses::Entity::find().count(&self.database).await?;

        let models = expenses::Entity::find()
            .order_by_desc(expenses::Column::Date)
            .offset(page.saturating_sub(1) * size)
            .limit(size)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Expense::try_from(model)?);
        }
        Ok((out, total))
    }

    /// Replaces an expense wholesale.
    ///
    /// Expenses are immutable once validated; the only mutation allowed is a
    /// full-field update, re-validated exactly like a create. The id and, if
    /// the payload omits one, the original date are kept.
    pub async fn update_expense(&self, id: Uuid, input: NewExpense) -> ResultEngine<Expense> {
        let existing = self.expense(id).await?;
        input.validate()?;

        let expense = Expense {
            id: existing.id,
            amount: input.amount,
            description: input.description,
            paid_by: input.paid_by,
            split_method: input.split_method,
            participants: input.participants,
            date: input.date.unwrap_or(existing.date),
        };

        expenses::ActiveModel::try_from(&expense)?
            .update(&self.database)
            .await?;
        tracing::debug!(id = %expense.id, "expense updated");
        Ok(expense)
    }

    /// Deletes an expense.
    pub async fn delete_expense(&self, id: Uuid) -> ResultEngine<()> {
        let result = expenses::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        tracing::debug!(%id, "expense deleted");
        Ok(())
    }

    /// Returns every distinct person name appearing as payer or participant,
    /// sorted alphabetically.
    pub async fn people(&self) -> ResultEngine<Vec<String>> {
        let expenses = self.all_expenses().await?;

        let mut people = BTreeSet::new();
        for expense in expenses {
            people.insert(expense.paid_by);
            for participant in expense.participants {
                people.insert(participant.name);
            }
        }
        Ok(people.into_iter().collect())
    }

    /// Computes net balances over the full expense history.
    pub async fn balances(&self) -> ResultEngine<Balance> {
        let expenses = self.all_expenses().await?;
        compute_balances(&expenses)
    }

    /// Computes the settlement plan that zeroes all current balances.
    pub async fn settlements(&self) -> ResultEngine<Vec<SettlementTransaction>> {
        let balances = self.balances().await?;
        Ok(plan_settlements(&balances))
    }

    async fn all_expenses(&self) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find().all(&self.database).await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Expense::try_from(model)?);
        }
        Ok(out)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
