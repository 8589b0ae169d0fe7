//! Expenses API endpoints

use api_types::expense::{
    ExpenseList, ExpenseListResponse, ExpenseNew, ExpenseView, ParticipantShare,
    SplitMethod as ApiSplitMethod,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_method(method: ApiSplitMethod) -> engine::SplitMethod {
    match method {
        ApiSplitMethod::Equal => engine::SplitMethod::Equal,
        ApiSplitMethod::Exact => engine::SplitMethod::Exact,
        ApiSplitMethod::Percentage => engine::SplitMethod::Percentage,
        ApiSplitMethod::Shares => engine::SplitMethod::Shares,
    }
}

fn map_method_back(method: engine::SplitMethod) -> ApiSplitMethod {
    match method {
        engine::SplitMethod::Equal => ApiSplitMethod::Equal,
        engine::SplitMethod::Exact => ApiSplitMethod::Exact,
        engine::SplitMethod::Percentage => ApiSplitMethod::Percentage,
        engine::SplitMethod::Shares => ApiSplitMethod::Shares,
    }
}

fn to_input(payload: ExpenseNew) -> engine::NewExpense {
    engine::NewExpense {
        amount: payload.amount,
        description: payload.description,
        paid_by: payload.paid_by,
        split_method: map_method(payload.split_method),
        participants: payload
            .participants
            .into_iter()
            .map(|p| engine::Participant {
                name: p.name,
                share: p.share,
            })
            .collect(),
        date: payload.date.map(|dt| dt.with_timezone(&Utc)),
    }
}

fn to_view(expense: engine::Expense) -> Result<ExpenseView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;

    Ok(ExpenseView {
        id: expense.id,
        amount: expense.amount,
        description: expense.description,
        paid_by: expense.paid_by,
        split_method: map_method_back(expense.split_method),
        participants: expense
            .participants
            .into_iter()
            .map(|p| ParticipantShare {
                name: p.name,
                share: p.share,
            })
            .collect(),
        date: expense.date.with_timezone(&utc),
    })
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state.engine.create_expense(to_input(payload)).await?;
    Ok((StatusCode::CREATED, Json(to_view(expense)?)))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(payload): Query<ExpenseList>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let page = payload.page.unwrap_or(1).max(1);
    let size = payload.size.unwrap_or(10).clamp(1, 100);

    let (expenses, total) = state.engine.list_expenses(page, size).await?;
    let expenses = expenses
        .into_iter()
        .map(to_view)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ExpenseListResponse {
        total,
        page,
        size,
        expenses,
    }))
}

pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(id).await?;
    Ok(Json(to_view(expense)?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.update_expense(id, to_input(payload)).await?;
    Ok(Json(to_view(expense)?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(id).await?;
    Ok(StatusCode::OK)
}
