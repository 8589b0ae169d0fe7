use chrono::{TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{Engine, EngineError, NewExpense, Participant, SplitMethod};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build()
}

fn participant(name: &str, share: Option<f64>) -> Participant {
    Participant {
        name: name.to_string(),
        share,
    }
}

fn dinner_for_three() -> NewExpense {
    NewExpense {
        amount: 60.0,
        description: "Dinner".to_string(),
        paid_by: "Alice".to_string(),
        split_method: SplitMethod::Equal,
        participants: vec![
            participant("Alice", None),
            participant("Bob", None),
            participant("Carol", None),
        ],
        // Whole-second timestamp so equality survives the database round trip.
        date: Some(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()),
    }
}

#[tokio::test]
async fn create_and_fetch_expense() {
    let engine = engine_with_db().await;

    let created = engine.create_expense(dinner_for_three()).await.unwrap();
    let fetched = engine.expense(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.amount, 60.0);
    assert_eq!(fetched.split_method, SplitMethod::Equal);
}

#[tokio::test]
async fn create_rejects_invalid_exact_split() {
    let engine = engine_with_db().await;

    let input = NewExpense {
        amount: 60.0,
        description: "Dinner".to_string(),
        paid_by: "Alice".to_string(),
        split_method: SplitMethod::Exact,
        participants: vec![
            participant("Alice", Some(20.0)),
            participant("Bob", Some(15.0)),
            participant("Carol", Some(24.99)),
        ],
        date: None,
    };

    assert!(matches!(
        engine.create_expense(input).await,
        Err(EngineError::Validation(_))
    ));

    let (expenses, total) = engine.list_expenses(1, 10).await.unwrap();
    assert!(expenses.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn list_is_paginated_newest_first() {
    let engine = engine_with_db().await;

    for day in 1..=3 {
        let mut input = dinner_for_three();
        input.description = format!("Day {day}");
        input.date = Some(
            Utc::now() + chrono::Duration::days(day),
        );
        engine.create_expense(input).await.unwrap();
    }

    let (first_page, total) = engine.list_expenses(1, 2).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(first_page.len(), 2);
    assert_eq!(first_page[0].description, "Day 3");
    assert_eq!(first_page[1].description, "Day 2");

    let (second_page, _) = engine.list_expenses(2, 2).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].description, "Day 1");
}

#[tokio::test]
async fn update_replaces_every_field() {
    let engine = engine_with_db().await;
    let created = engine.create_expense(dinner_for_three()).await.unwrap();

    let update = NewExpense {
        amount: 90.0,
        description: "Dinner and drinks".to_string(),
        paid_by: "Bob".to_string(),
        split_method: SplitMethod::Shares,
        participants: vec![
            participant("Alice", Some(2.0)),
            participant("Bob", Some(1.0)),
        ],
        date: None,
    };

    let updated = engine.update_expense(created.id, update).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.amount, 90.0);
    assert_eq!(updated.paid_by, "Bob");
    // Omitted date keeps the original one.
    assert_eq!(updated.date, created.date);

    let fetched = engine.expense(created.id).await.unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_validates_the_merged_record() {
    let engine = engine_with_db().await;
    let created = engine.create_expense(dinner_for_three()).await.unwrap();

    let mut update = dinner_for_three();
    update.paid_by = "Dave".to_string();

    assert!(matches!(
        engine.update_expense(created.id, update).await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn missing_expense_is_key_not_found() {
    let engine = engine_with_db().await;

    assert!(matches!(
        engine.expense(Uuid::new_v4()).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_expense(Uuid::new_v4()).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.update_expense(Uuid::new_v4(), dinner_for_three()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn delete_removes_the_expense() {
    let engine = engine_with_db().await;
    let created = engine.create_expense(dinner_for_three()).await.unwrap();

    engine.delete_expense(created.id).await.unwrap();

    assert!(matches!(
        engine.expense(created.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn people_are_distinct_and_sorted() {
    let engine = engine_with_db().await;

    engine.create_expense(dinner_for_three()).await.unwrap();
    let mut second = dinner_for_three();
    second.paid_by = "Bob".to_string();
    second.participants = vec![participant("Bob", None), participant("Zoe", None)];
    engine.create_expense(second).await.unwrap();

    let people = engine.people().await.unwrap();
    assert_eq!(people, vec!["Alice", "Bob", "Carol", "Zoe"]);
}

#[tokio::test]
async fn settlement_plan_from_stored_history() {
    let engine = engine_with_db().await;

    engine.create_expense(dinner_for_three()).await.unwrap();
    engine
        .create_expense(NewExpense {
            amount: 30.0,
            description: "Groceries".to_string(),
            paid_by: "Bob".to_string(),
            split_method: SplitMethod::Exact,
            participants: vec![
                participant("Alice", Some(10.0)),
                participant("Bob", Some(10.0)),
                participant("Carol", Some(10.0)),
            ],
            date: None,
        })
        .await
        .unwrap();
    engine
        .create_expense(NewExpense {
            amount: 15.0,
            description: "Taxi".to_string(),
            paid_by: "Carol".to_string(),
            split_method: SplitMethod::Percentage,
            participants: vec![
                participant("Alice", Some(50.0)),
                participant("Bob", Some(30.0)),
                participant("Carol", Some(20.0)),
            ],
            date: None,
        })
        .await
        .unwrap();

    let balances = engine.balances().await.unwrap();
    assert_eq!(balances["Alice"], 22.5);
    assert_eq!(balances["Bob"], -4.5);
    assert_eq!(balances["Carol"], -18.0);
    let total: f64 = balances.values().sum();
    assert!(total.abs() < 1e-5);

    let settlements = engine.settlements().await.unwrap();
    assert_eq!(settlements.len(), 2);
    assert_eq!(settlements[0].payer, "Carol");
    assert_eq!(settlements[0].receiver, "Alice");
    assert_eq!(settlements[0].amount, 18.0);
    assert_eq!(settlements[1].payer, "Bob");
    assert_eq!(settlements[1].receiver, "Alice");
    assert_eq!(settlements[1].amount, 4.5);
}
