use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Action, Balances, Bucket, Engine, EngineError, Money, NewAccount, RecordFilter, RecordKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .bcrypt_cost(4)
        .build()
        .await
        .unwrap();
    engine
        .register(NewAccount {
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            password: "secret123".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    (engine, db)
}

async fn all_records(engine: &Engine) -> Vec<engine::Record> {
    engine
        .list_records("alice", &RecordFilter::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn deposit_increases_balance_and_writes_one_record() {
    let (engine, _db) = engine_with_db().await;

    let outcome = engine
        .deposit("alice", Bucket::Current, Money::pounds(100))
        .await
        .unwrap();
    assert_eq!(
        outcome.balances,
        Balances::new(Money::pounds(100), Money::ZERO)
    );
    assert_eq!(outcome.record_ids.len(), 1);

    let records = all_records(&engine).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, outcome.record_ids[0]);
    assert_eq!(records[0].kind, RecordKind::Deposit);
    assert_eq!(records[0].bucket, Bucket::Current);
    assert_eq!(records[0].amount, Money::pounds(100));
    assert_eq!(records[0].username, "alice");
}

#[tokio::test]
async fn deposit_into_savings_leaves_current_alone() {
    let (engine, _db) = engine_with_db().await;

    let outcome = engine
        .deposit("alice", Bucket::Savings, Money::new(15_050))
        .await
        .unwrap();
    assert_eq!(outcome.balances.current, Money::ZERO);
    assert_eq!(outcome.balances.savings, Money::new(15_050));
}

#[tokio::test]
async fn non_positive_amounts_are_rejected_without_effect() {
    let (engine, _db) = engine_with_db().await;

    for amount in [Money::ZERO, Money::pounds(-50)] {
        for action in [
            Action::Deposit {
                bucket: Bucket::Current,
                amount,
            },
            Action::Withdraw {
                bucket: Bucket::Current,
                amount,
            },
            Action::Transfer {
                from: Bucket::Current,
                to: Bucket::Savings,
                amount,
            },
        ] {
            let err = engine.execute("alice", action).await.unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)));
        }
    }

    assert_eq!(engine.get_balances("alice").await.unwrap(), Balances::default());
    assert!(all_records(&engine).await.is_empty());
}

#[tokio::test]
async fn withdraw_decreases_balance_and_writes_one_record() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", Bucket::Current, Money::pounds(100))
        .await
        .unwrap();

    let outcome = engine
        .withdraw("alice", Bucket::Current, Money::pounds(30))
        .await
        .unwrap();
    assert_eq!(outcome.balances.current, Money::pounds(70));

    let records = all_records(&engine).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind, RecordKind::Withdraw);
    assert_eq!(records[0].amount, Money::pounds(30));
}

#[tokio::test]
async fn withdraw_more_than_balance_changes_nothing() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", Bucket::Current, Money::pounds(20))
        .await
        .unwrap();

    let err = engine
        .withdraw("alice", Bucket::Current, Money::new(2001))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .withdraw("alice", Bucket::Savings, Money::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert_eq!(
        engine.get_balances("alice").await.unwrap(),
        Balances::new(Money::pounds(20), Money::ZERO)
    );
    assert_eq!(all_records(&engine).await.len(), 1);
}

#[tokio::test]
async fn withdraw_entire_balance_is_allowed() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", Bucket::Savings, Money::pounds(20))
        .await
        .unwrap();

    let outcome = engine
        .withdraw("alice", Bucket::Savings, Money::pounds(20))
        .await
        .unwrap();
    assert_eq!(outcome.balances.savings, Money::ZERO);
}

#[tokio::test]
async fn transfer_moves_money_and_writes_two_records() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", Bucket::Current, Money::pounds(70))
        .await
        .unwrap();

    let outcome = engine
        .transfer("alice", Bucket::Current, Bucket::Savings, Money::pounds(20))
        .await
        .unwrap();
    assert_eq!(
        outcome.balances,
        Balances::new(Money::pounds(50), Money::pounds(20))
    );
    assert_eq!(outcome.record_ids.len(), 2);

    let records = all_records(&engine).await;
    assert_eq!(records.len(), 3);
    let out = records
        .iter()
        .find(|r| r.kind == RecordKind::TransferOut)
        .unwrap();
    let inbound = records
        .iter()
        .find(|r| r.kind == RecordKind::TransferIn)
        .unwrap();
    assert_eq!(out.bucket, Bucket::Current);
    assert_eq!(out.amount, Money::pounds(20));
    assert_eq!(inbound.bucket, Bucket::Savings);
    assert_eq!(inbound.amount, Money::pounds(20));
    assert_eq!(outcome.record_ids, vec![out.id, inbound.id]);
}

#[tokio::test]
async fn transfer_from_savings_to_current() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", Bucket::Savings, Money::pounds(10))
        .await
        .unwrap();

    let outcome = engine
        .transfer("alice", Bucket::Savings, Bucket::Current, Money::new(250))
        .await
        .unwrap();
    assert_eq!(outcome.balances.savings, Money::new(750));
    assert_eq!(outcome.balances.current, Money::new(250));
}

#[tokio::test]
async fn transfer_with_insufficient_funds_or_same_bucket_changes_nothing() {
    let (engine, _db) = engine_with_db().await;
    engine
        .deposit("alice", Bucket::Current, Money::pounds(10))
        .await
        .unwrap();

    let err = engine
        .transfer("alice", Bucket::Current, Bucket::Savings, Money::pounds(11))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .transfer("alice", Bucket::Current, Bucket::Current, Money::pounds(1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert_eq!(
        engine.get_balances("alice").await.unwrap(),
        Balances::new(Money::pounds(10), Money::ZERO)
    );
    assert_eq!(all_records(&engine).await.len(), 1);
}

#[tokio::test]
async fn credit_that_would_overflow_is_rejected_without_effect() {
    let (engine, _db) = engine_with_db().await;
    let max: Money = "92233720368547758.07".parse().unwrap();
    assert_eq!(max, Money::new(i64::MAX));
    engine.deposit("alice", Bucket::Current, max).await.unwrap();

    let err = engine
        .deposit("alice", Bucket::Current, Money::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(err.is_recoverable());

    engine
        .deposit("alice", Bucket::Savings, Money::new(1))
        .await
        .unwrap();
    let err = engine
        .transfer("alice", Bucket::Savings, Bucket::Current, Money::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .adjust_balance("alice", Bucket::Current, Money::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert_eq!(
        engine.get_balances("alice").await.unwrap(),
        Balances::new(max, Money::new(1))
    );
    assert_eq!(all_records(&engine).await.len(), 2);
}

#[tokio::test]
async fn actions_on_unknown_user_fail_with_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .deposit("ghost", Bucket::Current, Money::pounds(1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("ghost".to_string()));
    assert!(
        engine
            .list_records("ghost", &RecordFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn failed_ledger_write_rolls_back_balance() {
    let (engine, db) = engine_with_db().await;
    engine
        .deposit("alice", Bucket::Current, Money::pounds(10))
        .await
        .unwrap();

    // Make every insert into the ledger fail.
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "CREATE TRIGGER reject_ledger BEFORE INSERT ON transactions \
         BEGIN SELECT RAISE(ABORT, 'ledger offline'); END;",
    ))
    .await
    .unwrap();

    let err = engine
        .deposit("alice", Bucket::Current, Money::pounds(5))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::StorageUnavailable(_)));
    assert!(!err.is_recoverable());

    assert_eq!(
        engine.get_balances("alice").await.unwrap(),
        Balances::new(Money::pounds(10), Money::ZERO)
    );
    assert_eq!(all_records(&engine).await.len(), 1);
}

#[tokio::test]
async fn example_scenario_reconciles() {
    let (engine, _db) = engine_with_db().await;

    let steps = [
        (
            Action::Deposit {
                bucket: Bucket::Current,
                amount: Money::pounds(100),
            },
            Balances::new(Money::pounds(100), Money::ZERO),
        ),
        (
            Action::Withdraw {
                bucket: Bucket::Current,
                amount: Money::pounds(30),
            },
            Balances::new(Money::pounds(70), Money::ZERO),
        ),
        (
            Action::Transfer {
                from: Bucket::Current,
                to: Bucket::Savings,
                amount: Money::pounds(20),
            },
            Balances::new(Money::pounds(50), Money::pounds(20)),
        ),
    ];

    for (action, expected) in steps {
        let outcome = engine.execute("alice", action).await.unwrap();
        assert_eq!(outcome.balances, expected);
    }

    let records = all_records(&engine).await;
    assert_eq!(records.len(), 4);

    let mut replayed = Balances::default();
    for record in &records {
        match record.bucket {
            Bucket::Current => replayed.current += record.signed_amount(),
            Bucket::Savings => replayed.savings += record.signed_amount(),
        }
    }
    assert_eq!(replayed, engine.get_balances("alice").await.unwrap());
}

#[tokio::test]
async fn list_records_is_newest_first_and_restartable() {
    let (engine, _db) = engine_with_db().await;

    let mut ids = Vec::new();
    for pounds in 1..=5 {
        let outcome = engine
            .deposit("alice", Bucket::Current, Money::pounds(pounds))
            .await
            .unwrap();
        ids.extend(outcome.record_ids);
    }

    let first = all_records(&engine).await;
    assert_eq!(first.len(), 5);
    let listed: Vec<i64> = first.iter().map(|r| r.id).collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed, expected);
    assert!(
        first
            .windows(2)
            .all(|w| w[0].occurred_at >= w[1].occurred_at)
    );

    let second = all_records(&engine).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn list_records_respects_since_and_limit() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();

    engine
        .append_record(
            "alice",
            RecordKind::Deposit,
            Bucket::Current,
            Money::pounds(1),
            now - Duration::days(30),
        )
        .await
        .unwrap();
    engine
        .append_record(
            "alice",
            RecordKind::Deposit,
            Bucket::Current,
            Money::pounds(2),
            now - Duration::days(2),
        )
        .await
        .unwrap();
    engine
        .append_record(
            "alice",
            RecordKind::Withdraw,
            Bucket::Current,
            Money::pounds(3),
            now - Duration::hours(1),
        )
        .await
        .unwrap();

    let recent = engine
        .list_records("alice", &RecordFilter::last_days(7))
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].amount, Money::pounds(3));
    assert_eq!(recent[1].amount, Money::pounds(2));

    let limited = engine
        .list_records(
            "alice",
            &RecordFilter {
                since: None,
                limit: Some(1),
            },
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].amount, Money::pounds(3));
}

#[tokio::test]
async fn append_record_rejects_non_positive_amount() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .append_record(
            "alice",
            RecordKind::Deposit,
            Bucket::Current,
            Money::ZERO,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}
