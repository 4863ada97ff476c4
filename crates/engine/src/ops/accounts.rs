use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QuerySelect, SqlErr, TransactionTrait,
    prelude::*,
    sea_query::Expr,
};

use crate::{
    Account, Balances, Bucket, EngineError, Money, NewAccount, RecordKind, ResultEngine,
    accounts::{self, balance_column},
    auth,
    util::{normalize_display_name, validate_password, validate_username},
};

use super::{Engine, with_tx};

impl Engine {
    /// Insert a new account with zero balances.
    ///
    /// `password_hash` is stored as given; use [`Engine::register`] to go from
    /// a plain password.
    pub async fn create_account(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.insert_account(
                &db_tx,
                username,
                display_name,
                password_hash,
                Balances::default(),
                Utc::now(),
            )
            .await
        })
    }

    /// Register a user from a plain password.
    ///
    /// - Validates username, password and display name.
    /// - Hashes the password with the engine's bcrypt cost.
    /// - Records non-zero opening balances as deposits so the ledger
    ///   reconciles with the balances from the first row.
    pub async fn register(&self, new: NewAccount) -> ResultEngine<Account> {
        validate_username(&new.username)?;
        validate_password(&new.password)?;
        let display_name = normalize_display_name(&new.display_name)?;
        let opening = Balances::new(new.opening_current, new.opening_savings);
        for bucket in Bucket::ALL {
            if opening.get(bucket).is_negative() {
                return Err(EngineError::InvalidAmount(format!(
                    "opening {bucket} balance must not be negative"
                )));
            }
        }

        let password_hash = auth::hash_password(&new.password, self.bcrypt_cost)?;
        let created_at = Utc::now();
        let username = new.username;

        let result: ResultEngine<Account> = with_tx!(self, |db_tx| {
            self.insert_account(
                &db_tx,
                &username,
                &display_name,
                &password_hash,
                opening,
                created_at,
            )
            .await?;
            for bucket in Bucket::ALL {
                let amount = opening.get(bucket);
                if amount.is_positive() {
                    self.append_record_tx(
                        &db_tx,
                        &username,
                        RecordKind::Deposit,
                        bucket,
                        amount,
                        created_at,
                    )
                    .await?;
                }
            }
            let model = self.require_account(&db_tx, &username).await?;
            Ok(Account::from(model))
        });
        let account = result?;

        tracing::info!(username = %account.username, "registered new account");
        Ok(account)
    }

    /// Snapshot of an account (display name and balances).
    pub async fn account(&self, username: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, username).await?;
            Ok(Account::from(model))
        })
    }

    pub async fn account_exists(&self, username: &str) -> ResultEngine<bool> {
        let found = accounts::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?;
        Ok(found.is_some())
    }

    pub async fn get_password_hash(&self, username: &str) -> ResultEngine<String> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, username).await?;
            Ok(model.password_hash)
        })
    }

    pub async fn get_balances(&self, username: &str) -> ResultEngine<Balances> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, username).await?;
            Ok(Balances::from(&model))
        })
    }

    /// Add `delta` (possibly negative) to one bucket and return the new balance.
    ///
    /// No funds check happens here; callers validate before withdrawing.
    /// A delta that would overflow the stored balance is `InvalidAmount`.
    pub async fn adjust_balance(
        &self,
        username: &str,
        bucket: Bucket,
        delta: Money,
    ) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| {
            self.adjust_balance_tx(&db_tx, username, bucket, delta).await
        })
    }

    pub async fn set_display_name(&self, username: &str, display_name: &str) -> ResultEngine<()> {
        let display_name = normalize_display_name(display_name)?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, username).await?;
            let model = accounts::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                display_name: ActiveValue::Set(display_name),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Check `password` for `username`.
    ///
    /// Unknown usernames verify as `false`, same as a wrong password.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<bool> {
        let hash = match self.get_password_hash(username).await {
            Ok(hash) => hash,
            Err(EngineError::NotFound(_)) => {
                tracing::debug!(username, "login attempt for unknown user");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        let ok = auth::verify(password, &hash);
        if !ok {
            tracing::debug!(username, "login rejected");
        }
        Ok(ok)
    }

    pub(super) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(username.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound(username.to_string()))
    }

    pub(super) async fn adjust_balance_tx(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
        bucket: Bucket,
        delta: Money,
    ) -> ResultEngine<Money> {
        let before = Balances::from(&self.require_account(db_tx, username).await?).get(bucket);
        if before.checked_add(delta).is_none() {
            return Err(EngineError::InvalidAmount(format!(
                "amount too large: {bucket} balance would overflow"
            )));
        }

        let column = balance_column(bucket);
        let updated = accounts::Entity::update_many()
            .col_expr(column, Expr::col(column).add(delta.pence()))
            .filter(accounts::Column::Username.eq(username))
            .exec(db_tx)
            .await?;
        if updated.rows_affected == 0 {
            return Err(EngineError::NotFound(username.to_string()));
        }

        let model = self.require_account(db_tx, username).await?;
        Ok(Balances::from(&model).get(bucket))
    }

    async fn insert_account(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
        display_name: &str,
        password_hash: &str,
        opening: Balances,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let exists = accounts::Entity::find_by_id(username.to_string())
            .one(db_tx)
            .await?;
        if exists.is_some() {
            return Err(EngineError::DuplicateUsername(username.to_string()));
        }

        let last_number: Option<i64> = accounts::Entity::find()
            .select_only()
            .column_as(accounts::Column::AccountNumber.max(), "last_number")
            .into_tuple()
            .one(db_tx)
            .await?
            .flatten();

        let model = accounts::ActiveModel {
            username: ActiveValue::Set(username.to_string()),
            account_number: ActiveValue::Set(last_number.unwrap_or(0) + 1),
            display_name: ActiveValue::Set(display_name.to_string()),
            password_hash: ActiveValue::Set(password_hash.to_string()),
            current_balance: ActiveValue::Set(opening.current.pence()),
            savings_balance: ActiveValue::Set(opening.savings.pence()),
            created_at: ActiveValue::Set(created_at),
        };
        accounts::Entity::insert(model)
            .exec_without_returning(db_tx)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    EngineError::DuplicateUsername(username.to_string())
                }
                _ => EngineError::from(err),
            })?;
        Ok(())
    }
}
