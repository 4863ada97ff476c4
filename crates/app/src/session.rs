//! The interactive menu loop.
//!
//! The logged-in username is passed explicitly from `login`/`register` to
//! `home`; nothing about the session lives in shared state.

use std::io::{BufRead, Write};

use crossterm::style::Color;
use engine::{
    Action, ActionOutcome, Bucket, Engine, EngineError, Money, NewAccount, RecordFilter,
};

use crate::{
    error::Result,
    menu::{self, DashboardChoice, MenuChoice, StartChoice},
    prompt::Prompter,
};

pub struct Session<'a, R, W> {
    engine: &'a Engine,
    prompt: Prompter<R, W>,
    history_days: u32,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(engine: &'a Engine, prompt: Prompter<R, W>, history_days: u32) -> Self {
        Self {
            engine,
            prompt,
            history_days,
        }
    }

    #[cfg(test)]
    pub fn prompt(&self) -> &Prompter<R, W> {
        &self.prompt
    }

    /// Run the start menu until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        self.prompt.clear()?;
        loop {
            self.prompt
                .say_colored("Welcome to River Bank!", Color::Cyan)?;
            for line in StartChoice::lines() {
                self.prompt.say(line)?;
            }

            match self.choose::<StartChoice>()? {
                StartChoice::Login => match self.login().await? {
                    Some(username) => self.home(&username).await?,
                    None => self.prompt.say_colored(
                        "Incorrect login details, please try again.",
                        Color::Red,
                    )?,
                },
                StartChoice::Register => {
                    if let Some(username) = self.register().await? {
                        self.home(&username).await?;
                    }
                }
                StartChoice::Quit => {
                    self.prompt.say("Goodbye!")?;
                    return Ok(());
                }
            }
        }
    }

    fn choose<C: MenuChoice>(&mut self) -> Result<C> {
        loop {
            let answer = self
                .prompt
                .line("Enter an action (the letter in brackets)")?;
            match C::from_key(&answer) {
                Some(choice) => return Ok(choice),
                None => self.prompt.say("Invalid action. Try again.")?,
            }
        }
    }

    async fn login(&mut self) -> Result<Option<String>> {
        let username = self.prompt.line("Enter a username")?;
        if !self.engine.account_exists(&username).await? {
            tracing::debug!(%username, "login for unknown username");
            return Ok(None);
        }

        let password = self
            .prompt
            .password(&format!("Enter password for {username}"))?;
        if self.engine.authenticate(&username, &password).await? {
            tracing::info!(%username, "logged in");
            Ok(Some(username))
        } else {
            Ok(None)
        }
    }

    async fn register(&mut self) -> Result<Option<String>> {
        let username = loop {
            let candidate = self.prompt.line("Create a new username")?;
            if let Err(err) = engine::validate_username(&candidate) {
                self.report(&err)?;
                continue;
            }
            if self.engine.account_exists(&candidate).await? {
                self.prompt
                    .say("Username already exists. Please choose another.")?;
                continue;
            }
            break candidate;
        };

        let display_name = loop {
            let name = self.prompt.line("Create a new display name")?;
            if !name.is_empty() {
                break name;
            }
            self.prompt.say("Display name must not be empty.")?;
        };

        let password = self.new_password()?;
        let opening_current = self.opening_balance(Bucket::Current)?;
        let opening_savings = self.opening_balance(Bucket::Savings)?;

        let created = self
            .engine
            .register(NewAccount {
                username,
                display_name,
                password,
                opening_current,
                opening_savings,
            })
            .await;
        let Some(account) = self.settle(created)? else {
            return Ok(None);
        };
        self.prompt.say_colored(
            format!("Account '{}' created.", account.username),
            Color::Green,
        )?;
        Ok(Some(account.username))
    }

    fn new_password(&mut self) -> Result<String> {
        loop {
            let password = self.prompt.password("Set a new password")?;
            if let Err(err) = engine::validate_password(&password) {
                self.report(&err)?;
                continue;
            }
            if self.prompt.is_terminal() {
                let confirm = self.prompt.password("Confirm password")?;
                if confirm != password {
                    self.prompt.say("Passwords do not match. Try again.")?;
                    continue;
                }
            }
            return Ok(password);
        }
    }

    fn opening_balance(&mut self, bucket: Bucket) -> Result<Money> {
        loop {
            let amount = self.prompt.parse(
                &format!("Enter starting {bucket} account balance"),
                Some(Money::ZERO),
            )?;
            if !amount.is_negative() {
                return Ok(amount);
            }
            self.prompt.say("Opening balance must not be negative.")?;
        }
    }

    /// The account dashboard. Returns on logout.
    async fn home(&mut self, username: &str) -> Result<()> {
        self.prompt.clear()?;
        loop {
            let account = self.engine.account(username).await?;
            self.prompt.say("")?;
            self.prompt
                .say_colored(format!("Welcome, {}!", account.display_name), Color::Green)?;
            self.prompt.say(format!("Username: {}", account.username))?;
            self.prompt
                .say(format!("Your account number: {}", account.account_number))?;
            self.prompt.say(format!(
                "\t Your current account balance: {}",
                account.balances.current
            ))?;
            self.prompt.say(format!(
                "\t Your savings account balance: {}",
                account.balances.savings
            ))?;
            self.prompt.say("\nActions")?;
            for line in DashboardChoice::lines() {
                self.prompt.say(line)?;
            }

            match self.choose::<DashboardChoice>()? {
                DashboardChoice::Deposit => {
                    let bucket = self.bucket("Account to deposit into (current, savings)")?;
                    let amount = self.prompt.parse("Amount to deposit", None)?;
                    self.run_action(username, Action::Deposit { bucket, amount })
                        .await?;
                }
                DashboardChoice::Withdraw => {
                    let bucket = self.bucket("Account to withdraw from (current, savings)")?;
                    let amount = self.prompt.parse("Amount to withdraw", None)?;
                    self.run_action(username, Action::Withdraw { bucket, amount })
                        .await?;
                }
                DashboardChoice::Transfer => {
                    let from = self.bucket("Account to transfer from (current, savings)")?;
                    let amount = self.prompt.parse("Amount to transfer", None)?;
                    let to = from.other();
                    self.run_action(username, Action::Transfer { from, to, amount })
                        .await?;
                }
                DashboardChoice::History => self.show_history(username).await?,
                DashboardChoice::Rename => {
                    let name = self.prompt.line("New display name")?;
                    let renamed = self.engine.set_display_name(username, &name).await;
                    if self.settle(renamed)?.is_some() {
                        self.prompt.say_colored("Display name updated.", Color::Green)?;
                    }
                }
                DashboardChoice::Logout => {
                    tracing::info!(username, "logged out");
                    self.prompt.clear()?;
                    return Ok(());
                }
            }
        }
    }

    /// Show recoverable engine errors and carry on; anything else ends the session.
    fn settle<T>(&mut self, result: std::result::Result<T, EngineError>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                self.report(&err)?;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn bucket(&mut self, prompt: &str) -> Result<Bucket> {
        loop {
            let answer = self.prompt.line(prompt)?;
            match Bucket::try_from(answer.as_str()) {
                Ok(bucket) => return Ok(bucket),
                Err(_) => self.prompt.say("Not a valid option, try again.")?,
            }
        }
    }

    async fn run_action(&mut self, username: &str, action: Action) -> Result<()> {
        let executed = self.engine.execute(username, action).await;
        let Some(ActionOutcome { balances, .. }) = self.settle(executed)? else {
            return Ok(());
        };
        let message = match action {
            Action::Deposit { bucket, amount } => format!("Deposited {amount} into {bucket}."),
            Action::Withdraw { bucket, amount } => format!("Withdrew {amount} from {bucket}."),
            Action::Transfer { from, to, amount } => {
                format!("Transferred {amount} from {from} to {to}.")
            }
        };
        self.prompt.say_colored(message, Color::Green)?;
        self.prompt.say(format!(
            "Balances now: current {}, savings {}",
            balances.current, balances.savings
        ))
    }

    async fn show_history(&mut self, username: &str) -> Result<()> {
        let records = self
            .engine
            .list_records(username, &RecordFilter::last_days(self.history_days))
            .await?;
        self.prompt.say(format!(
            "Transactions in the last {} days:",
            self.history_days
        ))?;
        if records.is_empty() {
            self.prompt.say("(none)")?;
        }
        for record in &records {
            self.prompt.say(menu::record_line(record))?;
        }
        Ok(())
    }

    fn report(&mut self, err: &EngineError) -> Result<()> {
        self.prompt.say_colored(err, Color::Red)
    }
}
