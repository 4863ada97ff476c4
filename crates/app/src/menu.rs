//! Menu choices and the text shown for them.

use chrono::Local;
use engine::Record;

/// A fixed menu: one key per option.
pub trait MenuChoice: Copy + 'static {
    /// `(key, choice, description)` in display order.
    const ITEMS: &'static [(char, Self, &'static str)];

    fn from_key(input: &str) -> Option<Self> {
        let mut chars = input.trim().chars();
        let key = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        Self::ITEMS
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, choice, _)| *choice)
    }

    fn lines() -> impl Iterator<Item = String> {
        Self::ITEMS
            .iter()
            .map(|(_, _, description)| format!("\t {description}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartChoice {
    Login,
    Register,
    Quit,
}

impl MenuChoice for StartChoice {
    const ITEMS: &'static [(char, Self, &'static str)] = &[
        ('l', Self::Login, "(l)ogin to existing account."),
        ('r', Self::Register, "(r)egister a new account."),
        ('q', Self::Quit, "(q)uit the application."),
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashboardChoice {
    Deposit,
    Withdraw,
    Transfer,
    History,
    Rename,
    Logout,
}

impl MenuChoice for DashboardChoice {
    const ITEMS: &'static [(char, Self, &'static str)] = &[
        ('d', Self::Deposit, "(d)eposit money into an account."),
        ('w', Self::Withdraw, "(w)ithdraw money from an account."),
        ('t', Self::Transfer, "(t)ransfer money between my accounts."),
        ('v', Self::History, "(v)iew recent transactions."),
        ('n', Self::Rename, "(n)ame change."),
        ('l', Self::Logout, "(l)ogout."),
    ];
}

/// One history line, e.g. `- Deposit of £100.00 on account 'current' at 2025-10-19 10:00:00`.
pub fn record_line(record: &Record) -> String {
    format!(
        "- {} of {} on account '{}' at {}",
        record.kind.label(),
        record.amount,
        record.bucket,
        record
            .occurred_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    )
}
