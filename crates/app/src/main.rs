use std::{
    io::{IsTerminal, stdin, stdout},
    process::ExitCode,
};

use migration::{Migrator, MigratorTrait};

use crate::{
    error::{AppError, Result},
    prompt::Prompter,
    session::Session,
    settings::Settings,
};

mod error;
mod menu;
mod prompt;
mod session;
mod settings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) | Err(AppError::Interrupted) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "river_bank={level},engine={level}",
            level = settings.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    let database = sea_orm::Database::connect(settings.database_url()).await?;
    Migrator::up(&database, None).await?;
    tracing::info!(db_path = %settings.db_path, "database ready");

    let engine = engine::Engine::builder()
        .database(database)
        .bcrypt_cost(settings.bcrypt_rounds)
        .build()
        .await?;

    let input = stdin();
    let terminal = input.is_terminal();
    let prompt = Prompter::new(input.lock(), stdout()).terminal(terminal);
    Session::new(&engine, prompt, settings.history_days)
        .run()
        .await
}
