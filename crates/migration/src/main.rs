use sea_orm::Database;
use sea_orm_migration::prelude::*;

/// Resolution order for the ledger database: explicit argument, then
/// `DATABASE_URL`, then the same `splitpay.db` file the server defaults to.
fn database_url(arg: Option<String>) -> String {
    arg.map(|path| format!("sqlite:{path}?mode=rwc"))
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:./splitpay.db?mode=rwc".to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());
    let db_url = database_url(args.next());

    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => {
            migration::Migrator::status(&db).await?;
        }
        _ => {
            eprintln!("Usage: cargo run -p migration -- [up|down|fresh|status] [db-path]");
            std::process::exit(2);
        }
    }

    Ok(())
}
