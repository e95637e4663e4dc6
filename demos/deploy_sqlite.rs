//! Deploys a MariaDB-flavored schema into an in-memory SQLite database,
//! seeds it from a callback, applies an update and queries the result.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p sqldeploy-demos --example deploy_sqlite
//! ```

use sqldeploy_core::{Columns, Dialect, Where, default_error_handlers};
use sqldeploy_db::{Config, DeployJob, DeployOptions, UpdateJob, UpdateOptions};
use sqldeploy_sqlite::{IN_MEMORY_RACY, SqliteDatabase, SqliteSession};
use tracing_subscriber::EnvFilter;

const USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    ID INT NOT NULL AUTO_INCREMENT,
    Fname VARCHAR(100) NOT NULL,
    Birthday DATE NOT NULL,
    Created DATETIME DEFAULT UTC_TIMESTAMP,
    PRIMARY KEY(ID)
)";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // === Step 1: Deploy, keeping the private in-memory database alive ===
    let insert = Columns::from(["Fname", "Birthday"]);
    let deploy = DeployJob::new()
        .statement(USERS)
        .translated(Dialect::MariaDb, Dialect::Sqlite)
        .error_handlers(default_error_handlers())
        .callback("seed users", move |session: &SqliteSession| {
            let (names, values) = insert.for_insert()?;
            let sql = format!("INSERT INTO users ({names}) VALUES ({values})");
            session.execute(&sql, ["Ada", "1815-12-10"])?;
            session.execute(&sql, ["Grace", "1906-12-09"])?;
            Ok(())
        });

    println!("=== Deploy ===");
    for statement in deploy.translated_statements() {
        println!("{statement}");
    }
    let mut db = SqliteDatabase::new(Config::sqlite(IN_MEMORY_RACY));
    db.deploy_schema(&deploy, DeployOptions { keep_open: true })
        .unwrap();

    // === Step 2: Update on the same connection, twice ===
    let update = UpdateJob::new()
        .statements([
            "ALTER TABLE users ADD COLUMN Active BOOL NOT NULL DEFAULT 1",
            "CREATE INDEX idx_users_fname ON users(Fname)",
        ])
        .translated(Dialect::MariaDb, Dialect::Sqlite)
        .error_handlers(default_error_handlers());
    for run in 1..=2 {
        db.update_schema(&update, UpdateOptions { keep_open: true })
            .unwrap();
        println!("\nupdate run {run} ok");
    }

    // === Step 3: Query ===
    println!("\n=== Query ===");
    let select = Columns::from(["ID", "Fname", "Birthday", "Active"])
        .for_select()
        .unwrap();
    let filter = Where::new("Active = 1");
    let session = db.session().unwrap();
    let mut stmt = session
        .prepare(&format!("SELECT {select} FROM users WHERE {filter} ORDER BY ID"))
        .unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })
        .unwrap();
    for row in rows {
        let (id, name, birthday, active) = row.unwrap();
        println!("  {id}: {name} born {birthday} active={active}");
    }
    drop(stmt);

    db.close().unwrap();
}
