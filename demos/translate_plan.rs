//! Prints one schema plan as it would run against every supported dialect.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p sqldeploy-demos --example translate_plan
//! ```

use sqldeploy_core::Dialect;
use sqldeploy_db::SchemaPlan;

fn main() {
    let mut plan = SchemaPlan::new(Dialect::MariaDb);
    plan.deploy.statements = vec![
        "CREATE TABLE IF NOT EXISTS users (
    ID INT NOT NULL AUTO_INCREMENT,
    Username VARCHAR(255) NOT NULL,
    Balance DECIMAL(10,2) NOT NULL DEFAULT 0,
    Admin BOOL NOT NULL DEFAULT 0,
    Avatar MEDIUMBLOB,
    Created DATETIME DEFAULT UTC_TIMESTAMP,
    PRIMARY KEY(ID)
)"
        .to_string(),
    ];
    plan.update.statements =
        vec!["ALTER TABLE users ADD COLUMN LastSeen DATETIME".to_string()];

    for target in Dialect::ALL {
        let translated = match plan.translated_statements(target) {
            Ok(translated) => translated,
            Err(err) => {
                eprintln!("{target}: {err}");
                continue;
            }
        };
        println!("=== {target} ({}) ===", translated.fingerprint());
        for statement in translated.deploy.iter().chain(&translated.update) {
            println!("{statement};\n");
        }
    }
}
