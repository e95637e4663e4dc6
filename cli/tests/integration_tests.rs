use std::fs;
use std::path::PathBuf;
use std::process::Output;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "sqldeploy_cli_test_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const PLAN_YAML: &str = r#"source_dialect: mariadb
deploy:
  statements:
    - |
      CREATE TABLE IF NOT EXISTS users (
          ID INT NOT NULL AUTO_INCREMENT,
          Username VARCHAR(255) NOT NULL,
          Created DATETIME DEFAULT UTC_TIMESTAMP,
          PRIMARY KEY(ID)
      )
    - CREATE TABLE IF NOT EXISTS sessions (Token VARCHAR(64) NOT NULL, Expires DATETIME NOT NULL)
update:
  statements:
    - ALTER TABLE users ADD COLUMN Active BOOL NOT NULL DEFAULT 1
    - CREATE INDEX idx_sessions_token ON sessions(Token)
"#;

fn write_plan(dir: &TempDir) -> PathBuf {
    let path = dir.join("plan.yml");
    fs::write(&path, PLAN_YAML).expect("failed to write plan");
    path
}

fn write_sqlite_config(dir: &TempDir, db: &PathBuf) -> PathBuf {
    let yaml = format!("dialect: sqlite\nsqlite_path: {}\n", db.display());
    let path = dir.join("config.yml");
    fs::write(&path, yaml).expect("failed to write config");
    path
}

fn run(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_sqldeploy"))
        .args(args)
        .output()
        .expect("failed to run sqldeploy")
}

fn column_names(db: &PathBuf, table: &str) -> Vec<String> {
    let conn = rusqlite::Connection::open(db).unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .unwrap();
    stmt.query_map([table], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

// ---------------------------------------------------------------------------
// deploy / update
// ---------------------------------------------------------------------------

#[test]
fn deploy_creates_sqlite_database() {
    let dir = TempDir::new("deploy_creates");
    let db = dir.join("app.db");
    let config = write_sqlite_config(&dir, &db);
    let plan = write_plan(&dir);

    let out = run(&[
        "deploy",
        "--config",
        config.to_str().unwrap(),
        "--plan",
        plan.to_str().unwrap(),
    ]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "deploy should succeed. stdout: {stdout}");
    assert!(stdout.contains("2 statement(s) applied"), "stdout: {stdout}");
    assert!(stdout.contains("Tables (2): sessions, users"), "stdout: {stdout}");
    assert!(db.exists());
    assert_eq!(column_names(&db, "users"), vec!["ID", "Username", "Created"]);
}

#[test]
fn deploy_with_update_then_rerun_update() {
    let dir = TempDir::new("deploy_with_update");
    let db = dir.join("app.db");
    let config = write_sqlite_config(&dir, &db);
    let plan = write_plan(&dir);
    let config = config.to_str().unwrap();
    let plan = plan.to_str().unwrap();

    let out = run(&["deploy", "--config", config, "--plan", plan, "--with-update"]);
    assert!(
        out.status.success(),
        "deploy should succeed. stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(String::from_utf8_lossy(&out.stdout).contains("Update complete"));

    // Every update statement now hits an already-applied error that is ignored.
    let out = run(&["update", "--config", config, "--plan", plan]);
    assert!(
        out.status.success(),
        "re-running update should succeed. stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(
        column_names(&db, "users"),
        vec!["ID", "Username", "Created", "Active"]
    );
}

#[test]
fn update_requires_deployed_database() {
    let dir = TempDir::new("update_missing");
    let db = dir.join("missing.db");
    let config = write_sqlite_config(&dir, &db);
    let plan = write_plan(&dir);

    let out = run(&[
        "update",
        "--config",
        config.to_str().unwrap(),
        "--plan",
        plan.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Update failed"), "stderr: {stderr}");
    assert!(!db.exists());
}

#[test]
fn deploy_refuses_server_dialects() {
    let dir = TempDir::new("deploy_server");
    let config = dir.join("config.yml");
    fs::write(
        &config,
        "dialect: mariadb\nhost: db.local\nname: app\nuser: root\npassword: secret\n",
    )
    .unwrap();
    let plan = write_plan(&dir);

    let out = run(&[
        "deploy",
        "--config",
        config.to_str().unwrap(),
        "--plan",
        plan.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("targets mariadb"), "stderr: {stderr}");
}

#[test]
fn deploy_reports_bad_statement() {
    let dir = TempDir::new("deploy_bad_statement");
    let db = dir.join("app.db");
    let config = write_sqlite_config(&dir, &db);
    let plan = dir.join("plan.yml");
    fs::write(
        &plan,
        "source_dialect: sqlite\ndeploy:\n  statements:\n    - CREATE TABLE broken (\n",
    )
    .unwrap();

    let out = run(&[
        "deploy",
        "--config",
        config.to_str().unwrap(),
        "--plan",
        plan.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Deploy failed"), "stderr: {stderr}");
    assert!(stderr.contains("CREATE TABLE broken ("), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// translate
// ---------------------------------------------------------------------------

#[test]
fn translate_prints_sqlite_statements() {
    let dir = TempDir::new("translate_sqlite");
    let plan = write_plan(&dir);

    let out = run(&["translate", "--plan", plan.to_str().unwrap(), "--target", "sqlite"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("-- target: sqlite\n-- fingerprint: "));
    assert!(stdout.contains("ID INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL"));
    assert!(stdout.contains("Created TEXT DEFAULT CURRENT_TIMESTAMP"));
    assert!(stdout.contains("ADD COLUMN Active INTEGER NOT NULL DEFAULT 1;"));
    assert!(!stdout.contains("VARCHAR"));
}

#[test]
fn translate_json_is_stable() {
    let dir = TempDir::new("translate_json");
    let plan = write_plan(&dir);
    let args = [
        "translate",
        "--plan",
        plan.to_str().unwrap(),
        "--target",
        "mssql",
        "--json",
    ];

    let first = run(&args);
    let second = run(&args);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let json: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    assert_eq!(json["target"], "mssql");
    assert_eq!(json["deploy"].as_array().unwrap().len(), 2);
    assert_eq!(json["update"].as_array().unwrap().len(), 2);
    assert_eq!(json["fingerprint"].as_str().unwrap().len(), 64);
    assert!(
        json["deploy"][0]
            .as_str()
            .unwrap()
            .contains("IDENTITY(1,1)")
    );
}

#[test]
fn translate_rejects_unknown_dialect() {
    let dir = TempDir::new("translate_unknown");
    let plan = write_plan(&dir);

    let out = run(&["translate", "--plan", plan.to_str().unwrap(), "--target", "oracle"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid dialect"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

#[test]
fn status_reports_tables() {
    let dir = TempDir::new("status");
    let db = dir.join("app.db");
    let config = write_sqlite_config(&dir, &db);
    let plan = write_plan(&dir);
    let config = config.to_str().unwrap();

    let out = run(&["deploy", "--config", config, "--plan", plan.to_str().unwrap()]);
    assert!(out.status.success());

    let out = run(&["status", "--config", config]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("SQLite version: 3."), "stdout: {stdout}");
    assert!(stdout.contains("Tables (2)"), "stdout: {stdout}");
}

#[test]
fn status_fails_without_database() {
    let dir = TempDir::new("status_missing");
    let db = dir.join("missing.db");
    let config = write_sqlite_config(&dir, &db);

    let out = run(&["status", "--config", config.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: Failed to connect"), "stderr: {stderr}");
}
