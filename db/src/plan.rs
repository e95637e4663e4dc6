//! YAML schema plans.
//!
//! A plan keeps a project's deploy and update statements in one file, written
//! in a single source dialect, and names the translators and error handlers
//! to apply. Lists left out fall back to the defaults for the target dialect.
//!
//! # Example YAML
//!
//! ```yaml
//! source_dialect: mariadb
//! deploy:
//!   statements:
//!     - |
//!       CREATE TABLE IF NOT EXISTS users (
//!         ID INT NOT NULL AUTO_INCREMENT,
//!         Username VARCHAR(255) NOT NULL,
//!         PRIMARY KEY(ID)
//!       )
//! update:
//!   statements:
//!     - ALTER TABLE users ADD COLUMN Active BOOL NOT NULL DEFAULT 1
//!   error_handlers:
//!     - ignore_duplicate_column
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use sqldeploy_core::translate::{self, Translator};
use sqldeploy_core::{
    Dialect, ErrorHandler, default_error_handlers, error_handler_by_name, translator_by_name,
};

use crate::error::{DatabaseError, Result};
use crate::job::{DeployJob, UpdateJob};
use crate::session::Session;

/// One half of a plan: deploy or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSection {
    /// Statements in the plan's source dialect, in execution order.
    #[serde(default)]
    pub statements: Vec<String>,
    /// Translator names; `None` uses the target dialect's default chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translators: Option<Vec<String>>,
    /// Error-handler names; `None` uses every built-in handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_handlers: Option<Vec<String>>,
}

impl PlanSection {
    fn translator_chain(
        &self,
        default: impl FnOnce() -> Vec<Translator>,
    ) -> Result<Vec<Translator>> {
        match &self.translators {
            None => Ok(default()),
            Some(names) => names
                .iter()
                .map(|name| {
                    translator_by_name(name)
                        .ok_or_else(|| DatabaseError::UnknownTranslator(name.clone()))
                })
                .collect(),
        }
    }

    fn handler_chain(&self) -> Result<Vec<ErrorHandler>> {
        match &self.error_handlers {
            None => Ok(default_error_handlers()),
            Some(names) => names
                .iter()
                .map(|name| {
                    error_handler_by_name(name)
                        .ok_or_else(|| DatabaseError::UnknownErrorHandler(name.clone()))
                })
                .collect(),
        }
    }
}

/// Deploy and update statements for one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPlan {
    /// Dialect the statements are written in.
    pub source_dialect: Dialect,
    #[serde(default)]
    pub deploy: PlanSection,
    #[serde(default)]
    pub update: PlanSection,
}

/// A plan's statements after translation for one target dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedPlan {
    pub target: Dialect,
    pub deploy: Vec<String>,
    pub update: Vec<String>,
}

impl SchemaPlan {
    pub fn new(source_dialect: Dialect) -> Self {
        Self {
            source_dialect,
            deploy: PlanSection::default(),
            update: PlanSection::default(),
        }
    }

    /// Loads a plan from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](DatabaseError::Io) if the file cannot be read, or
    /// [`Yaml`](DatabaseError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let plan = serde_yaml::from_reader(reader)?;
        Ok(plan)
    }

    /// Saves the plan as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Translator chain for deploy statements when deploying to `target`.
    pub fn deploy_translators(&self, target: Dialect) -> Result<Vec<Translator>> {
        self.deploy
            .translator_chain(|| target.deploy_translators(self.source_dialect))
    }

    /// Translator chain for update statements when deploying to `target`.
    pub fn update_translators(&self, target: Dialect) -> Result<Vec<Translator>> {
        self.update
            .translator_chain(|| target.update_translators(self.source_dialect))
    }

    /// Builds the deploy job for `target`.
    ///
    /// # Errors
    ///
    /// [`UnknownTranslator`](DatabaseError::UnknownTranslator) or
    /// [`UnknownErrorHandler`](DatabaseError::UnknownErrorHandler) when the
    /// plan names something that does not exist.
    pub fn deploy_job<S>(&self, target: Dialect) -> Result<DeployJob<S>> {
        Ok(DeployJob::new()
            .statements(self.deploy.statements.iter().cloned())
            .translators(self.deploy_translators(target)?)
            .error_handlers(self.deploy.handler_chain()?))
    }

    /// Builds the update job for `target`.
    pub fn update_job<S: Session>(&self, target: Dialect) -> Result<UpdateJob<S>> {
        Ok(UpdateJob::new()
            .statements(self.update.statements.iter().cloned())
            .translators(self.update_translators(target)?)
            .error_handlers(self.update.handler_chain()?))
    }

    /// Every statement as it would be executed against `target`.
    pub fn translated_statements(&self, target: Dialect) -> Result<TranslatedPlan> {
        let deploy_chain = self.deploy_translators(target)?;
        let update_chain = self.update_translators(target)?;
        Ok(TranslatedPlan {
            target,
            deploy: self
                .deploy
                .statements
                .iter()
                .map(|s| translate::translate(s, &deploy_chain))
                .collect(),
            update: self
                .update
                .statements
                .iter()
                .map(|s| translate::translate(s, &update_chain))
                .collect(),
        })
    }

    /// SHA-256 over the translated deploy then update statements.
    ///
    /// Statements are separated by a NUL byte so that moving text from one
    /// statement to the next changes the digest. Two runs of the same plan
    /// against the same target always agree.
    pub fn fingerprint(&self, target: Dialect) -> Result<String> {
        let translated = self.translated_statements(target)?;
        Ok(translated.fingerprint())
    }
}

impl TranslatedPlan {
    /// Hex SHA-256 of the statements, see [`SchemaPlan::fingerprint`].
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for statement in self.deploy.iter().chain(&self.update) {
            hasher.update(statement.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
source_dialect: mariadb
deploy:
  statements:
    - CREATE TABLE IF NOT EXISTS users (ID INT NOT NULL AUTO_INCREMENT, Name VARCHAR(50) NOT NULL, PRIMARY KEY(ID))
update:
  statements:
    - ALTER TABLE users ADD COLUMN Active BOOL NOT NULL DEFAULT 1
  error_handlers:
    - ignore_duplicate_column
"#
    }

    fn sample() -> SchemaPlan {
        serde_yaml::from_str(sample_yaml()).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let plan = sample();
        assert_eq!(plan.source_dialect, Dialect::MariaDb);
        assert_eq!(plan.deploy.statements.len(), 1);
        assert!(plan.deploy.translators.is_none());
        assert!(plan.deploy.error_handlers.is_none());
        assert_eq!(
            plan.update.error_handlers.as_deref(),
            Some(&["ignore_duplicate_column".to_string()][..])
        );
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let plan: SchemaPlan = serde_yaml::from_str("source_dialect: sqlite\n").unwrap();
        assert!(plan.deploy.statements.is_empty());
        assert!(plan.update.statements.is_empty());
    }

    #[test]
    fn test_translated_statements_for_sqlite() {
        let translated = sample().translated_statements(Dialect::Sqlite).unwrap();
        assert_eq!(
            translated.deploy,
            vec![
                "CREATE TABLE IF NOT EXISTS users (ID INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, Name TEXT NOT NULL )"
            ]
        );
        assert_eq!(
            translated.update,
            vec!["ALTER TABLE users ADD COLUMN Active INTEGER NOT NULL DEFAULT 1"]
        );
    }

    #[test]
    fn test_same_family_is_untouched() {
        let plan = sample();
        let translated = plan.translated_statements(Dialect::MySql).unwrap();
        assert_eq!(translated.deploy, plan.deploy.statements);
        assert_eq!(translated.update, plan.update.statements);
    }

    #[test]
    fn test_explicit_translators() {
        let mut plan = sample();
        plan.update.translators = Some(vec!["bool_to_integer".into()]);
        let translated = plan.translated_statements(Dialect::MsSql).unwrap();
        assert_eq!(
            translated.update,
            vec!["ALTER TABLE users ADD COLUMN Active INTEGER NOT NULL DEFAULT 1"]
        );
    }

    #[test]
    fn test_unknown_names() {
        let mut plan = sample();
        plan.deploy.translators = Some(vec!["mariadb_to_oracle".into()]);
        assert!(matches!(
            plan.fingerprint(Dialect::Sqlite),
            Err(DatabaseError::UnknownTranslator(name)) if name == "mariadb_to_oracle"
        ));

        let mut plan = sample();
        plan.update.error_handlers = Some(vec!["ignore_all".into()]);
        assert!(matches!(
            plan.update.handler_chain(),
            Err(DatabaseError::UnknownErrorHandler(_))
        ));
    }

    #[test]
    fn test_fingerprint_is_stable_and_target_specific() {
        let plan = sample();
        let a = plan.fingerprint(Dialect::Sqlite).unwrap();
        let b = plan.fingerprint(Dialect::Sqlite).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, plan.fingerprint(Dialect::MariaDb).unwrap());
    }

    #[test]
    fn test_fingerprint_separates_statements() {
        let split = TranslatedPlan {
            target: Dialect::Sqlite,
            deploy: vec!["ab".into(), "c".into()],
            update: vec![],
        };
        let moved = TranslatedPlan {
            target: Dialect::Sqlite,
            deploy: vec!["a".into(), "bc".into()],
            update: vec![],
        };
        assert_ne!(split.fingerprint(), moved.fingerprint());
    }

    #[test]
    fn test_load_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.yml");
        let plan = sample();
        plan.save(&path).unwrap();
        assert_eq!(SchemaPlan::load(&path).unwrap(), plan);
    }
}
