use std::path::PathBuf;

/// Engine configuration.
///
/// All settings can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/sklad | work directory (database, logs) |
/// | LOG_LEVEL | info | tracing level filter |
/// | ENVIRONMENT | development | development \| staging \| production |
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding the database and log files
    pub work_dir: String,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults. A `.env` file in the working directory is honored.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/sklad".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("sklad.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Ensure the work directory layout exists.
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
