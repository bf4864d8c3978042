use std::{env, path::PathBuf, time::Duration};

/// Server configuration loaded via environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Database settings
    pub database_url: Option<String>,

    // Ledger gateway settings
    pub ledger_gateway_url: String,
    pub contract_address: Option<String>,
    pub ledger_timeout: Duration,

    // Candidate media settings
    pub upload_dir: PathBuf,

    // CORS settings
    pub cors_allowed_origins: Vec<String>,

    // Development settings
    pub dev_mode: bool,

    /// Cadence and kill switches for the background lifecycle sweeps.
    pub sweeps: SweepEnvConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),

            database_url: env::var("DATABASE_URL").ok(),

            ledger_gateway_url: env::var("LEDGER_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:8545".to_string()),
            contract_address: env::var("CONTRACT_ADDRESS").ok(),
            ledger_timeout: duration_var("LEDGER_TIMEOUT", Duration::from_secs(30)),

            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "./uploads/candidates".to_string())
                .into(),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),

            dev_mode: env::var("DEV_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),

            sweeps: SweepEnvConfig::load_from_env(),
        })
    }

    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        // Create the candidate media directory if it doesn't exist
        std::fs::create_dir_all(&self.upload_dir)?;
        Ok(())
    }
}

/// Sweep cadence overrides. Durations accept humantime syntax ("90s", "2m").
#[derive(Debug, Clone)]
pub struct SweepEnvConfig {
    pub completion_interval: Duration,
    pub archival_interval: Duration,
    pub auto_complete: bool,
    pub auto_archive: bool,
}

impl Default for SweepEnvConfig {
    fn default() -> Self {
        Self {
            completion_interval: Duration::from_secs(60),
            archival_interval: Duration::from_secs(30),
            auto_complete: true,
            auto_archive: true,
        }
    }
}

impl SweepEnvConfig {
    fn load_from_env() -> Self {
        let defaults = Self::default();

        Self {
            completion_interval: duration_var(
                "SWEEP_COMPLETION_INTERVAL",
                defaults.completion_interval,
            ),
            archival_interval: duration_var("SWEEP_ARCHIVAL_INTERVAL", defaults.archival_interval),
            auto_complete: bool_var("SWEEP_AUTO_COMPLETE", defaults.auto_complete),
            auto_archive: bool_var("SWEEP_AUTO_ARCHIVE", defaults.auto_archive),
        }
    }
}

fn duration_var(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|raw| humantime::parse_duration(raw.trim()).ok())
        .unwrap_or(default)
}

fn bool_var(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
