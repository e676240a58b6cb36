use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Where (if anywhere) the in-memory store mirrors itself on disk.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub default_classes: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { default_classes: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_max_range_days")]
    pub max_range_days: u32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self { max_range_days: default_max_range_days() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self { max_entries: default_max_entries() }
    }
}

/// A user provisioned at startup. `role` is `teacher` or `student`;
/// students carry the code of their own student record.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub api_key: String,
    #[serde(default)]
    pub student_code: Option<String>,
}

fn default_true() -> bool { true }
fn default_max_range_days() -> u32 { 366 }
fn default_max_entries() -> usize { 1000 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config built only from environment variables, used when no config file exists.
    pub fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());
        cfg.storage.snapshot_path = std::env::var("SNAPSHOT_PATH").ok();
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize();
        if self.reports.max_range_days == 0 {
            return Err(anyhow!("reports.max_range_days must be >= 1"));
        }
        if self.activity.max_entries == 0 {
            return Err(anyhow!("activity.max_entries must be >= 1"));
        }
        for user in &mut self.users {
            user.normalize()?;
        }
        let mut keys: Vec<&str> = self.users.iter().map(|u| u.api_key.as_str()).collect();
        keys.sort_unstable();
        if keys.windows(2).any(|w| w[0] == w[1]) {
            return Err(anyhow!("users[].api_key must be unique"));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize(&mut self) {
        if self.snapshot_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.snapshot_path = None;
        }
        if self.snapshot_path.is_none() {
            self.snapshot_path = std::env::var("SNAPSHOT_PATH").ok().filter(|p| !p.trim().is_empty());
        }
    }
}

impl UserConfig {
    fn normalize(&mut self) -> Result<()> {
        self.username = self.username.trim().to_string();
        self.role = self.role.trim().to_ascii_lowercase();
        if self.username.is_empty() {
            return Err(anyhow!("users[].username is required"));
        }
        if self.api_key.trim().is_empty() {
            return Err(anyhow!("users[{}].api_key is required", self.username));
        }
        match self.role.as_str() {
            "teacher" => {}
            "student" => {
                if self.student_code.as_deref().map(str::trim).unwrap_or("").is_empty() {
                    return Err(anyhow!("users[{}] has role student but no student_code", self.username));
                }
            }
            other => return Err(anyhow!("users[{}].role `{other}` is not teacher or student", self.username)),
        }
        Ok(())
    }
}
