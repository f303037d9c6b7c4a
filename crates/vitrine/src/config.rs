//! Run configuration.
//!
//! A [`RunConfig`] is resolved once at run start from layered sources and
//! then shared read-only (`Arc<RunConfig>`) by the fixture, the harness and
//! every page object that needs a URL or a timeout.
//!
//! Precedence, lowest first:
//!
//! ```text
//! defaults  <  YAML file  <  VITRINE_* environment  <  CLI flags
//! ```
//!
//! Every layer is a [`ConfigLayer`] of optional fields. Values are parsed
//! and type-checked when the layer is built, and the merged result is
//! validated before anything runs, so a bad value never surfaces mid-run.

use crate::result::{VitrineError, VitrineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::{Host, Url};

/// Default storefront under test
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// Password shared by every built-in storefront account
pub const DEFAULT_PASSWORD: &str = "secret_sauce";

/// Environment variable naming an optional YAML config file
pub const CONFIG_FILE_ENV: &str = "VITRINE_CONFIG";

const MAX_TIMEOUT_MS: u64 = 300_000;
const MAX_TEST_TIMEOUT_MS: u64 = 3_600_000;
const MAX_PARALLELISM: usize = 64;
const MAX_RETRIES: u32 = 10;
const MAX_SLOW_MO_MS: u64 = 10_000;

/// Browser engine to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Chromium (CDP)
    #[default]
    Chromium,
    /// Firefox
    Firefox,
    /// WebKit
    Webkit,
}

impl BrowserKind {
    /// All supported kinds
    pub const ALL: [Self; 3] = [Self::Chromium, Self::Firefox, Self::Webkit];

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" => Ok(Self::Chromium),
            "firefox" => Ok(Self::Firefox),
            "webkit" => Ok(Self::Webkit),
            other => Err(format!(
                "unknown browser '{other}' (expected chromium, firefox or webkit)"
            )),
        }
    }
}

/// Which driver implementation backs the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverBackend {
    /// Real browser over the Chrome DevTools Protocol
    #[default]
    Cdp,
    /// In-process storefront model
    Simulated,
}

impl fmt::Display for DriverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cdp => "cdp",
            Self::Simulated => "simulated",
        })
    }
}

impl FromStr for DriverBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cdp" => Ok(Self::Cdp),
            "simulated" | "sim" => Ok(Self::Simulated),
            other => Err(format!(
                "unknown driver '{other}' (expected cdp or simulated)"
            )),
        }
    }
}

/// Minimum level for log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace
    Trace,
    /// Debug
    Debug,
    /// Info
    #[default]
    Info,
    /// Warn
    Warn,
    /// Error
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for this level
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Role of a storefront account
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular shopper
    Standard,
    /// Account that is locked out
    Locked,
    /// Account that sees a broken UI
    Problem,
    /// Account with artificially slow responses
    Performance,
    /// Account whose actions raise errors
    Error,
    /// Account with visual defects
    Visual,
}

impl UserRole {
    /// All roles
    pub const ALL: [Self; 6] = [
        Self::Standard,
        Self::Locked,
        Self::Problem,
        Self::Performance,
        Self::Error,
        Self::Visual,
    ];

    /// Lowercase role name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Locked => "locked",
            Self::Problem => "problem",
            Self::Performance => "performance",
            Self::Error => "error",
            Self::Visual => "visual",
        }
    }

    /// Username the storefront ships for this role
    #[must_use]
    pub const fn default_username(self) -> &'static str {
        match self {
            Self::Standard => "standard_user",
            Self::Locked => "locked_out_user",
            Self::Problem => "problem_user",
            Self::Performance => "performance_glitch_user",
            Self::Error => "error_user",
            Self::Visual => "visual_user",
        }
    }

    /// Environment variable overriding this role's username
    #[must_use]
    pub fn env_key(self) -> String {
        format!("VITRINE_USER_{}", self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(Self::Standard),
            "locked" | "locked_out" => Ok(Self::Locked),
            "problem" => Ok(Self::Problem),
            "performance" | "performance_glitch" | "performance_degraded" => {
                Ok(Self::Performance)
            }
            "error" => Ok(Self::Error),
            "visual" => Ok(Self::Visual),
            other => Err(format!("unknown user role '{other}'")),
        }
    }
}

/// Username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credential {
    /// Create a credential
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Credentials keyed by role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialTable {
    entries: BTreeMap<UserRole, Credential>,
}

impl Default for CredentialTable {
    fn default() -> Self {
        let entries = UserRole::ALL
            .iter()
            .map(|role| {
                (
                    *role,
                    Credential::new(role.default_username(), DEFAULT_PASSWORD),
                )
            })
            .collect();
        Self { entries }
    }
}

impl CredentialTable {
    /// Credential for a role
    pub fn get(&self, role: UserRole) -> VitrineResult<&Credential> {
        self.entries
            .get(&role)
            .ok_or_else(|| VitrineError::config("credentials", format!("no entry for role '{role}'")))
    }

    /// Credential for a role given by name
    pub fn get_by_name(&self, role: &str) -> VitrineResult<&Credential> {
        let role = role
            .parse::<UserRole>()
            .map_err(|reason| VitrineError::config("credentials", reason))?;
        self.get(role)
    }

    /// Override one role's username
    pub fn set_username(&mut self, role: UserRole, username: impl Into<String>) {
        let username = username.into();
        self.entries
            .entry(role)
            .and_modify(|c| c.username.clone_from(&username))
            .or_insert_with(|| Credential::new(username, DEFAULT_PASSWORD));
    }

    /// Override the password of every role
    pub fn set_password(&mut self, password: &str) {
        for credential in self.entries.values_mut() {
            credential.password = password.to_string();
        }
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = (&UserRole, &Credential)> {
        self.entries.iter()
    }

    /// Copy with passwords masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.set_password("********");
        copy
    }

    fn validate(&self) -> VitrineResult<()> {
        for role in UserRole::ALL {
            let credential = self.get(role)?;
            if credential.username.trim().is_empty() {
                return Err(VitrineError::config(
                    role.env_key(),
                    "username must not be empty",
                ));
            }
            if credential.password.is_empty() {
                return Err(VitrineError::config(
                    "VITRINE_PASSWORD",
                    "password must not be empty",
                ));
            }
        }
        Ok(())
    }
}

/// Browser viewport size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{w}'"))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{h}'"))?;
        Ok(Self { width, height })
    }
}

/// Resolved run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// Storefront base URL, without trailing slash
    pub base_url: String,
    /// Browser engine
    pub browser: BrowserKind,
    /// Run without a visible window
    pub headless: bool,
    /// Default timeout for element operations
    pub default_timeout_ms: u64,
    /// Timeout for page navigations
    pub navigation_timeout_ms: u64,
    /// Number of concurrently running tests
    pub parallelism: usize,
    /// Extra attempts after a failed test
    pub retries: u32,
    /// Delay inserted after each interaction
    pub slow_mo_ms: u64,
    /// Viewport size
    pub viewport: Viewport,
    /// Keep a screenshot of every failed test
    pub screenshot_on_failure: bool,
    /// Where failure screenshots go
    pub screenshot_dir: PathBuf,
    /// Where reports go
    pub report_dir: PathBuf,
    /// Where log files go
    pub log_dir: PathBuf,
    /// Log level
    pub log_level: LogLevel,
    /// Driver backend
    pub driver: DriverBackend,
    /// Seed for generated test data; random when unset
    pub data_seed: Option<u64>,
    /// Upper bound for one test attempt
    pub test_timeout_ms: u64,
    /// Credentials keyed by role
    pub credentials: CredentialTable,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserKind::Chromium,
            headless: false,
            default_timeout_ms: 30_000,
            navigation_timeout_ms: 30_000,
            parallelism: 4,
            retries: 1,
            slow_mo_ms: 0,
            viewport: Viewport::default(),
            screenshot_on_failure: true,
            screenshot_dir: PathBuf::from("screenshots"),
            report_dir: PathBuf::from("reports"),
            log_dir: PathBuf::from("logs"),
            log_level: LogLevel::Info,
            driver: DriverBackend::Cdp,
            data_seed: None,
            test_timeout_ms: 120_000,
            credentials: CredentialTable::default(),
        }
    }
}

impl RunConfig {
    /// Resolve defaults, an optional file, the environment and explicit
    /// overrides into a validated configuration.
    ///
    /// When `file` is `None`, `VITRINE_CONFIG` may name the file instead.
    pub fn resolve(
        file: Option<&Path>,
        env: &impl EnvSource,
        overrides: ConfigLayer,
    ) -> VitrineResult<Self> {
        let mut config = Self::default();

        let env_file = env
            .var(CONFIG_FILE_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        if let Some(path) = file.map(Path::to_path_buf).or(env_file) {
            config.merge(ConfigLayer::from_file(&path)?);
        }

        config.merge(ConfigLayer::from_env(env)?);
        config.merge(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply a layer on top of the current values
    pub fn merge(&mut self, layer: ConfigLayer) {
        if let Some(url) = layer.base_url {
            self.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(browser) = layer.browser {
            self.browser = browser;
        }
        if let Some(headless) = layer.headless {
            self.headless = headless;
        }
        if let Some(ms) = layer.default_timeout_ms {
            self.default_timeout_ms = ms;
        }
        if let Some(ms) = layer.navigation_timeout_ms {
            self.navigation_timeout_ms = ms;
        }
        if let Some(n) = layer.parallelism {
            self.parallelism = n;
        }
        if let Some(n) = layer.retries {
            self.retries = n;
        }
        if let Some(ms) = layer.slow_mo_ms {
            self.slow_mo_ms = ms;
        }
        if let Some(viewport) = layer.viewport {
            self.viewport = viewport;
        }
        if let Some(flag) = layer.screenshot_on_failure {
            self.screenshot_on_failure = flag;
        }
        if let Some(dir) = layer.screenshot_dir {
            self.screenshot_dir = dir;
        }
        if let Some(dir) = layer.report_dir {
            self.report_dir = dir;
        }
        if let Some(dir) = layer.log_dir {
            self.log_dir = dir;
        }
        if let Some(level) = layer.log_level {
            self.log_level = level;
        }
        if let Some(driver) = layer.driver {
            self.driver = driver;
        }
        if let Some(seed) = layer.data_seed {
            self.data_seed = Some(seed);
        }
        if let Some(ms) = layer.test_timeout_ms {
            self.test_timeout_ms = ms;
        }
        if let Some(password) = layer.password {
            self.credentials.set_password(&password);
        }
        for (role, username) in layer.users {
            self.credentials.set_username(role, username);
        }
    }

    /// Check every option; the first violation is reported
    pub fn validate(&self) -> VitrineResult<()> {
        validate_base_url(&self.base_url)?;
        check_range("default_timeout_ms", self.default_timeout_ms, 1, MAX_TIMEOUT_MS)?;
        check_range(
            "navigation_timeout_ms",
            self.navigation_timeout_ms,
            1,
            MAX_TIMEOUT_MS,
        )?;
        check_range("test_timeout_ms", self.test_timeout_ms, 1, MAX_TEST_TIMEOUT_MS)?;
        check_range("parallelism", self.parallelism as u64, 1, MAX_PARALLELISM as u64)?;
        check_range("retries", u64::from(self.retries), 0, u64::from(MAX_RETRIES))?;
        check_range("slow_mo_ms", self.slow_mo_ms, 0, MAX_SLOW_MO_MS)?;
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(VitrineError::config(
                "viewport",
                "width and height must be positive",
            ));
        }
        for (option, dir) in [
            ("screenshot_dir", &self.screenshot_dir),
            ("report_dir", &self.report_dir),
            ("log_dir", &self.log_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(VitrineError::config(option, "directory must not be empty"));
            }
        }
        self.credentials.validate()
    }

    /// Default element timeout
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Navigation timeout
    #[must_use]
    pub const fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Per-test timeout
    #[must_use]
    pub const fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    /// Absolute URL for a storefront path
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Copy with passwords masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            credentials: self.credentials.redacted(),
            ..self.clone()
        }
    }
}

fn validate_base_url(url: &str) -> VitrineResult<()> {
    let invalid = |reason: String| VitrineError::config("base_url", format!("'{url}' {reason}"));
    let parsed = Url::parse(url).map_err(|e| invalid(format!("is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("must start with http:// or https://".to_string()));
    }
    match parsed.host() {
        Some(Host::Domain(domain))
            if domain.trim_end_matches('.').split('.').any(str::is_empty) =>
        {
            return Err(invalid("has an empty host label".to_string()));
        }
        Some(_) => {}
        None => return Err(invalid("has no host".to_string())),
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment".to_string()));
    }
    Ok(())
}

fn check_range<T>(option: &str, value: T, min: T, max: T) -> VitrineResult<()>
where
    T: PartialOrd + fmt::Display,
{
    if value < min || value > max {
        return Err(VitrineError::config(
            option,
            format!("{value} is outside {min}..={max}"),
        ));
    }
    Ok(())
}

/// One source of configuration values; unset fields leave lower layers alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    /// Storefront base URL
    pub base_url: Option<String>,
    /// Browser engine
    pub browser: Option<BrowserKind>,
    /// Headless flag
    pub headless: Option<bool>,
    /// Element timeout
    pub default_timeout_ms: Option<u64>,
    /// Navigation timeout
    pub navigation_timeout_ms: Option<u64>,
    /// Worker count
    pub parallelism: Option<usize>,
    /// Retry count
    pub retries: Option<u32>,
    /// Slow-motion delay
    pub slow_mo_ms: Option<u64>,
    /// Viewport size
    pub viewport: Option<Viewport>,
    /// Failure screenshots
    pub screenshot_on_failure: Option<bool>,
    /// Screenshot directory
    pub screenshot_dir: Option<PathBuf>,
    /// Report directory
    pub report_dir: Option<PathBuf>,
    /// Log directory
    pub log_dir: Option<PathBuf>,
    /// Log level
    pub log_level: Option<LogLevel>,
    /// Driver backend
    pub driver: Option<DriverBackend>,
    /// Data seed
    pub data_seed: Option<u64>,
    /// Per-test timeout
    pub test_timeout_ms: Option<u64>,
    /// Shared password
    pub password: Option<String>,
    /// Username overrides by role
    #[serde(default)]
    pub users: BTreeMap<UserRole, String>,
}

impl ConfigLayer {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> VitrineResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Read a YAML file
    pub fn from_file(path: &Path) -> VitrineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            VitrineError::config(
                CONFIG_FILE_ENV,
                format!("cannot read {}: {e}", path.display()),
            )
        })?;
        Self::from_yaml_str(&text).map_err(|e| {
            VitrineError::config(CONFIG_FILE_ENV, format!("{}: {e}", path.display()))
        })
    }

    /// Read `VITRINE_*` variables. Empty values count as unset.
    pub fn from_env(env: &impl EnvSource) -> VitrineResult<Self> {
        let mut users = BTreeMap::new();
        for role in UserRole::ALL {
            if let Some(name) = non_empty(env, &role.env_key()) {
                let _ = users.insert(role, name);
            }
        }

        Ok(Self {
            base_url: non_empty(env, "VITRINE_BASE_URL"),
            browser: parse_env(env, "VITRINE_BROWSER")?,
            headless: parse_env_bool(env, "VITRINE_HEADLESS")?,
            default_timeout_ms: parse_env_in_range(env, "VITRINE_TIMEOUT_MS", 1, MAX_TIMEOUT_MS)?,
            navigation_timeout_ms: parse_env_in_range(
                env,
                "VITRINE_NAVIGATION_TIMEOUT_MS",
                1,
                MAX_TIMEOUT_MS,
            )?,
            parallelism: parse_env_in_range(env, "VITRINE_WORKERS", 1, MAX_PARALLELISM)?,
            retries: parse_env_in_range(env, "VITRINE_RETRIES", 0, MAX_RETRIES)?,
            slow_mo_ms: parse_env_in_range(env, "VITRINE_SLOW_MO_MS", 0, MAX_SLOW_MO_MS)?,
            viewport: parse_env(env, "VITRINE_VIEWPORT")?,
            screenshot_on_failure: parse_env_bool(env, "VITRINE_SCREENSHOT_ON_FAILURE")?,
            screenshot_dir: non_empty(env, "VITRINE_SCREENSHOT_DIR").map(PathBuf::from),
            report_dir: non_empty(env, "VITRINE_REPORT_DIR").map(PathBuf::from),
            log_dir: non_empty(env, "VITRINE_LOG_DIR").map(PathBuf::from),
            log_level: parse_env(env, "VITRINE_LOG_LEVEL")?,
            driver: parse_env(env, "VITRINE_DRIVER")?,
            data_seed: parse_env(env, "VITRINE_DATA_SEED")?,
            test_timeout_ms: parse_env_in_range(env, "VITRINE_TEST_TIMEOUT_MS", 1, MAX_TEST_TIMEOUT_MS)?,
            password: non_empty(env, "VITRINE_PASSWORD"),
            users,
        })
    }
}

/// Source of environment variables
pub trait EnvSource {
    /// Value of `key`, if set
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

fn non_empty(env: &impl EnvSource, key: &str) -> Option<String> {
    env.var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(env: &impl EnvSource, key: &str) -> VitrineResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    non_empty(env, key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| VitrineError::config(key, format!("invalid value '{raw}': {e}")))
        })
        .transpose()
}

/// Parse `key` and reject values outside `min..=max`, naming the variable
fn parse_env_in_range<T>(
    env: &impl EnvSource,
    key: &str,
    min: T,
    max: T,
) -> VitrineResult<Option<T>>
where
    T: FromStr + PartialOrd + fmt::Display,
    T::Err: fmt::Display,
{
    parse_env::<T>(env, key)?
        .map(|value| check_range(key, &value, &min, &max).map(|()| value))
        .transpose()
}

fn parse_env_bool(env: &impl EnvSource, key: &str) -> VitrineResult<Option<bool>> {
    non_empty(env, key)
        .map(|raw| {
            parse_bool(&raw)
                .ok_or_else(|| VitrineError::config(key, format!("'{raw}' is not a boolean")))
        })
        .transpose()
}

/// Accepts true/false, 1/0, yes/no and on/off
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
