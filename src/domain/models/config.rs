use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration structure for swapguard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Upstream HR API connection and credentials
    #[serde(default)]
    pub hr_api: HrApiConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Circuit breaker guarding the HR API
    #[serde(default)]
    pub circuit_breaker: BreakerConfig,

    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Credential lifetime handling
    #[serde(default)]
    pub token: TokenConfig,

    /// Narrative (explanation text) generation
    #[serde(default)]
    pub narrative: NarrativeConfig,

    /// Validation rule tables
    #[serde(default)]
    pub rules: RulesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HR API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HrApiConfig {
    /// Base URL, e.g. `https://hr.example.com/api/v1/`
    #[serde(default = "default_hr_base_url")]
    pub base_url: String,

    /// Service account email used for login
    #[serde(default)]
    pub email: String,

    /// Service account password used for login
    #[serde(default)]
    pub password: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_hr_timeout_secs")]
    pub timeout_secs: u64,

    /// Field that wraps payloads in API responses
    #[serde(default = "default_envelope_key")]
    pub envelope_key: String,

    /// Login endpoint, relative to `base_url`
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Token refresh endpoint, relative to `base_url`
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Cookie that carries the token when the login body does not
    #[serde(default = "default_auth_cookie")]
    pub auth_cookie: String,
}

fn default_hr_base_url() -> String {
    "http://localhost:8000/api/v1/".to_string()
}

const fn default_hr_timeout_secs() -> u64 {
    10
}

fn default_envelope_key() -> String {
    "data".to_string()
}

fn default_login_path() -> String {
    "login".to_string()
}

fn default_refresh_path() -> String {
    "auth/refresh".to_string()
}

fn default_auth_cookie() -> String {
    "auth_token".to_string()
}

impl Default for HrApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_hr_base_url(),
            email: String::new(),
            password: String::new(),
            timeout_secs: default_hr_timeout_secs(),
            envelope_key: default_envelope_key(),
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            auth_cookie: default_auth_cookie(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Additional attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    4000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BreakerConfig {
    /// Consecutive failures that open the circuit
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Seconds to stay open before allowing a trial request
    #[serde(default = "default_breaker_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether the breaker gates requests at all
    #[serde(default = "default_true")]
    pub enabled: bool,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_breaker_timeout_secs() -> u64 {
    60
}

const fn default_true() -> bool {
    true
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            timeout_secs: default_breaker_timeout_secs(),
            enabled: true,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Maximum number of entries
    #[serde(default = "default_cache_max_size")]
    pub max_size: usize,

    /// TTL used when a caller gives none
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    #[serde(default = "default_ttl_secs")]
    pub employee_ttl_secs: u64,

    #[serde(default = "default_ttl_secs")]
    pub shift_ttl_secs: u64,

    #[serde(default = "default_availability_ttl_secs")]
    pub availability_ttl_secs: u64,

    #[serde(default = "default_fatigue_ttl_secs")]
    pub fatigue_ttl_secs: u64,

    /// Interval of the background expiry sweep; 0 disables it
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

const fn default_cache_max_size() -> usize {
    500
}

const fn default_ttl_secs() -> u64 {
    300
}

const fn default_availability_ttl_secs() -> u64 {
    120
}

const fn default_fatigue_ttl_secs() -> u64 {
    60
}

const fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_cache_max_size(),
            default_ttl_secs: default_ttl_secs(),
            employee_ttl_secs: default_ttl_secs(),
            shift_ttl_secs: default_ttl_secs(),
            availability_ttl_secs: default_availability_ttl_secs(),
            fatigue_ttl_secs: default_fatigue_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Credential lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TokenConfig {
    /// A token is treated as expired this many seconds before its real expiry
    #[serde(default = "default_safety_margin_secs")]
    pub safety_margin_secs: i64,

    /// Lifetime assumed when the token carries no readable expiry
    #[serde(default = "default_lifetime_secs")]
    pub default_lifetime_secs: i64,

    /// Log in when the service starts instead of on first use
    #[serde(default = "default_true")]
    pub preauthenticate: bool,
}

const fn default_safety_margin_secs() -> i64 {
    300
}

const fn default_lifetime_secs() -> i64 {
    3600
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            safety_margin_secs: default_safety_margin_secs(),
            default_lifetime_secs: default_lifetime_secs(),
            preauthenticate: true,
        }
    }
}

/// Narrative generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NarrativeConfig {
    /// When false the deterministic fallback text is always used
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_narrative_base_url")]
    pub base_url: String,

    #[serde(default = "default_narrative_model")]
    pub model: String,

    #[serde(default = "default_narrative_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_narrative_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_narrative_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_narrative_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

const fn default_narrative_max_tokens() -> u32 {
    150
}

const fn default_narrative_timeout_secs() -> u64 {
    15
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: default_narrative_base_url(),
            model: default_narrative_model(),
            max_tokens: default_narrative_max_tokens(),
            timeout_secs: default_narrative_timeout_secs(),
        }
    }
}

/// Validation rule tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RulesConfig {
    #[serde(default)]
    pub fatigue: FatigueRules,

    #[serde(default)]
    pub compliance: ComplianceRules,
}

/// Fatigue projection rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FatigueRules {
    /// Projected score at or above which the swap is rejected
    #[serde(default = "default_high_risk_threshold")]
    pub high_risk_threshold: i64,

    /// Base fatigue added by a shift of each type
    #[serde(default = "default_shift_impact")]
    pub shift_impact: BTreeMap<String, i64>,

    /// Base impact for shift types missing from the table
    #[serde(default = "default_shift_impact_fallback")]
    pub default_impact: i64,
}

const fn default_high_risk_threshold() -> i64 {
    60
}

fn default_shift_impact() -> BTreeMap<String, i64> {
    BTreeMap::from([
        ("night".to_string(), 15),
        ("evening".to_string(), 8),
        ("day".to_string(), 5),
    ])
}

const fn default_shift_impact_fallback() -> i64 {
    10
}

impl Default for FatigueRules {
    fn default() -> Self {
        Self {
            high_risk_threshold: default_high_risk_threshold(),
            shift_impact: default_shift_impact(),
            default_impact: default_shift_impact_fallback(),
        }
    }
}

/// Working-time compliance rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComplianceRules {
    #[serde(default = "default_max_weekly_hours")]
    pub max_weekly_hours: f64,

    #[serde(default = "default_min_rest_hours")]
    pub min_rest_between_shifts_hours: f64,

    #[serde(default = "default_max_consecutive_days")]
    pub max_consecutive_days: u32,

    #[serde(default = "default_max_daily_hours")]
    pub max_daily_hours: f64,
}

const fn default_max_weekly_hours() -> f64 {
    56.0
}

const fn default_min_rest_hours() -> f64 {
    8.0
}

const fn default_max_consecutive_days() -> u32 {
    6
}

const fn default_max_daily_hours() -> f64 {
    12.0
}

impl Default for ComplianceRules {
    fn default() -> Self {
        Self {
            max_weekly_hours: default_max_weekly_hours(),
            min_rest_between_shifts_hours: default_min_rest_hours(),
            max_consecutive_days: default_max_consecutive_days(),
            max_daily_hours: default_max_daily_hours(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
