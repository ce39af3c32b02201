//! Shared constants and invariants

pub const SERVICE_NAME: &str = "voiceops-bridge-api";

pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: &str = "8000";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "http://vocalbridgeai.com";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

// Upstream protocol
pub const UPSTREAM_TOKEN_PATH: &str = "/api/v1/token";
pub const UPSTREAM_API_KEY_HEADER: &str = "X-API-Key";

// Token request contract
pub const DEFAULT_PARTICIPANT_NAME: &str = "Web User";
pub const MAX_PARTICIPANT_NAME_CHARS: usize = 64;
pub const MAX_SESSION_ID_CHARS: usize = 128;
pub const CORRELATION_ID_PREFIX: &str = "vo-";
pub const UPSTREAM_ERROR_EXCERPT_CHARS: usize = 300;
pub const MAX_UPSTREAM_REDIRECTS: usize = 5;

// Routes
pub const ROUTE_HEALTHZ: &str = "/healthz";
pub const ROUTE_VOICE_TOKEN: &str = "/api/voice-token";
pub const ROUTE_POLICY: &str = "/api/policy";
