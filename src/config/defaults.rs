/// Default constants used across the boot sequence.

/// Port the gateway always listens on inside the sandbox.
pub const GATEWAY_PORT: u16 = 18789;

/// Gateway run mode written into the document.
pub const GATEWAY_MODE: &str = "local";

/// Bind mode passed to onboarding and launch.
pub const GATEWAY_BIND: &str = "lan";

/// The sandbox's ingress proxy range.
pub const TRUSTED_PROXY_CIDR: &str = "10.1.0.0/16";

/// Current on-disk namespace.
pub const NAMESPACE: &str = "openclaw";

/// Namespace used by older installs and backups.
pub const LEGACY_NAMESPACE: &str = "clawdbot";

/// Sync marker filename stored at every asset root.
pub const MARKER_NAME: &str = ".last-sync";

/// Mount point of the backup store.
pub const BACKUP_DIR: &str = "/data/moltbot";

/// Subdirectory of the backup root holding skills.
pub const BACKUP_SKILLS_SUBDIR: &str = "skills";

/// Gateway executable.
pub const GATEWAY_BIN: &str = "openclaw";

/// Bound on the model-catalog request.
pub const CATALOG_TIMEOUT_SECS: u64 = 10;

/// Lock files a crashed gateway may leave behind.
pub const GATEWAY_LOCK_FILES: &[&str] = &["/tmp/openclaw-gateway.lock"];

/// Proxy provider entry name.
pub const PROXY_PROVIDER: &str = "openai";

/// API dialect of the proxy provider.
pub const PROXY_PROVIDER_API: &str = "openai-completions";

/// Direct provider entry name.
pub const DIRECT_PROVIDER: &str = "anthropic";

/// API dialect of the direct provider.
pub const DIRECT_PROVIDER_API: &str = "anthropic-messages";

/// DM policy applied when none is configured.
pub const DEFAULT_DM_POLICY: &str = "pairing";

/// DM policy that admits everyone.
pub const OPEN_DM_POLICY: &str = "open";

/// Allow-list sentinel matching every sender.
pub const ALLOW_ALL: &str = "*";

/// Web search tool.
pub const SEARCH_PROVIDER: &str = "brave";
pub const SEARCH_MAX_RESULTS: u32 = 5;
pub const SEARCH_TIMEOUT_SECONDS: u64 = 30;
pub const SEARCH_CACHE_TTL_MINUTES: u64 = 15;
