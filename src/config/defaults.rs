/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Icon cache defaults
pub const DEFAULT_CACHE_PATH: &str = "./data/icons";

// Remote icon store (Cloudinary) defaults
pub const DEFAULT_CLOUD_NAME: &str = "dsupi8dff";
pub const DEFAULT_UPLOAD_PRESET: &str = "bookmark";
pub const DEFAULT_FOLDER: &str = "favicons";
pub const DEFAULT_TRANSFORMATION: &str = "c_pad,w_64,h_64,q_auto,f_auto";
pub const DEFAULT_FETCH_TRANSFORMATION: &str = "f_auto,q_auto,w_80,h_80,c_fill,r_max";
pub const DEFAULT_TAGS: &[&str] = &["auto_fetched", "favicon"];
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_DELIVERY_BASE: &str = "https://res.cloudinary.com";

// Public provider defaults
pub const DEFAULT_GOOGLE_SIZE: u32 = 128;

// Probe defaults
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PROBE_MAX_BYTES: u64 = 5 * 1024 * 1024; // 5MB
pub const DEFAULT_USER_AGENT: &str = concat!("favicon-resolver/", env!("CARGO_PKG_VERSION"));

// Ranking defaults
/// Icons this wide or narrower are generic placeholders (Google's globe is 16x16)
pub const DEFAULT_PLACEHOLDER_MAX_WIDTH: u32 = 16;
pub const DEFAULT_PUBLISH_MIN_WIDTH: u32 = 128;

// Environment
pub const ENV_PREFIX: &str = "FAVICON_RESOLVER_";
pub const DEFAULT_CONFIG_FILE: &str = "favicon-resolver.toml";
