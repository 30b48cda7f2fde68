//! Configuration module
//!
//! Settings are read from the environment (and an optional `.env` file). The Graph
//! client secret can be supplied directly or through a mounted secret file so it never
//! has to live in the process environment.

use std::env;
use std::fs;

use secrecy::{ExposeSecret, SecretString};

use crate::error::AppError;

const SERVER_PORT: u16 = 4000;
const MAX_FILES: usize = 5;
const MAX_FILE_SIZE_MB: u64 = 50;
const GRAPH_TIMEOUT_SECS: u64 = 30;
const GRAPH_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_GRAPH_LOGIN_BASE: &str = "https://login.microsoftonline.com";
pub const DEFAULT_LIBRARY_NAME: &str = "CasesandIncidentsFiles";
pub const DEFAULT_LIBRARY_ALIASES: &str = "cases and incidents files";
pub const DEFAULT_KEYWORD_PAIRS: &str = "cases+incidents,case+incident";
pub const DEFAULT_ALLOWED_EXTENSIONS: &str =
    "jpg,jpeg,png,gif,bmp,tiff,webp,mp4,avi,mov,wmv,flv,webm,mkv";

/// Values shipped in sample configuration files that must never reach Graph.
const PLACEHOLDER_VALUES: [&str; 6] = ["x", "y", "z", "changeme", "your-client-secret", "todo"];

/// Server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Microsoft Graph application credentials and endpoints
#[derive(Clone, Debug)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub site_id: String,
    pub api_base: String,
    pub login_base: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

/// Which document library receives case folders
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Preferred library name, matched as a lowercase substring
    pub target_name: String,
    /// Additional lowercase substrings accepted as the target library
    pub aliases: Vec<String>,
    /// Word pairs that both have to appear in the library name
    pub keyword_pairs: Vec<(String, String)>,
}

/// Limits applied to every submitted batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_files: usize,
    pub max_file_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct UploaderConfig {
    pub base: BaseConfig,
    pub graph: GraphConfig,
    pub library: LibraryConfig,
    pub upload: UploadPolicy,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploaderConfig>);

impl Config {
    fn as_uploader(&self) -> &UploaderConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_uploader().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploaderConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.as_uploader().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_uploader().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_uploader().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_uploader().base.environment
    }

    pub fn graph(&self) -> &GraphConfig {
        &self.as_uploader().graph
    }

    pub fn library(&self) -> &LibraryConfig {
        &self.as_uploader().library
    }

    pub fn upload_policy(&self) -> &UploadPolicy {
        &self.as_uploader().upload
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.as_uploader().upload.max_file_size_bytes
    }

    pub fn max_files(&self) -> usize {
        self.as_uploader().upload.max_files
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_uploader().upload.allowed_extensions
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `a+b,c+d` into keyword pairs. Malformed entries are skipped.
pub fn parse_keyword_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (left, right) = pair.split_once('+')?;
            let (left, right) = (left.trim().to_lowercase(), right.trim().to_lowercase());
            if left.is_empty() || right.is_empty() {
                return None;
            }
            Some((left, right))
        })
        .collect()
}

/// Read the client secret from `GRAPH_CLIENT_SECRET_FILE` when set, otherwise from
/// `GRAPH_CLIENT_SECRET`.
fn load_client_secret() -> Result<SecretString, anyhow::Error> {
    if let Ok(path) = env::var("GRAPH_CLIENT_SECRET_FILE") {
        return read_secret_file(&path);
    }

    env::var("GRAPH_CLIENT_SECRET")
        .map(SecretString::from)
        .map_err(|_| anyhow::anyhow!("GRAPH_CLIENT_SECRET or GRAPH_CLIENT_SECRET_FILE must be set"))
}

fn read_secret_file(path: &str) -> Result<SecretString, anyhow::Error> {
    let contents = fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("GRAPH_CLIENT_SECRET_FILE could not be read ({}): {}", path, e)
    })?;
    Ok(SecretString::from(contents.trim().to_string()))
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || PLACEHOLDER_VALUES
            .iter()
            .any(|p| p.eq_ignore_ascii_case(value))
}

impl LibraryConfig {
    /// Defaults targeting the cases-and-incidents library.
    pub fn cases_and_incidents() -> Self {
        Self {
            target_name: DEFAULT_LIBRARY_NAME.to_lowercase(),
            aliases: parse_list(DEFAULT_LIBRARY_ALIASES),
            keyword_pairs: parse_keyword_pairs(DEFAULT_KEYWORD_PAIRS),
        }
    }
}

impl UploadPolicy {
    pub fn new(max_files: usize, max_file_size_mb: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_files,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
        }
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(
            MAX_FILES,
            MAX_FILE_SIZE_MB,
            parse_list(DEFAULT_ALLOWED_EXTENSIONS),
        )
    }
}

impl UploaderConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
        };

        let graph = GraphConfig {
            tenant_id: env::var("GRAPH_TENANT_ID")
                .map_err(|_| anyhow::anyhow!("GRAPH_TENANT_ID must be set"))?,
            client_id: env::var("GRAPH_CLIENT_ID")
                .map_err(|_| anyhow::anyhow!("GRAPH_CLIENT_ID must be set"))?,
            client_secret: load_client_secret()?,
            site_id: env::var("SHAREPOINT_SITE_ID")
                .map_err(|_| anyhow::anyhow!("SHAREPOINT_SITE_ID must be set"))?,
            api_base: env::var("GRAPH_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GRAPH_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            login_base: env::var("GRAPH_LOGIN_BASE")
                .unwrap_or_else(|_| DEFAULT_GRAPH_LOGIN_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: env::var("GRAPH_TIMEOUT_SECS")
                .unwrap_or_else(|_| GRAPH_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(GRAPH_TIMEOUT_SECS),
            connect_timeout_secs: env::var("GRAPH_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| GRAPH_CONNECT_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(GRAPH_CONNECT_TIMEOUT_SECS),
        };

        let library = LibraryConfig {
            target_name: env::var("TARGET_LIBRARY_NAME")
                .unwrap_or_else(|_| DEFAULT_LIBRARY_NAME.to_string())
                .trim()
                .to_lowercase(),
            aliases: parse_list(
                &env::var("TARGET_LIBRARY_ALIASES")
                    .unwrap_or_else(|_| DEFAULT_LIBRARY_ALIASES.to_string()),
            ),
            keyword_pairs: parse_keyword_pairs(
                &env::var("TARGET_LIBRARY_KEYWORD_PAIRS")
                    .unwrap_or_else(|_| DEFAULT_KEYWORD_PAIRS.to_string()),
            ),
        };

        let upload = UploadPolicy::new(
            env::var("MAX_FILES")
                .unwrap_or_else(|_| MAX_FILES.to_string())
                .parse()
                .unwrap_or(MAX_FILES),
            env::var("MAX_FILE_SIZE_MB")
                .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
                .parse()
                .unwrap_or(MAX_FILE_SIZE_MB),
            parse_list(
                &env::var("ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_EXTENSIONS.to_string()),
            ),
        );

        let config = UploaderConfig {
            base,
            graph,
            library,
            upload,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let graph = &self.graph;
        for (name, value) in [
            ("GRAPH_TENANT_ID", graph.tenant_id.as_str()),
            ("GRAPH_CLIENT_ID", graph.client_id.as_str()),
            ("GRAPH_CLIENT_SECRET", graph.client_secret.expose_secret()),
            ("SHAREPOINT_SITE_ID", graph.site_id.as_str()),
        ] {
            if is_placeholder(value) {
                return Err(AppError::Configuration(format!(
                    "{} is empty or still set to a placeholder value",
                    name
                )));
            }
        }

        if self.library.target_name.is_empty() {
            return Err(AppError::Configuration(
                "TARGET_LIBRARY_NAME cannot be empty".to_string(),
            ));
        }

        if self.upload.max_files == 0 {
            return Err(AppError::Configuration(
                "MAX_FILES must be at least 1".to_string(),
            ));
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(AppError::Configuration(
                "MAX_FILE_SIZE_MB must be at least 1".to_string(),
            ));
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(AppError::Configuration(
                "ALLOWED_EXTENSIONS cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
