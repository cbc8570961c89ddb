use std::env;

/// Process-wide settings loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub environment: String,
    pub client_url: String,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl AppConfig {
    /// Load configuration from environment variables (after `.env`).
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| "PORT must be a valid number")?,
            mongodb_uri: env::var("MONGODB_URI").map_err(|_| "MONGODB_URI is required")?,
            database_name: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "writeora".to_string()),
            jwt_secret: env::var("JWT_SECRET").map_err(|_| "JWT_SECRET is required")?,
            environment: environment_name(env::var("APP_ENV").ok()),
            client_url: env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gemini: GeminiConfig::from_env(),
        })
    }

    /// Only an explicit `development` relaxes secure-cookie settings.
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Normalized `APP_ENV`, `production` when unset or blank.
fn environment_name(raw: Option<String>) -> String {
    raw.map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "production".to_string())
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            base_url: env::var("GEMINI_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
        }
    }
}
