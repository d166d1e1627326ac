use crate::error::ConfigError;

const MIN_SECRET_LENGTH: usize = 32;
// bcrypt accepts costs 4..=31
const MIN_HASH_COST: u32 = 4;
const MAX_HASH_COST: u32 = 31;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub admin: Option<AdminSettings>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_hash_cost")]
    pub password_hash_cost: u32,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone, Debug)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,   // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_expiry: i64,  // seconds (e.g., 604800 for 7 days)
    pub issuer: String,
}

impl JwtSettings {
    /// Reject settings the token codec cannot run safely with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        if self.refresh_token_expiry <= self.access_token_expiry {
            return Err(ConfigError::InvalidValue(
                "jwt.refresh_token_expiry must be longer than jwt.access_token_expiry".to_string(),
            ));
        }

        if self.issuer.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.issuer".to_string()));
        }

        Ok(())
    }
}

/// Identity created with the `Admin` role at startup when it does not exist yet
#[derive(serde::Deserialize, Clone, Debug)]
pub struct AdminSettings {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Load settings from `configuration.{yaml,toml,json}` and `APP_*` environment variables.
///
/// Nested keys use a double underscore: `APP_JWT__SECRET`, `APP_APPLICATION__PORT`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.jwt.validate()?;

    if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&settings.application.password_hash_cost) {
        return Err(ConfigError::InvalidValue(format!(
            "application.password_hash_cost must be within {}..={}",
            MIN_HASH_COST, MAX_HASH_COST
        )));
    }

    Ok(settings)
}
