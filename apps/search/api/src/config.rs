use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;
use domain_search::{IndexConfig, MlConfig};

pub use core_config::Environment;

/// Application configuration composed from the shared config libraries.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub database: PostgresConfig,
    pub redis: RedisConfig,
    pub ml: MlConfig,
    pub index: IndexConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let database = PostgresConfig::from_env()?;
        let redis = RedisConfig::from_env()?;
        let ml = MlConfig::from_env()?;
        let index = IndexConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            database,
            redis,
            ml,
            index,
        })
    }
}
