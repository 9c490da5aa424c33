//! Connection settings for the relational sources.

use serde::Deserialize;

/// Host and credentials shared by both source databases.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub gateway_db: String,
    pub switch_db: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "password".to_string(),
            gateway_db: "gateway_db".to_string(),
            switch_db: "switch_db".to_string(),
        }
    }
}

impl SourceConfig {
    /// Build a `tokio_postgres::Config` for `dbname`.
    pub fn pg_config(&self, dbname: &str) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(dbname)
            .application_name("graphsync");
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pg_config_targets_database() {
        let config = SourceConfig::default().pg_config("switch_db");
        assert_eq!(config.get_dbname(), Some("switch_db"));
        assert_eq!(config.get_user(), Some("postgres"));
        assert_eq!(config.get_ports(), &[5432]);
    }
}
