use clap::Parser;
use queryx_client::config::{API_URL_ENV, DEFAULT_BASE_URL};
use queryx_client::ClientConfig;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "queryx-studio")]
#[command(about = "QueryX Studio - Browser console for QueryX databases")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    /// Address to bind to (localhost only for security)
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Base URL of the QueryX API server
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Timeout for API requests in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Don't open browser automatically
    #[arg(long, default_value_t = false)]
    pub no_open: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub host: String,
    pub port: u16,
    pub api_url: String,
    pub api_timeout: Duration,
    pub open_browser: bool,
}

impl From<Args> for StudioConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            api_url: args.api_url,
            api_timeout: Duration::from_secs(args.timeout_secs),
            open_browser: !args.no_open,
        }
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            api_url: DEFAULT_BASE_URL.to_string(),
            api_timeout: Duration::from_secs(30),
            open_browser: false,
        }
    }
}

impl StudioConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Configuration of the client the studio calls the API with.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.api_url)
            .with_timeout(self.api_timeout)
            .with_user_agent(format!("queryx-studio/{}", env!("CARGO_PKG_VERSION")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_convert_to_config() {
        let args = Args::parse_from([
            "queryx-studio",
            "--port",
            "4000",
            "--api-url",
            "http://api.internal:8080",
            "--timeout-secs",
            "5",
            "--no-open",
        ]);
        let config = StudioConfig::from(args);

        assert_eq!(config.listen_addr(), "127.0.0.1:4000");
        assert_eq!(config.base_url(), "http://127.0.0.1:4000");
        assert!(!config.open_browser);

        let client = config.client_config();
        assert_eq!(client.base_url, "http://api.internal:8080");
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert!(client.user_agent.starts_with("queryx-studio/"));
    }
}
