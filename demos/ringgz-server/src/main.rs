//! Runs a Ringgz server.
//!
//! ```text
//! ringgz-server [config.json]
//! ```
//!
//! Without an argument the defaults apply (127.0.0.1:4000, random
//! starting base, two-player random matches). `RUST_LOG` overrides the
//! configured log filter.

use ringgz::prelude::*;

/// Loads the config named on the command line, or the defaults.
fn load_config(path: Option<String>) -> Result<ServerConfig, ConfigError> {
    match path {
        Some(path) => ServerConfig::from_json_file(path),
        None => Ok(ServerConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(std::env::args().nth(1))?;
    ringgz::init_tracing(&config.log_filter);

    tracing::info!(addr = %config.bind_addr, "starting Ringgz server");
    let server = RinggzServer::builder().config(config).build().await?;

    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_without_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_load_config_reads_json_file() {
        let path = std::env::temp_dir().join(format!(
            "ringgz-server-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "match_size": 3, "log_filter": "debug" }"#).unwrap();

        let config = load_config(Some(path.display().to_string())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.match_size, 3);
        assert_eq!(config.log_filter, "debug");
    }

    #[tokio::test]
    async fn test_server_accepts_join_over_tcp() {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        let server = RinggzServer::builder()
            .bind("127.0.0.1:0")
            .build()
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = server.run().await;
        });

        let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        write_half.write_all(b"join~Alice~0\n").await.unwrap();

        let mut lines = BufReader::new(read_half).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("accept"));
    }
}
