use std::net::IpAddr;
use std::path::PathBuf;

use clap::{value_parser, Arg, Command};
use presence_map_server::config::{DEFAULT_HOST, DEFAULT_PORT};
use presence_map_server::{init_tracing, serve, ServerConfig};
use tracing::warn;

fn cli() -> Command {
    Command::new("presence_map_server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Counts connected clients and broadcasts the count over WebSocket")
        .arg(
            Arg::new("port")
                .long("port")
                .env("PORT")
                .default_value("3000")
                .value_parser(value_parser!(u16))
                .help("Port to listen on"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .default_value("0.0.0.0")
                .value_parser(value_parser!(IpAddr))
                .help("Address to bind"),
        )
        .arg(
            Arg::new("static-dir")
                .long("static-dir")
                .value_parser(value_parser!(PathBuf))
                .help("Directory served as static files"),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let matches = cli().get_matches();

    let config = ServerConfig::new()
        .with_host(matches.get_one::<IpAddr>("host").copied().unwrap_or(DEFAULT_HOST))
        .with_port(matches.get_one::<u16>("port").copied().unwrap_or(DEFAULT_PORT))
        .with_static_dir(matches.get_one::<PathBuf>("static-dir").cloned());

    serve(config, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    })
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let matches = cli()
            .try_get_matches_from(["presence_map_server", "--port", "8080", "--host", "127.0.0.1"])
            .unwrap();
        assert_eq!(matches.get_one::<u16>("port"), Some(&8080));
        assert_eq!(
            matches.get_one::<IpAddr>("host"),
            Some(&"127.0.0.1".parse::<IpAddr>().unwrap())
        );
        assert!(matches.get_one::<PathBuf>("static-dir").is_none());
    }
}
