use std::path::PathBuf;

use clap::{value_parser, Arg, ArgMatches, Command};
use presence_map::boundary::BoundarySource;
use presence_map::config::{ReconnectPolicy, VizConfig};
use presence_map::scene::SvgScene;
use presence_map::sync::CountSource;
use presence_map_viewer::{init_tracing, SnapshotSink};
use tracing::{info, warn};

fn cli() -> Command {
    Command::new("presence_map_viewer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Places one point per connected client inside a boundary and writes the scene as SVG")
        .arg(
            Arg::new("boundary")
                .long("boundary")
                .required(true)
                .help("Boundary SVG: file path or http(s) URL"),
        )
        .arg(
            Arg::new("channel")
                .long("channel")
                .help("WebSocket URL of the counting service; demo mode when absent"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u32))
                .help("Seed of the point generator"),
        )
        .arg(
            Arg::new("mask-width")
                .long("mask-width")
                .value_parser(value_parser!(u32))
                .help("Raster width of the boundary mask"),
        )
        .arg(
            Arg::new("max-points")
                .long("max-points")
                .value_parser(value_parser!(usize))
                .help("Most points drawn, whatever count the channel reports"),
        )
        .arg(
            Arg::new("dot-radius")
                .long("dot-radius")
                .value_parser(value_parser!(f64))
                .help("Radius of rendered points in view box units"),
        )
        .arg(
            Arg::new("reconnect-attempts")
                .long("reconnect-attempts")
                .default_value("0")
                .value_parser(value_parser!(u32))
                .help("Reconnect attempts after the channel ends"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_parser(value_parser!(PathBuf))
                .help("SVG snapshot path, rewritten on every update"),
        )
}

fn viz_config(matches: &ArgMatches) -> VizConfig {
    let mut config = VizConfig::new();
    if let Some(seed) = matches.get_one::<u32>("seed") {
        config = config.with_seed(*seed);
    }
    if let Some(width) = matches.get_one::<u32>("mask-width") {
        config = config.with_mask_width(*width);
    }
    if let Some(max_points) = matches.get_one::<usize>("max-points") {
        config = config.with_max_points(*max_points);
    }
    if let Some(radius) = matches.get_one::<f64>("dot-radius") {
        config = config.with_dot_radius(*radius);
    }
    let attempts = matches.get_one::<u32>("reconnect-attempts").copied().unwrap_or(0);
    config.with_reconnect(ReconnectPolicy::exponential(attempts))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let matches = cli().get_matches();

    let config = viz_config(&matches);
    config.validate()?;
    let boundary = matches
        .get_one::<String>("boundary")
        .map(|location| BoundarySource::from_location(location))
        .ok_or_else(|| anyhow::anyhow!("--boundary is required"))?;
    let counts = CountSource::from_url(matches.get_one::<String>("channel").map(String::as_str));
    let scene = SvgScene::new(config.dot_radius);
    let (sink, writer) = match matches.get_one::<PathBuf>("out") {
        Some(path) => {
            let (sink, writer) = SnapshotSink::with_writer(scene, path.clone());
            (sink, Some(tokio::spawn(writer.run())))
        }
        None => (SnapshotSink::new(scene), None),
    };

    tokio::select! {
        sink = presence_map::run(config, &boundary, &counts, sink) => {
            info!(status = %sink.scene().status_text(), "viewer finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
        }
    }

    if let Some(writer) = writer {
        match writer.await {
            Ok(writes) => info!(writes, "snapshots written"),
            Err(err) => warn!(%err, "snapshot writer failed"),
        }
    }
    Ok(())
}
