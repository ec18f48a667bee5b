/*!
`bmpd` is the collector daemon: it loads a YAML configuration, binds a listener per
`base.listen_mode`, and spawns one session task per accepted router connection.
*/
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bmp_collector::config::{Config, ListenMode};
use bmp_collector::dispatch::Dispatcher;
use bmp_collector::dns::resolve_ptr;
use bmp_collector::identity::hash_collector;
use bmp_collector::publish::rdkafka_backend::RdKafkaPublisher;
use bmp_collector::publish::Publisher;
use bmp_collector::session;
use clap::Parser;
use log::{error, info, warn};
use tokio::net::{TcpListener, TcpStream};

/// bmpd accepts BMP (RFC 7854) sessions from routers and republishes decoded events.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    /// Path to the collector's YAML configuration file.
    #[clap(name = "CONFIG")]
    config_path: std::path::PathBuf,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let opts = Opts::parse();

    let config = match Config::load(&opts.config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let admin_id = config.resolved_admin_id();
    let collector_hash = hash_collector(&admin_id);
    info!("collector '{admin_id}' starting, hash_id={collector_hash}");

    let config = Arc::new(config);
    let publisher = match spawn_publisher(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("failed to initialize kafka publisher: {e}");
            std::process::exit(1);
        }
    };
    let listeners = match bind_listeners(&config).await {
        Ok(l) => l,
        Err(e) => {
            error!("failed to bind listener: {e}");
            std::process::exit(1);
        }
    };

    let mut tasks = Vec::new();
    for listener in listeners {
        let config = config.clone();
        let publisher = publisher.clone();
        tasks.push(tokio::spawn(accept_loop(listener, config, publisher, collector_hash)));
    }
    for task in tasks {
        let _ = task.await;
    }
}

/// Starts the Kafka producer and the background task that drains the bounded publish queue
/// into it (§9 "concurrent producer" redesign): session tasks only ever touch the queue's
/// sync `Publisher::publish`, never the Kafka client itself.
fn spawn_publisher(config: &Config) -> Result<Arc<dyn Publisher>, bmp_collector::publish::PublishError> {
    let (mpsc_publisher, mut receiver) =
        bmp_collector::publish::MpscPublisher::new(config.kafka.queue_buffering_max_messages as usize);
    let kafka_publisher = RdKafkaPublisher::new(&config.kafka)?;
    tokio::spawn(async move {
        while let Some(req) = receiver.recv().await {
            if let Err(e) = kafka_publisher.send(&req).await {
                warn!("failed to publish to kafka: {e}");
            }
        }
    });
    Ok(Arc::new(mpsc_publisher))
}

async fn bind_listeners(config: &Config) -> std::io::Result<Vec<TcpListener>> {
    let port = config.base.listen_port;
    let mut listeners = Vec::new();
    match config.base.listen_mode {
        ListenMode::V4 => {
            listeners.push(TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?);
        }
        ListenMode::V6 => {
            listeners
                .push(TcpListener::bind(SocketAddr::from(([0u16; 8], port))).await?);
        }
        ListenMode::V4v6 => {
            listeners.push(TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?);
            listeners.push(TcpListener::bind(SocketAddr::from(([0u16; 8], port))).await?);
        }
    }
    Ok(listeners)
}

async fn accept_loop(
    listener: TcpListener,
    config: Arc<Config>,
    publisher: Arc<dyn Publisher>,
    collector_hash: bmp_collector::identity::HashId,
) {
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };
        let config = config.clone();
        let publisher = publisher.clone();
        tokio::spawn(handle_router(stream, addr.ip(), config, publisher, collector_hash));
    }
}

async fn handle_router(
    stream: TcpStream,
    peer_ip: IpAddr,
    config: Arc<Config>,
    publisher: Arc<dyn Publisher>,
    collector_hash: bmp_collector::identity::HashId,
) {
    let hostname = resolve_ptr(peer_ip).await;
    let router_group = bmp_collector::publish::topic::match_router_group(
        &config.mapping.groups.router_groups,
        hostname.as_deref(),
        peer_ip,
    );
    info!("router {peer_ip} ({hostname:?}) assigned to group '{router_group:?}'");

    let mut dispatcher = Dispatcher::new(config.clone(), publisher, collector_hash, hostname, router_group);
    let result = session::run(stream, peer_ip, collector_hash, |msg, raw, sess| {
        if config.debug.bmp {
            log::debug!("router {peer_ip}: {:?}", msg.common_header.msg_type);
        }
        dispatcher.dispatch(sess, msg, raw);
    })
    .await;

    if let Err(e) = result {
        warn!("session with router {peer_ip} ended: {e}");
    } else {
        info!("session with router {peer_ip} closed");
    }
}
