//! Builds the four queues, the two connectors, and the converter from a
//! validated [`Config`], spawns the six workers, and restarts any of them
//! that fail (spec.md §4.5, §9 "Restart supervision").

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::codec::Codec;
use crate::config::{Config, Mode};
use crate::converter::PacketConverter;
use crate::net::{BoundConnector, ConnectedConnector, Connector, Side};
use crate::queue::PacketQueue;

/// A running relay pipeline: four queues, two connectors, one converter,
/// six self-restarting worker tasks.
pub struct Supervisor {
    workers: Vec<JoinHandle<()>>,
    scratch_dirs: Vec<std::path::PathBuf>,
    local_addr: std::net::SocketAddr,
}

impl Supervisor {
    /// Build every component and spawn the six workers. Socket binding can
    /// fail (e.g. address in use); everything after that point is
    /// infallible at startup and only fails per-worker, handled by the
    /// restart loop below.
    pub async fn start(config: &Config) -> anyhow::Result<Self> {
        let codec = Codec::new(config.packet.protocol, config.packet.encoding);
        let capacity = config.packet.queue_capacity;
        let max_packet_size = config.packet.max_packet_size;

        let from_local = PacketQueue::new("from_local", capacity);
        let to_remote = PacketQueue::new("to_remote", capacity);
        let from_remote = PacketQueue::new("from_remote", capacity);
        let to_local = PacketQueue::new("to_local", capacity);

        // `local` is always the raw/application-facing connector and `remote`
        // is always the disguised/peer-facing one, in both modes (spec.md
        // §4.4: assemble always reads from_local and writes to_remote;
        // disassemble always reads from_remote and writes to_local). `[peer]`
        // in spec.md §1/§6 means the *other relay instance*, never the local
        // application, so the socket that learns a dynamic peer address is
        // always wired as `remote`, not `local`.
        type LocalRemote = (Arc<ConnectedConnector>, Arc<dyn Connector>, std::net::SocketAddr);

        let (local, remote, local_addr): LocalRemote = match config.mode {
            Mode::Client => {
                let local = ConnectedConnector::connect(
                    Side::Local,
                    &config.client.endpoint,
                    config.client.port,
                    max_packet_size,
                )
                .await?;
                let remote = ConnectedConnector::connect(
                    Side::Remote,
                    &config.server.endpoint,
                    config.server.port,
                    max_packet_size,
                )
                .await?;

                let local_addr = local.local_addr()?;
                (Arc::new(local), Arc::new(remote) as Arc<dyn Connector>, local_addr)
            }
            Mode::Server => {
                let local = ConnectedConnector::connect(
                    Side::Local,
                    &config.client.endpoint,
                    config.client.port,
                    max_packet_size,
                )
                .await?;
                let remote = BoundConnector::bind(
                    Side::Remote,
                    &config.server.endpoint,
                    config.server.port,
                    max_packet_size,
                )
                .await?;

                let local_addr = local.local_addr()?;
                (Arc::new(local), Arc::new(remote) as Arc<dyn Connector>, local_addr)
            }
        };

        let converter = PacketConverter::new(
            codec,
            from_local.clone(),
            to_remote.clone(),
            from_remote.clone(),
            to_local.clone(),
        );

        let mut workers = Vec::with_capacity(6);

        workers.push(spawn_restarting("local-listener", {
            let local = local.clone();
            let q = from_local.clone();
            move || {
                let local = local.clone();
                let q = q.clone();
                async move { local.run_listener(q).await }
            }
        }));
        workers.push(spawn_restarting("local-transmitter", {
            let local = local.clone();
            let q = to_local.clone();
            move || {
                let local = local.clone();
                let q = q.clone();
                async move { local.run_transmitter(q).await }
            }
        }));

        workers.push(spawn_restarting("remote-listener", {
            let remote = remote.clone();
            let q = from_remote.clone();
            move || {
                let remote = remote.clone();
                let q = q.clone();
                async move { remote.run_listener(q).await }
            }
        }));
        workers.push(spawn_restarting("remote-transmitter", {
            let remote = remote.clone();
            let q = to_remote.clone();
            move || {
                let remote = remote.clone();
                let q = q.clone();
                async move { remote.run_transmitter(q).await }
            }
        }));

        workers.push(spawn_restarting_infallible("assembler", {
            let converter = converter.clone();
            move || {
                let converter = converter.clone();
                async move { converter.assemble_worker().await }
            }
        }));
        workers.push(spawn_restarting_infallible("disassembler", {
            let converter = converter.clone();
            move || {
                let converter = converter.clone();
                async move { converter.disassemble_worker().await }
            }
        }));

        Ok(Self {
            workers,
            scratch_dirs: config.packet.scratch_dirs.clone(),
            local_addr,
        })
    }

    /// The local (application-facing) connector's source address, i.e. the
    /// OS-assigned ephemeral port it connected from. Mainly useful for
    /// diagnostics and tests.
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Run until `tokio::signal::ctrl_c()` fires, then shut the pipeline
    /// down (spec.md §4.5 "Shutdown").
    pub async fn run_until_shutdown(self) -> anyhow::Result<()> {
        tokio::signal::ctrl_c().await?;
        tracing::info!("shutting down");

        for worker in &self.workers {
            worker.abort();
        }

        let removed = cleanup_scratch_dirs(&self.scratch_dirs);
        if removed > 0 {
            tracing::info!(removed, "deleted binary scratch files");
        }

        Ok(())
    }
}

/// Delete every `*.bin` file under each configured scratch directory,
/// returning the count removed. A no-op when no scratch directories are
/// configured (the default; see SPEC_FULL.md §4.5 — this implementation
/// keeps frames in memory and doesn't stage them on disk).
fn cleanup_scratch_dirs(dirs: &[std::path::PathBuf]) -> usize {
    let mut removed = 0;

    for dir in dirs {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("bin") {
                continue;
            }

            if std::fs::remove_file(&path).is_ok() {
                tracing::debug!(path = %path.display(), "deleted scratch file");
                removed += 1;
            }
        }
    }

    removed
}

/// Wrap a worker that can fail with an `io::Result` in a restart loop:
/// errors and clean (unexpected) returns are both logged at ERROR and the
/// worker body is re-invoked, so transient failures don't kill the pipeline
/// (spec.md §9 "Restart supervision" mandates a genuine loop, not the
/// source's one-shot closure).
fn spawn_restarting<F, Fut>(name: &'static str, mut make_future: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = std::io::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match make_future().await {
                Ok(()) => {
                    tracing::error!(worker = name, "exited cleanly, restarting...");
                }
                Err(e) => {
                    tracing::error!(worker = name, error = %e, "worker failed, restarting...");
                }
            }

            tokio::time::sleep(RESTART_BACKOFF).await;
        }
    })
}

/// As [`spawn_restarting`], for workers that never return an error (the
/// codec workers only fail by panicking, which this still catches and
/// restarts from).
fn spawn_restarting_infallible<F, Fut>(name: &'static str, mut make_future: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            make_future().await;
            tracing::error!(worker = name, "exited cleanly, restarting...");
            tokio::time::sleep(RESTART_BACKOFF).await;
        }
    })
}

/// Small delay between restart attempts so a persistently failing worker
/// doesn't spin the runtime.
const RESTART_BACKOFF: Duration = Duration::from_millis(100);
