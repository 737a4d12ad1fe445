//! Wires two in-process `Supervisor`s back to back over loopback sockets and
//! checks identity pass-through in both directions (spec.md §8, scenario 1).

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::time::Duration;

use relay_core::config::{Config, EndpointConfig, Encoding, LogLevel, Mode, PacketConfig, Protocol};
use relay_core::Supervisor;
use tokio::net::UdpSocket;

fn pick_free_port() -> u16 {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap().port()
}

fn passthrough_config(mode: Mode, client: EndpointConfig, server: EndpointConfig) -> Config {
    Config {
        log_level: LogLevel::Info,
        mode,
        client,
        server,
        packet: PacketConfig {
            protocol: Protocol::None,
            encoding: Encoding::None,
            queue_capacity: 100,
            max_packet_size: 9000,
            scratch_dirs: Vec::new(),
        },
    }
}

async fn recv_with_timeout(socket: &UdpSocket) -> (Vec<u8>, SocketAddr) {
    let mut buf = vec![0u8; 1024];
    let (len, from) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
        .await
        .expect("packet did not arrive before timeout")
        .unwrap();
    (buf[..len].to_vec(), from)
}

#[tokio::test]
async fn identity_pass_through_round_trips_in_both_directions() {
    let app = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let backend = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let app_addr = app.local_addr().unwrap();
    let backend_addr = backend.local_addr().unwrap();
    let relay_port = pick_free_port();

    let server_relay_config = passthrough_config(
        Mode::Server,
        EndpointConfig {
            endpoint: backend_addr.ip().to_string(),
            port: backend_addr.port(),
        },
        EndpointConfig {
            endpoint: "127.0.0.1".to_string(),
            port: relay_port,
        },
    );
    let server_relay = Supervisor::start(&server_relay_config).await.unwrap();

    let client_relay_config = passthrough_config(
        Mode::Client,
        EndpointConfig {
            endpoint: app_addr.ip().to_string(),
            port: app_addr.port(),
        },
        EndpointConfig {
            endpoint: "127.0.0.1".to_string(),
            port: relay_port,
        },
    );
    let client_relay = Supervisor::start(&client_relay_config).await.unwrap();

    // `client_relay`'s local connector bound an ephemeral source port when it
    // connected out to `app_addr`; the test plays the role of `app` and needs
    // that address to send the first datagram.
    let client_relay_local = client_relay.local_addr();

    app.send_to(b"hello", client_relay_local).await.unwrap();
    let (received, relay_to_backend_addr) = recv_with_timeout(&backend).await;
    assert_eq!(received, b"hello");

    backend
        .send_to(b"world", relay_to_backend_addr)
        .await
        .unwrap();
    let (received, _) = recv_with_timeout(&app).await;
    assert_eq!(received, b"world");

    drop(server_relay);
    drop(client_relay);
}

/// Regression test for the `local`/`remote` connector assignment in `server`
/// mode (see DESIGN.md): with a non-identity disguise, a backwards wiring
/// would re-disguise already-disguised bytes arriving from the peer instead
/// of decoding them, and the backend would see garbage instead of the
/// original payload.
#[tokio::test]
async fn dns_disguise_round_trips_through_server_mode_relay() {
    let app = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let backend = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let app_addr = app.local_addr().unwrap();
    let backend_addr = backend.local_addr().unwrap();
    let relay_port = pick_free_port();

    let disguised = |mode, client, server| Config {
        log_level: LogLevel::Info,
        mode,
        client,
        server,
        packet: PacketConfig {
            protocol: Protocol::Dns,
            encoding: Encoding::Base64,
            queue_capacity: 100,
            max_packet_size: 9000,
            scratch_dirs: Vec::new(),
        },
    };

    let server_relay_config = disguised(
        Mode::Server,
        EndpointConfig {
            endpoint: backend_addr.ip().to_string(),
            port: backend_addr.port(),
        },
        EndpointConfig {
            endpoint: "127.0.0.1".to_string(),
            port: relay_port,
        },
    );
    let server_relay = Supervisor::start(&server_relay_config).await.unwrap();

    let client_relay_config = disguised(
        Mode::Client,
        EndpointConfig {
            endpoint: app_addr.ip().to_string(),
            port: app_addr.port(),
        },
        EndpointConfig {
            endpoint: "127.0.0.1".to_string(),
            port: relay_port,
        },
    );
    let client_relay = Supervisor::start(&client_relay_config).await.unwrap();

    let client_relay_local = client_relay.local_addr();

    app.send_to(b"hello through the tunnel", client_relay_local)
        .await
        .unwrap();
    let (received, relay_to_backend_addr) = recv_with_timeout(&backend).await;
    assert_eq!(received, b"hello through the tunnel");

    backend
        .send_to(b"reply from the backend", relay_to_backend_addr)
        .await
        .unwrap();
    let (received, _) = recv_with_timeout(&app).await;
    assert_eq!(received, b"reply from the backend");

    drop(server_relay);
    drop(client_relay);
}
