//! Line-based relay server.
//!
//! A client connects, sends its name on the first line, and stays listed
//! until it disconnects. Every later line is relayed to everyone else.

use crate::lobby::Lobby;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{RwLock, broadcast};

pub type SharedLobby = Arc<RwLock<Lobby>>;

pub async fn run(addr: SocketAddr, lobby: SharedLobby) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let (broadcast_tx, _) = broadcast::channel::<(u32, String)>(64);
    tracing::info!("Listening on {}", listener.local_addr()?);

    loop {
        let (stream, client_addr) = listener.accept().await?;
        let lobby = lobby.clone();
        let broadcast_tx = broadcast_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, client_addr, lobby, broadcast_tx).await {
                tracing::warn!("Connection error from {}: {}", client_addr, e);
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    lobby: SharedLobby,
    broadcast_tx: broadcast::Sender<(u32, String)>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    let name = match lines.next_line().await? {
        Some(line) if !line.trim().is_empty() => line.trim().to_string(),
        _ => return Ok(()),
    };

    let (joined, online) = {
        let mut lobby = lobby.write().await;
        let joined = lobby.join(name.clone(), addr);
        (joined, lobby.len())
    };
    let Some(id) = joined else {
        writer.write_all(b"server full\n").await?;
        return Ok(());
    };
    tracing::info!("{} joined from {} ({} online)", name, addr, online);
    writer.write_all(format!("welcome {name}\n").as_bytes()).await?;

    let mut broadcast_rx = broadcast_tx.subscribe();
    let result = async {
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let _ = broadcast_tx.send((id, format!("{name}: {line}\n")));
                }
                msg = broadcast_rx.recv() => {
                    if let Ok((from, text)) = msg
                        && from != id
                    {
                        writer.write_all(text.as_bytes()).await?;
                    }
                }
            }
        }
        anyhow::Ok(())
    }
    .await;

    lobby.write().await.leave(id);
    tracing::info!("{} disconnected", name);
    result
}
