//! A length-prefixed JSON conformance harness: each request imports one block against
//! the harness's held state and replies with either the new state root or an error.
//!
//! The wire format here (4-byte little-endian length prefix, JSON body) is this
//! implementation's own choice; framing for the block-import interface isn't pinned
//! by the state transition function itself.

use std::path::Path;

use anyhow::{Context, Result};
use jam_crypto::MockRingVerifier;
use jam_state::stf::{import_block, Block};
use jam_state::JamState;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
struct ImportRequest {
    block: Block,
}

#[derive(Debug, Serialize)]
struct ImportResponse {
    ok: bool,
    state_root: Option<String>,
    error: Option<String>,
}

/// Run the conformance harness, accepting one block-import request per connection on
/// a Unix domain socket.
pub async fn run(socket_path: &Path, mut state: JamState, config: jam_state::Config) -> Result<()> {
    let _ = std::fs::remove_file(socket_path);
    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("binding conformance socket at {}", socket_path.display()))?;
    info!(path = %socket_path.display(), "conformance harness listening");

    let verifier = MockRingVerifier;

    loop {
        let (stream, _) = listener.accept().await?;
        match handle_connection(stream, &state, &config, &verifier).await {
            Ok(Some(posterior)) => state = posterior,
            Ok(None) => {}
            Err(err) => warn!(%err, "connection handling failed"),
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    state: &JamState,
    config: &jam_state::Config,
    verifier: &MockRingVerifier,
) -> Result<Option<JamState>> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut body = vec![0u8; len];
    stream.read_exact(&mut body).await?;

    let request: ImportRequest = serde_json::from_slice(&body).context("parsing import request")?;

    let response = match import_block(state, &request.block, config, verifier) {
        Ok(posterior) => {
            let response = ImportResponse {
                ok: true,
                state_root: Some(hex::encode(posterior.state_root())),
                error: None,
            };
            write_response(&mut stream, &response).await?;
            return Ok(Some(posterior));
        }
        Err(err) => {
            error!(%err, "block import rejected");
            ImportResponse {
                ok: false,
                state_root: None,
                error: Some(err.to_string()),
            }
        }
    };

    write_response(&mut stream, &response).await?;
    Ok(None)
}

async fn write_response(stream: &mut UnixStream, response: &ImportResponse) -> Result<()> {
    let body = serde_json::to_vec(response)?;
    stream.write_all(&(body.len() as u32).to_le_bytes()).await?;
    stream.write_all(&body).await?;
    Ok(())
}
