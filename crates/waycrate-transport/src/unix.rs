//! Broker connection over a Unix domain socket.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::Mutex;

use crate::{encode_frame, Connection, ConnectionId, FrameDecoder, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Read side of the stream plus the bytes it has buffered so far.
struct Reader {
    half: OwnedReadHalf,
    decoder: FrameDecoder,
}

/// A framed connection to the broker's Unix socket.
///
/// Reads and writes are locked independently, so a pending `recv` never
/// blocks a `send`, while two `send`s can never interleave their bytes.
pub struct UnixConnection {
    id: ConnectionId,
    reader: Mutex<Reader>,
    writer: Mutex<OwnedWriteHalf>,
}

impl UnixConnection {
    /// Connects to the broker socket at `path`.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectFailed`] if the socket is missing
    /// or refuses the connection.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).await.map_err(|source| {
            TransportError::ConnectFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let conn = Self::from_stream(stream);
        tracing::info!(id = %conn.id, path = %path.display(), "connected to broker");
        Ok(conn)
    }

    /// Wraps an already connected stream.
    pub fn from_stream(stream: UnixStream) -> Self {
        let (read, write) = stream.into_split();
        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            id,
            reader: Mutex::new(Reader {
                half: read,
                decoder: FrameDecoder::new(),
            }),
            writer: Mutex::new(write),
        }
    }
}

impl Connection for UnixConnection {
    type Error = TransportError;

    async fn send(&self, payload: &[u8]) -> Result<(), Self::Error> {
        let frame = encode_frame(payload)?;
        let mut writer = self.writer.lock().await;
        writer
            .write_all(&frame)
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)?;
        tracing::debug!(id = %self.id, len = payload.len(), "frame sent");
        Ok(())
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut guard = self.reader.lock().await;
        let reader = &mut *guard;
        loop {
            if let Some(frame) = reader.decoder.next_frame()? {
                tracing::debug!(id = %self.id, len = frame.len(), "frame received");
                return Ok(Some(frame));
            }

            let n = reader
                .half
                .read_buf(reader.decoder.buffer_mut())
                .await
                .map_err(TransportError::ReceiveFailed)?;

            if n == 0 {
                if reader.decoder.is_empty() {
                    return Ok(None);
                }
                return Err(TransportError::ConnectionClosed(format!(
                    "peer closed with {} bytes of a partial frame buffered",
                    reader.decoder.buffered()
                )));
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
