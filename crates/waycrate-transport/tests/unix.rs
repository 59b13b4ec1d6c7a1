//! Integration tests for the Unix socket transport.
//!
//! These tests bind a real `UnixListener` in a temporary directory and talk
//! to it with raw bytes, so the framing is checked exactly as the broker
//! would see it.

#[cfg(feature = "unix")]
mod unix {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixListener;
    use waycrate_transport::{Connection, TransportError, UnixConnection};

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut out = (payload.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(payload);
        out
    }

    #[tokio::test]
    async fn test_connect_send_and_receive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greetd.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            // Read exactly one frame from the client.
            let mut header = [0u8; 4];
            stream.read_exact(&mut header).await.unwrap();
            let mut payload = vec![0u8; u32::from_le_bytes(header) as usize];
            stream.read_exact(&mut payload).await.unwrap();

            stream
                .write_all(&frame(br#"{"type":"success"}"#))
                .await
                .unwrap();
            payload
        });

        let conn = UnixConnection::connect(&path).await.expect("should connect");
        assert!(conn.id().get() > 0);

        conn.send(br#"{"type":"cancel_session"}"#)
            .await
            .expect("send should succeed");

        let reply = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have a frame");
        assert_eq!(reply, br#"{"type":"success"}"#);

        let seen = server.await.unwrap();
        assert_eq!(seen, br#"{"type":"cancel_session"}"#);
    }

    #[tokio::test]
    async fn test_recv_reassembles_split_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greetd.sock");
        let listener = UnixListener::bind(&path).unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut wire = frame(b"one");
            wire.extend(frame(b"two"));
            // Dribble the bytes out in awkward pieces.
            for piece in wire.chunks(3) {
                stream.write_all(piece).await.unwrap();
                stream.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        let conn = UnixConnection::connect(&path).await.unwrap();
        assert_eq!(conn.recv().await.unwrap().unwrap(), b"one");
        assert_eq!(conn.recv().await.unwrap().unwrap(), b"two");
        assert!(conn.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_clean_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greetd.sock");
        let listener = UnixListener::bind(&path).unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let conn = UnixConnection::connect(&path).await.unwrap();
        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on peer close");
    }

    #[tokio::test]
    async fn test_recv_errors_on_close_mid_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greetd.sock");
        let listener = UnixListener::bind(&path).unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Header promises 10 bytes, only 2 follow.
            stream.write_all(&[10, 0, 0, 0, b'{', b'"']).await.unwrap();
        });

        let conn = UnixConnection::connect(&path).await.unwrap();
        let err = conn.recv().await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed(_)));
    }

    #[tokio::test]
    async fn test_connect_missing_socket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nobody-home.sock");

        let err = UnixConnection::connect(&path).await.err().unwrap();
        assert!(matches!(err, TransportError::ConnectFailed { .. }));
        assert!(err.to_string().contains("nobody-home.sock"));
    }
}
