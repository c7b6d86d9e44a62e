//! Integration tests for the TCP line transport.
//!
//! These tests spin up a real listener on an OS-assigned port and talk
//! to it with a plain `TcpStream`, so the framing is checked byte for
//! byte.

#[cfg(feature = "tcp")]
mod tcp {
    use ringgz_transport::{
        Connection, TcpLineTransport, Transport, TransportError,
    };
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;

    async fn bind(max_line_length: usize) -> (TcpLineTransport, String) {
        let transport = TcpLineTransport::bind("127.0.0.1:0", max_line_length)
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    #[tokio::test]
    async fn test_tcp_accept_and_exchange_lines() {
        let (mut transport, addr) = bind(1024).await;

        let server = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let client = TcpStream::connect(&addr).await.expect("connect");
        let conn = server.await.expect("task should complete");
        assert!(conn.id().into_inner() > 0);

        let (read_half, mut write_half) = client.into_split();
        write_half
            .write_all(b"join~alice~0\r\ngetPlayers\n")
            .await
            .expect("write");

        assert_eq!(
            conn.recv().await.expect("recv").as_deref(),
            Some("join~alice~0")
        );
        assert_eq!(
            conn.recv().await.expect("recv").as_deref(),
            Some("getPlayers")
        );

        conn.send("accept").await.expect("send");
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        reader.read_line(&mut line).await.expect("read");
        assert_eq!(line, "accept\n");
    }

    #[tokio::test]
    async fn test_tcp_recv_returns_none_when_peer_closes() {
        let (mut transport, addr) = bind(1024).await;

        let server = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let client = TcpStream::connect(&addr).await.expect("connect");
        let conn = server.await.expect("task should complete");

        drop(client);

        assert!(conn.recv().await.expect("clean close").is_none());
    }

    #[tokio::test]
    async fn test_tcp_recv_rejects_oversized_line() {
        let (mut transport, addr) = bind(16).await;

        let server = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let mut client = TcpStream::connect(&addr).await.expect("connect");
        let conn = server.await.expect("task should complete");

        client
            .write_all(b"sendMessage~this line is far too long\n")
            .await
            .expect("write");

        let result = conn.recv().await;
        assert!(matches!(result, Err(TransportError::LineTooLong(16))));
    }

    #[tokio::test]
    async fn test_tcp_recv_invalid_utf8_fails_that_line_only() {
        let (mut transport, addr) = bind(1024).await;

        let server = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let mut client = TcpStream::connect(&addr).await.expect("connect");
        let conn = server.await.expect("task should complete");

        client
            .write_all(b"sendMessage~caf\xe9\ngetPlayers\n")
            .await
            .expect("write");

        let err = conn.recv().await.expect_err("not UTF-8");
        assert!(matches!(err, TransportError::InvalidUtf8));
        assert!(err.is_recoverable());
        assert_eq!(
            conn.recv().await.expect("recv").as_deref(),
            Some("getPlayers")
        );
    }

    #[tokio::test]
    async fn test_tcp_close_ends_client_stream() {
        let (mut transport, addr) = bind(1024).await;

        let server = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let client = TcpStream::connect(&addr).await.expect("connect");
        let conn = server.await.expect("task should complete");

        conn.send("error~7~Error").await.expect("send");
        conn.close().await.expect("close");

        let mut reader = BufReader::new(client);
        let mut line = String::new();
        reader.read_line(&mut line).await.expect("read");
        assert_eq!(line, "error~7~Error\n");

        line.clear();
        let n = reader.read_line(&mut line).await.expect("read eof");
        assert_eq!(n, 0);
    }
}
