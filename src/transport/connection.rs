// MIT License - Copyright (c) 2026 Peter Wright
// Per-connection read / ACK loop

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

use crate::constants::{ACK, READ_BUF_LEN};
use crate::transport::DatagramHandler;
use crate::transport::framing::DatagramSplitter;

/// Read datagrams from one panel connection until it closes.
///
/// Every datagram gets exactly one ACK byte, whether or not it decodes.
/// Only I/O errors on the socket itself end the loop early.
pub async fn serve_connection<S, H>(
    mut stream: S,
    peer: &str,
    handler: Arc<H>,
    max_datagram_len: usize,
) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: DatagramHandler + ?Sized,
{
    let mut buf = vec![0u8; READ_BUF_LEN];
    let mut splitter = DatagramSplitter::new(max_datagram_len);

    loop {
        match stream.read(&mut buf).await {
            Ok(0) => {
                if let Some(rest) = splitter.finish() {
                    warn!(
                        "Connection from {} closed with unterminated input, dropping {:?}",
                        peer,
                        String::from_utf8_lossy(&rest)
                    );
                }
                debug!("Connection from {} closed", peer);
                return Ok(());
            }
            Ok(n) => {
                for datagram in splitter.push(&buf[..n]) {
                    handler.handle(&datagram);
                    stream.write_all(&[ACK]).await?;
                    debug!("ACK sent to {}", peer);
                }
                stream.flush().await?;
            }
            Err(e) => {
                error!("Read error on connection from {}: {}", peer, e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::duplex;

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<Vec<u8>>>,
    }

    impl DatagramHandler for Collect {
        fn handle(&self, raw: &[u8]) {
            self.seen.lock().unwrap().push(raw.to_vec());
        }
    }

    #[tokio::test]
    async fn test_one_ack_per_datagram() {
        let (mut panel, server) = duplex(1024);
        let handler = Arc::new(Collect::default());
        let task = tokio::spawn({
            let handler = handler.clone();
            async move { serve_connection(server, "test", handler, 1024).await }
        });

        panel
            .write_all(b"[test 18313100003D504][bad]garbage[x 18")
            .await
            .unwrap();
        let mut acks = [0u8; 3];
        panel.read_exact(&mut acks).await.unwrap();
        assert_eq!(acks, [ACK; 3]);

        panel.write_all(b"140101001ABCD]\r\n").await.unwrap();
        let mut ack = [0u8; 1];
        panel.read_exact(&mut ack).await.unwrap();
        assert_eq!(ack, [ACK]);

        drop(panel);
        task.await.unwrap().unwrap();

        let seen = handler.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                b"[test 18313100003D504]".to_vec(),
                b"[bad]".to_vec(),
                b"garbage".to_vec(),
                b"[x 18140101001ABCD]".to_vec(),
            ]
        );
    }

    #[tokio::test]
    async fn test_junk_split_across_writes_is_acked_once() {
        let (mut panel, server) = duplex(1024);
        let handler = Arc::new(Collect::default());
        let task = tokio::spawn({
            let handler = handler.clone();
            async move { serve_connection(server, "test", handler, 1024).await }
        });

        panel.write_all(b"garb").await.unwrap();
        panel.write_all(b"age\r\n[x]").await.unwrap();
        let mut acks = [0u8; 2];
        panel.read_exact(&mut acks).await.unwrap();
        assert_eq!(acks, [ACK; 2]);

        drop(panel);
        task.await.unwrap().unwrap();
        assert_eq!(
            handler.seen.lock().unwrap().clone(),
            vec![b"garbage".to_vec(), b"[x]".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_close_mid_datagram_is_clean() {
        let (mut panel, server) = duplex(1024);
        let handler = Arc::new(Collect::default());
        let task = tokio::spawn({
            let handler = handler.clone();
            async move { serve_connection(server, "test", handler, 1024).await }
        });

        panel.write_all(b"[test 18313100003D504").await.unwrap();
        drop(panel);

        task.await.unwrap().unwrap();
        assert!(handler.seen.lock().unwrap().is_empty());
    }
}
