use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

pub struct SocketReader {
    inner: OwnedReadHalf,
    open: Arc<AtomicBool>,
}

pub struct SocketWriter {
    inner: OwnedWriteHalf,
    open: Arc<AtomicBool>,
}

pub fn split(stream: TcpStream) -> (SocketReader, SocketWriter) {
    let open = Arc::new(AtomicBool::new(true));
    let (read_half, write_half) = stream.into_split();
    (
        SocketReader {
            inner: read_half,
            open: open.clone(),
        },
        SocketWriter {
            inner: write_half,
            open,
        },
    )
}

impl SocketReader {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    // Returns Ok(0) only on EOF, at which point the socket is marked closed.
    // Returns Ok(0) immediately without reading if already closed.
    pub async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.is_open() {
            return Ok(0);
        }
        let n = self.inner.read(buf).await?;
        if n == 0 {
            self.close();
        }
        Ok(n)
    }
}

impl SocketWriter {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    // A connection-reset-like error closes the socket as a side effect.
    pub async fn send(&mut self, buf: &[u8]) -> io::Result<()> {
        if !self.is_open() {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "socket is closed",
            ));
        }
        match self.inner.write_all(buf).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if matches!(
                    e.kind(),
                    io::ErrorKind::ConnectionReset | io::ErrorKind::BrokenPipe
                ) {
                    self.close();
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connect = TcpStream::connect(addr);
        let (accept_result, connect_result) = tokio::join!(listener.accept(), connect);
        (accept_result.unwrap().0, connect_result.unwrap())
    }

    #[tokio::test]
    async fn send_then_recv_round_trips_bytes() {
        let (server, client) = connected_pair().await;
        let (_client_r, mut client_w) = split(client);
        let (mut server_r, _server_w) = split(server);

        client_w.send(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        let n = server_r.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[tokio::test]
    async fn recv_returns_zero_and_closes_on_eof() {
        let (server, client) = connected_pair().await;
        drop(client);
        let (mut server_r, _server_w) = split(server);

        let mut buf = [0u8; 16];
        let n = server_r.recv(&mut buf).await.unwrap();
        assert_eq!(n, 0);
        assert!(!server_r.is_open());
    }

    #[tokio::test]
    async fn send_after_close_is_rejected_without_touching_the_socket() {
        let (server, client) = connected_pair().await;
        let (_client_r, mut client_w) = split(client);
        drop(server);

        client_w.close();
        assert!(client_w.send(b"anything").await.is_err());
    }
}
