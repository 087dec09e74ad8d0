use bytes::BytesMut;
use log::warn;

use crate::canned;
use crate::filter;
use crate::http::parse::parse_response_header;
use crate::socket::{SocketReader, SocketWriter};

use super::{MAX_HEADER_SIZE, RECEIVE_BUFFER_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwarderOutcome {
    Completed,
    Blocked,
    Aborted,
}

enum ChunkResult {
    Continue,
    Blocked,
    Aborted,
}

pub struct Forwarder {
    client: SocketWriter,
    server: SocketReader,
    cache_buffer: BytesMut,
    have_header: bool,
    apply_filter: bool,
}

impl Forwarder {
    // apply_filter is false for a CONNECT tunnel, where the forwarder
    // degenerates into a plain byte relay with no buffering or filtering.
    pub fn new(client: SocketWriter, server: SocketReader, apply_filter: bool) -> Self {
        Forwarder {
            client,
            server,
            cache_buffer: BytesMut::new(),
            have_header: false,
            apply_filter,
        }
    }

    pub async fn run(mut self) -> ForwarderOutcome {
        let mut buf = vec![0u8; RECEIVE_BUFFER_SIZE];
        loop {
            let n = match self.server.recv(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    warn!("error reading from upstream server: {e}");
                    self.server.close();
                    return ForwarderOutcome::Aborted;
                }
            };

            match self.forward_chunk(&buf[..n]).await {
                ChunkResult::Continue => {
                    if n == 0 {
                        return ForwarderOutcome::Completed;
                    }
                }
                ChunkResult::Blocked => return ForwarderOutcome::Blocked,
                ChunkResult::Aborted => return ForwarderOutcome::Aborted,
            }
        }
    }

    // chunk is empty exactly once, on EOF.
    async fn forward_chunk(&mut self, chunk: &[u8]) -> ChunkResult {
        if self.apply_filter {
            self.cache_buffer.extend_from_slice(chunk);

            if !self.have_header {
                match parse_response_header(&self.cache_buffer) {
                    Ok(header) => {
                        self.have_header = true;
                        self.apply_filter = filter::content_filter_gate(&header);
                    }
                    Err(_) if self.cache_buffer.len() > MAX_HEADER_SIZE => {
                        self.cache_buffer.clear();
                        return ChunkResult::Aborted;
                    }
                    Err(_) => {}
                }
            }
        }

        if !self.apply_filter {
            if !self.cache_buffer.is_empty() {
                let buffered = std::mem::take(&mut self.cache_buffer);
                if self.client.send(&buffered).await.is_err() {
                    return ChunkResult::Aborted;
                }
            } else if !chunk.is_empty() && self.client.send(chunk).await.is_err() {
                return ChunkResult::Aborted;
            }
            return ChunkResult::Continue;
        }

        if chunk.is_empty() {
            if filter::is_blocked(&self.cache_buffer) {
                let _ = self.client.send(canned::CONTENT_BLOCKED).await;
                self.server.close();
                return ChunkResult::Blocked;
            }

            let buffered = std::mem::take(&mut self.cache_buffer);
            if self.client.send(&buffered).await.is_err() {
                return ChunkResult::Aborted;
            }
        }

        ChunkResult::Continue
    }
}
