pub mod forwarder;

use std::io;
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::net::TcpStream;

use crate::canned;
use crate::filter;
use crate::http::error::HttpError;
use crate::http::parse::{parse_request_header, RequestHeader};
use crate::http::serialize::serialize_request_header;
use crate::socket::{self, SocketReader, SocketWriter};
use crate::stats::ProxyStats;

use forwarder::{Forwarder, ForwarderOutcome};

pub const MAX_HEADER_SIZE: usize = 8192;
pub const RECEIVE_BUFFER_SIZE: usize = 8192;

const DEFAULT_PORT: &str = "80";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("client closed the connection before a complete request header was received")]
    ClientClosedEarly,

    #[error("request header exceeded the {0}-byte limit without completing")]
    HeaderTooBig(usize),

    #[error("request header did not include a 'Host' field")]
    MissingHost,

    #[error("request header did not match the expected grammar: {0}")]
    Malformed(#[from] HttpError),

    #[error("could not reach upstream host {host}:{port}: {source}")]
    UpstreamUnreachable {
        host: String,
        port: String,
        #[source]
        source: io::Error,
    },

    #[error("socket I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    UrlBlocked,
    ContentBlocked,
    Completed,
}

// Never panics; any internal failure just closes the client connection.
pub async fn run(client_stream: TcpStream, stats: Arc<ProxyStats>) {
    stats.session_accepted();

    let (mut client_reader, client_writer) = socket::split(client_stream);
    let outcome = drive(&mut client_reader, client_writer).await;

    match outcome {
        Ok(SessionOutcome::UrlBlocked) => {
            info!("blocked request URL matched the content filter");
            stats.url_blocked();
        }
        Ok(SessionOutcome::ContentBlocked) => {
            info!("blocked response body matched the content filter");
            stats.content_blocked();
        }
        Ok(SessionOutcome::Completed) => {
            debug!("session completed");
        }
        Err(e) => {
            warn!("session ended with an error: {e}");
            stats.error();
        }
    }

    stats.session_ended();
}

// Early canned replies (413, URL-blocked 301, CONNECT's 200) are sent here
// directly; ownership of the client write half then passes to the response
// forwarder, which is the only writer to the client from that point on.
async fn drive(
    client_reader: &mut SocketReader,
    mut client_writer: SocketWriter,
) -> Result<SessionOutcome, SessionError> {
    // ReadingHeader
    let (buffer, request) =
        read_request_header(client_reader, &mut client_writer).await?;

    // UrlFilterCheck: runs over the whole accumulated buffer, not just the
    // parsed request line, so a keyword in an early body byte also trips it.
    if filter::is_blocked(&buffer) {
        client_writer.send(canned::URL_BLOCKED).await?;
        return Ok(SessionOutcome::UrlBlocked);
    }

    // Dialing
    let host_field = request
        .fields
        .get("Host")
        .ok_or(SessionError::MissingHost)?;
    let (hostname, port) = split_host_port(host_field);

    debug!("connecting to host: {hostname} port: {port}");
    let server_stream = TcpStream::connect(format!("{hostname}:{port}"))
        .await
        .map_err(|source| SessionError::UpstreamUnreachable {
            host: hostname.clone(),
            port: port.clone(),
            source,
        })?;
    let (server_reader, mut server_writer) = socket::split(server_stream);

    // Rewriting
    let conn_request = request.method == "CONNECT";
    let header_len_before_rewrite = buffer_header_len(&buffer);
    let mut request = request;
    if !conn_request {
        request.fields.set("Connection", "close");
        let resource = strip_authority_prefix(&request.target, &hostname, &port).to_string();
        request.target = resource;
    }

    if conn_request {
        client_writer.send(canned::CONNECTION_ESTABLISHED).await?;
    } else {
        let serialized = serialize_request_header(&request);
        server_writer.send(&serialized).await?;
        server_writer
            .send(&buffer[header_len_before_rewrite..])
            .await?;
    }

    // Pumping: the forwarder owns the client write half from here on and
    // becomes the sole path for server->client bytes; this task keeps the
    // server write half and pumps client->server.
    let forwarder = Forwarder::new(client_writer, server_reader, !conn_request);
    let forwarder_handle = tokio::spawn(forwarder.run());

    // client -> server pump
    let mut chunk = vec![0u8; RECEIVE_BUFFER_SIZE];
    loop {
        if !server_writer.is_open() || !client_reader.is_open() {
            break;
        }

        let n = match client_reader.recv(&mut chunk).await {
            Ok(n) => n,
            Err(e) => {
                warn!("error reading from client: {e}");
                break;
            }
        };
        if n == 0 {
            break;
        }
        if server_writer.send(&chunk[..n]).await.is_err() {
            break;
        }
    }

    let forwarder_outcome = forwarder_handle.await.unwrap_or(ForwarderOutcome::Aborted);
    server_writer.close();

    match forwarder_outcome {
        ForwarderOutcome::Blocked => Ok(SessionOutcome::ContentBlocked),
        ForwarderOutcome::Completed | ForwarderOutcome::Aborted => Ok(SessionOutcome::Completed),
    }
}

// Returns the full accumulated buffer alongside the parsed header, so the
// caller can run the URL filter over it rather than just the parsed header.
async fn read_request_header(
    client_reader: &mut SocketReader,
    client_writer: &mut SocketWriter,
) -> Result<(Vec<u8>, RequestHeader), SessionError> {
    let mut buffer = vec![0u8; MAX_HEADER_SIZE];
    let mut received = 0usize;

    loop {
        if !client_reader.is_open() {
            return Err(SessionError::ClientClosedEarly);
        }

        if received == MAX_HEADER_SIZE {
            client_writer.send(canned::ENTITY_TOO_LARGE).await.ok();
            return Err(SessionError::HeaderTooBig(MAX_HEADER_SIZE));
        }

        let n = client_reader.recv(&mut buffer[received..]).await?;
        if n == 0 {
            return Err(SessionError::ClientClosedEarly);
        }
        received += n;

        match parse_request_header(&buffer[..received]) {
            Ok(header) => {
                buffer.truncate(received);
                return Ok((buffer, header));
            }
            Err(HttpError::NotHttp) => continue,
            Err(e) => return Err(SessionError::Malformed(e)),
        }
    }
}

// Length of the original, unmodified request header, including the blank
// line. Bytes past this point were read ahead of the header boundary and
// must be forwarded to the server unchanged after the rewritten header.
fn buffer_header_len(buffer: &[u8]) -> usize {
    memchr::memmem::find(buffer, b"\r\n\r\n")
        .map(|end| end + 4)
        .unwrap_or(buffer.len())
}

// Splits a `Host` field into (hostname, port), defaulting the port to "80"
// when absent or empty.
fn split_host_port(host_field: &str) -> (String, String) {
    match host_field.split_once(':') {
        Some((host, port)) if !port.is_empty() => (host.to_string(), port.to_string()),
        Some((host, _)) => (host.to_string(), DEFAULT_PORT.to_string()),
        None => (host_field.to_string(), DEFAULT_PORT.to_string()),
    }
}

// Strips a leading http://hostname[:port] or hostname[:port] authority from
// target, turning an absolute-form URI into an origin-form one. Longest
// candidate is tried first so a target carrying the port isn't left with a
// dangling port.
fn strip_authority_prefix<'a>(target: &'a str, hostname: &str, port: &str) -> &'a str {
    let host_port = format!("{hostname}:{port}");
    let candidates = [
        format!("http://{host_port}"),
        format!("http://{hostname}"),
        host_port,
        hostname.to_string(),
    ];

    for candidate in &candidates {
        if let Some(rest) = target.strip_prefix(candidate.as_str()) {
            return rest;
        }
    }
    target
}
