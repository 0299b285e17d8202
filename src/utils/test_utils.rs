#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
use tokio::io::{AsyncReadExt, AsyncWriteExt};
#[cfg(test)]
use tokio::net::{TcpListener, TcpStream};

#[cfg(test)]
use crate::core::conversation::ConversationStore;

/// Build a store holding `count` conversations; the newest (front) one is
/// active, matching `new_chat` behavior.
#[cfg(test)]
pub fn store_with_chats(count: usize) -> ConversationStore {
    let mut store = ConversationStore::new();
    for _ in 1..count {
        store.new_chat();
    }
    store
}

/// One scripted HTTP response for [`spawn_responder`].
#[cfg(test)]
pub struct CannedReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

/// Serve the scripted replies on a loopback port, one per connection in
/// order. Returns the base URL and a counter of accepted connections.
///
/// This is deliberately a raw TCP responder rather than a mock crate: the
/// request tests only need fixed bodies, delays, and a connection count.
#[cfg(test)]
pub async fn spawn_responder(replies: Vec<CannedReply>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    let hits = Arc::new(AtomicUsize::new(0));

    let task_hits = Arc::clone(&hits);
    tokio::spawn(async move {
        for reply in replies {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            task_hits.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(handle_connection(stream, reply));
        }
    });

    (format!("http://{addr}"), hits)
}

#[cfg(test)]
async fn handle_connection(mut stream: TcpStream, reply: CannedReply) {
    // Drain the request: headers, then Content-Length worth of body.
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        request.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&request) {
            break pos;
        }
    };

    let content_length = parse_content_length(&request[..header_end]);
    while request.len() < header_end + 4 + content_length {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);
    }

    tokio::time::sleep(reply.delay).await;

    let reason = if reply.status < 400 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason,
        reply.body.len(),
        reply.body
    );
    // The peer may have gone away (aborted request); that is fine.
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.flush().await;
}

#[cfg(test)]
fn find_header_end(request: &[u8]) -> Option<usize> {
    request.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
fn parse_content_length(headers: &[u8]) -> usize {
    let headers = String::from_utf8_lossy(headers);
    headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}
