//! Single-client HTTP/1.0 responder.
//!
//! One connection is accepted, read once, answered and closed before the
//! next accept. Requests are never parsed beyond a substring check.

use std::{
    convert::Infallible,
    io::{Read, Write},
    net::TcpListener,
};

use log::{debug, info};

use crate::{error::ServeError, page::INDEX_HTML};

pub const RESPONSE_HEAD: &str = "HTTP/1.0 200 OK\r\nContent-type: text/html\r\n\r\n";
pub const MAX_REQUEST_BYTES: usize = 1024;
pub const TEMPS_ROUTE: &str = "GET /temps";

/// Produces the body for a temperature poll.
pub trait TemperatureFeed {
    fn temperatures_html(&mut self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Temperatures,
    Page,
}

impl RequestKind {
    pub fn classify(request: &str) -> Self {
        if request.contains(TEMPS_ROUTE) {
            Self::Temperatures
        } else {
            Self::Page
        }
    }
}

pub fn write_response<W: Write>(writer: &mut W, body: &str) -> Result<(), ServeError> {
    writer
        .write_all(RESPONSE_HEAD.as_bytes())
        .and_then(|()| writer.write_all(body.as_bytes()))
        .and_then(|()| writer.flush())
        .map_err(ServeError::Write)
}

/// Answers one request on an open connection. Larger requests are
/// truncated to the first read of at most [`MAX_REQUEST_BYTES`].
pub fn handle_connection<S, F>(stream: &mut S, feed: &mut F) -> Result<RequestKind, ServeError>
where
    S: Read + Write,
    F: TemperatureFeed,
{
    let mut buffer = [0_u8; MAX_REQUEST_BYTES];
    let len = stream.read(&mut buffer).map_err(ServeError::Read)?;
    let request = String::from_utf8_lossy(&buffer[..len]);
    debug!("request: {request}");

    let kind = RequestKind::classify(&request);
    match kind {
        RequestKind::Temperatures => {
            let body = feed.temperatures_html();
            write_response(stream, &body)?;
        }
        RequestKind::Page => write_response(stream, INDEX_HTML)?,
    }

    Ok(kind)
}

/// Accepts and answers exactly one client. The connection is closed on return.
pub fn serve_next<F: TemperatureFeed>(
    listener: &TcpListener,
    feed: &mut F,
) -> Result<RequestKind, ServeError> {
    let (mut stream, peer) = listener.accept().map_err(ServeError::Accept)?;
    info!("client connected from {peer}");
    handle_connection(&mut stream, feed)
}

pub fn serve_forever<F: TemperatureFeed>(
    listener: &TcpListener,
    feed: &mut F,
) -> Result<Infallible, ServeError> {
    if let Ok(addr) = listener.local_addr() {
        info!("listening on {addr}");
    }

    loop {
        serve_next(listener, feed)?;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        net::{Shutdown, TcpStream},
        thread,
    };

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::FakeStream;

    #[derive(Default)]
    struct CountingFeed {
        calls: usize,
    }

    impl TemperatureFeed for CountingFeed {
        fn temperatures_html(&mut self) -> String {
            self.calls += 1;
            "<div class=\"device\"><p>Temperature: 20.00°C / 68.00°F</p></div>".to_string()
        }
    }

    #[test]
    fn classifies_requests_by_route_substring() {
        assert_eq!(
            RequestKind::classify("GET /temps HTTP/1.1\r\nHost: node\r\n\r\n"),
            RequestKind::Temperatures
        );
        assert_eq!(
            RequestKind::classify("GET / HTTP/1.1\r\nHost: node\r\n\r\n"),
            RequestKind::Page
        );
        assert_eq!(RequestKind::classify(""), RequestKind::Page);
        assert_eq!(RequestKind::classify("\u{fffd}\u{fffd}garbage"), RequestKind::Page);
        assert_eq!(
            RequestKind::classify("POST /temps HTTP/1.1\r\n\r\n"),
            RequestKind::Page
        );
    }

    #[test]
    fn temps_request_gets_sampled_fragment() {
        let mut stream = FakeStream::new("GET /temps HTTP/1.1\r\nHost: node\r\n\r\n");
        let mut feed = CountingFeed::default();

        let kind = handle_connection(&mut stream, &mut feed).unwrap();

        assert_eq!(kind, RequestKind::Temperatures);
        assert_eq!(feed.calls, 1);
        assert_eq!(
            stream.written_text(),
            format!("{RESPONSE_HEAD}<div class=\"device\"><p>Temperature: 20.00°C / 68.00°F</p></div>")
        );
    }

    #[test]
    fn other_requests_get_static_page() {
        let mut stream = FakeStream::new("GET / HTTP/1.1\r\n\r\n");
        let mut feed = CountingFeed::default();

        let kind = handle_connection(&mut stream, &mut feed).unwrap();

        assert_eq!(kind, RequestKind::Page);
        assert_eq!(feed.calls, 0);
        assert_eq!(stream.written_text(), format!("{RESPONSE_HEAD}{INDEX_HTML}"));
    }

    #[test]
    fn invalid_utf8_falls_through_to_page() {
        let mut stream = FakeStream::new(vec![0xff, 0xfe, 0x00, 0x47]);
        let mut feed = CountingFeed::default();

        let kind = handle_connection(&mut stream, &mut feed).unwrap();

        assert_eq!(kind, RequestKind::Page);
        assert!(stream.written_text().starts_with(RESPONSE_HEAD));
    }

    #[test]
    fn reads_request_once_up_to_cap() {
        let mut request = vec![b'x'; MAX_REQUEST_BYTES];
        request.extend_from_slice(b"GET /temps HTTP/1.1\r\n\r\n");
        let mut stream = FakeStream::new(request);
        let mut feed = CountingFeed::default();

        let kind = handle_connection(&mut stream, &mut feed).unwrap();

        assert_eq!(stream.reads, 1);
        assert_eq!(kind, RequestKind::Page);
    }

    #[test]
    fn write_failure_is_reported() {
        let mut stream = FakeStream::new("GET / HTTP/1.1\r\n\r\n");
        stream.fail_writes = true;
        let mut feed = CountingFeed::default();

        let err = handle_connection(&mut stream, &mut feed).unwrap_err();

        assert!(matches!(err, ServeError::Write(_)));
    }

    #[test]
    fn serves_one_client_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream
                .write_all(b"GET /temps HTTP/1.1\r\nHost: node\r\n\r\n")
                .unwrap();
            stream.shutdown(Shutdown::Write).unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).unwrap();
            response
        });

        let mut feed = CountingFeed::default();
        let kind = serve_next(&listener, &mut feed).unwrap();
        let response = client.join().unwrap();

        assert_eq!(kind, RequestKind::Temperatures);
        assert!(response.starts_with("HTTP/1.0 200 OK\r\nContent-type: text/html\r\n\r\n<div"));
        assert!(response.ends_with("</div>"));
    }
}
