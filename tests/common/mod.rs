#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// A request as seen by the stub server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Canned reply for one request.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Reply {
            status,
            body: body.to_string(),
        }
    }
}

/// Minimal HTTP/1.1 responder: answers the given replies in order, one per
/// connection, and reports each request it saw.
pub struct StubServer {
    pub url: String,
    pub requests: Receiver<Recorded>,
}

impl StubServer {
    pub fn start(replies: Vec<Reply>) -> Self {
        Self::spawn(replies, None)
    }

    /// Like `start`, but the first reply is held back until `gate` receives.
    /// Its request is still reported as soon as it arrives.
    pub fn start_gated(replies: Vec<Reply>, gate: Receiver<()>) -> Self {
        Self::spawn(replies, Some(gate))
    }

    fn spawn(replies: Vec<Reply>, mut gate: Option<Receiver<()>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for reply in replies {
                let (mut stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let recorded = match read_request(&stream) {
                    Some(recorded) => recorded,
                    None => continue,
                };
                let _ = tx.send(recorded);

                if let Some(gate) = gate.take() {
                    if gate.recv().is_err() {
                        return;
                    }
                }
                respond(&mut stream, &reply);
            }
        });

        StubServer { url, requests: rx }
    }
}

fn read_request(stream: &TcpStream) -> Option<Recorded> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;

    Some(Recorded {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn respond(stream: &mut TcpStream, reply: &Reply) {
    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
