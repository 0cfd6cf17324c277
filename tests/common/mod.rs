//! Scripted SMTP relay listening on localhost, for one session

#![allow(dead_code)]

use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
};

/// How the relay answers the client
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Script {
    /// Accept everything
    Accept,
    /// Reject the credentials with 535
    RejectAuth,
    /// Reject the recipient with 550
    RejectRecipient,
}

/// What the relay saw during the session
#[derive(Debug, Default)]
pub struct Transcript {
    /// Command lines, without CRLF
    pub commands: Vec<String>,
    /// Lines of the DATA section, without CRLF and without the final dot
    pub data: Vec<String>,
}

impl Transcript {
    pub fn has_command(&self, prefix: &str) -> bool {
        self.commands.iter().any(|c| c.starts_with(prefix))
    }

    /// The raw message received during DATA
    pub fn message(&self) -> String {
        self.data.join("\r\n")
    }
}

pub struct FakeRelay {
    port: u16,
    handle: JoinHandle<Transcript>,
}

impl FakeRelay {
    pub fn spawn(script: Script) -> FakeRelay {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            serve(stream, script)
        });

        FakeRelay { port, handle }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the session to end
    pub fn finish(self) -> Transcript {
        self.handle.join().unwrap()
    }
}

/// A localhost port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn serve(stream: TcpStream, script: Script) -> Transcript {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = stream;
    let mut transcript = Transcript::default();

    reply(&mut writer, "220 relay.test ESMTP ready");

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => (),
        }

        let command = line.trim_end_matches(&['\r', '\n'][..]).to_owned();
        let verb = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        transcript.commands.push(command);

        match verb.as_str() {
            "EHLO" => {
                reply(&mut writer, "250-relay.test");
                reply(&mut writer, "250 AUTH PLAIN LOGIN");
            }
            "AUTH" if script == Script::RejectAuth => {
                reply(&mut writer, "535 5.7.8 Authentication credentials invalid")
            }
            "AUTH" => reply(&mut writer, "235 2.7.0 Authentication successful"),
            "MAIL" => reply(&mut writer, "250 2.1.0 OK"),
            "RCPT" if script == Script::RejectRecipient => {
                reply(&mut writer, "550 5.1.1 No such user")
            }
            "RCPT" => reply(&mut writer, "250 2.1.5 OK"),
            "DATA" => {
                reply(&mut writer, "354 End data with <CR><LF>.<CR><LF>");
                loop {
                    line.clear();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 {
                        return transcript;
                    }
                    let data = line.trim_end_matches(&['\r', '\n'][..]);
                    if data == "." {
                        break;
                    }
                    // undo dot-stuffing
                    let data = data.strip_prefix('.').unwrap_or(data);
                    transcript.data.push(data.to_owned());
                }
                reply(&mut writer, "250 2.0.0 queued");
            }
            "RSET" | "NOOP" => reply(&mut writer, "250 2.0.0 OK"),
            "QUIT" => {
                reply(&mut writer, "221 2.0.0 Bye");
                break;
            }
            _ => reply(&mut writer, "502 5.5.2 Command not recognized"),
        }
    }

    transcript
}

// the client may already be gone after a rejection
fn reply(writer: &mut TcpStream, line: &str) {
    let _ = writer
        .write_all(format!("{line}\r\n").as_bytes())
        .and_then(|()| writer.flush());
}
