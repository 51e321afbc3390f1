//! TCP transport.
//!
//! Room `code` is served on `base_port + code`. Frames are newline-delimited
//! UTF-8 (the JSON encoder never emits a raw newline). A frame that is not
//! UTF-8 is dropped; only I/O errors and EOF end the link. The guest's first
//! line is its own room code so the host learns who joined.
//!
//! Blocking accept, connect, and read run on background threads that only
//! forward signals over a channel. All game state is still mutated on the
//! caller's thread via [`PeerTransport::poll_event`].

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::NetworkConfig;
use crate::error::LinkError;

use super::{LinkEvent, PeerTransport, RoomCode};

const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Message from a worker thread, tagged with the link generation it belongs to.
enum Signal {
    Attached {
        generation: u64,
        stream: TcpStream,
        remote_id: String,
    },
    Event {
        generation: u64,
        event: LinkEvent,
    },
}

pub struct TcpTransport {
    config: NetworkConfig,
    tx: Sender<Signal>,
    rx: Receiver<Signal>,
    /// Bumped on every close so signals from old links are dropped.
    generation: u64,
    cancel: Arc<AtomicBool>,
    pending: bool,
    writer: Option<TcpStream>,
}

impl TcpTransport {
    pub fn new(config: NetworkConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        TcpTransport {
            config,
            tx,
            rx,
            generation: 0,
            cancel: Arc::new(AtomicBool::new(false)),
            pending: false,
            writer: None,
        }
    }

    fn ensure_idle(&self) -> Result<(), LinkError> {
        if self.writer.is_some() {
            return Err(LinkError::Busy("open"));
        }
        if self.pending {
            return Err(LinkError::Busy("pending"));
        }
        Ok(())
    }

    fn spawn<F>(&self, name: &str, work: F) -> Result<(), LinkError>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::Builder::new()
            .name(name.to_string())
            .spawn(work)
            .map(|_| ())
            .map_err(LinkError::Io)
    }
}

impl PeerTransport for TcpTransport {
    fn listen(&mut self, local_id: RoomCode) -> Result<(), LinkError> {
        self.ensure_idle()?;

        let addr = format!("{}:{}", self.config.bind_host, self.config.port_for(local_id));
        let listener = TcpListener::bind(&addr).map_err(|source| LinkError::Bind {
            addr: addr.clone(),
            source,
        })?;
        listener.set_nonblocking(true)?;
        info!(%addr, room = %local_id, "listening for opponent");

        let tx = self.tx.clone();
        let cancel = Arc::clone(&self.cancel);
        let generation = self.generation;
        let hello_timeout = self.config.hello_timeout();
        self.spawn("link-accept", move || {
            accept_one(listener, hello_timeout, tx, cancel, generation)
        })?;
        self.pending = true;
        Ok(())
    }

    fn connect(&mut self, local_id: RoomCode, remote_id: RoomCode) -> Result<(), LinkError> {
        self.ensure_idle()?;

        let addr = format!("{}:{}", self.config.peer_host, self.config.port_for(remote_id));
        info!(%addr, room = %remote_id, "connecting to room");

        let tx = self.tx.clone();
        let cancel = Arc::clone(&self.cancel);
        let generation = self.generation;
        self.spawn("link-connect", move || {
            dial(addr, local_id, remote_id, tx, cancel, generation)
        })?;
        self.pending = true;
        Ok(())
    }

    fn send(&mut self, payload: &str) -> Result<(), LinkError> {
        let writer = self.writer.as_mut().ok_or(LinkError::NotConnected)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn poll_event(&mut self) -> Option<LinkEvent> {
        while let Ok(signal) = self.rx.try_recv() {
            match signal {
                Signal::Attached {
                    generation,
                    stream,
                    remote_id,
                } if generation == self.generation => {
                    self.pending = false;
                    self.writer = Some(stream);
                    return Some(LinkEvent::Opened { remote_id });
                }
                Signal::Event { generation, event } if generation == self.generation => {
                    if event == LinkEvent::Closed {
                        self.pending = false;
                        self.writer = None;
                    }
                    return Some(event);
                }
                Signal::Attached { stream, .. } => {
                    debug!("dropping stale link");
                    let _ = stream.shutdown(Shutdown::Both);
                }
                Signal::Event { .. } => {}
            }
        }
        None
    }

    fn close(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.cancel = Arc::new(AtomicBool::new(false));
        if let Some(stream) = self.writer.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.pending = false;
        self.generation += 1;
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn emit(tx: &Sender<Signal>, generation: u64, event: LinkEvent) {
    let _ = tx.send(Signal::Event { generation, event });
}

/// Wait for a single guest, read its room code, then pump its lines.
fn accept_one(
    listener: TcpListener,
    hello_timeout: Duration,
    tx: Sender<Signal>,
    cancel: Arc<AtomicBool>,
    generation: u64,
) {
    let stream = loop {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(%peer, "inbound connection");
                break stream;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) => {
                emit(&tx, generation, LinkEvent::Errored(format!("accept failed: {e}")));
                return;
            }
        }
    };
    drop(listener);

    if let Err(e) = stream
        .set_nonblocking(false)
        .and_then(|()| stream.set_read_timeout(Some(hello_timeout)))
    {
        emit(&tx, generation, LinkEvent::Errored(e.to_string()));
        return;
    }

    let mut reader = match stream.try_clone() {
        Ok(read_half) => BufReader::new(read_half),
        Err(e) => {
            emit(&tx, generation, LinkEvent::Errored(e.to_string()));
            return;
        }
    };

    let mut hello = String::new();
    let remote_id = match reader.read_line(&mut hello) {
        Ok(0) => {
            warn!("guest hung up before identifying");
            emit(&tx, generation, LinkEvent::Errored("guest hung up".to_string()));
            return;
        }
        Ok(_) => hello.trim().to_string(),
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
            warn!(?hello_timeout, "guest never identified");
            let _ = stream.shutdown(Shutdown::Both);
            emit(&tx, generation, LinkEvent::Errored("guest did not identify in time".to_string()));
            return;
        }
        Err(e) => {
            emit(&tx, generation, LinkEvent::Errored(e.to_string()));
            return;
        }
    };
    if let Err(e) = stream.set_read_timeout(None) {
        emit(&tx, generation, LinkEvent::Errored(e.to_string()));
        return;
    }

    let _ = tx.send(Signal::Attached {
        generation,
        stream,
        remote_id,
    });
    pump(reader, &tx, generation);
}

/// Connect to the host, identify, then pump its lines.
fn dial(
    addr: String,
    local_id: RoomCode,
    remote_id: RoomCode,
    tx: Sender<Signal>,
    cancel: Arc<AtomicBool>,
    generation: u64,
) {
    let mut stream = match TcpStream::connect(&addr) {
        Ok(stream) => stream,
        Err(e) => {
            if !cancel.load(Ordering::Relaxed) {
                emit(&tx, generation, LinkEvent::Errored(format!("could not reach {addr}: {e}")));
            }
            return;
        }
    };
    if cancel.load(Ordering::Relaxed) {
        let _ = stream.shutdown(Shutdown::Both);
        return;
    }

    if let Err(e) = writeln!(stream, "{local_id}") {
        emit(&tx, generation, LinkEvent::Errored(e.to_string()));
        return;
    }

    let reader = match stream.try_clone() {
        Ok(read_half) => BufReader::new(read_half),
        Err(e) => {
            emit(&tx, generation, LinkEvent::Errored(e.to_string()));
            return;
        }
    };

    let _ = tx.send(Signal::Attached {
        generation,
        stream,
        remote_id: remote_id.to_string(),
    });
    pump(reader, &tx, generation);
}

fn pump(mut reader: BufReader<TcpStream>, tx: &Sender<Signal>, generation: u64) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                emit(tx, generation, LinkEvent::Errored(e.to_string()));
                break;
            }
        }
        match std::str::from_utf8(&buf) {
            Ok(text) => {
                let line = text.trim_end_matches(|c| c == '\n' || c == '\r');
                if !line.is_empty() {
                    emit(tx, generation, LinkEvent::Data(line.to_string()));
                }
            }
            Err(e) => debug!(error = %e, len = buf.len(), "dropping frame that is not UTF-8"),
        }
    }
    emit(tx, generation, LinkEvent::Closed);
}
