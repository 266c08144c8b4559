use std::io::Write;
use std::sync::mpsc::{self, Receiver, Sender};

/// Messages headed for the shell. Every response, sync or async, goes
/// through one channel so only the writer loop touches the output stream.
#[derive(Debug)]
pub enum Outgoing {
    Line(String),
    /// Acknowledged once every line queued before it has been written.
    Flush(Sender<()>),
}

pub type Outbox = Sender<Outgoing>;

pub fn channel() -> (Outbox, Receiver<Outgoing>) {
    mpsc::channel()
}

/// Drains the outbox until all senders are gone or the output breaks.
pub fn run_writer<W: Write>(rx: Receiver<Outgoing>, mut out: W) {
    for msg in rx {
        match msg {
            Outgoing::Line(line) => {
                if writeln!(out, "{line}").is_err() {
                    break;
                }
                let _ = out.flush();
            }
            Outgoing::Flush(ack) => {
                let _ = out.flush();
                let _ = ack.send(());
            }
        }
    }
}

/// Blocks until the writer has emitted everything queued so far.
pub fn flush(outbox: &Outbox) {
    let (ack_tx, ack_rx) = mpsc::channel();
    if outbox.send(Outgoing::Flush(ack_tx)).is_ok() {
        let _ = ack_rx.recv();
    }
}
