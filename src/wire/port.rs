use crate::mach::Device;
use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Read half of an in-memory byte duplex. Blocks until bytes arrive;
/// reports end-of-file once the far side hangs up.
pub struct PipeReader {
    rx: Receiver<u8>,
}

/// Write half of an in-memory byte duplex.
pub struct PipeWriter {
    tx: Sender<u8>,
}

/// An in-memory byte channel, one direction.
pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = channel();
    (PipeWriter { tx }, PipeReader { rx })
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.rx.recv() {
            Ok(byte) => {
                buf[0] = byte;
                let mut filled = 1;
                while filled < buf.len() {
                    match self.rx.try_recv() {
                        Ok(byte) => {
                            buf[filled] = byte;
                            filled += 1;
                        }
                        Err(_) => break,
                    }
                }
                Ok(filled)
            }
            Err(_) => Ok(0),
        }
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.tx
                .send(byte)
                .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An open connection to a device.
///
/// The write half stays with the driver; the read half is taken once by
/// the terminal and pumped on a background thread. Dropping the link
/// raises the stop flag that thread watches.
pub struct Link {
    name: String,
    writer: Box<dyn Write + Send>,
    reader: Option<Box<dyn Read + Send>>,
    stop: Arc<AtomicBool>,
    trace: Arc<AtomicBool>,
    events: Arc<AtomicUsize>,
}

impl Link {
    /// Open a port by name. `sim` starts the in-process device model;
    /// anything else is opened read-write as a filesystem node (the usual
    /// shape of a serial device on the host OS).
    pub fn open(name: &str) -> io::Result<Link> {
        let stop = Arc::new(AtomicBool::new(false));
        let (writer, reader): (Box<dyn Write + Send>, Box<dyn Read + Send>) = if name == "sim" {
            let (writer, reader) = simulator(stop.clone());
            (Box::new(writer), Box::new(reader))
        } else {
            let file = OpenOptions::new().read(true).write(true).open(name)?;
            let read_half = file.try_clone()?;
            (Box::new(file), Box::new(read_half))
        };
        Ok(Link {
            name: name.to_string(),
            writer,
            reader: Some(reader),
            stop,
            trace: Arc::new(AtomicBool::new(false)),
            events: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.writer.write_all(frame)?;
        self.writer.flush()
    }

    pub fn take_reader(&mut self) -> Option<Box<dyn Read + Send>> {
        self.reader.take()
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn trace_flag(&self) -> Arc<AtomicBool> {
        self.trace.clone()
    }

    pub fn event_count(&self) -> Arc<AtomicUsize> {
        self.events.clone()
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Wire a device model to a pair of pipes and service it on a background
/// thread: frames in, events out, the loop word run while idle.
fn simulator(stop: Arc<AtomicBool>) -> (PipeWriter, PipeReader) {
    let (host_writer, device_rx) = pipe();
    let (device_tx, host_reader) = pipe();
    thread::spawn(move || simulate(device_rx.rx, device_tx, stop));
    (host_writer, host_reader)
}

fn simulate(rx: Receiver<u8>, mut tx: PipeWriter, stop: Arc<AtomicBool>) {
    let mut device = Device::new();
    loop {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        if tx.write_all(&device.take_output()).is_err() {
            return;
        }
        match rx.recv_timeout(Duration::from_millis(1)) {
            Ok(header) => {
                let execute = header & 0x80 != 0;
                let length = (header & 0x7F) as usize;
                let mut payload = Vec::with_capacity(length);
                while payload.len() < length {
                    match rx.recv_timeout(Duration::from_millis(50)) {
                        Ok(byte) => payload.push(byte),
                        Err(RecvTimeoutError::Timeout) => {
                            if stop.load(Ordering::SeqCst) {
                                return;
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                device.frame(execute, &payload);
            }
            Err(RecvTimeoutError::Timeout) => device.service(),
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}
