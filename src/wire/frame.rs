use crate::lang::Error;
use std::io::Read;

type Result<T> = std::result::Result<T, Error>;

/// Payload capacity of one host-to-device frame.
pub const MAX_PAYLOAD: usize = 127;

/// Device announced a (re)boot.
pub const BOOT_EVENT: u8 = 0xFF;
/// VM fault; one data byte carries the code.
pub const VM_ERROR_EVENT: u8 = 0xFE;
/// Id used by the interactive `.` word; rendered as a bare value.
pub const PRINT_EVENT: u8 = 0xF0;

/// Build a host-to-device frame. The header byte is the payload length in
/// the low seven bits; the high bit set means execute now rather than
/// append to the device dictionary.
pub fn frame(execute: bool, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD {
        return Err(error!(ProtocolError; "FRAME TOO LONG"));
    }
    let mut bytes = Vec::with_capacity(payload.len() + 1);
    bytes.push(payload.len() as u8 | if execute { 0x80 } else { 0 });
    bytes.extend(payload);
    Ok(bytes)
}

/// One device-to-host notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: u8,
    pub data: Vec<u8>,
}

impl Event {
    /// Scalar reading of the payload: empty is zero, one byte is signed,
    /// anything longer is a big-endian 16-bit value.
    pub fn value(&self) -> i16 {
        match self.data.len() {
            0 => 0,
            1 => self.data[0] as i8 as i16,
            _ => (((self.data[0] as u16) << 8) | self.data[1] as u16) as i16,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.id {
            BOOT_EVENT => write!(f, "(boot)"),
            VM_ERROR_EVENT => {
                let what = match self.data.first().copied() {
                    Some(0) => "return stack underflow",
                    Some(1) => "return stack overflow",
                    Some(2) => "data stack underflow",
                    Some(3) => "data stack overflow",
                    Some(4) => "out of memory",
                    _ => "unknown",
                };
                write!(f, "(vm error: {})", what)
            }
            PRINT_EVENT => write!(f, "{}", self.value()),
            _ => {
                if self.data.len() > 2 {
                    write!(f, "event {}:", self.id)?;
                    for byte in &self.data {
                        write!(f, " {:02X}", byte)?;
                    }
                    Ok(())
                } else {
                    write!(f, "event {}: {}", self.id, self.value())
                }
            }
        }
    }
}

/// Pulls events off the device byte stream.
///
/// Framing errors are local: a truncated frame is reported once and the
/// reader picks up again at the next byte. A clean end of stream yields
/// `None`.
pub struct EventReader<R: Read> {
    reader: R,
}

impl<R: Read> EventReader<R> {
    pub fn new(reader: R) -> EventReader<R> {
        EventReader { reader }
    }

    pub fn next_event(&mut self) -> Result<Option<Event>> {
        let mut length = [0u8; 1];
        match self.reader.read(&mut length) {
            Ok(0) => return Ok(None),
            Ok(_) => {}
            Err(error) => return Err(error!(ProtocolError; error.to_string())),
        }
        let mut id = [0u8; 1];
        read_fully(&mut self.reader, &mut id)?;
        let mut data = vec![0u8; length[0] as usize];
        read_fully(&mut self.reader, &mut data)?;
        Ok(Some(Event { id: id[0], data }))
    }
}

fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(error!(ProtocolError; "TRUNCATED EVENT")),
            Ok(n) => filled += n,
            Err(error) => return Err(error!(ProtocolError; error.to_string())),
        }
    }
    Ok(())
}
