/*!
## Wire Module

The framed transport between host and device: length-prefixed frames in
both directions over any byte-oriented duplex channel. No escaping, no
checksums, no sequence numbers.

*/

mod frame;
mod port;

pub use frame::{frame, Event, EventReader, BOOT_EVENT, MAX_PAYLOAD, PRINT_EVENT, VM_ERROR_EVENT};
pub use port::{pipe, Link, PipeReader, PipeWriter};
