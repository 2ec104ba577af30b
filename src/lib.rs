//! # Tether
//!
//! An interactive compiler for a tiny concatenative language that targets a
//! 16-bit stack machine living on a microcontroller at the far end of a
//! serial line.
//! ```text
//! Tether 0.3
//! > [dup *] 'square def
//! > 7 square .
//! 49
//! ```
//!
//! Source lines are compiled to compact byte code and either executed on the
//! device immediately or appended to its persistent dictionary. Definitions
//! stay host-side until they grow past the inline threshold, at which point
//! they migrate to the device and shrink to a two-byte call at every use.
//!
//! The `sim` port attaches an in-process model of the device, so the whole
//! toolchain runs without hardware:
//! ```text
//! > 'sim conn
//! (boot)
//! > 11 output pinMode
//! ```

#[macro_use]
pub mod lang;
pub mod mach;
pub mod term;
pub mod wire;
