/*!
## Machine Module

The byte-code model, the dictionary, the assembler with its shrinker, an
executable model of the device, and the interactive driver that ties them
to the wire.

*/

mod compile;
mod device;
mod dictionary;
mod op;
mod runtime;

pub use compile::Compiler;
pub use device::Device;
pub use device::MEM_SIZE;
pub use dictionary::{Definition, Dictionary, Forced, Lazy};
pub use op::{disassemble, opcode, Op};
pub use runtime::{Reply, Runtime};
