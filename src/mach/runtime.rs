use super::compile::Compiler;
use super::op::{disassemble, opcode};
use crate::lang::{self, Error, Node};
use crate::wire::{frame, Link, MAX_PAYLOAD};
use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// What one input line produced, for the terminal to render.
#[derive(Debug)]
pub enum Reply {
    Print(String),
    Error(Error),
    Exit,
}

/// The interactive driver.
///
/// Scans each parsed line left to right, consuming directives against a
/// stack of nodes; whatever survives is assembled and framed for the
/// device, definition frames ahead of the execute frame.
pub struct Runtime {
    compiler: Compiler,
    link: Option<Link>,
    tracing: bool,
    prompt: bool,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}

impl Runtime {
    pub fn new() -> Runtime {
        Runtime {
            compiler: Compiler::new(),
            link: None,
            tracing: false,
            prompt: true,
        }
    }

    pub fn show_prompt(&self) -> bool {
        self.prompt
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Hand the connection's read half to a caller that wants to pump
    /// events, together with the flags the pump should honor.
    pub fn take_event_reader(
        &mut self,
    ) -> Option<(
        Box<dyn Read + Send>,
        Arc<AtomicBool>,
        Arc<AtomicBool>,
        Arc<AtomicUsize>,
    )> {
        let link = self.link.as_mut()?;
        let reader = link.take_reader()?;
        Some((
            reader,
            link.stop_flag(),
            link.trace_flag(),
            link.event_count(),
        ))
    }

    /// Process one source line.
    pub fn enter(&mut self, line: &str) -> Vec<Reply> {
        let mut replies = vec![];
        if let Err(error) = self.interpret(line, &mut replies) {
            replies.push(Reply::Error(error));
        }
        replies
    }

    /// Feed a file through the driver, line by line.
    pub fn load_file(&mut self, path: &str) -> Vec<Reply> {
        let mut replies = vec![];
        if let Err(error) = self.load_path(path, &mut replies) {
            replies.push(Reply::Error(error));
        }
        replies
    }

    fn interpret(&mut self, line: &str, replies: &mut Vec<Reply>) -> Result<()> {
        let nodes = lang::read(line)?;
        let mut stack: Vec<Node> = vec![];
        for node in nodes {
            if let Node::Token(token) = &node {
                match token.as_str() {
                    "connect" | "conn" => {
                        self.connect(&mut stack, replies)?;
                        continue;
                    }
                    "disconnect" => {
                        self.disconnect()?;
                        continue;
                    }
                    "reset" => {
                        self.reset(replies)?;
                        continue;
                    }
                    "define" | "def" => {
                        self.define(&mut stack)?;
                        continue;
                    }
                    "variable" | "var" => {
                        let name = pop_name(&mut stack, "VARIABLE")?;
                        self.compiler.define_variable(&name);
                        continue;
                    }
                    "instruction" => {
                        self.instruction(&mut stack)?;
                        continue;
                    }
                    "load" => {
                        let path = pop_name(&mut stack, "LOAD")?;
                        self.load_path(&path, replies)?;
                        continue;
                    }
                    "." => {
                        stack.push(Node::Number(crate::wire::PRINT_EVENT as i16));
                        stack.push(Node::Token("event".to_string()));
                        continue;
                    }
                    "trace" => {
                        self.tracing = !self.tracing;
                        if let Some(link) = &self.link {
                            link.trace_flag().store(self.tracing, Ordering::SeqCst);
                        }
                        let state = if self.tracing { "TRACE ON" } else { "TRACE OFF" };
                        replies.push(Reply::Print(state.to_string()));
                        continue;
                    }
                    "memory" | "mem" => {
                        replies.push(Reply::Print(self.report()));
                        continue;
                    }
                    "prompt" => {
                        self.prompt = !self.prompt;
                        continue;
                    }
                    "exit" => {
                        self.link.take();
                        replies.push(Reply::Exit);
                        return Ok(());
                    }
                    _ => {}
                }
            }
            stack.push(node);
        }
        self.transmit(stack, replies)
    }

    fn connect(&mut self, stack: &mut Vec<Node>, replies: &mut Vec<Reply>) -> Result<()> {
        if self.link.is_some() {
            return Err(error!(BadDirective; "ALREADY CONNECTED"));
        }
        let name = pop_name(stack, "CONNECT")?;
        let link = Link::open(&name).map_err(|e| error!(ConnectFailed; e.to_string()))?;
        link.trace_flag().store(self.tracing, Ordering::SeqCst);
        self.link = Some(link);
        // start the device from known-clean state
        self.send(true, &[opcode::RESET, opcode::RETURN], replies)
    }

    fn disconnect(&mut self) -> Result<()> {
        match self.link.take() {
            Some(_) => Ok(()),
            None => Err(error!(NotConnected)),
        }
    }

    fn reset(&mut self, replies: &mut Vec<Reply>) -> Result<()> {
        self.compiler.reset();
        if self.link.is_some() {
            self.send(true, &[opcode::RESET, opcode::RETURN], replies)?;
        }
        Ok(())
    }

    fn define(&mut self, stack: &mut Vec<Node>) -> Result<()> {
        let name = pop_name(stack, "DEFINE")?;
        match stack.pop() {
            Some(Node::Quotation(body)) => {
                self.compiler.define(&name, body);
                Ok(())
            }
            _ => Err(error!(BadDirective; "DEFINE NEEDS A BODY QUOTATION")),
        }
    }

    fn instruction(&mut self, stack: &mut Vec<Node>) -> Result<()> {
        let name = pop_name(stack, "INSTRUCTION")?;
        match stack.pop() {
            Some(Node::Number(byte)) if (0..=127).contains(&byte) => {
                self.compiler.define_instruction(&name, byte as u8);
                Ok(())
            }
            _ => Err(error!(BadDirective; "INSTRUCTION NEEDS AN OPCODE 0-127")),
        }
    }

    fn load_path(&mut self, path: &str, replies: &mut Vec<Reply>) -> Result<()> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| error!(FileError; format!("{}: {}", path, e)))?;
        for line in text.lines() {
            if let Err(error) = self.interpret(line, replies) {
                replies.push(Reply::Error(error));
            }
        }
        Ok(())
    }

    /// Assemble the residual stack and emit frames: pending definitions
    /// first, then the immediate code terminated by a return.
    fn transmit(&mut self, stack: Vec<Node>, replies: &mut Vec<Reply>) -> Result<()> {
        let code = self.compiler.eager(&stack)?;
        if self.link.is_none() {
            if !code.is_empty() {
                return Err(error!(NotConnected));
            }
            // definitions shrunk while disconnected stay pending
            return Ok(());
        }
        let pending = self.compiler.take_pending();
        for chunk in pending.chunks(MAX_PAYLOAD) {
            self.send(false, chunk, replies)?;
        }
        if !code.is_empty() {
            let mut payload = code;
            if payload.len() < MAX_PAYLOAD {
                payload.push(opcode::RETURN);
            }
            self.send(true, &payload, replies)?;
        }
        Ok(())
    }

    fn send(&mut self, execute: bool, payload: &[u8], replies: &mut Vec<Reply>) -> Result<()> {
        let bytes = frame(execute, payload)?;
        if self.tracing {
            replies.push(Reply::Print(format!("tx {}", hex(&bytes))));
            let mut listing = String::from("  ");
            for op in disassemble(payload, self.compiler.dictionary()) {
                listing.push(' ');
                listing.push_str(&op.to_string());
            }
            replies.push(Reply::Print(listing));
        }
        match &mut self.link {
            Some(link) => link
                .send(&bytes)
                .map_err(|e| error!(WriteFailed; e.to_string())),
            None => Err(error!(NotConnected)),
        }
    }

    fn report(&self) -> String {
        let (port, events) = match &self.link {
            Some(link) => (
                link.name().to_string(),
                link.event_count().load(Ordering::SeqCst),
            ),
            None => ("none".to_string(), 0),
        };
        format!(
            "port {}  address {}  pending {}  words {}  events {}",
            port,
            self.compiler.address(),
            self.compiler.pending_len(),
            self.compiler.dictionary().len(),
            events
        )
    }
}

fn pop_name(stack: &mut Vec<Node>, directive: &str) -> Result<String> {
    if let Some(Node::Quotation(nodes)) = stack.pop() {
        if let [Node::Token(name)] = nodes.as_slice() {
            return Ok(name.clone());
        }
    }
    Err(error!(BadDirective; format!("{} NEEDS A QUOTED NAME", directive)))
}

fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for byte in bytes {
        if !s.is_empty() {
            s.push(' ');
        }
        s.push_str(&format!("{:02X}", byte));
    }
    s
}
