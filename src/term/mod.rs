extern crate ansi_term;
extern crate linefeed;

use crate::mach::{Reply, Runtime};
use crate::wire::EventReader;
use ansi_term::Style;
use linefeed::{DefaultTerminal, Interface, ReadResult, Signal};
use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

pub fn main() {
    if std::env::args().count() > 2 {
        println!("Usage: tether [FILENAME]");
        return;
    }
    let filename = std::env::args().nth(1);
    if let Err(error) = main_loop(filename) {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}

fn main_loop(filename: Option<String>) -> std::io::Result<()> {
    let interface = Arc::new(Interface::new("tether")?);
    interface.set_report_signal(Signal::Interrupt, true);
    interface.write_fmt(format_args!("Tether {}\n", env!("CARGO_PKG_VERSION")))?;
    let mut runtime = Runtime::default();

    if let Some(filename) = filename {
        let replies = runtime.load_file(&filename);
        if render(&interface, replies)? {
            return Ok(());
        }
    }

    loop {
        service_reader(&mut runtime, &interface);
        let prompt = if runtime.show_prompt() { "> " } else { "" };
        interface.set_prompt(prompt)?;
        match interface.read_line()? {
            ReadResult::Input(line) => {
                let replies = runtime.enter(&line);
                if !line.trim().is_empty() {
                    interface.add_history_unique(line);
                }
                if render(&interface, replies)? {
                    return Ok(());
                }
            }
            ReadResult::Signal(_) => {
                interface.set_buffer("")?;
            }
            ReadResult::Eof => return Ok(()),
        }
    }
}

fn render(interface: &Interface<DefaultTerminal>, replies: Vec<Reply>) -> std::io::Result<bool> {
    for reply in replies {
        match reply {
            Reply::Print(s) => interface.write_fmt(format_args!("{}\n", s))?,
            Reply::Error(error) => interface.write_fmt(format_args!(
                "{}\n",
                Style::new().bold().paint(error.to_string())
            ))?,
            Reply::Exit => return Ok(true),
        }
    }
    Ok(false)
}

/// After a connect, move the link's read half onto a background thread
/// that prints events as they arrive. The thread ends when the link is
/// dropped or the stream closes.
fn service_reader(runtime: &mut Runtime, interface: &Arc<Interface<DefaultTerminal>>) {
    if let Some((reader, stop, trace, events)) = runtime.take_event_reader() {
        let interface = interface.clone();
        thread::spawn(move || event_loop(reader, stop, trace, events, interface));
    }
}

fn event_loop(
    reader: Box<dyn Read + Send>,
    stop: Arc<AtomicBool>,
    trace: Arc<AtomicBool>,
    events: Arc<AtomicUsize>,
    interface: Arc<Interface<DefaultTerminal>>,
) {
    let mut stream = EventReader::new(reader);
    let mut faults = 0;
    loop {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        match stream.next_event() {
            Ok(Some(event)) => {
                faults = 0;
                events.fetch_add(1, Ordering::SeqCst);
                if trace.load(Ordering::SeqCst) {
                    let mut line = format!("rx {:02X} {:02X}", event.data.len(), event.id);
                    for byte in &event.data {
                        line.push_str(&format!(" {:02X}", byte));
                    }
                    let _ = interface.write_fmt(format_args!("{}\n", line));
                }
                let _ = interface.write_fmt(format_args!("{}\n", event));
            }
            Ok(None) => return,
            Err(error) => {
                if stop.load(Ordering::SeqCst) {
                    return;
                }
                let _ = interface.write_fmt(format_args!(
                    "{}\n",
                    Style::new().bold().paint(error.to_string())
                ));
                // a wedged port produces nothing but errors; give up
                faults += 1;
                if faults > 8 {
                    return;
                }
            }
        }
    }
}
