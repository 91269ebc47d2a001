//! # Shell Core Demo
//!
//! Terminal walkthrough of the callback and registry layer: opens a session,
//! constructs the top-level shells, wires their callbacks together and prints
//! what the registry sees at each step.
//!
//! ## Usage
//!
//! ```text
//! shell_cli [config.json]
//! ```
//!
//! Set `RUST_LOG=debug` to watch registrations as they happen.

use std::path::Path;
use std::rc::Rc;

use shell_core::callback::Callback;
use shell_core::registry::RegistryEvent;
use shell_core::session::Session;
use shell_core::shells::{
    append_to_output_log, ListView, MainFrame, OutputLog, ProjectBrowser, ShellKind, ShellRef,
    TopLevelShell,
};
use shell_core::types::{is_a, TypeTag};
use shell_core::{RegistryConfig, ShellError};

fn open_session() -> Result<Session, ShellError> {
    match std::env::args().nth(1) {
        Some(path) => Session::load(Path::new(&path)),
        None => Ok(Session::new(RegistryConfig::default())),
    }
}

fn main() {
    env_logger::init();

    println!("Shell Core Demo - Callbacks and Shell Registry");
    println!("==============================================");
    println!();

    let session = match open_session() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            std::process::exit(1);
        }
    };
    let registry = session.registry();

    println!("Policy: {}", session.config().duplicate_policy.display_name());
    registry.set_observer(Callback::new(|event: &RegistryEvent| {
        println!("  [registry] {}", event);
    }));

    println!();
    println!("Output log before construction: {}", status(session.shell(ShellKind::OutputLog).is_some()));
    println!("Nothing to append to: {}", !append_to_output_log(registry, "dropped"));

    let frame = match MainFrame::new(registry, "Shell Core Demo") {
        Ok(frame) => frame,
        Err(e) => report(e),
    };
    let output = match OutputLog::new(registry) {
        Ok(output) => output,
        Err(e) => report(e),
    };
    let browser = match ProjectBrowser::new(registry) {
        Ok(browser) => browser,
        Err(e) => report(e),
    };
    println!("Output log after construction: {}", status(session.shell(ShellKind::OutputLog).is_some()));

    // Browser selection reports through the frame's status line, which in
    // turn mirrors into the output log.
    browser.set_items(["B-1 Floor Beam", "C-1 Column", "H-1 Header"]);
    let status_frame = Rc::downgrade(&frame);
    browser.on_selection_changed(Callback::new(move |row: &usize, label: &String| {
        if let Some(frame) = status_frame.upgrade() {
            frame.set_status(&format!("selected row {row}: {label}"));
        }
    }));
    browser.select(1);
    browser.select(2);
    if let Some(label) = browser.selected().and_then(|row| browser.items().get(row).cloned()) {
        frame.set_title(format!("Shell Core Demo - {label}"));
    }
    println!("Frame title: {}", frame.title());

    let append: Callback<str> = Callback::method(&output, OutputLog::append);
    append.invoke("hello");

    println!();
    println!("Output log text:");
    for line in output.text().lines() {
        println!("  | {}", line);
    }

    println!();
    println!("Capabilities:");
    for shell in session.open_shells() {
        let tag = shell.as_component().type_tag();
        println!(
            "  {:<16} {}  top-level={} list={}",
            shell.kind().display_name(),
            tag,
            is_a(tag, TypeTag::of::<dyn TopLevelShell>()),
            is_a(tag, TypeTag::of::<dyn ListView>()),
        );
        if let ShellRef::ProjectBrowser(browser) = &shell {
            println!("  {:<16} selected={:?}", "", browser.selected());
        }
    }

    println!();
    println!("Registry snapshot:");
    match serde_json::to_string_pretty(&registry.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: {}", e),
    }

    println!();
    drop(output);
    println!("Output log after drop: {}", status(session.shell(ShellKind::OutputLog).is_some()));
    let late = append.invoke("late");
    println!("Stale append delivered: {} ({:?})", late.is_delivered(), late);
    log::info!("demo finished with {} shells open", registry.len());
}

fn report(error: ShellError) -> ! {
    eprintln!("Error [{}]: {}", error.error_code(), error);
    std::process::exit(1);
}

fn status(open: bool) -> &'static str {
    if open { "[OPEN]" } else { "[NONE]" }
}
