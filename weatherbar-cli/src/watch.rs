//! The `watch` command: a terminal status line kept fresh by the scheduler.
//!
//! The main task owns stdout and is the only writer of the label; the
//! scheduler sends text through a channel sink.

use std::{io::BufRead, sync::Arc, thread};

use anyhow::Context;
use chrono::Local;
use tokio::sync::mpsc;
use weatherbar_core::{Config, Scheduler, display, format::LOADING_TEXT, provider_from_config};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Refresh,
    Quit,
}

fn parse_input(line: &str) -> Input {
    match line.trim().to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Input::Quit,
        _ => Input::Refresh,
    }
}

fn render(text: &str) {
    println!("[{}] {text}", Local::now().format("%H:%M:%S"));
}

/// Read stdin on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let (sink, mut label) = display::channel();

    let handle = Scheduler::new(
        provider,
        config.coordinates(),
        config.refresh_interval(),
        Arc::new(sink),
    )
    .spawn();

    tracing::info!(
        coords = %config.coordinates(),
        interval_secs = config.refresh_interval_secs,
        "watching weather"
    );
    eprintln!("Press Enter to refresh, q then Enter to quit.");
    render(LOADING_TEXT);

    let mut input = spawn_stdin_reader();
    let mut stdin_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            text = label.recv() => match text {
                Some(text) => render(&label.try_latest().unwrap_or(text)),
                None => break,
            },
            line = input.recv(), if stdin_open => match line.as_deref().map(parse_input) {
                Some(Input::Quit) => break,
                Some(Input::Refresh) => {
                    if !handle.refresh() {
                        tracing::debug!("refresh already queued");
                    }
                }
                None => {
                    tracing::debug!("stdin closed; manual refresh disabled");
                    stdin_open = false;
                }
            },
            res = &mut ctrl_c => {
                res.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_words_quit_everything_else_refreshes() {
        assert_eq!(parse_input("q"), Input::Quit);
        assert_eq!(parse_input(" Quit \n"), Input::Quit);
        assert_eq!(parse_input("exit"), Input::Quit);
        assert_eq!(parse_input(""), Input::Refresh);
        assert_eq!(parse_input("r"), Input::Refresh);
    }
}
