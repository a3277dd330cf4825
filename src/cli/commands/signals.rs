use crate::core::retention::CancelReason;
use anyhow::Context;
use std::io::BufRead;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Routes Ctrl-C into a cancel channel for the rest of the process.
///
/// After the confirmation gate has resolved the receiver is gone, and Ctrl-C
/// only prints a notice: a started deletion run is never interrupted.
pub fn install_interrupt_handler(
) -> anyhow::Result<(UnboundedSender<CancelReason>, UnboundedReceiver<CancelReason>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let interrupt_tx = tx.clone();

    ctrlc::set_handler(move || {
        if interrupt_tx.send(CancelReason::Interrupted).is_err() {
            eprintln!("\n⚠️  Deletion already in progress; it cannot be cancelled now.");
        }
    })
    .context("Failed to install Ctrl-C handler")?;

    Ok((tx, rx))
}

/// Sends a cancel when an empty line is entered on stdin. Other input is
/// ignored.
pub fn listen_for_enter(tx: UnboundedSender<CancelReason>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => {
                    if tx.send(CancelReason::UserRequested).is_err() {
                        eprintln!("⚠️  Deletion already in progress; it cannot be cancelled now.");
                    }
                    return;
                }
                Ok(_) => continue,
                Err(_) => return,
            }
        }
    });
}
