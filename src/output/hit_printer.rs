use indicatif::ProgressBar;
use tokio::sync::mpsc;

use crate::matching::Evidence;
use crate::output::format::{render, HitFormat, Layout};

/// Spawn a background task that prints every hit to stdout as it arrives.
/// The task ends once all senders are dropped and returns the number printed.
pub fn spawn_hit_printer(
    mut rx: mpsc::Receiver<Evidence>,
    layout: Layout,
    format: HitFormat,
    progress: Option<ProgressBar>,
) -> tokio::task::JoinHandle<u64> {
    tokio::spawn(async move {
        let mut printed = 0u64;
        while let Some(ev) = rx.recv().await {
            let line = render(&ev, layout, format);
            match &progress {
                // keep the bar from tearing the line
                Some(pb) => pb.suspend(|| println!("{}", line)),
                None => println!("{}", line),
            }
            printed += 1;
        }
        printed
    })
}
