//! Interactive session loop

use crate::console::{Console, HELP, Reply};
use fleet_sync::FleetSync;

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

/// Drive the console until the operator quits, input ends or `shutdown`
/// resolves.
///
/// Jobs run on spawned tasks and report back over a channel, so notifications
/// and shutdown are still handled while the fleet service is slow to answer.
/// Once input ends the session waits for the jobs still in flight.
pub async fn run_session<R, W>(
    sync: Arc<FleetSync>,
    input: R,
    mut out: W,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut console = Console::new(&sync);
    let mut events = sync.events().subscribe();
    let mut lines = input.lines();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<String>();
    let mut in_flight = 0usize;
    let mut input_open = true;
    tokio::pin!(shutdown);

    writeln!(out, "{}", HELP)?;

    while input_open || in_flight > 0 {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) => match console.handle_line(&line) {
                    Reply::Output(text) => {
                        if !text.is_empty() {
                            writeln!(out, "{}", text)?;
                        }
                    }
                    Reply::Run(job) => {
                        in_flight += 1;
                        let sync = Arc::clone(&sync);
                        let done = done_tx.clone();
                        tokio::spawn(async move {
                            let _ = done.send(job.run(&sync).await);
                        });
                    }
                    Reply::Quit => break,
                },
                None => {
                    debug!("Input closed with {} jobs in flight", in_flight);
                    input_open = false;
                }
            },
            Some(text) = done_rx.recv() => {
                in_flight -= 1;
                writeln!(out, "{}", text)?;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(text) = console.on_event(&event) {
                        writeln!(out, "{}", text)?;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Console fell behind, {} notifications skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = &mut shutdown => break,
        }
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
