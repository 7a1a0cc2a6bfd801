use iris_pointer::config::Config;
use iris_pointer::frame::decode_frame;
use iris_pointer::logging::init_tracing;
use iris_pointer::pointer::{DryRunPointer, JsonLinesPointer, PointerDevice};
use iris_pointer::tracker::Tracker;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(&config.log_config());

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(2);
    }
    tracing::info!(
        screen_width = config.screen.width,
        screen_height = config.screen.height,
        dry_run = config.pointer_dry_run,
        "Starting iris-pointer"
    );

    let mut pointer: Box<dyn PointerDevice> = if config.pointer_dry_run {
        Box::new(DryRunPointer::default())
    } else {
        Box::new(JsonLinesPointer::new(std::io::stdout()))
    };
    let mut tracker = Tracker::new(config.tracker_config());

    run(&mut tracker, pointer.as_mut()).await;

    tracing::info!(
        blinks = tracker.blink().total_blinks(),
        calibrated = tracker.calibration().is_calibrated(),
        "Shutdown complete"
    );
}

/// Process frames until stdin closes or an exit signal arrives.
async fn run(tracker: &mut Tracker, pointer: &mut dyn PointerDevice) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut frames: u64 = 0;
    loop {
        let line = tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!(frames, "Input closed");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read frame input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match decode_frame(&line) {
            Ok(frame) => {
                frames += 1;
                let outcome = tracker.process_frame(&frame, pointer);
                if let Some(Err(e)) = &outcome.fit {
                    tracing::warn!(error = %e, "Calibration fit rejected");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Skipping malformed frame"),
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}
