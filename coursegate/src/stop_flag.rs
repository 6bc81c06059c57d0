use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::{signal, sync::Notify};
use tracing::info;

/// Shutdown signal shared between the http server and the signal handlers
#[derive(Clone, Debug, Default)]
pub struct StopFlag {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopFlag {
    pub fn new() -> Self {
        StopFlag::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once [`StopFlag::stop`] was called, immediately if it already was
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        if self.is_stopped() {
            return;
        }
        notified.await;
    }
}

pub fn register_signal_handler(stop_flag: &StopFlag) {
    {
        let stop_flag = stop_flag.clone();
        tokio::spawn(async move {
            let _ = signal::ctrl_c().await;
            info!("Ctrl-C received, initiating graceful shutdown...");
            stop_flag.stop();
        });
    }
    #[cfg(unix)]
    {
        let stop_flag = stop_flag.clone();

        tokio::spawn(async move {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut terminate) => {
                    terminate.recv().await;
                    info!("Terminate signal received, initiating graceful shutdown...");
                    stop_flag.stop();
                }
                Err(e) => tracing::warn!("Failed to install SIGTERM handler: {}", e),
            }
        });
    }
}
