use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::dot::Surface;
use crate::settings::ConfigEdit;

use super::input::ControlInput;
use super::{RenderModel, SessionController};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Ticker {
    fn stop(self) {
        self.cancel_token.cancel();
        self.handle.abort();
    }
}

/// Async shell around [`SessionController`]: owns the single one-second tick
/// source and publishes a fresh [`RenderModel`] after every change.
pub struct SessionRunner {
    controller: Arc<Mutex<SessionController>>,
    ticker: Mutex<Option<Ticker>>,
    render_tx: Arc<watch::Sender<RenderModel>>,
    tick_interval: Duration,
}

impl SessionRunner {
    pub fn new(controller: SessionController) -> Self {
        Self::with_interval(controller, TICK_INTERVAL)
    }

    pub fn with_interval(controller: SessionController, tick_interval: Duration) -> Self {
        let (render_tx, _) = watch::channel(controller.render_model());
        Self {
            controller: Arc::new(Mutex::new(controller)),
            ticker: Mutex::new(None),
            render_tx: Arc::new(render_tx),
            tick_interval,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderModel> {
        self.render_tx.subscribe()
    }

    pub async fn render_model(&self) -> RenderModel {
        self.controller.lock().await.render_model()
    }

    /// Runs `f` against the controller under the session lock.
    pub async fn with_controller<R>(&self, f: impl FnOnce(&SessionController) -> R) -> R {
        let guard = self.controller.lock().await;
        f(&guard)
    }

    pub async fn start(&self) {
        self.controller.lock().await.start();
        self.sync_ticker().await;
    }

    pub async fn pause(&self) {
        self.controller.lock().await.pause();
        self.sync_ticker().await;
    }

    pub async fn toggle_running(&self) -> bool {
        let running = self.controller.lock().await.toggle_running();
        self.sync_ticker().await;
        running
    }

    /// Debounced UI/keyboard toggle.
    pub async fn press(&self, input: ControlInput) -> bool {
        let toggled = self
            .controller
            .lock()
            .await
            .press(&input, std::time::Instant::now());
        if toggled {
            self.sync_ticker().await;
        }
        toggled
    }

    pub async fn reset(&self) {
        self.controller.lock().await.reset();
        self.sync_ticker().await;
    }

    pub async fn apply_edit(&self, edit: ConfigEdit) {
        self.controller.lock().await.apply_edit(edit);
        self.publish().await;
    }

    pub async fn set_sound_enabled(&self, enabled: bool) {
        self.controller.lock().await.set_sound_enabled(enabled);
        self.publish().await;
    }

    pub async fn set_surface(&self, surface: Option<Surface>) {
        self.controller.lock().await.set_surface(surface);
    }

    /// Stops the tick source for good. Dropping the runner does the same.
    pub async fn shutdown(&self) {
        self.controller.lock().await.pause();
        self.cancel_ticker().await;
        self.publish().await;
        log_info!("session runner shut down");
    }

    async fn sync_ticker(&self) {
        let running = self.controller.lock().await.is_running();
        if running {
            self.spawn_ticker().await;
        } else {
            self.cancel_ticker().await;
        }
        self.publish().await;
    }

    async fn publish(&self) {
        let model = self.controller.lock().await.render_model();
        self.render_tx.send_replace(model);
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if ticker_guard
            .as_ref()
            .is_some_and(|ticker| !ticker.handle.is_finished())
        {
            return;
        }

        let controller = self.controller.clone();
        let render_tx = self.render_tx.clone();
        let tick_interval = self.tick_interval;
        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(async move {
            // First tick lands one full period after start.
            let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let model = {
                            let mut guard = controller.lock().await;
                            if !guard.is_running() {
                                break;
                            }
                            guard.tick();
                            guard.render_model()
                        };
                        render_tx.send_replace(model);
                    }
                    _ = token_clone.cancelled() => {
                        log_debug!("ticker cancelled");
                        break;
                    }
                }
            }
        });

        *ticker_guard = Some(Ticker {
            handle,
            cancel_token,
        });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.stop();
        }
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.get_mut().take() {
            ticker.stop();
        }
    }
}
