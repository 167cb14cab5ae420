//! The engine that owns every clock face and keeps it in step with real time.

use crate::common::{ClockId, ElementId};
use crate::components::face::{ClockFace, ClockOptions};
use crate::components::tracker::ClockTracker;
use crate::config::DialclockConfig;
use crate::discovery::{PlaceholderToken, TokenError};
use crate::document::HostDocument;
use crate::events::ClockEvent;
use crate::skin::SkinRegistry;
use crate::surface::DrawingSurface;
use crate::time::{wall_time, SystemTimeSource, TimeSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// The main dialclock engine.
///
/// This struct is the application root. It holds the configuration, the skin
/// registry, the drawing surface and host document, and the tracker of every
/// face, and it drives each face's refresh chain. The engine is cheap to clone;
/// clones are handles to the same running instance.
///
/// Each face refreshes on a chain of one-shot timers. When a timer expires it
/// hands the face's [`ClockId`] to the dispatcher loop, which looks the face up
/// at that moment and ticks it. A tick redraws the face and arms the next timer
/// only if the face is still active and its host element still exists, so a
/// stopped face, a replaced face, or a face whose element was removed quietly
/// stops refreshing.
pub struct DialclockEngine<S, D> {
    config: Arc<DialclockConfig>,
    skins: Arc<SkinRegistry>,
    time: Arc<dyn TimeSource>,
    surface: Arc<RwLock<S>>,
    document: Arc<RwLock<D>>,
    tracker: Arc<RwLock<ClockTracker>>,
    fire_sender: mpsc::UnboundedSender<ClockId>,
    fire_receiver: Arc<Mutex<Option<mpsc::UnboundedReceiver<ClockId>>>>,
    event_sender: broadcast::Sender<ClockEvent>,
    next_auto_id: Arc<AtomicUsize>,
}

impl<S, D> Clone for DialclockEngine<S, D> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            skins: self.skins.clone(),
            time: self.time.clone(),
            surface: self.surface.clone(),
            document: self.document.clone(),
            tracker: self.tracker.clone(),
            fire_sender: self.fire_sender.clone(),
            fire_receiver: self.fire_receiver.clone(),
            event_sender: self.event_sender.clone(),
            next_auto_id: self.next_auto_id.clone(),
        }
    }
}

// Core implementation block for internal logic.
impl<S, D> DialclockEngine<S, D>
where
    S: DrawingSurface + 'static,
    D: HostDocument + 'static,
{
    /// Creates a new engine that samples the system clock.
    pub fn new(config: DialclockConfig, skins: SkinRegistry, surface: S, document: D) -> Self {
        const EVENT_CAPACITY: usize = 256;
        let (fire_sender, fire_receiver) = mpsc::unbounded_channel();
        let (event_sender, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            config: Arc::new(config),
            skins: Arc::new(skins),
            time: Arc::new(SystemTimeSource),
            surface: Arc::new(RwLock::new(surface)),
            document: Arc::new(RwLock::new(document)),
            tracker: Arc::new(RwLock::new(ClockTracker::new())),
            fire_sender,
            fire_receiver: Arc::new(Mutex::new(Some(fire_receiver))),
            event_sender,
            next_auto_id: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replaces the time source every face samples.
    pub fn with_time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    /// Runs the dispatcher until a shutdown signal is received.
    ///
    /// Faces render once when they are created; after that they only refresh
    /// while a dispatcher is running.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("DialclockEngine starting up...");
        let (shutdown_tx, _) = broadcast::channel(1);
        let dispatcher = self.spawn_dispatcher(shutdown_tx.subscribe());

        let clocks = self.tracker.read().await.len();
        info!("Engine running {} clocks. Press Ctrl+C to shut down.", clocks);
        tokio::signal::ctrl_c().await?;

        info!("Shutdown signal received. Stopping dispatcher...");
        if shutdown_tx.send(()).is_err() {
            error!("Failed to send shutdown signal. The dispatcher may not terminate gracefully.");
        }
        tokio::time::timeout(Duration::from_millis(50), dispatcher).await.ok();
        info!("DialclockEngine has shut down.");
        Ok(())
    }

    /// Spawns the dispatcher loop, which ticks faces as their timers expire
    /// until `shutdown_rx` receives a value.
    pub fn spawn_dispatcher(&self, shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatcher_loop(shutdown_rx).await })
    }

    #[doc(hidden)]
    async fn dispatcher_loop(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let Some(mut fire_rx) = self.fire_receiver.lock().await.take() else {
            warn!("A dispatcher is already running for this engine.");
            return;
        };
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                Some(id) = fire_rx.recv() => self.tick(id).await,
            }
        }
        // Hand the queue back so a later dispatcher can resume the chains.
        *self.fire_receiver.lock().await = Some(fire_rx);
    }

    /// Refreshes a face and arms its next tick.
    ///
    /// Does nothing if the face is unknown, inactive, or its host element no
    /// longer exists; in that case no further tick is armed either.
    pub async fn tick(&self, id: ClockId) {
        let document = self.document.read().await;
        let mut tracker = self.tracker.write().await;
        let Some(face) = tracker.get_mut(id) else {
            return;
        };
        if !face.is_active() || !document.contains(face.element()) {
            return;
        }

        let time = wall_time(self.time.now(), face.options().gmt_offset);
        {
            let mut surface = self.surface.write().await;
            face.render(time, &self.config, &mut *surface);
        }
        self.schedule_next(id, face);
        trace!("Clock '{}' rendered {:?}.", face.element(), time);
        self.event_sender
            .send(ClockEvent::Rendered { id, time })
            .ok();
    }

    #[doc(hidden)]
    fn schedule_next(&self, id: ClockId, face: &mut ClockFace) {
        let delay = face.tick_delay();
        let fire_sender = self.fire_sender.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire_sender.send(id).ok();
        });
        face.arm(timer.abort_handle());
    }

    fn next_element_id(&self) -> ElementId {
        let n = self.next_auto_id.fetch_add(1, Ordering::Relaxed);
        ElementId::new(format!("{}{}", self.config.auto_id_prefix, n))
    }
}

// Public API implementation block.
impl<S, D> DialclockEngine<S, D>
where
    S: DrawingSurface + 'static,
    D: HostDocument + 'static,
{
    /// Builds a face, tracks it under its host element, and renders it
    /// immediately.
    ///
    /// An unknown skin falls back to the configured default. If the host
    /// element is missing, the face is built but never renders.
    ///
    /// # Returns
    /// The `ClockId` of the new face.
    pub async fn add_clock(&self, options: ClockOptions) -> ClockId {
        let now = wall_time(self.time.now(), options.gmt_offset);
        let face = {
            let mut surface = self.surface.write().await;
            ClockFace::build(options, &self.skins, &self.config, &mut *surface, now)
        };
        let element = face.element().clone();
        debug!(
            "Building clock '{}' with skin '{}' at radius {}.",
            element,
            face.skin_id(),
            face.display_radius()
        );
        let id = self.tracker.write().await.track(face);
        self.event_sender
            .send(ClockEvent::Created { id, element })
            .ok();
        self.tick(id).await;
        id
    }

    /// Scans the host document for clock placeholders and creates a face for
    /// each one.
    ///
    /// Placeholders without an id are given one. Placeholders whose radius is
    /// not a number are skipped, as are elements that already have a face.
    ///
    /// # Returns
    /// The ids of the faces created, in document order.
    pub async fn discover(&self) -> Vec<ClockId> {
        let mut found = Vec::new();
        {
            let mut document = self.document.write().await;
            let tracker = self.tracker.read().await;
            for placeholder in document.placeholders() {
                let parsed = PlaceholderToken::parse(&placeholder.class, &self.config.marker);
                if let Err(TokenError::NotAClock(_)) = parsed {
                    continue;
                }
                let element = match placeholder.id {
                    Some(id) => id,
                    None => {
                        let id = self.next_element_id();
                        document.assign_id(placeholder.node, id.clone());
                        id
                    }
                };
                match parsed {
                    Ok(token) if tracker.lookup(&element).is_none() => {
                        found.push(token.into_options(element));
                    }
                    Ok(_) => trace!("Clock '{}' already exists.", element),
                    Err(error) => debug!("Skipping placeholder '{}': {}", element, error),
                }
            }
        }

        let mut created = Vec::with_capacity(found.len());
        for options in found {
            created.push(self.add_clock(options).await);
        }
        info!("Discovered {} new clocks.", created.len());
        created
    }

    /// Stops the face mounted in `element` and cancels its pending tick.
    ///
    /// Returns `true` if the element has a face.
    pub async fn stop(&self, element: &ElementId) -> bool {
        let mut tracker = self.tracker.write().await;
        let Some(id) = tracker.lookup(element) else {
            return false;
        };
        if let Some(face) = tracker.get_mut(id) {
            face.stop();
            self.event_sender.send(ClockEvent::Stopped { id }).ok();
        }
        true
    }

    /// Restarts a stopped face, rendering it immediately. Running faces are
    /// left alone.
    ///
    /// Returns `true` if the element has a face.
    pub async fn start(&self, element: &ElementId) -> bool {
        let id = {
            let mut tracker = self.tracker.write().await;
            let Some(id) = tracker.lookup(element) else {
                return false;
            };
            match tracker.get_mut(id) {
                Some(face) if !face.is_active() => face.set_active(),
                _ => return true,
            }
            id
        };
        self.event_sender.send(ClockEvent::Started { id }).ok();
        self.tick(id).await;
        true
    }

    /// The process-wide configuration.
    pub fn config(&self) -> &DialclockConfig {
        &self.config
    }

    /// The skin registry faces are built from.
    pub fn skins(&self) -> &SkinRegistry {
        &self.skins
    }

    /// A handle to the drawing surface.
    pub fn surface(&self) -> Arc<RwLock<S>> {
        self.surface.clone()
    }

    /// A handle to the host document.
    pub fn document(&self) -> Arc<RwLock<D>> {
        self.document.clone()
    }

    /// A handle to the tracker of every face.
    pub fn tracker(&self) -> Arc<RwLock<ClockTracker>> {
        self.tracker.clone()
    }

    /// Subscribes to the `ClockEvent` stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ClockEvent> {
        self.event_sender.subscribe()
    }
}
