//! Advertisement lifecycle.
//!
//! [`Advertiser`] decides when to register, heartbeat and unregister. It is a
//! plain state machine driven by [`Advertiser::activate`],
//! [`Advertiser::deactivate`] and [`Advertiser::tick`]; [`Advertiser::spawn`]
//! moves it onto its own thread so every directory request runs from one
//! place, in order.
//!
//! ```text
//!            activate()            register ok
//!   Idle ───────────────► Activating ──────────► Advertising ◄─┐
//!    ▲  ▲                     │                     │   │      │ heartbeat ok
//!    │  └─────────────────────┘ register failed     │   └──────┘
//!    │       (retry after retry_delay)              │
//!    └──────────────────────────────────────────────┘
//!        failure_threshold heartbeats failed, or deactivate()
//! ```

use crate::client::RegistrationClient;
use crate::config::{DirectorySection, MasterlistConfig, ServerSection};
use crate::public_ip::resolve_public_address;
use masterlist_core::{Error, ServerDescriptor, Transport};
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Supplies the current user list for each heartbeat.
///
/// Called from the advertiser's thread. Implementations return a snapshot;
/// the advertiser never holds on to it.
pub trait UserListProvider: Send {
    fn user_list(&self) -> Vec<Value>;
}

impl<F> UserListProvider for F
where
    F: Fn() -> Vec<Value> + Send,
{
    fn user_list(&self) -> Vec<Value> {
        self()
    }
}

/// Where the advertiser is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Activating,
    Advertising,
    Deactivating,
}

/// Point-in-time view of an advertiser, for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvertiseStatus {
    pub phase: Phase,
    /// Whether the operator wants the server listed.
    pub active: bool,
    pub registered: bool,
    /// Consecutive failed heartbeats.
    pub failures: u32,
    pub trust_level: Option<i32>,
    /// Address being advertised, once known.
    pub address: Option<String>,
}

pub struct Advertiser<T, P> {
    client: RegistrationClient<T>,
    provider: P,
    server: ServerSection,
    directory: DirectorySection,
    address: Option<String>,
    phase: Phase,
    active: bool,
    failures: u32,
    /// Set once running on its own thread.
    status_tx: Option<watch::Sender<AdvertiseStatus>>,
}

impl<T: Transport, P: UserListProvider> Advertiser<T, P> {
    pub fn new(transport: T, config: &MasterlistConfig, provider: P) -> Self {
        Self {
            client: RegistrationClient::new(transport, &config.directory),
            provider,
            server: config.server.clone(),
            directory: config.directory.clone(),
            address: config.server.ip.clone(),
            phase: Phase::Idle,
            active: false,
            failures: 0,
            status_tx: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn client(&self) -> &RegistrationClient<T> {
        &self.client
    }

    pub fn status(&self) -> AdvertiseStatus {
        AdvertiseStatus {
            phase: self.phase,
            active: self.active,
            registered: self.client.is_registered(),
            failures: self.failures,
            trust_level: self.client.trust_level(),
            address: self.address.clone(),
        }
    }

    /// Start advertising. Registers right away when idle.
    pub fn activate(&mut self) {
        self.active = true;
        if self.phase == Phase::Idle {
            self.register();
        }
    }

    /// Stop advertising and withdraw the listing if there is one.
    ///
    /// No automatic retries happen until [`activate`](Self::activate) is
    /// called again.
    pub fn deactivate(&mut self) {
        self.active = false;
        if self.client.is_registered() {
            tracing::info!("withdrawing server listing");
            self.withdraw();
        }
        self.phase = Phase::Idle;
    }

    /// Run one scheduled step: retry registration when idle, heartbeat when
    /// advertising, nothing when inactive.
    pub fn tick(&mut self) {
        if !self.active {
            return;
        }
        match self.phase {
            Phase::Idle => self.register(),
            Phase::Advertising => self.heartbeat(),
            // Only seen while a call is in flight.
            Phase::Activating | Phase::Deactivating => {}
        }
    }

    /// Delay until the next [`tick`](Self::tick) should run, or `None` when
    /// nothing is scheduled.
    pub fn next_tick(&self) -> Option<Duration> {
        if !self.active {
            return None;
        }
        match self.phase {
            Phase::Advertising => Some(self.directory.heartbeat_interval()),
            _ => Some(self.directory.retry_delay()),
        }
    }

    fn register(&mut self) {
        self.enter(Phase::Activating);
        let result = self
            .descriptor()
            .and_then(|descriptor| self.client.register(&descriptor));
        match result {
            Ok(_) => {
                self.failures = 0;
                self.phase = Phase::Advertising;
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    retry_in = ?self.directory.retry_delay(),
                    "registration failed"
                );
                self.phase = Phase::Idle;
            }
        }
    }

    /// The descriptor to register, looking up the public address on first
    /// use when none is configured.
    fn descriptor(&mut self) -> Result<ServerDescriptor, Error> {
        if let Some(address) = &self.address {
            return Ok(self.server.descriptor(address.clone()));
        }
        let address = resolve_public_address(self.client.transport(), &self.directory)?;
        self.address = Some(address.clone());
        Ok(self.server.descriptor(address))
    }

    fn heartbeat(&mut self) {
        let users = self.provider.user_list();
        match self.client.send_heartbeat(&users) {
            Ok(()) => {
                if self.failures > 0 {
                    tracing::info!(after = self.failures, "heartbeat recovered");
                }
                self.failures = 0;
            }
            Err(e) if e.is_precondition() => {
                // Lost the session without going through deactivate.
                self.phase = Phase::Idle;
            }
            Err(e) => {
                self.failures += 1;
                let threshold = self.directory.failure_threshold;
                tracing::warn!(
                    error = %e,
                    failures = self.failures,
                    threshold,
                    "heartbeat failed"
                );
                if self.failures >= threshold {
                    tracing::error!(
                        failures = self.failures,
                        "too many failed heartbeats, dropping listing"
                    );
                    self.withdraw();
                    self.phase = Phase::Idle;
                }
            }
        }
    }

    /// Best-effort unregister. The session is gone either way.
    fn withdraw(&mut self) {
        self.enter(Phase::Deactivating);
        if let Err(e) = self.client.unregister() {
            tracing::warn!(error = %e, "failed to unregister, listing will expire");
        }
    }

    /// Switch phase and, when running on a thread, publish it before the
    /// blocking call that follows.
    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.publish();
    }

    fn publish(&self) {
        if let Some(status_tx) = &self.status_tx {
            status_tx.send_replace(self.status());
        }
    }
}

enum Command {
    Activate,
    Deactivate,
    Shutdown,
}

impl<T, P> Advertiser<T, P>
where
    T: Transport + Send + 'static,
    P: UserListProvider + 'static,
{
    /// Move the advertiser onto a dedicated thread.
    ///
    /// The thread starts idle; call [`AdvertiserHandle::activate`] to list
    /// the server.
    pub fn spawn(mut self) -> std::io::Result<AdvertiserHandle> {
        let (commands, receiver) = mpsc::channel();
        let (status_tx, status) = watch::channel(self.status());
        self.status_tx = Some(status_tx);
        let thread = thread::Builder::new()
            .name("masterlist-advertiser".into())
            .spawn(move || self.run(receiver))?;
        Ok(AdvertiserHandle {
            commands,
            status,
            thread: Some(thread),
        })
    }

    fn run(mut self, commands: Receiver<Command>) {
        let mut deadline = self.next_tick().map(|delay| Instant::now() + delay);
        loop {
            let received = match deadline {
                Some(at) => commands.recv_timeout(at.saturating_duration_since(Instant::now())),
                None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            let before = (self.active, self.phase);
            let ticked = match received {
                Ok(Command::Activate) => {
                    self.activate();
                    false
                }
                Ok(Command::Deactivate) => {
                    self.deactivate();
                    false
                }
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    self.tick();
                    true
                }
            };

            if ticked || before != (self.active, self.phase) {
                deadline = self.next_tick().map(|delay| Instant::now() + delay);
            }
            self.publish();
        }

        self.deactivate();
        self.publish();
        tracing::info!("advertiser stopped");
    }
}

/// Controls an advertiser running on its own thread.
///
/// Dropping the handle shuts the advertiser down and waits for it, the same
/// as [`shutdown`](Self::shutdown).
pub struct AdvertiserHandle {
    commands: Sender<Command>,
    status: watch::Receiver<AdvertiseStatus>,
    thread: Option<JoinHandle<()>>,
}

impl AdvertiserHandle {
    pub fn activate(&self) {
        let _ = self.commands.send(Command::Activate);
    }

    pub fn deactivate(&self) {
        let _ = self.commands.send(Command::Deactivate);
    }

    /// Latest published status. May lag behind the advertiser thread.
    pub fn status(&self) -> AdvertiseStatus {
        self.status.borrow().clone()
    }

    /// Withdraw the listing and stop the thread. Blocks until the final
    /// unregister request has completed or timed out.
    pub fn shutdown(mut self) -> AdvertiseStatus {
        self.stop();
        self.status()
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let _ = self.commands.send(Command::Shutdown);
        if thread.join().is_err() {
            tracing::error!("advertiser thread panicked");
        }
    }
}

impl Drop for AdvertiserHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{REGISTERED, ScriptedTransport};
    use masterlist_core::{Method, Request, Response, TransportError};
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn config(ip: Option<&str>, threshold: u32) -> MasterlistConfig {
        let mut server = ServerSection::new("Test Server");
        server.ip = ip.map(str::to_string);
        let mut directory = DirectorySection::new("api.example.org");
        directory.failure_threshold = threshold;
        MasterlistConfig::new(server, directory)
    }

    fn users() -> Vec<Value> {
        vec![json!({"name": "Bob"})]
    }

    fn advertising(
        transport: &ScriptedTransport,
        threshold: u32,
    ) -> Advertiser<&ScriptedTransport, fn() -> Vec<Value>> {
        transport.reply(200, REGISTERED);
        let mut advertiser = Advertiser::new(
            transport,
            &config(Some("203.0.113.7"), threshold),
            users as fn() -> Vec<Value>,
        );
        advertiser.activate();
        assert_eq!(advertiser.phase(), Phase::Advertising);
        advertiser
    }

    #[test]
    fn starts_idle_and_inactive() {
        let transport = ScriptedTransport::new();
        let mut advertiser = Advertiser::new(&transport, &config(None, 3), users);

        assert_eq!(advertiser.status(), AdvertiseStatus::default());
        assert_eq!(advertiser.next_tick(), None);

        advertiser.tick();
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn activate_registers_immediately() {
        let transport = ScriptedTransport::new();
        let advertiser = advertising(&transport, 3);

        let status = advertiser.status();
        assert!(status.active);
        assert!(status.registered);
        assert_eq!(status.trust_level, Some(3));
        assert_eq!(status.address.as_deref(), Some("203.0.113.7"));
        assert_eq!(transport.methods(), vec![Method::Post]);
        assert_eq!(transport.last().json()["ip"], "203.0.113.7");
        assert_eq!(advertiser.next_tick(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn resolves_address_once_before_registering() {
        let transport = ScriptedTransport::new();
        transport
            .reply(200, "198.51.100.4\n")
            .reply(200, REGISTERED)
            .reply(200, "")
            .reply(200, REGISTERED);
        let mut advertiser = Advertiser::new(&transport, &config(None, 3), users);

        advertiser.activate();
        assert_eq!(transport.sent()[1].json()["ip"], "198.51.100.4");

        advertiser.deactivate();
        advertiser.activate();

        assert_eq!(
            transport.methods(),
            vec![Method::Get, Method::Post, Method::Delete, Method::Post]
        );
        assert_eq!(advertiser.status().address.as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn failed_address_lookup_blocks_registration() {
        let transport = ScriptedTransport::new();
        transport.fail(TransportError::Timeout);
        let mut advertiser = Advertiser::new(&transport, &config(None, 3), users);

        advertiser.activate();

        assert_eq!(transport.methods(), vec![Method::Get]);
        assert_eq!(advertiser.phase(), Phase::Idle);
        assert!(advertiser.is_active());
        assert_eq!(advertiser.status().address, None);
    }

    #[test]
    fn failed_activation_retries_on_next_tick() {
        let transport = ScriptedTransport::new();
        transport.reply(500, "").reply(200, REGISTERED);
        let mut advertiser = Advertiser::new(&transport, &config(Some("203.0.113.7"), 3), users);

        advertiser.activate();
        assert_eq!(advertiser.phase(), Phase::Idle);
        assert!(advertiser.is_active());
        assert_eq!(advertiser.next_tick(), Some(Duration::from_secs(30)));
        assert_eq!(transport.sent().len(), 1);

        advertiser.tick();
        assert_eq!(advertiser.phase(), Phase::Advertising);
        assert_eq!(transport.methods(), vec![Method::Post, Method::Post]);
    }

    #[test]
    fn tick_sends_heartbeat_with_user_list() {
        let transport = ScriptedTransport::new();
        let mut advertiser = advertising(&transport, 3);
        transport.reply(200, "");

        advertiser.tick();

        let sent = transport.last();
        assert_eq!(sent.method, Method::Put);
        assert_eq!(sent.body, r#"{"challenge":"abc123","users":[{"name":"Bob"}]}"#);
        assert_eq!(advertiser.failures(), 0);
    }

    #[test]
    fn provider_is_polled_every_tick() {
        let transport = ScriptedTransport::new();
        transport.reply(200, REGISTERED).reply(200, "").reply(200, "");
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let polled = counter.clone();
        let provider = move || {
            let n = polled.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            vec![json!({"name": format!("user{n}")})]
        };
        let mut advertiser =
            Advertiser::new(&transport, &config(Some("203.0.113.7"), 3), provider);

        advertiser.activate();
        advertiser.tick();
        advertiser.tick();

        let sent = transport.sent();
        assert_eq!(sent[1].json()["users"][0]["name"], "user0");
        assert_eq!(sent[2].json()["users"][0]["name"], "user1");
    }

    #[test]
    fn failure_counter_counts_and_resets() {
        let transport = ScriptedTransport::new();
        let mut advertiser = advertising(&transport, 5);
        transport
            .reply(500, "")
            .fail(TransportError::Timeout)
            .reply(200, "")
            .reply(502, "");

        advertiser.tick();
        assert_eq!(advertiser.failures(), 1);
        advertiser.tick();
        assert_eq!(advertiser.failures(), 2);
        advertiser.tick();
        assert_eq!(advertiser.failures(), 0);
        advertiser.tick();
        assert_eq!(advertiser.failures(), 1);
        assert_eq!(advertiser.phase(), Phase::Advertising);
    }

    #[test]
    fn threshold_drops_listing_but_stays_active() {
        let transport = ScriptedTransport::new();
        let mut advertiser = advertising(&transport, 3);
        transport
            .reply(500, "")
            .reply(500, "")
            .reply(500, "")
            .reply(200, "");

        advertiser.tick();
        advertiser.tick();
        assert_eq!(advertiser.phase(), Phase::Advertising);
        advertiser.tick();

        assert_eq!(advertiser.phase(), Phase::Idle);
        assert!(advertiser.is_active());
        assert!(!advertiser.client().is_registered());
        assert_eq!(advertiser.status().trust_level, None);
        assert_eq!(
            transport.methods(),
            vec![
                Method::Post,
                Method::Put,
                Method::Put,
                Method::Put,
                Method::Delete
            ]
        );
        assert_eq!(advertiser.next_tick(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn reactivates_after_threshold_drop() {
        let transport = ScriptedTransport::new();
        let mut advertiser = advertising(&transport, 1);
        transport
            .reply(500, "")
            .reply(500, "")
            .reply(200, r#"{"verified-level": 0, "challenge": "fresh"}"#)
            .reply(200, "");

        advertiser.tick(); // heartbeat fails, unregister fails too
        assert_eq!(advertiser.phase(), Phase::Idle);

        advertiser.tick(); // re-register
        assert_eq!(advertiser.phase(), Phase::Advertising);
        assert_eq!(advertiser.failures(), 0);

        advertiser.tick();
        assert_eq!(transport.last().json()["challenge"], "fresh");
    }

    #[test]
    fn deactivate_unregisters_and_clears_active() {
        let transport = ScriptedTransport::new();
        let mut advertiser = advertising(&transport, 3);
        transport.reply(500, "").reply(200, "");

        advertiser.tick();
        assert_eq!(advertiser.failures(), 1);
        advertiser.deactivate();

        assert_eq!(advertiser.phase(), Phase::Idle);
        assert!(!advertiser.is_active());
        assert_eq!(advertiser.next_tick(), None);
        assert_eq!(transport.last().method, Method::Delete);
        assert_eq!(transport.last().body, r#"{"challenge":"abc123"}"#);

        // No automatic retries once deactivated.
        advertiser.tick();
        assert_eq!(transport.sent().len(), 3);
    }

    #[test]
    fn deactivate_when_unregister_fails() {
        let transport = ScriptedTransport::new();
        let mut advertiser = advertising(&transport, 3);
        transport.fail(TransportError::Timeout);

        advertiser.deactivate();

        let status = advertiser.status();
        assert_eq!(status.phase, Phase::Idle);
        assert!(!status.active);
        assert!(!status.registered);
        assert_eq!(status.trust_level, None);
    }

    #[test]
    fn deactivate_while_idle_sends_nothing() {
        let transport = ScriptedTransport::new();
        transport.reply(500, "");
        let mut advertiser = Advertiser::new(&transport, &config(Some("203.0.113.7"), 3), users);

        advertiser.activate();
        advertiser.deactivate();

        assert!(!advertiser.is_active());
        assert_eq!(transport.methods(), vec![Method::Post]);
    }

    fn wait_for(
        handle: &AdvertiserHandle,
        predicate: impl Fn(&AdvertiseStatus) -> bool,
    ) -> AdvertiseStatus {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let status = handle.status();
            if predicate(&status) {
                return status;
            }
            assert!(Instant::now() < deadline, "timed out, last status {status:?}");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn spawned_advertiser_registers_and_unregisters_on_shutdown() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(200, REGISTERED).reply(200, "");
        let advertiser = Advertiser::new(
            transport.clone(),
            &config(Some("203.0.113.7"), 3),
            users,
        );

        let handle = advertiser.spawn().unwrap();
        handle.activate();
        let status = wait_for(&handle, |s| s.phase == Phase::Advertising);
        assert_eq!(status.trust_level, Some(3));

        let status = handle.shutdown();
        assert!(!status.active);
        assert!(!status.registered);
        assert_eq!(transport.methods(), vec![Method::Post, Method::Delete]);
    }

    #[test]
    fn dropping_handle_withdraws_listing() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(200, REGISTERED).reply(200, "");
        let advertiser = Advertiser::new(
            transport.clone(),
            &config(Some("203.0.113.7"), 3),
            users,
        );

        let handle = advertiser.spawn().unwrap();
        handle.activate();
        wait_for(&handle, |s| s.registered);
        drop(handle);

        assert_eq!(transport.last().method, Method::Delete);
    }

    #[test]
    fn spawned_deactivate_then_activate() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .reply(200, REGISTERED)
            .reply(200, "")
            .reply(200, REGISTERED)
            .reply(200, "");
        let advertiser = Advertiser::new(
            transport.clone(),
            &config(Some("203.0.113.7"), 3),
            users,
        );

        let handle = advertiser.spawn().unwrap();
        handle.activate();
        wait_for(&handle, |s| s.registered);
        handle.deactivate();
        wait_for(&handle, |s| !s.active && !s.registered);
        handle.activate();
        wait_for(&handle, |s| s.registered);
        handle.shutdown();

        assert_eq!(
            transport.methods(),
            vec![Method::Post, Method::Delete, Method::Post, Method::Delete]
        );
    }

    #[test]
    fn spawned_advertiser_heartbeats_until_threshold() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .reply(200, REGISTERED)
            .reply(200, "")
            .reply(500, "")
            .reply(500, "");
        let mut config = config(Some("203.0.113.7"), 2);
        config.directory.heartbeat_interval_secs = 1;
        config.directory.retry_delay_secs = 1;
        let advertiser = Advertiser::new(transport.clone(), &config, users);

        let handle = advertiser.spawn().unwrap();
        handle.activate();
        wait_for(&handle, |s| s.registered);
        let status = wait_for(&handle, |s| s.phase == Phase::Idle && s.failures == 2);

        assert!(status.active);
        assert!(!status.registered);
        assert_eq!(status.trust_level, None);
        assert_eq!(
            &transport.methods()[..5],
            &[
                Method::Post,
                Method::Put,
                Method::Put,
                Method::Put,
                Method::Delete
            ]
        );
        handle.shutdown();
    }

    /// Records the published phase at the moment each request goes out.
    struct PhaseRecorder {
        inner: ScriptedTransport,
        status: watch::Receiver<AdvertiseStatus>,
        seen: Mutex<Vec<(Method, Phase)>>,
    }

    impl Transport for PhaseRecorder {
        fn send(&self, request: &Request<'_>) -> Result<Response, TransportError> {
            let phase = self.status.borrow().phase;
            self.seen.lock().unwrap().push((request.method, phase));
            self.inner.send(request)
        }
    }

    #[test]
    fn transient_phases_are_published_before_requests() {
        let (status_tx, status) = watch::channel(AdvertiseStatus::default());
        let transport = PhaseRecorder {
            inner: ScriptedTransport::new(),
            status,
            seen: Mutex::new(Vec::new()),
        };
        transport.inner.reply(200, REGISTERED).reply(200, "");
        let mut advertiser = Advertiser::new(&transport, &config(Some("203.0.113.7"), 3), users);
        advertiser.status_tx = Some(status_tx);

        advertiser.activate();
        advertiser.deactivate();

        assert_eq!(
            *transport.seen.lock().unwrap(),
            vec![
                (Method::Post, Phase::Activating),
                (Method::Delete, Phase::Deactivating)
            ]
        );
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn failed_unregister_after_threshold_is_logged() {
        let transport = ScriptedTransport::new();
        let mut advertiser = advertising(&transport, 1);
        transport.reply(500, "").fail(TransportError::Timeout);

        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || advertiser.tick());

        assert_eq!(advertiser.phase(), Phase::Idle);
        assert!(advertiser.is_active());
        assert_eq!(transport.last().method, Method::Delete);
        let output = logs.contents();
        assert!(output.contains("failed to unregister"), "{output}");
        assert!(output.contains("request timed out"), "{output}");
    }
}
