use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use hsmc_testkit::FakeServer;
use hsmc_transport::MemTransport;

/// Runs a [`FakeServer`] on a background thread until `stop` is set,
/// so the test's `ClientContext` can busy-retry on the main thread without
/// deadlocking against itself.
pub fn spawn_server(
    transport: MemTransport,
    server_id: u32,
    configure: impl FnOnce(&mut FakeServer<MemTransport>) + Send + 'static,
) -> (Arc<AtomicBool>, JoinHandle<()>) {
    spawn_server_multi(vec![transport], server_id, configure)
}

/// Same as [`spawn_server`] but the server answers every client endpoint
/// in `transports`, sharing one set of key state across all of them.
pub fn spawn_server_multi(
    transports: Vec<MemTransport>,
    server_id: u32,
    configure: impl FnOnce(&mut FakeServer<MemTransport>) + Send + 'static,
) -> (Arc<AtomicBool>, JoinHandle<()>) {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = stop.clone();
    let handle = thread::spawn(move || {
        let mut transports = transports.into_iter();
        let mut server = FakeServer::new(transports.next().expect("at least one transport"), server_id);
        for t in transports {
            server.add_client(t);
        }
        configure(&mut server);
        while !stop_clone.load(Ordering::Acquire) {
            if !server.poll_once() {
                thread::yield_now();
            }
        }
    });
    (stop, handle)
}

pub fn shutdown(stop: Arc<AtomicBool>, handle: JoinHandle<()>) {
    stop.store(true, Ordering::Release);
    handle.join().expect("server thread panicked");
}
