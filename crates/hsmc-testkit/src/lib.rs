//! Test-only scaffolding: a fake HSM server driving [`hsmc_transport::MemTransport`].

mod server;

pub use server::FakeServer;
