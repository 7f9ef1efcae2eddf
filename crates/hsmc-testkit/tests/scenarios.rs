mod common;

use common::{shutdown, spawn_server, spawn_server_multi};
use hsmc_client::{ClientConfig, ClientContext, HsmError};
use hsmc_comm::CommClient;
use hsmc_transport::MemTransport;
use hsmc_wire::{pack, Group, KEYID_ERASED};

#[test]
fn s1_init_close() {
    let (client_t, server_t) = MemTransport::pair();
    let (stop, handle) = spawn_server(server_t, 124, |_| {});

    let mut ctx = ClientContext::init(ClientConfig::comm_only(client_t, 7)).unwrap();
    let server_id = ctx.comm_init().unwrap();
    assert_eq!((ctx.client_id(), server_id), (7, 124));

    ctx.comm_close().unwrap();
    assert!(ctx.is_terminated());

    shutdown(stop, handle);
}

#[test]
fn s2_echo_roundtrip() {
    let (client_t, server_t) = MemTransport::pair();
    let (stop, handle) = spawn_server(server_t, 1, |_| {});

    let mut ctx = ClientContext::init(ClientConfig::comm_only(client_t, 1)).unwrap();
    let out = ctx.echo(b"mytextisbigplain").unwrap();
    assert_eq!(out, b"mytextisbigplain");
    assert_eq!(out.len(), 16);

    shutdown(stop, handle);
}

#[test]
fn s3_cache_export_roundtrip() {
    let (client_t, server_t) = MemTransport::pair();
    let (stop, handle) = spawn_server(server_t, 1, |_| {});

    let mut ctx = ClientContext::init(ClientConfig::comm_only(client_t, 1)).unwrap();
    let key_bytes: Vec<u8> = (0u8..=0x0F).collect();
    let label = vec![0xFFu8; 24];

    let id = ctx
        .key_cache(KEYID_ERASED, 0, &label, key_bytes.clone())
        .unwrap();
    assert_ne!(id, KEYID_ERASED);

    let exported = ctx.key_export(id).unwrap();
    assert_eq!(exported.key_bytes, key_bytes);
    assert_eq!(exported.label, label);

    shutdown(stop, handle);
}

#[test]
fn s4_cross_client_isolation() {
    let (client1_t, server1_t) = MemTransport::pair();
    let (client2_t, server2_t) = MemTransport::pair();
    let (stop, handle) = spawn_server_multi(vec![server1_t, server2_t], 1, |_| {});

    let mut ctx1 = ClientContext::init(ClientConfig::comm_only(client1_t, 1)).unwrap();
    let k1 = vec![0xAAu8; 8];
    let id = ctx1.key_cache(KEYID_ERASED, 0, b"k1", k1.clone()).unwrap();

    let mut ctx2 = ClientContext::init(ClientConfig::comm_only(client2_t, 2)).unwrap();

    // Client 2 doesn't own id on the shared server, so evicting it yields
    // NotFound rather than touching client 1's cache entry.
    let err = ctx2.key_evict(id).unwrap_err();
    assert_eq!(err, HsmError::NotFound);

    let k2 = vec![0xBBu8; 8];
    let id2 = ctx2.key_cache(id, 0, b"k2", k2.clone()).unwrap();
    assert_eq!(id2, id);
    let exported2 = ctx2.key_export(id).unwrap();
    assert_eq!(exported2.key_bytes, k2);

    // Client 1's own entry at the same id number is unaffected.
    let exported1 = ctx1.key_export(id).unwrap();
    assert_eq!(exported1.key_bytes, k1);

    shutdown(stop, handle);
}

#[test]
fn s5_commit_survives_evict() {
    let (client_t, server_t) = MemTransport::pair();
    let (stop, handle) = spawn_server(server_t, 1, |_| {});

    let mut ctx = ClientContext::init(ClientConfig::comm_only(client_t, 1)).unwrap();
    let key_bytes = vec![1, 2, 3, 4];
    let id = ctx
        .key_cache(KEYID_ERASED, 0, b"persist-me", key_bytes.clone())
        .unwrap();
    ctx.key_commit(id).unwrap();
    ctx.key_evict(id).unwrap();

    let exported = ctx.key_export(id).unwrap();
    assert_eq!(exported.key_bytes, key_bytes);

    shutdown(stop, handle);
}

#[test]
fn s6_mismatched_reply_is_aborted() {
    let (client_t, peer_t) = MemTransport::pair();
    let mut ctx = ClientContext::init(ClientConfig::comm_only(client_t, 1)).unwrap();

    ctx.send_request(Group::Key, hsmc_wire::key_action::CACHE, &[])
        .unwrap();

    // Inject a reply tagged as a KEY_EVICT response instead of KEY_CACHE.
    let raw = CommClient::new(peer_t, 1);
    let bogus_kind = pack(Group::Key, hsmc_wire::key_action::EVICT);
    let frame = raw.encode_request(bogus_kind, 9999, &[]);
    raw.try_send(&frame).unwrap();

    let err = ctx.recv_response().unwrap_err();
    assert_eq!(err, HsmError::Aborted);

    // The context is back in IDLE and can start a fresh exchange.
    let status = ctx
        .send_request(Group::Key, hsmc_wire::key_action::EVICT, &[])
        .unwrap();
    assert!(matches!(status, hsmc_client::SendStatus::Sent { .. }));
}
