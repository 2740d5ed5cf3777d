//! End-to-end PSK handshake exercised entirely through the synchronous
//! [`HandshakeStateMachine`] API — no network, no tokio — to cover the
//! transcript/PRF/state-transition path named in the handshake spec's
//! end-to-end scenarios.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use handshake_core::cipher_suite::CipherSuiteId;
use handshake_core::config::{Config, Identity, Transport};
use handshake_core::content::ContentType;
use handshake_core::crypto::DefaultCryptoProvider;
use handshake_core::error::Result;
use handshake_core::record_layer::{RecordLayer, SecurityParameters};
use handshake_core::{HandshakeStateMachine, Role, UpwardEvent};

type Wire = Arc<Mutex<VecDeque<(ContentType, Vec<u8>)>>>;

struct ChannelRecordLayer {
    outbound: Wire,
    disconnected: bool,
}

impl RecordLayer for ChannelRecordLayer {
    fn send(&mut self, content_type: ContentType, payload: &[u8]) -> Result<()> {
        self.outbound.lock().unwrap().push_back((content_type, payload.to_vec()));
        Ok(())
    }

    fn install_write_security_parameters(&mut self, _params: SecurityParameters) -> Result<()> {
        Ok(())
    }

    fn install_read_security_parameters(&mut self, _params: SecurityParameters) -> Result<()> {
        Ok(())
    }

    fn disconnect(&mut self) {
        self.disconnected = true;
    }
}

fn psk_config(is_client: bool, is_dtls: bool, cookie_verification_is_on: bool) -> Arc<Config> {
    Arc::new(Config {
        transport: if is_dtls { Transport::Dtls } else { Transport::Tls },
        is_client,
        supported_cipher_suites: vec![CipherSuiteId::PskWithAes128GcmSha256],
        identity: Identity {
            psk: Some(b"shared-secret".to_vec()),
            psk_identity_hint: b"client-identity".to_vec(),
        },
        crypto: Arc::new(DefaultCryptoProvider::new()),
        retransmit_interval: Duration::from_secs(1),
        retransmit_retries: 3,
        connected_retention: Duration::from_secs(240),
        extended_master_secret: false,
        cookie_verification_is_on,
    })
}

/// Pumps `from`'s outbound queue into `to` until it runs dry, feeding each
/// record into the matching `on_*` entry point the way a record layer
/// demultiplexing by content type would, and returns every upward event
/// raised along the way.
fn pump(from: &Wire, to: &mut HandshakeStateMachine) -> Vec<UpwardEvent> {
    let mut events = Vec::new();
    loop {
        let next = from.lock().unwrap().pop_front();
        let Some((content_type, payload)) = next else {
            break;
        };
        let result = match content_type {
            ContentType::Handshake => to.on_handshake_data(0, &payload),
            ContentType::ChangeCipherSpec => to.on_change_cipher(),
            ContentType::Alert | ContentType::ApplicationData | ContentType::Invalid => continue,
        };
        if let Ok(output) = result {
            events.extend(output.events);
        }
    }
    events
}

#[test]
fn psk_handshake_reaches_connected_on_both_sides() {
    let client_wire: Wire = Arc::new(Mutex::new(VecDeque::new()));
    let server_wire: Wire = Arc::new(Mutex::new(VecDeque::new()));

    let role = Role::ClientDtls;
    let mut client = HandshakeStateMachine::open(
        role,
        psk_config(true, true, false),
        Box::new(ChannelRecordLayer {
            outbound: client_wire.clone(),
            disconnected: false,
        }),
    )
    .unwrap();

    let mut server = HandshakeStateMachine::open(
        Role::ServerDtls,
        psk_config(false, true, false),
        Box::new(ChannelRecordLayer {
            outbound: server_wire.clone(),
            disconnected: false,
        }),
    )
    .unwrap();

    let output = client.initiate_handshake().unwrap();
    assert!(output.events.is_empty());

    let mut client_connected = false;
    let mut server_connected = false;

    for _ in 0..10 {
        let server_events = pump(&client_wire, &mut server);
        server_connected |= contains_connected(&server_events);
        let client_events = pump(&server_wire, &mut client);
        client_connected |= contains_connected(&client_events);
        if client_connected && server_connected {
            break;
        }
    }

    assert!(client_connected, "client never reached Connected");
    assert!(server_connected, "server never reached Connected");
}

fn contains_connected(events: &[UpwardEvent]) -> bool {
    events.iter().any(|e| matches!(e, UpwardEvent::Connected))
}

#[test]
fn dtls_hello_verify_request_round_trip_precedes_server_hello() {
    let client_wire: Wire = Arc::new(Mutex::new(VecDeque::new()));
    let server_wire: Wire = Arc::new(Mutex::new(VecDeque::new()));

    let mut client = HandshakeStateMachine::open(
        Role::ClientDtls,
        psk_config(true, true, true),
        Box::new(ChannelRecordLayer {
            outbound: client_wire.clone(),
            disconnected: false,
        }),
    )
    .unwrap();
    let mut server = HandshakeStateMachine::open(
        Role::ServerDtls,
        psk_config(false, true, true),
        Box::new(ChannelRecordLayer {
            outbound: server_wire.clone(),
            disconnected: false,
        }),
    )
    .unwrap();

    client.initiate_handshake().unwrap();
    // First ClientHello has no cookie: server challenges with
    // HelloVerifyRequest instead of proceeding to ServerHello.
    pump(&client_wire, &mut server);
    assert!(!server_wire.lock().unwrap().is_empty());
    pump(&server_wire, &mut client);
    // Client resent ClientHello with the echoed cookie.
    pump(&client_wire, &mut server);

    let mut events = Vec::new();
    for _ in 0..8 {
        events.extend(pump(&server_wire, &mut client));
        events.extend(pump(&client_wire, &mut server));
        if contains_connected(&events) {
            break;
        }
    }

    assert!(contains_connected(&events), "handshake never converged after the cookie round trip");
}
