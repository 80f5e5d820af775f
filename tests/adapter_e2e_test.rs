use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use squad_guessr::adapter::{run_game_server, ServerConfig, StaticRoundSource};
use squad_guessr::core::{GameSession, MapMetadata, MapRegistry, MemoryHighScores, RoundRecord};
use squad_guessr::types::WorldSize;

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send(&mut self, v: Value) {
        let line = serde_json::to_string(&v).unwrap();
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }

    async fn expect(&mut self, msg_type: &str) -> Value {
        let v = self.recv().await;
        assert_eq!(v["type"], msg_type, "unexpected message: {}", v);
        v
    }

    async fn hello(&mut self, seq: u64) -> Value {
        self.send(json!({"type": "hello", "seq": seq, "client": {"name": "e2e"}, "protocolVersion": "1.0.0"}))
            .await;
        self.expect("welcome").await
    }
}

fn maps() -> Arc<MapRegistry> {
    Arc::new(MapRegistry::new([
        MapMetadata::new("narva", WorldSize::square(3000.0)).with_name("Narva"),
        MapMetadata::new("gorodok", WorldSize::square(4340.0)).with_name("Gorodok"),
    ]))
}

fn pool() -> Vec<RoundRecord> {
    vec![
        RoundRecord::new("narva", 1500.0, -1500.0, "hints/narva/1.webp"),
        RoundRecord::new("narva", 1500.0, -1500.0, "hints/narva/2.webp"),
    ]
}

async fn start_server(pool: Vec<RoundRecord>) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };
    let session = GameSession::new(maps(), Box::new(MemoryHighScores::default()));
    let source = Arc::new(StaticRoundSource::new(pool, Some(11)));
    let (ready_tx, ready_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let _ = run_game_server(config, session, source, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");
    (addr, handle)
}

#[tokio::test]
async fn commands_before_hello_are_rejected() {
    let (addr, server) = start_server(pool()).await;
    let mut client = Client::connect(addr).await;

    client
        .send(json!({"type": "startNewGame", "seq": 1, "mode": "classic"}))
        .await;
    let err = client.expect("error").await;
    assert_eq!(err["code"], "handshake_required");
    assert_eq!(err["seq"], 1);

    let welcome = client.hello(2).await;
    assert_eq!(welcome["seq"], 2);
    assert_eq!(welcome["gameId"], "squad-guessr");
    assert_eq!(welcome["maps"], json!(["gorodok", "narva"]));

    // The menu can show every mode's best before a game is played.
    client.send(json!({"type": "getScores", "seq": 3})).await;
    let scores = client.expect("scores").await;
    assert_eq!(scores["seq"], 3);
    assert_eq!(
        scores["bestScores"],
        json!({"classic": 0, "mapFinder": 0, "timeAttack": 0})
    );

    server.abort();
}

#[tokio::test]
async fn full_classic_game_over_the_wire() {
    let (addr, server) = start_server(pool()).await;
    let mut client = Client::connect(addr).await;
    client.hello(1).await;

    client
        .send(json!({"type": "startNewGame", "seq": 2, "mode": "classic", "rounds": 2}))
        .await;
    assert_eq!(client.expect("ack").await["seq"], 2);
    let loaded = client.expect("roundLoaded").await;
    assert_eq!(loaded["index"], 0);
    assert_eq!(loaded["count"], 2);
    assert_eq!(loaded["mapId"], "narva");
    assert!(loaded.get("timer").is_none());

    // Dead center of a 3000m map on a 256px minimap.
    client
        .send(json!({"type": "placeGuess", "seq": 3, "x": 128.0, "y": -128.0}))
        .await;
    client.expect("ack").await;
    let resolved = client.expect("roundResolved").await;
    assert_eq!(resolved["points"], 100);
    assert_eq!(resolved["totalScore"], 100);
    assert_eq!(resolved["distanceText"], "0.00m");
    assert_eq!(resolved["solution"], json!({"x": 1500.0, "y": -1500.0}));
    assert_eq!(resolved["isLast"], false);

    client.send(json!({"type": "advance", "seq": 4})).await;
    client.expect("ack").await;
    assert_eq!(client.expect("roundLoaded").await["index"], 1);

    client.send(json!({"type": "skip", "seq": 5})).await;
    client.expect("ack").await;
    let resolved = client.expect("roundResolved").await;
    assert_eq!(resolved["points"], 0);
    assert_eq!(resolved["isLast"], true);

    client.send(json!({"type": "advance", "seq": 6})).await;
    client.expect("ack").await;
    let finished = client.expect("finished").await;
    assert_eq!(finished["totalScore"], 100);
    assert_eq!(finished["bestScore"], 100);
    assert_eq!(finished["newRecord"], true);
    assert_eq!(finished["rounds"].as_array().unwrap().len(), 2);

    client.send(json!({"type": "getScores", "seq": 7})).await;
    assert_eq!(client.expect("scores").await["bestScores"]["classic"], 100);

    // Finished only leaves through reset.
    client
        .send(json!({"type": "startNewGame", "seq": 8, "mode": "classic"}))
        .await;
    assert_eq!(client.expect("error").await["code"], "ordering_error");
    client.send(json!({"type": "reset", "seq": 9})).await;
    client.expect("ack").await;

    server.abort();
}

#[tokio::test]
async fn map_finder_name_guess() {
    let (addr, server) = start_server(pool()).await;
    let mut client = Client::connect(addr).await;
    client.hello(1).await;

    client
        .send(json!({"type": "startNewGame", "seq": 2, "mode": "mapFinder", "rounds": 1}))
        .await;
    client.expect("ack").await;
    client.expect("roundLoaded").await;

    client
        .send(json!({"type": "placeGuess", "seq": 3, "x": 1.0, "y": -1.0}))
        .await;
    assert_eq!(client.expect("error").await["code"], "guess_mismatch");

    client
        .send(json!({"type": "submitNameGuess", "seq": 4, "text": "narwa"}))
        .await;
    client.expect("ack").await;
    let resolved = client.expect("roundResolved").await;
    assert_eq!(resolved["correct"], true);
    assert_eq!(resolved["points"], 100);
    assert_eq!(resolved["mapName"], "Narva");

    server.abort();
}

#[tokio::test]
async fn seq_must_increase() {
    let (addr, server) = start_server(pool()).await;
    let mut client = Client::connect(addr).await;
    client.hello(5).await;

    client.send(json!({"type": "advance", "seq": 5})).await;
    let err = client.expect("error").await;
    assert_eq!(err["code"], "invalid_command");
    assert!(err["message"].as_str().unwrap().contains("seq"));

    server.abort();
}

#[tokio::test]
async fn unknown_and_malformed_messages_get_errors() {
    let (addr, server) = start_server(pool()).await;
    let mut client = Client::connect(addr).await;
    client.hello(1).await;

    client.send(json!({"type": "teleport", "seq": 2})).await;
    let err = client.expect("error").await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 2);

    client
        .send(json!({"type": "placeGuess", "seq": 3, "x": "left"}))
        .await;
    let err = client.expect("error").await;
    assert_eq!(err["seq"], 3);

    server.abort();
}

#[tokio::test]
async fn protocol_mismatch_closes_connection() {
    let (addr, server) = start_server(pool()).await;
    let mut client = Client::connect(addr).await;

    client
        .send(json!({"type": "hello", "seq": 1, "protocolVersion": "2.0.0"}))
        .await;
    assert_eq!(client.expect("error").await["code"], "protocol_mismatch");

    let next = tokio::time::timeout(Duration::from_secs(2), client.lines.next_line())
        .await
        .unwrap()
        .unwrap();
    assert!(next.is_none());

    server.abort();
}

#[tokio::test]
async fn unknown_map_in_batch_fails_that_round() {
    let batch = vec![RoundRecord::new("sanxian", 100.0, -100.0, "hints/x.webp")];
    let (addr, server) = start_server(batch).await;
    let mut client = Client::connect(addr).await;
    client.hello(1).await;

    client
        .send(json!({"type": "startNewGame", "seq": 2, "mode": "classic", "rounds": 1}))
        .await;
    client.expect("ack").await;
    let err = client.expect("error").await;
    assert_eq!(err["code"], "unknown_map");
    assert_eq!(err["seq"], 2);
    assert_eq!(err["recoverable"], false);

    server.abort();
}
