//! End-to-end tests for the Ringgz server over real TCP connections.

use std::time::Duration;

use ringgz::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on a random port with starting base 6 and returns the
/// address.
async fn start_server() -> String {
    start_with(RinggzServer::builder()).await
}

async fn start_with(builder: ServerBuilder) -> String {
    let server = builder
        .bind("127.0.0.1:0")
        .starting_base(6)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

/// A line-oriented test client.
struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("should connect");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("send");
    }

    async fn recv(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read failed")
            .expect("connection closed")
    }

    async fn expect(&mut self, line: &str) {
        assert_eq!(self.recv().await, line);
    }

    /// `true` once the server has closed the connection.
    async fn is_closed(&mut self) -> bool {
        match tokio::time::timeout(Duration::from_secs(2), self.lines.next_line()).await {
            Ok(Ok(None)) | Ok(Err(_)) => true,
            Ok(Ok(Some(_))) | Err(_) => false,
        }
    }

    /// Joins and waits for `accept`.
    async fn join(addr: &str, name: &str, opponents: u8) -> Self {
        let mut client = Self::connect(addr).await;
        client.send(&format!("join~{name}~{opponents}")).await;
        client.expect("accept").await;
        client
    }
}

/// Alice and Bob matched through the random queue, both past `nextMove`.
async fn two_player_game(addr: &str) -> (Client, Client) {
    let mut alice = Client::join(addr, "Alice", 0).await;
    let mut bob = Client::join(addr, "Bob", 0).await;
    for client in [&mut alice, &mut bob] {
        client.expect("startGame~6~Alice~Bob").await;
        client.expect("nextMove~Alice").await;
    }
    (alice, bob)
}

// =========================================================================
// Before join
// =========================================================================

#[tokio::test]
async fn test_malformed_line_gets_unknown_command_error() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr).await;

    client.send("dance~now").await;
    assert!(client.recv().await.starts_with("error~5~"));

    client.send("join~Alice~x").await;
    assert!(client.recv().await.starts_with("error~5~"));

    // The connection survives.
    client.send("join~Alice~1").await;
    client.expect("accept").await;
}

#[tokio::test]
async fn test_commands_before_join_are_refused() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr).await;

    client.send("getPlayers").await;
    client.expect("error~7~join first").await;

    client.send("doMove~0~0~0").await;
    client.expect("error~6~not in a game").await;
}

#[tokio::test]
async fn test_client_error_gets_no_reply() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr).await;

    client.send("error~7~Error").await;
    client.send("join~Alice~1").await;

    client.expect("accept").await;
}

// =========================================================================
// Lobby
// =========================================================================

#[tokio::test]
async fn test_join_rejects_taken_and_invalid_names() {
    let addr = start_server().await;
    let _alice = Client::join(&addr, "Alice", 1).await;

    let mut other = Client::connect(&addr).await;
    other.send("join~Alice~1").await;
    assert!(other.recv().await.starts_with("error~2~"));

    other.send("join~Bob~7").await;
    assert!(other.recv().await.starts_with("error~3~"));

    other.send("join~Bob~1").await;
    other.expect("accept").await;
}

#[tokio::test]
async fn test_get_players_lists_lobby_in_join_order() {
    let addr = start_server().await;
    let mut alice = Client::join(&addr, "Alice", 1).await;
    let _bob = Client::join(&addr, "Bob", 2).await;

    alice.send("getPlayers").await;

    alice.expect("players~Alice~Bob").await;
}

#[tokio::test]
async fn test_lobby_chat_reaches_everyone_in_lobby() {
    let addr = start_server().await;
    let mut alice = Client::join(&addr, "Alice", 1).await;
    let mut bob = Client::join(&addr, "Bob", 1).await;

    alice.send("sendMessage~hallo allemaal").await;

    alice.expect("broadcast~Alice~hallo allemaal").await;
    bob.expect("broadcast~Alice~hallo allemaal").await;
}

#[tokio::test]
async fn test_accepted_challenge_starts_game() {
    let addr = start_server().await;
    let mut alice = Client::join(&addr, "Alice", 1).await;
    let mut bob = Client::join(&addr, "Bob", 1).await;

    alice.send("challenge~Bob").await;
    bob.expect("challengedBy~Alice").await;
    bob.send("challengeAccept~Alice").await;

    for client in [&mut alice, &mut bob] {
        client.expect("startGame~6~Alice~Bob").await;
        client.expect("nextMove~Alice").await;
    }
}

#[tokio::test]
async fn test_rejected_challenge_notifies_requester() {
    let addr = start_server().await;
    let mut alice = Client::join(&addr, "Alice", 2).await;
    let mut bob = Client::join(&addr, "Bob", 2).await;
    let mut carol = Client::join(&addr, "Carol", 2).await;

    alice.send("challenge~Bob~Carol").await;
    bob.expect("challengedBy~Alice").await;
    carol.expect("challengedBy~Alice").await;

    carol.send("challengeReject~Alice").await;

    alice.expect("challengeRejected~Carol").await;
    bob.expect("challengeRejected~Carol").await;

    // Everyone is idle again and can be challenged anew.
    bob.send("challenge~Alice").await;
    alice.expect("challengedBy~Bob").await;
}

#[tokio::test]
async fn test_challenge_cancelled_when_invitee_disconnects() {
    let addr = start_server().await;
    let mut alice = Client::join(&addr, "Alice", 1).await;
    let mut bob = Client::join(&addr, "Bob", 1).await;

    alice.send("challenge~Bob").await;
    bob.expect("challengedBy~Alice").await;
    drop(bob);

    alice.expect("challengeRejected~Bob").await;
}

// =========================================================================
// Games
// =========================================================================

#[tokio::test]
async fn test_random_queue_forms_game_in_join_order() {
    let addr = start_server().await;
    let (_alice, _bob) = two_player_game(&addr).await;
}

#[tokio::test]
async fn test_move_on_starting_base_is_rejected_to_mover_only() {
    let addr = start_server().await;
    let (mut alice, mut bob) = two_player_game(&addr).await;

    alice.send("doMove~6~0~4").await;
    alice.expect("error~1~Ongeldige zet").await;

    alice.send("doMove~0~0~0").await;
    for client in [&mut alice, &mut bob] {
        client.expect("setMove~0~0~0").await;
        client.expect("nextMove~Bob").await;
    }
}

#[tokio::test]
async fn test_move_out_of_turn_is_rejected() {
    let addr = start_server().await;
    let (mut alice, mut bob) = two_player_game(&addr).await;

    bob.send("doMove~0~2~0").await;
    bob.expect("error~1~not your turn").await;

    alice.send("doMove~0~0~0").await;
    alice.expect("setMove~0~0~0").await;
}

#[tokio::test]
async fn test_lobby_commands_refused_during_game() {
    let addr = start_server().await;
    let (mut alice, _bob) = two_player_game(&addr).await;

    alice.send("challenge~Bob").await;
    alice.expect("error~7~not allowed during a game").await;
}

#[tokio::test]
async fn test_game_chat_reaches_participants() {
    let addr = start_server().await;
    let (mut alice, mut bob) = two_player_game(&addr).await;

    bob.send("sendMessage~veel succes").await;

    alice.expect("broadcast~Bob~veel succes").await;
    bob.expect("broadcast~Bob~veel succes").await;
}

#[tokio::test]
async fn test_disconnect_ends_two_player_game_and_returns_to_lobby() {
    let addr = start_server().await;
    let (mut alice, bob) = two_player_game(&addr).await;

    drop(bob);

    alice.expect("error~4~Bob left the game").await;
    alice.expect("gameOver~Alice~0~Bob~0").await;

    // Alice is back in the lobby, Bob is gone.
    alice.send("getPlayers").await;
    alice.expect("players~Alice").await;

    alice.send("doMove~0~0~0").await;
    alice.expect("error~6~not in a game").await;

    alice.send("join~Alice~1").await;
    alice.expect("accept").await;
}

// =========================================================================
// Transport limits
// =========================================================================

#[tokio::test]
async fn test_overlong_line_closes_connection() {
    let addr = start_with(RinggzServer::builder().max_line_length(32)).await;
    let mut client = Client::connect(&addr).await;

    client.send(&format!("join~{}~0", "a".repeat(64))).await;

    assert!(client.is_closed().await);
}

#[tokio::test]
async fn test_non_utf8_line_gets_unknown_command_error() {
    let addr = start_server().await;
    let mut alice = Client::join(&addr, "Alice", 1).await;

    alice
        .writer
        .write_all(b"sendMessage~caf\xe9\n")
        .await
        .expect("send");
    assert!(alice.recv().await.starts_with("error~5~"));

    // The connection survives.
    alice.send("getPlayers").await;
    alice.expect("players~Alice").await;
}

#[tokio::test]
async fn test_build_rejects_invalid_config() {
    let result = RinggzServer::builder()
        .bind("127.0.0.1:0")
        .match_size(7)
        .build()
        .await;

    assert!(matches!(result, Err(RinggzError::Config(_))));
}
