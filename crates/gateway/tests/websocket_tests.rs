//! Websocket fan-out tests against a live listener.

use std::future::Future;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parley_chats::{CreateChatRequest, NewMessage};
use parley_config::{DatabaseConfig, RealtimeConfig};
use parley_database::{initialize_database, CreateUserRequest, UserRepository};
use parley_gateway::{build_router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(300);

struct TestServer {
    state: AppState,
    url: String,
    _dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("ws.db").display()),
            max_connections: 2,
        };
        let pool = initialize_database(&config).await.unwrap();

        let users = UserRepository::new(pool.clone());
        for username in ["alice", "bob"] {
            users
                .create(&CreateUserRequest {
                    username: username.to_string(),
                    display_name: None,
                })
                .await
                .unwrap();
        }

        let state = AppState::new(pool, &RealtimeConfig::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            state,
            url: format!("ws://{addr}/ws"),
            _dir: dir,
        }
    }

    async fn connect(&self) -> Client {
        let expected = self.state.hub().connection_count() + 1;
        let (client, _) = connect_async(self.url.as_str()).await.unwrap();
        let hub = self.state.hub().clone();
        wait_until(|| {
            let hub = hub.clone();
            async move { hub.connection_count() >= expected }
        })
        .await;
        client
    }

    async fn create_chat(&self) -> String {
        self.state
            .chat_service()
            .create_chat(CreateChatRequest {
                participants: vec!["alice".to_string(), "bob".to_string()],
                messages: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn send_message(&self, chat_id: &str) {
        self.state
            .chat_service()
            .add_message(
                chat_id,
                NewMessage {
                    msg: "ping".to_string(),
                    msg_from: "alice".to_string(),
                    timestamp: None,
                },
            )
            .await
            .unwrap();
    }

    async fn wait_for_subscribers(&self, chat_id: &str, count: usize) {
        let hub = self.state.hub().clone();
        let chat_id = chat_id.to_string();
        wait_until(|| {
            let hub = hub.clone();
            let chat_id = chat_id.clone();
            async move { hub.subscriber_count(&chat_id).await == count }
        })
        .await;
    }
}

async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    timeout(WAIT, async {
        while !check().await {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn next_event(client: &mut Client) -> Value {
    timeout(WAIT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(_)) => continue,
                other => panic!("websocket closed: {other:?}"),
            }
        }
    })
    .await
    .expect("no event received")
}

async fn assert_quiet(client: &mut Client) {
    if let Ok(frame) = timeout(QUIET, client.next()).await {
        panic!("unexpected frame: {frame:?}");
    }
}

async fn join(client: &mut Client, chat_id: &str) {
    let frame = serde_json::json!({ "event": "joinChat", "data": chat_id });
    client.send(Message::Text(frame.to_string())).await.unwrap();
}

#[tokio::test]
async fn created_chats_reach_every_connection() {
    let server = TestServer::start().await;
    let mut first = server.connect().await;
    let mut second = server.connect().await;

    let chat_id = server.create_chat().await;

    for client in [&mut first, &mut second] {
        let event = next_event(client).await;
        assert_eq!(event["event"], "chatUpdate");
        assert_eq!(event["data"]["type"], "created");
        assert_eq!(event["data"]["chat"]["id"], chat_id.as_str());
    }
}

#[tokio::test]
async fn new_messages_reach_only_joined_connections() {
    let server = TestServer::start().await;
    let chat_id = server.create_chat().await;

    let mut member = server.connect().await;
    let mut bystander = server.connect().await;

    join(&mut member, &chat_id).await;
    // a repeated join must not produce duplicate deliveries
    join(&mut member, &chat_id).await;
    server.wait_for_subscribers(&chat_id, 1).await;

    server.send_message(&chat_id).await;

    let event = next_event(&mut member).await;
    assert_eq!(event["data"]["type"], "newMessage");
    assert_eq!(event["data"]["chat"]["messages"][0]["msg"], "ping");
    assert_quiet(&mut member).await;
    assert_quiet(&mut bystander).await;
}

#[tokio::test]
async fn leaving_a_chat_stops_delivery() {
    let server = TestServer::start().await;
    let chat_id = server.create_chat().await;
    let mut client = server.connect().await;

    join(&mut client, &chat_id).await;
    server.wait_for_subscribers(&chat_id, 1).await;

    let frame = serde_json::json!({ "event": "leaveChat", "data": chat_id });
    client.send(Message::Text(frame.to_string())).await.unwrap();
    server.wait_for_subscribers(&chat_id, 0).await;

    let hub = server.state.hub().clone();
    wait_until(|| {
        let hub = hub.clone();
        async move { hub.channel_count().await == 0 }
    })
    .await;

    server.send_message(&chat_id).await;
    assert_quiet(&mut client).await;
}

#[tokio::test]
async fn disconnect_releases_subscriptions() {
    let server = TestServer::start().await;
    let chat_id = server.create_chat().await;
    let mut client = server.connect().await;

    join(&mut client, &chat_id).await;
    server.wait_for_subscribers(&chat_id, 1).await;

    client.close(None).await.unwrap();
    drop(client);

    let hub = server.state.hub().clone();
    wait_until(|| {
        let hub = hub.clone();
        async move { hub.connection_count() == 0 }
    })
    .await;
    server.wait_for_subscribers(&chat_id, 0).await;

    wait_until(|| {
        let hub = hub.clone();
        async move { hub.channel_count().await == 0 }
    })
    .await;
}
