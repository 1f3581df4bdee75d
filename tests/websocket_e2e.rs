//! End-to-end tests against a live server on an ephemeral port.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use whiteboard_rs::{app, config::Config, AppState};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(AppState::new(Config::default()));

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("ws://{}/ws", addr)
}

async fn send(socket: &mut Socket, event: Value) {
    socket
        .send(Message::Text(event.to_string()))
        .await
        .unwrap();
}

/// Next JSON event, failing the test if nothing arrives in time.
async fn recv(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed")
            .unwrap();

        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn join(url: &str, room_id: &str, name: &str) -> Socket {
    let (mut socket, _) = connect_async(url).await.unwrap();
    send(
        &mut socket,
        json!({"event": "join", "data": {"roomId": room_id, "displayName": name}}),
    )
    .await;
    socket
}

#[tokio::test]
async fn test_two_clients_draw_add_page_and_undo() {
    let url = spawn_server().await;

    let mut a = join(&url, "4242", "alice").await;
    let state = recv(&mut a).await;
    assert_eq!(state["event"], "roomState");
    assert_eq!(state["data"]["pages"].as_array().unwrap().len(), 1);

    let mut b = join(&url, "4242", "bob").await;
    let state = recv(&mut b).await;
    assert_eq!(state["event"], "roomState");
    assert_eq!(state["data"]["participants"].as_object().unwrap().len(), 2);

    let joined = recv(&mut a).await;
    assert_eq!(joined["event"], "userJoined");
    assert_eq!(joined["data"]["displayName"], "bob");
    assert_eq!(recv(&mut a).await["event"], "updateUserList");

    // A draws, only B hears about it
    let action = json!({
        "pageId": 0,
        "action": {
            "type": "stroke",
            "tool": "pencil",
            "points": [{"x": 1.0, "y": 1.0}, {"x": 20.0, "y": 30.0}],
            "color": "#112233",
            "width": 4.0
        }
    });
    send(&mut a, json!({"event": "drawingAction", "data": action})).await;

    let relayed = recv(&mut b).await;
    assert_eq!(relayed["event"], "drawingAction");
    assert_eq!(relayed["data"], action);

    // A adds a page; A's next event is the resync, not its own stroke
    send(&mut a, json!({"event": "addPage", "data": {}})).await;
    for socket in [&mut a, &mut b] {
        let state = recv(socket).await;
        assert_eq!(state["event"], "roomState");
        assert_eq!(state["data"]["pages"].as_array().unwrap().len(), 2);
        assert_eq!(state["data"]["pages"][0]["actions"][0], action["action"]);
    }

    // B undoes the stroke on page 0
    send(&mut b, json!({"event": "undo", "data": {"pageId": 0}})).await;
    for socket in [&mut a, &mut b] {
        let state = recv(socket).await;
        assert_eq!(state["event"], "roomState");
        assert_eq!(state["data"]["pages"].as_array().unwrap().len(), 2);
        assert_eq!(state["data"]["pages"][0]["actions"], json!([]));
    }
}

#[tokio::test]
async fn test_join_error_and_chat() {
    let url = spawn_server().await;

    let mut rejected = join(&url, "12A3", "bob").await;
    let error = recv(&mut rejected).await;
    assert_eq!(
        error,
        json!({"event": "joinError", "data": "Room ID must be a 4-digit code."})
    );

    // Garbage is ignored and the connection stays usable
    send(&mut rejected, json!({"event": "nope"})).await;
    send(
        &mut rejected,
        json!({"event": "join", "data": {"roomId": "9999", "displayName": "bob"}}),
    )
    .await;
    assert_eq!(recv(&mut rejected).await["event"], "roomState");

    send(&mut rejected, json!({"event": "chatMessage", "data": "hello"})).await;
    let chat = recv(&mut rejected).await;
    assert_eq!(chat["event"], "chatMessage");
    assert_eq!(chat["data"]["displayName"], "bob");
    assert_eq!(chat["data"]["text"], "hello");
}

#[tokio::test]
async fn test_preview_route() {
    let state = AppState::new(Config::default());
    let router = app(state.clone());

    let missing = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/rooms/4242/pages/0/preview.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let conn = uuid::Uuid::new_v4();
        let mut gateway = state.gateway.write().await;
        gateway.connect(conn, tx);
        gateway
            .handle(
                conn,
                serde_json::from_value(
                    json!({"event": "join", "data": {"roomId": "4242", "displayName": "alice"}}),
                )
                .unwrap(),
            )
            .unwrap();
    }

    let found = router
        .oneshot(
            Request::builder()
                .uri("/rooms/4242/pages/0/preview.png?width=64&height=36")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(found.headers()["content-type"], "image/png");
}
