use std::time::Duration;

use actix_web::{test, App};
use actix_web_actors::ws;
use futures_util::stream::Stream;
use futures_util::{SinkExt, StreamExt};

use whiteboard_server::config::ServerConfig;
use whiteboard_server::handlers;
use whiteboard_server::server::spawn_server;
use whiteboard_system::{
    decode_event, encode_command, CommandResult, IdentifiableCommand, IdentifiableEvent,
    NewObject, PropertyBag, SessionCommand, SessionError, SessionEvent, SessionRegistry,
    WireFormat,
};

fn start(engine_queue: usize) -> test::TestServer {
    let srv_tx = spawn_server(SessionRegistry::with_seed(9), engine_queue);
    let config = ServerConfig::default();
    test::start(move || {
        App::new()
            .data(srv_tx.clone())
            .data(config.clone())
            .configure(handlers::root)
    })
}

fn message(format: WireFormat, command_id: u16, command: SessionCommand) -> ws::Message {
    let command = IdentifiableCommand {
        command_id,
        command,
    };
    match encode_command(format, &command).expect("encodes") {
        whiteboard_system::Frame::Text(text) => ws::Message::Text(text),
        whiteboard_system::Frame::Binary(bin) => ws::Message::Binary(bin.into()),
    }
}

fn join(session_id: &str, participant_id: &str) -> SessionCommand {
    SessionCommand::Join {
        session_id: session_id.into(),
        participant_id: participant_id.into(),
        display_name: participant_id.into(),
    }
}

fn add(object_id: &str, object_type: &str) -> SessionCommand {
    SessionCommand::AddObject {
        session_id: None,
        object: NewObject {
            id: Some(object_id.into()),
            object_type: object_type.into(),
            properties: PropertyBag::new(),
        },
    }
}

async fn next_frame<S>(framed: &mut S) -> ws::Frame
where
    S: Stream<Item = Result<ws::Frame, ws::ProtocolError>> + Unpin,
{
    actix_rt::time::timeout(Duration::from_secs(2), framed.next())
        .await
        .expect("frame in time")
        .expect("socket open")
        .expect("valid frame")
}

fn event_of(frame: ws::Frame) -> IdentifiableEvent {
    match frame {
        ws::Frame::Text(text) => decode_event(WireFormat::Json, &text).expect("json event"),
        ws::Frame::Binary(bin) => decode_event(WireFormat::Bincode, &bin).expect("binary event"),
        other => panic!("unexpected {:?}", other),
    }
}

fn is_joined(event: &IdentifiableEvent, expected: &str) -> bool {
    matches!(
        event,
        IdentifiableEvent::ByMyself {
            result: CommandResult::Joined { session_id, .. },
            ..
        } if session_id == expected
    )
}

#[actix_rt::test]
async fn it_answers_a_join_sent_right_after_connecting() {
    let mut srv = start(64);
    let mut socket = srv.ws_at("/ws/").await.expect("connects");

    socket
        .send(message(WireFormat::Json, 1, join("room1", "A")))
        .await
        .expect("sent");

    let frame = next_frame(&mut socket).await;
    assert!(matches!(frame, ws::Frame::Text(_)));
    assert!(is_joined(&event_of(frame), "room1"));
}

#[actix_rt::test]
async fn it_replies_in_the_format_of_the_last_frame() {
    let mut srv = start(64);
    let mut socket = srv.ws_at("/ws/").await.expect("connects");

    socket
        .send(message(WireFormat::Bincode, 1, join("room1", "A")))
        .await
        .expect("sent");
    let frame = next_frame(&mut socket).await;
    assert!(matches!(frame, ws::Frame::Binary(_)));
    assert!(is_joined(&event_of(frame), "room1"));

    socket
        .send(message(WireFormat::Json, 2, add("s1", "")))
        .await
        .expect("sent");
    let frame = next_frame(&mut socket).await;
    assert!(matches!(frame, ws::Frame::Text(_)));
    match event_of(frame) {
        IdentifiableEvent::ByMyself {
            command_id,
            result: CommandResult::Error { error, message },
        } => {
            assert_eq!(command_id, 2);
            assert!(matches!(error, SessionError::Malformed(_)));
            assert!(!message.is_empty());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[actix_rt::test]
async fn it_rejects_undecodable_frames_and_stays_usable() {
    let mut srv = start(64);
    let mut socket = srv.ws_at("/ws/").await.expect("connects");

    socket
        .send(ws::Message::Text("{\"commandId\": ".into()))
        .await
        .expect("sent");
    match event_of(next_frame(&mut socket).await) {
        IdentifiableEvent::Rejected { reason } => assert!(!reason.is_empty()),
        other => panic!("unexpected {:?}", other),
    }

    socket
        .send(message(WireFormat::Json, 1, join("room1", "A")))
        .await
        .expect("sent");
    assert!(is_joined(&event_of(next_frame(&mut socket).await), "room1"));
}

#[actix_rt::test]
async fn it_cleans_up_when_a_socket_closes() {
    let mut srv = start(64);
    let mut alice = srv.ws_at("/ws/").await.expect("connects");
    let mut bob = srv.ws_at("/ws/").await.expect("connects");

    alice
        .send(message(WireFormat::Json, 1, join("room1", "A")))
        .await
        .expect("sent");
    assert!(is_joined(&event_of(next_frame(&mut alice).await), "room1"));
    bob.send(message(WireFormat::Json, 1, join("room1", "B")))
        .await
        .expect("sent");
    assert!(is_joined(&event_of(next_frame(&mut bob).await), "room1"));

    alice.send(ws::Message::Close(None)).await.expect("sent");

    match event_of(next_frame(&mut bob).await) {
        IdentifiableEvent::BySystem {
            session_event: SessionEvent::ParticipantLeft { participant_id, .. },
        } => assert_eq!(participant_id, "A"),
        other => panic!("unexpected {:?}", other),
    }
}

#[actix_rt::test]
async fn it_applies_every_command_when_the_engine_queue_is_tiny() {
    let mut srv = start(1);
    let mut alice = srv.ws_at("/ws/").await.expect("connects");
    let mut bob = srv.ws_at("/ws/").await.expect("connects");

    alice
        .send(message(WireFormat::Json, 1, join("room1", "A")))
        .await
        .expect("sent");
    assert!(is_joined(&event_of(next_frame(&mut alice).await), "room1"));
    bob.send(message(WireFormat::Json, 1, join("room1", "B")))
        .await
        .expect("sent");
    assert!(is_joined(&event_of(next_frame(&mut bob).await), "room1"));

    let ids: Vec<String> = (0..20).map(|n| format!("s{}", n)).collect();
    for (n, id) in ids.iter().enumerate() {
        alice
            .send(message(WireFormat::Json, n as u16 + 2, add(id, "stroke")))
            .await
            .expect("sent");
    }

    for id in &ids {
        match event_of(next_frame(&mut bob).await) {
            IdentifiableEvent::BySystem {
                session_event: SessionEvent::ObjectAdded(object),
            } => assert_eq!(&object.id, id),
            other => panic!("unexpected {:?}", other),
        }
    }
}
