use std::collections::VecDeque;

use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use whiteboard_system::{
    decode_command, encode_event, ConnectionId, Frame, IdentifiableCommand, IdentifiableEvent,
    WireFormat,
};

use crate::config::ServerConfig;
use crate::connection_tx_storage::ConnectionTx;
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    IdentifiableCommand {
        from: ConnectionId,
        command: IdentifiableCommand,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    IdentifiableEvent(IdentifiableEvent),
    Disconnected { connection_id: ConnectionId },
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Idle,
    Connected(ConnectionId),
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
    format: WireFormat,
    queue: usize,
    /// Commands decoded before the engine assigned an id, in arrival order.
    pending: VecDeque<IdentifiableCommand>,
}

impl ConnectionActor {
    fn ingress(&mut self, format: WireFormat, payload: &[u8], ctx: &mut ws::WebsocketContext<Self>) {
        self.format = format;
        match decode_command(format, payload) {
            Ok(command) => {
                log::debug!("Ingress {:?}", command);
                match self.state {
                    ConnectionState::Connected(from) => self.forward(from, vec![command], ctx),
                    ConnectionState::Idle => self.pending.push_back(command),
                }
            }
            Err(e) => {
                log::warn!("Malformed frame: {}", e);
                self.reject(e.to_string(), ctx);
            }
        }
    }

    /// Hands commands to the engine in order. The actor waits for room in the
    /// engine queue, which pauses only this connection's stream.
    fn forward(
        &self,
        from: ConnectionId,
        commands: Vec<IdentifiableCommand>,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        let mut srv_tx = self.srv_tx.clone();
        ctx.wait(actix::fut::wrap_future(async move {
            for command in commands {
                let command =
                    ServerCommand::Connection(ConnectionCommand::IdentifiableCommand { from, command });
                if srv_tx.send(command).await.is_err() {
                    log::error!("Engine is gone, commands from {} dropped", from);
                    break;
                }
            }
        }));
    }

    fn reject(&self, reason: String, ctx: &mut ws::WebsocketContext<Self>) {
        self.egress(&IdentifiableEvent::Rejected { reason }, ctx);
    }

    fn egress(&self, event: &IdentifiableEvent, ctx: &mut ws::WebsocketContext<Self>) {
        match encode_event(self.format, event) {
            Ok(Frame::Text(text)) => ctx.text(text),
            Ok(Frame::Binary(bin)) => ctx.binary(bin),
            Err(e) => log::error!("Failed to encode {:?}: {}", event, e),
        }
    }

    fn notify_disconnect(&mut self) {
        if let ConnectionState::Connected(id) = self.state {
            self.state = ConnectionState::Idle;
            let srv_tx = self.srv_tx.clone();
            tokio::spawn(send_disconnect(srv_tx, id));
        }
    }
}

/// The engine must see this even when its queue is momentarily full.
async fn send_disconnect(mut srv_tx: ServerTx, from: ConnectionId) {
    let command = ServerCommand::Connection(ConnectionCommand::Disconnect { from });
    if srv_tx.send(command).await.is_err() {
        log::error!("Engine is gone, connection {} not cleaned up", from);
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(self.queue);

        let mut connect_tx = self.srv_tx.clone();
        ctx.wait(actix::fut::wrap_future(async move {
            let command = ServerCommand::Connection(ConnectionCommand::Connect { tx: Box::new(tx) });
            if connect_tx.send(command).await.is_err() {
                log::error!("Engine is gone, connection not registered");
            }
        }));

        let addr = ctx.address().recipient();
        let srv_tx = self.srv_tx.clone();

        tokio::spawn(async move {
            log::debug!("connection green thread - started");
            let mut connection_id = None;
            while let Some(msg) = rx.recv().await {
                if let ConnectionEvent::Connected { connection_id: id } = &msg {
                    connection_id = Some(*id);
                }
                if addr.do_send(ConnectionActorMessage(msg)).is_err() {
                    log::warn!("connection actor mailbox closed");
                    // The actor may have stopped before it learned its id.
                    if let Some(id) = connection_id {
                        send_disconnect(srv_tx, id).await;
                    }
                    break;
                }
            }
            log::debug!("connection green thread - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.notify_disconnect();

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => {
                log::debug!("Ingress text size: {}", text.len());
                self.ingress(WireFormat::Json, text.as_bytes(), ctx);
            }
            Ok(ws::Message::Binary(bin)) => {
                log::debug!("Ingress binary size: {}", bin.len());
                self.ingress(WireFormat::Bincode, &bin, ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                self.notify_disconnect();
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                log::warn!("WebSocket protocol error: {}", e);
                self.notify_disconnect();
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        let connection_event = &msg.0;
        log::debug!("Egress {:?}", connection_event);
        match connection_event {
            ConnectionEvent::Connected { connection_id } => {
                self.state = ConnectionState::Connected(*connection_id);
                if !self.pending.is_empty() {
                    let pending = self.pending.drain(..).collect();
                    self.forward(*connection_id, pending, ctx);
                }
            }
            ConnectionEvent::Disconnected { .. } => {
                self.state = ConnectionState::Idle;
                ctx.close(None);
                ctx.stop();
            }
            ConnectionEvent::IdentifiableEvent(event) => self.egress(event, ctx),
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor {
            srv_tx: srv_tx.get_ref().clone(),
            state: ConnectionState::Idle,
            format: WireFormat::default(),
            queue: config.connection_queue,
            pending: VecDeque::new(),
        },
        &req,
        stream,
    )
}
