use std::net::SocketAddr;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};

use crate::state::app_state::AppState;
use crate::ws::connection::{Connection, Outbound};
use crate::ws::dispatch::dispatch;
use crate::ws::protocol::{ClientEnvelope, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let source = source_address(&req);
    let (connection, outbound) = Connection::channel();
    info!(conn_id = %connection.id(), %source, "connection init");

    let session = WsSession::new(connection, outbound, source, app_state);
    ws::start(session, &req, stream)
}

/// Client address used for rate limiting: first forwarded hop if present,
/// otherwise the peer, without the port.
pub fn source_address(req: &HttpRequest) -> String {
    let info = req.connection_info();
    let raw = info.realip_remote_addr().unwrap_or("unknown");
    raw.parse::<SocketAddr>()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub struct WsSession {
    connection: Connection,
    outbound: Option<Outbound>,
    source: String,
    app_state: web::Data<AppState>,

    last_heartbeat: Instant,
}

impl WsSession {
    fn new(
        connection: Connection,
        outbound: Outbound,
        source: String,
        app_state: web::Data<AppState>,
    ) -> Self {
        Self {
            connection,
            outbound: Some(outbound),
            source,
            app_state,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn close_with_error(&self, ctx: &mut ws::WebsocketContext<Self>, reason: &str) {
        warn!(conn_id = %self.connection.id(), source = %self.source, reason, "[WS SESSION] protocol error");
        ctx.close(Some(ws::CloseReason {
            code: ws::CloseCode::Error,
            description: Some(reason.to_string()),
        }));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.connection.id(),
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        if !self.app_state.limiter().allow(&self.source) {
            return;
        }
        let envelope: ClientEnvelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(_) => {
                self.close_with_error(ctx, "Malformed JSON");
                return;
            }
        };
        dispatch(&self.app_state, &self.connection, envelope);
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.connection.id(), "[WS SESSION] started");
        if let Some(outbound) = self.outbound.take() {
            ctx.add_stream(UnboundedReceiverStream::new(outbound));
        }
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.app_state.directory().disconnect(self.connection.id());
        info!(conn_id = %self.connection.id(), "[WS SESSION] stopped");
    }
}

/// Outbound messages pushed by the game core.
impl StreamHandler<ServerMsg> for WsSession {
    fn handle(&mut self, msg: ServerMsg, ctx: &mut Self::Context) {
        Self::send_json(ctx, &msg);
    }

    // The sender side lives in the directory; ending here must not stop
    // the socket.
    fn finished(&mut self, _ctx: &mut Self::Context) {}
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.close_with_error(ctx, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.connection.id(),
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}
