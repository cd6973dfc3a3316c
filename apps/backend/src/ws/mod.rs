//! Websocket boundary: connection handles, wire format, session actor and
//! action dispatch.

pub mod connection;
pub mod dispatch;
pub mod protocol;
pub mod session;
