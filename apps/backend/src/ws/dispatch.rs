//! Routes one inbound action to the directory or the player's room.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::player::Player;
use crate::errors::GameError;
use crate::services::directory::SessionDirectory;
use crate::state::app_state::AppState;
use crate::ws::connection::Connection;
use crate::ws::protocol::{ClientAction, ClientEnvelope, ServerMsg};

/// Apply `envelope` on behalf of `connection`.
///
/// Rejections are reported back as `error` messages; the socket stays open.
pub fn dispatch(state: &AppState, connection: &Connection, envelope: ClientEnvelope) {
    let Ok(action) = envelope.action.parse::<ClientAction>() else {
        debug!(conn_id = %connection.id(), action = %envelope.action, "unknown action ignored");
        return;
    };

    if let Err(err) = apply(state.directory(), connection, action, &envelope.data) {
        debug!(
            conn_id = %connection.id(),
            action = %envelope.action,
            error = %err,
            "action rejected"
        );
        connection.send(ServerMsg::error(err.code()));
    }
}

fn apply(
    directory: &SessionDirectory,
    connection: &Connection,
    action: ClientAction,
    data: &str,
) -> Result<(), GameError> {
    match action {
        ClientAction::Register => {
            let token = directory.register(connection, data)?;
            connection.send(ServerMsg::Jwt { data: token });
            Ok(())
        }
        ClientAction::Login => directory.login(connection, data).map(drop).inspect_err(|_| {
            warn!(conn_id = %connection.id(), "login with invalid token");
        }),
        other => {
            let Some(player) = directory.lookup_player(connection.id()) else {
                warn!(conn_id = %connection.id(), action = ?other, "action from unregistered connection");
                return Ok(());
            };
            apply_as_player(directory, &player, other, data)
        }
    }
}

fn apply_as_player(
    directory: &SessionDirectory,
    player: &Arc<Player>,
    action: ClientAction,
    data: &str,
) -> Result<(), GameError> {
    match action {
        ClientAction::CreateRoom => directory.create_room(player).map(drop),
        ClientAction::JoinRoom => directory.join_room(player, data).map(drop),
        ClientAction::LeaveRoom => directory.leave_room(player),
        ClientAction::StartGame => directory.room_of(player)?.start(player.id()),
        ClientAction::SendAnswer => directory.room_of(player)?.submit_answer(player, data),
        ClientAction::VoteAnswer => directory.room_of(player)?.cast_vote(player, data),
        ClientAction::SendMessage => directory.room_of(player)?.chat(player, data),
        ClientAction::Register | ClientAction::Login => Ok(()),
    }
}
