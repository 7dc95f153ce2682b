//! Room command handlers.

use crate::models::room::{CreateRoomRequest, HandleUsersRequest, UpdateRoomRequest};
use crate::models::{AuthToken, Room};
use crate::state::App;

fn require_token(app: &App) -> Option<AuthToken> {
    let token = app.token().cloned();
    if token.is_none() {
        println!("Not signed in.");
        println!("Get started with: playparty onboard \"<display name>\"");
    }
    token
}

fn print_room(room: &Room) {
    println!("{} [{}]", room.name, room.id);
    println!(
        "  Members: {} | Pending requests: {}",
        room.users.len(),
        room.requests.len()
    );
}

pub async fn cmd_rooms_list(app: &App) -> anyhow::Result<()> {
    let Some(token) = require_token(app) else {
        return Ok(());
    };

    let rooms = app.api().list_rooms(&token).await?;
    if rooms.is_empty() {
        println!("No rooms yet.");
        println!();
        println!("Create one with: playparty rooms create \"room name\"");
        return Ok(());
    }

    println!("Rooms ({} total)", rooms.len());
    println!("{:-<60}", "");
    for room in &rooms {
        let joined = app.user().is_some_and(|u| room.has_member(u.id));
        let pending = app.user().is_some_and(|u| room.has_pending_request(u.id));
        let marker = if joined {
            "✓"
        } else if pending {
            "…"
        } else {
            "•"
        };
        println!("{marker} {} [{}] ({} members)", room.name, room.id, room.users.len());
    }
    println!();
    println!("Legend: ✓ Joined | … Request pending");

    Ok(())
}

pub async fn cmd_rooms_create(app: &App, name: &str) -> anyhow::Result<()> {
    let Some(token) = require_token(app) else {
        return Ok(());
    };

    let name = name.trim();
    if name.is_empty() {
        println!("Room name cannot be empty.");
        return Ok(());
    }

    let room = app
        .api()
        .create_room(
            &token,
            &CreateRoomRequest {
                name: name.to_string(),
                avatar: None,
            },
        )
        .await?;
    println!("✓ Created room");
    print_room(&room);

    Ok(())
}

pub async fn cmd_rooms_show(app: &App, id: &str) -> anyhow::Result<()> {
    let Some(token) = require_token(app) else {
        return Ok(());
    };

    let room = app.api().get_room(&token, id).await?;
    print_room(&room);

    if !room.users.is_empty() {
        println!();
        println!("Members:");
        for user in &room.users {
            println!("  {} ({}) [{}]", user.name, user.username, user.id);
        }
    }
    if !room.requests.is_empty() {
        println!();
        println!("Join requests:");
        for user in &room.requests {
            println!("  {} ({}) [{}]", user.name, user.username, user.id);
        }
    }

    Ok(())
}

pub async fn cmd_rooms_rename(app: &App, id: &str, name: &str) -> anyhow::Result<()> {
    let Some(token) = require_token(app) else {
        return Ok(());
    };

    let name = name.trim();
    if name.is_empty() {
        println!("Room name cannot be empty.");
        return Ok(());
    }

    let request = UpdateRoomRequest {
        name: name.to_string(),
        ..UpdateRoomRequest::default()
    };
    let room = app.api().update_room(&token, id, &request).await?;
    println!("✓ Renamed room");
    print_room(&room);

    Ok(())
}

pub async fn cmd_rooms_join(app: &App, id: &str) -> anyhow::Result<()> {
    let Some(token) = require_token(app) else {
        return Ok(());
    };

    let response = app.api().join_room(&token, id).await?;
    println!("✓ {}", response.message);
    Ok(())
}

pub async fn cmd_rooms_leave(app: &App, id: &str) -> anyhow::Result<()> {
    let Some(token) = require_token(app) else {
        return Ok(());
    };

    let response = app.api().leave_room(&token, id).await?;
    println!("✓ {}", response.message);
    Ok(())
}

pub async fn cmd_rooms_delete(app: &App, id: &str) -> anyhow::Result<()> {
    let Some(token) = require_token(app) else {
        return Ok(());
    };

    println!("Delete room {id}? Enter 'y' to confirm, anything else to cancel:");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    if !input.trim().eq_ignore_ascii_case("y") {
        println!("Cancelled.");
        return Ok(());
    }

    let response = app.api().delete_room(&token, id).await?;
    println!("✓ {}", response.message);
    Ok(())
}

pub async fn cmd_rooms_handle(
    app: &App,
    id: &str,
    user_id: i64,
    accept: bool,
) -> anyhow::Result<()> {
    let Some(token) = require_token(app) else {
        return Ok(());
    };

    let request = if accept {
        HandleUsersRequest {
            accept: Some(vec![user_id]),
            reject: None,
        }
    } else {
        HandleUsersRequest {
            accept: None,
            reject: Some(vec![user_id]),
        }
    };

    let room = app.api().handle_room_users(&token, id, &request).await?;
    println!(
        "✓ {} user {user_id}",
        if accept { "Accepted" } else { "Rejected" }
    );
    print_room(&room);
    Ok(())
}
