//! WebSocket behavior tests against a live server

use std::time::Duration;

use anyhow::Result;
use integration_tests::helpers::{
    create_room, recv_json, send_json, ws_reject_status, TestServer,
};
use serde_json::json;
use tokio::time::sleep;

/// Wait until the room reports the expected number of participants.
async fn wait_for_online(server: &TestServer, room_id: u64, expected: u64) -> Result<()> {
    for _ in 0..50 {
        let response = server.get(&format!("/rooms/{room_id}")).await?;
        if response.status() == 200 {
            let body: serde_json::Value = response.json().await?;
            if body["onlineUser"] == json!(expected) {
                return Ok(());
            }
        }
        sleep(Duration::from_millis(20)).await;
    }
    anyhow::bail!("room {room_id} never reached {expected} participants")
}

#[tokio::test]
async fn test_broadcast_between_clients() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let mut alice = server
        .connect_ws(&format!("/join/{room_id}?user=Alice"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;

    let mut bob = server
        .connect_ws(&format!("/join/{room_id}?user=Bob"))
        .await?;
    wait_for_online(&server, room_id, 2).await?;

    // Alice sees Bob arrive; Bob joined after his own notice went out.
    let joined = recv_json(&mut alice).await?;
    assert_eq!(joined["type"], json!("system"));
    assert_eq!(joined["message"], json!("Bob joined the room"));

    send_json(&mut alice, &json!({"type": "message", "message": "hi"})).await?;

    // The sender receives their own broadcast too.
    for socket in [&mut alice, &mut bob] {
        let frame = recv_json(socket).await?;
        assert_eq!(frame["type"], json!("message"));
        assert_eq!(frame["message"], json!("hi"));
        assert_eq!(frame["user"]["name"], json!("Alice"));
        assert!(uuid::Uuid::parse_str(frame["id"].as_str().unwrap()).is_ok());
        assert!(frame.get("timestamp").is_some());
    }

    // History: one joined notice per participant plus the chat message.
    let response = server.get(&format!("/rooms/{room_id}/messages")).await?;
    let body: serde_json::Value = response.json().await?;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["message"], json!("Alice joined the room"));
    assert_eq!(messages[1]["message"], json!("Bob joined the room"));
    assert_eq!(messages[2]["message"], json!("hi"));

    Ok(())
}

#[tokio::test]
async fn test_message_patch_broadcasts_to_clients() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let mut alice = server
        .connect_ws(&format!("/join/{room_id}?user=Alice"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;
    let mut bob = server
        .connect_ws(&format!("/join/{room_id}?user=Bob"))
        .await?;
    wait_for_online(&server, room_id, 2).await?;
    // Drain Bob's join notice from Alice's socket.
    recv_json(&mut alice).await?;

    send_json(&mut alice, &json!({"type": "message", "message": "hi"})).await?;
    let original = recv_json(&mut alice).await?;
    recv_json(&mut bob).await?;
    let message_id = original["id"].as_str().unwrap().to_string();

    let response = server
        .patch(
            &format!("/rooms/{room_id}/messages/{message_id}"),
            &json!({"message": "hi!"}),
        )
        .await?;
    assert_eq!(response.status(), 200);
    let patched: serde_json::Value = response.json().await?;
    assert_eq!(patched["message"], json!("hi!"));
    assert_eq!(patched["additionalInfo"]["modified"], json!(true));

    // Both participants get the edit over the same broadcast channel,
    // with the original type preserved.
    for socket in [&mut alice, &mut bob] {
        let frame = recv_json(socket).await?;
        assert_eq!(frame["id"], json!(message_id));
        assert_eq!(frame["type"], json!("message"));
        assert_eq!(frame["message"], json!("hi!"));
        assert_eq!(frame["additionalInfo"]["modified"], json!(true));
    }

    Ok(())
}

#[tokio::test]
async fn test_message_patch_replaces_metadata_wholesale() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let mut alice = server
        .connect_ws(&format!("/join/{room_id}?user=Alice"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;

    send_json(
        &mut alice,
        &json!({
            "type": "message",
            "message": "with context",
            "additionalInfo": {"replyTo": "msg-123"}
        }),
    )
    .await?;
    let original = recv_json(&mut alice).await?;
    let message_id = original["id"].as_str().unwrap().to_string();

    let response = server
        .patch(
            &format!("/rooms/{room_id}/messages/{message_id}"),
            &json!({"additionalInfo": {"edited": true}}),
        )
        .await?;
    assert_eq!(response.status(), 200);
    let patched: serde_json::Value = response.json().await?;

    // Metadata is replaced, not merged; the body is untouched.
    assert_eq!(patched["message"], json!("with context"));
    assert!(patched["additionalInfo"].get("replyTo").is_none());
    assert_eq!(patched["additionalInfo"]["edited"], json!(true));
    assert_eq!(patched["additionalInfo"]["modified"], json!(true));

    Ok(())
}

#[tokio::test]
async fn test_message_patch_validation() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let mut alice = server
        .connect_ws(&format!("/join/{room_id}?user=Alice"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;
    send_json(&mut alice, &json!({"type": "message", "message": "hi"})).await?;
    let original = recv_json(&mut alice).await?;
    let message_id = original["id"].as_str().unwrap().to_string();
    let path = format!("/rooms/{room_id}/messages/{message_id}");

    // Neither field present
    assert_eq!(server.patch(&path, &json!({})).await?.status(), 400);
    // Empty body text
    assert_eq!(
        server.patch(&path, &json!({"message": ""})).await?.status(),
        400
    );
    // Unknown message
    let unknown = uuid::Uuid::new_v4();
    assert_eq!(
        server
            .patch(
                &format!("/rooms/{room_id}/messages/{unknown}"),
                &json!({"message": "x"})
            )
            .await?
            .status(),
        404
    );

    Ok(())
}

#[tokio::test]
async fn test_message_put_replaces_everything() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let mut alice = server
        .connect_ws(&format!("/join/{room_id}?user=Alice"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;
    send_json(
        &mut alice,
        &json!({
            "type": "message",
            "message": "original",
            "additionalInfo": {"replyTo": "msg-123"}
        }),
    )
    .await?;
    let original = recv_json(&mut alice).await?;
    let message_id = original["id"].as_str().unwrap().to_string();

    let response = server
        .put(
            &format!("/rooms/{room_id}/messages/{message_id}"),
            &json!({"message": "replaced", "additionalInfo": {"edited": true}}),
        )
        .await?;
    assert_eq!(response.status(), 200);
    let replaced: serde_json::Value = response.json().await?;
    assert_eq!(replaced["message"], json!("replaced"));
    assert!(replaced["additionalInfo"].get("replyTo").is_none());
    assert_eq!(replaced["additionalInfo"]["modified"], json!(true));

    Ok(())
}

#[tokio::test]
async fn test_message_soft_delete() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let mut alice = server
        .connect_ws(&format!("/join/{room_id}?user=Alice"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;
    send_json(&mut alice, &json!({"type": "message", "message": "doomed"})).await?;
    let original = recv_json(&mut alice).await?;
    let message_id = original["id"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/rooms/{room_id}/messages/{message_id}"))
        .await?;
    assert_eq!(response.status(), 200);
    let deleted: serde_json::Value = response.json().await?;
    assert_eq!(deleted["message"], json!("deleted"));
    assert_eq!(deleted["additionalInfo"], json!({"deleted": true}));

    // The deletion rides the broadcast channel like any other edit.
    let frame = recv_json(&mut alice).await?;
    assert_eq!(frame["id"], json!(message_id));
    assert_eq!(frame["message"], json!("deleted"));
    assert_eq!(frame["additionalInfo"]["deleted"], json!(true));

    Ok(())
}

#[tokio::test]
async fn test_oversized_message_broadcast_but_not_stored() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let mut alice = server
        .connect_ws(&format!("/join/{room_id}?user=Alice"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;
    let mut bob = server
        .connect_ws(&format!("/join/{room_id}?user=Bob"))
        .await?;
    wait_for_online(&server, room_id, 2).await?;
    recv_json(&mut alice).await?;

    let big = "x".repeat(5 * 1024 * 1024);
    send_json(&mut alice, &json!({"type": "message", "message": big})).await?;

    for socket in [&mut alice, &mut bob] {
        let frame = recv_json(socket).await?;
        assert_eq!(frame["message"].as_str().unwrap().len(), 5 * 1024 * 1024);
    }

    // Delivered live, but past the storage bound.
    let response = server.get(&format!("/rooms/{room_id}/messages")).await?;
    let body: serde_json::Value = response.json().await?;
    let messages = body["messages"].as_array().unwrap();
    assert!(messages
        .iter()
        .all(|m| m["message"].as_str().unwrap().len() < 1024));

    Ok(())
}

#[tokio::test]
async fn test_image_messages_are_not_stored() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let mut alice = server
        .connect_ws(&format!("/join/{room_id}?user=Alice"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;

    send_json(
        &mut alice,
        &json!({"type": "image", "message": "base64data=="}),
    )
    .await?;
    let frame = recv_json(&mut alice).await?;
    assert_eq!(frame["type"], json!("image"));

    let response = server.get(&format!("/rooms/{room_id}/messages")).await?;
    let body: serde_json::Value = response.json().await?;
    let messages = body["messages"].as_array().unwrap();
    // Only Alice's join notice made it into history.
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["type"], json!("system"));

    Ok(())
}

#[tokio::test]
async fn test_idle_room_is_garbage_collected() -> Result<()> {
    let server = TestServer::start_with_fast_timeout().await?;
    let room_id = create_room(&server, json!({})).await?;

    assert_eq!(server.get(&format!("/rooms/{room_id}")).await?.status(), 200);

    sleep(Duration::from_millis(600)).await;
    assert_eq!(server.get(&format!("/rooms/{room_id}")).await?.status(), 404);

    Ok(())
}

#[tokio::test]
async fn test_join_rejections() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    assert_eq!(ws_reject_status(&server, "/join/999").await?, 404);
    assert_eq!(ws_reject_status(&server, "/join/invalid").await?, 400);
    assert_eq!(
        ws_reject_status(&server, &format!("/join/{room_id}?userId=not-a-uuid")).await?,
        400
    );
    let unknown = uuid::Uuid::new_v4();
    assert_eq!(
        ws_reject_status(&server, &format!("/join/{room_id}?userId={unknown}")).await?,
        404
    );

    Ok(())
}

#[tokio::test]
async fn test_join_with_registered_user() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let response = server
        .post(
            "/users",
            &json!({"firstName": "John", "lastName": "Doe"}),
        )
        .await?;
    let user: serde_json::Value = response.json().await?;
    let user_id = user["id"].as_str().unwrap().to_string();

    let mut john = server
        .connect_ws(&format!("/join/{room_id}?userId={user_id}"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;

    // The join notice carries the registered user's display name.
    let response = server.get(&format!("/rooms/{room_id}/messages")).await?;
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["messages"][0]["message"],
        json!("John Doe joined the room")
    );

    // Broadcasts carry the full user snapshot.
    send_json(&mut john, &json!({"type": "message", "message": "hello"})).await?;
    let frame = recv_json(&mut john).await?;
    assert_eq!(frame["user"]["id"], json!(user_id));
    assert_eq!(frame["user"]["firstName"], json!("John"));

    // The participant listing reflects the snapshot too.
    let response = server.get(&format!("/rooms/{room_id}/users")).await?;
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["users"][0]["id"], json!(user_id));

    let response = server.get("/rooms/users").await?;
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["users"][0]["roomId"], json!(room_id));
    assert_eq!(body["users"][0]["user"]["id"], json!(user_id));

    Ok(())
}

#[tokio::test]
async fn test_leave_broadcasts_notice() -> Result<()> {
    let server = TestServer::start().await?;
    let room_id = create_room(&server, json!({})).await?;

    let mut alice = server
        .connect_ws(&format!("/join/{room_id}?user=Alice"))
        .await?;
    wait_for_online(&server, room_id, 1).await?;
    let bob = server
        .connect_ws(&format!("/join/{room_id}?user=Bob"))
        .await?;
    wait_for_online(&server, room_id, 2).await?;
    recv_json(&mut alice).await?;

    drop(bob);

    let left = recv_json(&mut alice).await?;
    assert_eq!(left["type"], json!("system"));
    assert_eq!(left["message"], json!("Bob left the room"));

    wait_for_online(&server, room_id, 1).await?;

    Ok(())
}
