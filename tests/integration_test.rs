use std::sync::Arc;
use wordbingo::protocol::{ClientMessage, ServerMessage};
use wordbingo::state::AppState;
use wordbingo::types::{GameEventKind, GameStatus, Line, BOARD_SIZE};
use wordbingo::ws::handlers::handle_message;

async fn join(state: &Arc<AppState>, code: &str, name: &str, session: &str) -> ServerMessage {
    handle_message(
        ClientMessage::JoinGame {
            code: code.to_string(),
            player_name: name.to_string(),
            session_token: session.to_string(),
        },
        state,
    )
    .await
    .expect("join should answer")
}

async fn mark(state: &Arc<AppState>, board_id: &str, index: usize) -> ServerMessage {
    handle_message(
        ClientMessage::MarkSquare {
            board_id: board_id.to_string(),
            square_index: index,
        },
        state,
    )
    .await
    .expect("mark should answer")
}

/// End-to-end integration test for a complete game flow
#[tokio::test]
async fn test_full_game_flow() {
    let state = Arc::new(AppState::with_seed(7));
    let mut updates = state.broadcast.subscribe();

    // 1. Host creates a game with side effects on
    let created = handle_message(
        ClientMessage::CreateGame {
            host_name: "Alice".to_string(),
            session_token: "alice-session".to_string(),
            side_effect_mode: true,
        },
        &state,
    )
    .await;
    let (code, game_id, host_id) = match created {
        Some(ServerMessage::GameCreated {
            code,
            game_id,
            player_id,
        }) => (code, game_id, player_id),
        other => panic!("Expected GameCreated, got {:?}", other),
    };

    // 2. Two guests join; one name clash is rejected
    let bob_id = match join(&state, &code.to_lowercase(), "Bob", "bob-session").await {
        ServerMessage::Joined { game_id: g, player_id } => {
            assert_eq!(g, game_id);
            player_id
        }
        other => panic!("Expected Joined, got {:?}", other),
    };
    match join(&state, &code, "bob", "other-session").await {
        ServerMessage::Error { code, .. } => assert_eq!(code, "NAME_TAKEN"),
        other => panic!("Expected NAME_TAKEN, got {:?}", other),
    }
    assert!(matches!(
        join(&state, &code, "Carol", "carol-session").await,
        ServerMessage::Joined { .. }
    ));

    // 3. Only the host may start
    let not_host = handle_message(
        ClientMessage::StartGame {
            game_id: game_id.clone(),
            player_id: bob_id.clone(),
        },
        &state,
    )
    .await;
    match not_host {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "NOT_HOST"),
        other => panic!("Expected NOT_HOST, got {:?}", other),
    }

    let started = handle_message(
        ClientMessage::StartGame {
            game_id: game_id.clone(),
            player_id: host_id.clone(),
        },
        &state,
    )
    .await;
    assert!(started.is_none(), "start answers by broadcast");

    let game = state.get_game(&game_id).await.unwrap();
    assert_eq!(game.status, GameStatus::Playing);
    let boards = state.get_boards_by_game(&game_id).await.unwrap();
    assert_eq!(boards.len(), 3);
    assert!(boards.iter().all(|b| b.squares.len() == BOARD_SIZE));

    // 4. Bob reconnects and gets his board back
    let resumed = handle_message(
        ClientMessage::Resume {
            code: code.clone(),
            session_token: "bob-session".to_string(),
        },
        &state,
    )
    .await;
    let bob_board = match resumed {
        Some(ServerMessage::PlayerState {
            player,
            players,
            board,
            ..
        }) => {
            assert_eq!(player.id, bob_id);
            assert_eq!(players.len(), 3);
            board.expect("Bob should have a board")
        }
        other => panic!("Expected PlayerState, got {:?}", other),
    };

    // 5. Bob works through row 1 and gets one near-win notice
    for i in [5, 6, 7] {
        mark(&state, &bob_board.id, i).await;
    }
    match mark(&state, &bob_board.id, 8).await {
        ServerMessage::SquareMarked { won, squares, .. } => {
            assert!(!won);
            assert!(squares[8].marked);
        }
        other => panic!("Expected SquareMarked, got {:?}", other),
    }
    let game = state.get_game(&game_id).await.unwrap();
    let near_win = game
        .events
        .iter()
        .find(|e| matches!(e.kind, GameEventKind::NearWin { line: Line::Row(1) }))
        .expect("near-win event for row 1");
    assert_eq!(near_win.player_name, "Bob");

    // 6. Alice acknowledges it, twice
    for _ in 0..2 {
        let ack = handle_message(
            ClientMessage::AcknowledgeEvent {
                game_id: game_id.clone(),
                event_id: near_win.id.clone(),
                player_id: host_id.clone(),
            },
            &state,
        )
        .await;
        assert!(ack.is_none());
    }
    let game = state.get_game(&game_id).await.unwrap();
    let acked = game.events.iter().find(|e| e.id == near_win.id).unwrap();
    assert_eq!(acked.acknowledged_by.len(), 1);
    assert!(acked.acknowledged_by.contains(&host_id));

    // 7. Bob completes the row
    match mark(&state, &bob_board.id, 9).await {
        ServerMessage::SquareMarked { won, .. } => assert!(won),
        other => panic!("Expected SquareMarked, got {:?}", other),
    }
    let game = state.get_game(&game_id).await.unwrap();
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.winner_id.as_deref(), Some(bob_id.as_str()));

    // 8. Nothing moves after the game is over
    match mark(&state, &boards[0].id, 0).await {
        ServerMessage::Error { code, .. } => assert_eq!(code, "GAME_NOT_PLAYING"),
        other => panic!("Expected GAME_NOT_PLAYING, got {:?}", other),
    }

    // Every broadcast belonged to this game, and the finish was announced
    let mut saw_finished = false;
    while let Ok(update) = updates.try_recv() {
        assert_eq!(update.game_id, game_id);
        if let ServerMessage::GameState { game, .. } = update.msg {
            saw_finished |= game.status == GameStatus::Finished;
        }
    }
    assert!(saw_finished);
}

#[tokio::test]
async fn test_watch_and_winner_override() {
    let state = Arc::new(AppState::with_seed(8));

    let created = state
        .create_game("Host", "host-session", false)
        .await
        .unwrap();
    let guest = state
        .join_game(&created.game.code, "Guest", "guest-session")
        .await
        .unwrap();

    match handle_message(
        ClientMessage::Watch {
            code: created.game.code.clone(),
        },
        &state,
    )
    .await
    {
        Some(ServerMessage::GameState { game, players }) => {
            assert_eq!(game.status, GameStatus::Lobby);
            assert_eq!(players.len(), 2);
        }
        other => panic!("Expected GameState, got {:?}", other),
    }

    // Override is refused before play starts
    match handle_message(
        ClientMessage::SetWinner {
            game_id: created.game.id.clone(),
            winner_id: guest.player.id.clone(),
        },
        &state,
    )
    .await
    {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "GAME_NOT_PLAYING"),
        other => panic!("Expected GAME_NOT_PLAYING, got {:?}", other),
    }

    state
        .start_game(&created.game.id, &created.player.id)
        .await
        .unwrap();
    let response = handle_message(
        ClientMessage::SetWinner {
            game_id: created.game.id.clone(),
            winner_id: guest.player.id.clone(),
        },
        &state,
    )
    .await;
    assert!(response.is_none());

    let game = state.get_game(&created.game.id).await.unwrap();
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.winner_id, Some(guest.player.id));
}

#[tokio::test]
async fn test_resume_with_unknown_session() {
    let state = Arc::new(AppState::with_seed(9));
    let created = state.create_game("Host", "host-session", false).await.unwrap();

    match handle_message(
        ClientMessage::Resume {
            code: created.game.code,
            session_token: "stranger".to_string(),
        },
        &state,
    )
    .await
    {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "PLAYER_NOT_FOUND"),
        other => panic!("Expected PLAYER_NOT_FOUND, got {:?}", other),
    }
}
