use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use cascade_tetris::adapter::{
    run_server, ErrorCode, LeaderboardClient, LeaderboardConfig, ReporterEvent, Response,
    ScoreReporter,
};
use cascade_tetris::types::CoreEvent;

async fn spawn_server() -> SocketAddr {
    let config = LeaderboardConfig {
        port: 0,
        ..LeaderboardConfig::default()
    };
    let (ready_tx, ready_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = run_server(config, Some(ready_tx)).await;
    });
    tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped")
}

#[tokio::test]
async fn leaderboard_orders_by_score_then_time() {
    let addr = spawn_server().await;
    let client = LeaderboardClient::new(addr);

    assert_eq!(client.save_score("slow", 800, 120_000).await.unwrap(), 1);
    assert_eq!(client.save_score("fast", 800, 45_000).await.unwrap(), 1);
    assert_eq!(client.save_score("best", 2500, 300_000).await.unwrap(), 1);
    assert_eq!(
        client
            .save_score("someone-with-a-very-long-name", 10, 1_000)
            .await
            .unwrap(),
        4
    );

    let entries = client.fetch_scores(10).await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(names, ["best", "fast", "slow", "someone-with-a-very-"]);
    assert_eq!(entries[1].elapsed_ms, 45_000);

    let top = client.fetch_scores(2).await.unwrap();
    assert_eq!(top.len(), 2);
}

#[tokio::test]
async fn leaderboard_replies_with_errors_and_keeps_connection() {
    let addr = spawn_server().await;
    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let requests = [
        "this is not json",
        r#"{"type":"hello","seq":7}"#,
        r#"{"type":"save_score","seq":8,"player":"","score":5,"elapsed_ms":1}"#,
        r#"{"type":"get_scores","seq":9}"#,
    ];
    let mut replies = Vec::new();
    for request in requests {
        write_half.write_all(request.as_bytes()).await.unwrap();
        write_half.write_all(b"\n").await.unwrap();
        write_half.flush().await.unwrap();

        let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
            .await
            .unwrap()
            .unwrap()
            .expect("expected a reply line");
        replies.push(serde_json::from_str::<Response>(&line).unwrap());
    }

    let codes: Vec<_> = replies
        .iter()
        .filter_map(|r| match r {
            Response::Error { seq, code, .. } => Some((*seq, *code)),
            _ => None,
        })
        .collect();
    assert_eq!(
        codes,
        vec![
            (0, ErrorCode::InvalidMessage),
            (7, ErrorCode::UnknownType),
            (8, ErrorCode::InvalidField),
        ]
    );
    assert_eq!(
        replies[3],
        Response::Scores {
            seq: 9,
            entries: Vec::new()
        }
    );
}

#[tokio::test]
async fn client_reports_unreachable_server() {
    // Bind and drop to get a port nobody listens on.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = LeaderboardClient::new(addr);
    assert!(client.fetch_scores(5).await.is_err());
}

#[test]
fn reporter_submits_game_over_from_sync_code() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let addr = rt.block_on(spawn_server());

    let mut reporter = ScoreReporter::new(addr, "ada").unwrap();
    assert!(!reporter.report_event(&CoreEvent::GravityCapped { iterations: 50 }));
    assert!(reporter.report_event(&CoreEvent::GameOver {
        score: 1280,
        elapsed_ms: 93_410
    }));
    assert_eq!(
        reporter.recv_blocking(),
        Some(ReporterEvent::Saved { rank: 1 })
    );

    reporter.request_scores(5);
    match reporter.recv_blocking() {
        Some(ReporterEvent::Scores(entries)) => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].display_name, "ada");
            assert_eq!(entries[0].score, 1280);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(reporter.try_recv(), None);
}
