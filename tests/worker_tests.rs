mod common;

use std::time::Duration;

use axo_tasks::kanban_board::StatusChange;
use axo_tasks::task::{TaskDraft, TaskStatus};
use axo_tasks::worker::{execute, ApiEvent, Request, Worker};
use common::{authed_client, setup_mock_server, task_json, user_json};
use serde_json::json;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn move_to_done() -> Request {
    Request::MoveTask {
        project_id: Some(3),
        change: StatusChange {
            task_id: 7,
            from: TaskStatus::InProgress,
            to: TaskStatus::Done,
        },
    }
}

#[tokio::test]
async fn test_successful_move_refetches_balance() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/projects/3/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(7, "done")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(125)))
        .expect(1)
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let (tx, mut rx) = mpsc::unbounded_channel();
    execute(&client, move_to_done(), &tx).await;

    match rx.recv().await {
        Some(ApiEvent::StatusUpdated { change, result, .. }) => {
            assert_eq!(change.to, TaskStatus::Done);
            assert_eq!(result.unwrap().status, TaskStatus::Done);
        }
        other => panic!("unexpected event {other:?}"),
    }
    match rx.recv().await {
        Some(ApiEvent::CurrentUser(Ok(user))) => assert_eq!(user.coins, 125),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_move_skips_balance_refetch() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/projects/3/tasks/7"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db down" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(125)))
        .expect(0)
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let (tx, mut rx) = mpsc::unbounded_channel();
    execute(&client, move_to_done(), &tx).await;
    drop(tx);

    match rx.recv().await {
        Some(ApiEvent::StatusUpdated { result, .. }) => assert!(result.is_err()),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_complete_task_refetches_balance() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/projects/3/tasks/7"))
        .and(body_partial_json(json!({ "id": 7, "status": "done" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(7, "done")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(155)))
        .expect(1)
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let request = Request::CompleteTask {
        project_id: Some(3),
        task_id: 7,
    };
    execute(&client, request, &tx).await;

    match rx.recv().await {
        Some(ApiEvent::TaskCompleted {
            project_id,
            task_id,
            result,
        }) => {
            assert_eq!(project_id, Some(3));
            assert_eq!(task_id, 7);
            assert_eq!(result.unwrap().status, TaskStatus::Done);
        }
        other => panic!("unexpected event {other:?}"),
    }
    match rx.recv().await {
        Some(ApiEvent::CurrentUser(Ok(user))) => assert_eq!(user.coins, 155),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_edit_setting_done_refetches_balance() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(7, "done")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(155)))
        .expect(1)
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let request = Request::UpdateTask {
        project_id: None,
        task_id: 7,
        draft: TaskDraft {
            title: Some("Ship it".to_string()),
            status: Some(TaskStatus::Done),
            ..TaskDraft::default()
        },
    };
    execute(&client, request, &tx).await;

    match rx.recv().await {
        Some(ApiEvent::TaskUpdated { project_id, result }) => {
            assert_eq!(project_id, None);
            assert!(result.is_ok());
        }
        other => panic!("unexpected event {other:?}"),
    }
    match rx.recv().await {
        Some(ApiEvent::CurrentUser(Ok(user))) => assert_eq!(user.coins, 155),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_edit_without_done_skips_balance_refetch() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(7, "todo")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(155)))
        .expect(0)
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let request = Request::UpdateTask {
        project_id: None,
        task_id: 7,
        draft: TaskDraft {
            title: Some("Renamed".to_string()),
            ..TaskDraft::default()
        },
    };
    execute(&client, request, &tx).await;
    drop(tx);

    match rx.recv().await {
        Some(ApiEvent::TaskUpdated { result, .. }) => assert!(result.is_ok()),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(rx.recv().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_reports_over_channel() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/projects/3/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json(7, "todo")])))
        .mount(&server)
        .await;

    let (mut worker, mut events) = Worker::new(Handle::current(), authed_client(&server));
    worker.dispatch(Request::LoadProjectTasks(3));

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("worker answered in time");
    match event {
        Some(ApiEvent::ProjectTasks { project_id, result }) => {
            assert_eq!(project_id, 3);
            assert_eq!(result.unwrap().len(), 1);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_clear_token_is_applied_synchronously() {
    let server = setup_mock_server().await;
    let (mut worker, _events) = Worker::new(Handle::current(), authed_client(&server));
    assert!(worker.client().token().is_some());
    worker.dispatch(Request::ClearToken);
    assert!(worker.client().token().is_none());
}
