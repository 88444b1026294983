// tests/failure.rs

mod common;
use crate::common::builders::{StartLog, const_task, failing_task, logged_task, slow_task};
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use taskdag::{ExecuteOptions, RunContext, Task, TaskDagError, TaskGraph, TaskStatus};

#[tokio::test]
async fn failing_task_aborts_the_run_with_attributed_error() {
    init_tracing();
    let mut graph: TaskGraph<i64> = TaskGraph::new();
    let a = graph.add_task(const_task("A", 1)).unwrap();
    graph
        .add_task(failing_task("B", "upstream unavailable").depends_on(&a))
        .unwrap();

    let err = with_timeout(graph.execute(&RunContext::new()))
        .await
        .unwrap_err();

    match &err {
        TaskDagError::TaskExecutionFailure { task, error } => {
            assert_eq!(task, "B");
            assert!(error.to_string().contains("upstream unavailable"));
        }
        other => panic!("expected TaskExecutionFailure, got {other:?}"),
    }
    assert_eq!(err.task(), Some("B"));
    assert!(err.to_string().starts_with("task B failed"));

    assert_eq!(graph.task_status("A").unwrap(), TaskStatus::Completed);
    assert_eq!(graph.task_status("B").unwrap(), TaskStatus::Failed);
}

#[tokio::test]
async fn no_later_layer_starts_after_a_failure() {
    init_tracing();
    let log = StartLog::new();

    let mut graph: TaskGraph<i64> = TaskGraph::new();
    let root = graph.add_task(logged_task("root", 0, &log)).unwrap();
    let bad = graph
        .add_task(failing_task("bad", "boom").depends_on(&root))
        .unwrap();
    let sibling = graph
        .add_task(logged_task("sibling", 1, &log).depends_on(&root))
        .unwrap();
    graph
        .add_task(logged_task("after_bad", 2, &log).depends_on(&bad))
        .unwrap();
    graph
        .add_task(logged_task("after_sibling", 3, &log).depends_on(&sibling))
        .unwrap();

    let result = with_timeout(graph.execute(&RunContext::new())).await;
    assert!(matches!(
        result,
        Err(TaskDagError::TaskExecutionFailure { ref task, .. }) if task == "bad"
    ));

    // Layer 2 never started, not even the part unrelated to the failure.
    assert!(!log.contains("after_bad"));
    assert!(!log.contains("after_sibling"));
    assert_eq!(graph.task_status("after_bad").unwrap(), TaskStatus::Pending);
    assert_eq!(graph.task_status("after_sibling").unwrap(), TaskStatus::Pending);
}

#[tokio::test]
async fn failure_cancels_in_flight_siblings() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut graph: TaskGraph<i64> = TaskGraph::new();
    graph
        .add_task(slow_task("slow", Duration::from_secs(30), 1, Arc::clone(&calls)))
        .unwrap();
    graph
        .add_task(Task::new("fails_fast", |_ctx, _inputs| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err::<i64, _>(anyhow::anyhow!("fast failure"))
        }))
        .unwrap();

    // Finishes well inside the timeout only if `slow` saw the cancellation.
    let err = with_timeout(graph.execute(&RunContext::new()))
        .await
        .unwrap_err();

    assert_eq!(err.task(), Some("fails_fast"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(graph.task_status("slow").unwrap(), TaskStatus::Failed);
}

#[tokio::test]
async fn queued_tasks_do_not_start_once_the_layer_failed() {
    init_tracing();
    let options = ExecuteOptions::default().with_worker_count(1);

    for _ in 0..20 {
        let log = StartLog::new();
        let mut graph: TaskGraph<i64> = TaskGraph::new();
        graph.add_task(failing_task("first", "nope")).unwrap();
        for i in 0..4 {
            graph
                .add_task(logged_task(&format!("queued_{i}"), i, &log))
                .unwrap();
        }

        let err = with_timeout(graph.execute_with(&RunContext::new(), &options))
            .await
            .unwrap_err();

        assert_eq!(err.task(), Some("first"));
        assert!(log.entries().is_empty(), "started after failure: {:?}", log.entries());
        for i in 0..4 {
            let id = format!("queued_{i}");
            assert_eq!(graph.task_status(&id).unwrap(), TaskStatus::Pending, "{id}");
        }
    }
}

#[tokio::test]
async fn panic_cancels_queued_tasks_too() {
    init_tracing();
    let log = StartLog::new();

    let mut graph: TaskGraph<i64> = TaskGraph::new();
    graph
        .add_task(Task::new("explodes_first", |_ctx, _inputs| async {
            if true {
                panic!("kaboom");
            }
            anyhow::Ok(0)
        }))
        .unwrap();
    graph.add_task(logged_task("queued", 1, &log)).unwrap();

    let options = ExecuteOptions::default().with_worker_count(1);
    let err = with_timeout(graph.execute_with(&RunContext::new(), &options))
        .await
        .unwrap_err();

    assert_eq!(err.task(), Some("explodes_first"));
    assert!(!log.contains("queued"));
    assert_eq!(graph.task_status("queued").unwrap(), TaskStatus::Pending);
}

#[tokio::test]
async fn panicking_work_function_is_reported_as_failure() {
    init_tracing();
    let mut graph: TaskGraph<i64> = TaskGraph::new();
    graph
        .add_task(Task::new("explodes", |_ctx, _inputs| async {
            if true {
                panic!("kaboom");
            }
            anyhow::Ok(0)
        }))
        .unwrap();

    let err = with_timeout(graph.execute(&RunContext::new()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TaskDagError::TaskExecutionFailure { ref task, .. } if task == "explodes"
    ));
    assert_eq!(graph.task_status("explodes").unwrap(), TaskStatus::Failed);
}

#[tokio::test]
async fn cancelled_context_runs_nothing() {
    init_tracing();
    let log = StartLog::new();

    let mut graph: TaskGraph<i64> = TaskGraph::new();
    graph.add_task(logged_task("A", 1, &log)).unwrap();

    let ctx = RunContext::new();
    ctx.cancel();

    let err = graph.execute(&ctx).await.unwrap_err();
    assert!(matches!(err, TaskDagError::Cancelled));
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn caller_deadline_stops_a_slow_run() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut graph: TaskGraph<i64> = TaskGraph::new();
    let slow = graph
        .add_task(slow_task("slow", Duration::from_secs(30), 1, Arc::clone(&calls)))
        .unwrap();
    graph
        .add_task(const_task("never", 2).depends_on(&slow))
        .unwrap();

    let ctx = RunContext::new();
    let _timer = ctx.cancel_after(Duration::from_millis(20));

    let err = with_timeout(graph.execute(&ctx)).await.unwrap_err();

    // `slow` observes the cancellation and errors out.
    assert_eq!(err.task(), Some("slow"));
    assert_eq!(graph.task_status("never").unwrap(), TaskStatus::Pending);
}

#[tokio::test]
async fn zero_workers_is_rejected_at_execute() {
    init_tracing();
    let mut graph: TaskGraph<i64> = TaskGraph::new();
    graph.add_task(const_task("A", 1)).unwrap();

    let options = ExecuteOptions {
        worker_count: 0,
        debug_log: false,
    };
    let err = graph
        .execute_with(&RunContext::new(), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, TaskDagError::ConfigError(_)));
}
