// tests/conditional.rs

mod common;
use crate::common::builders::{StartLog, const_task, logged_task};
use crate::common::{init_tracing, with_timeout};

use std::collections::HashMap;
use std::error::Error;

use taskdag::{Inputs, RunContext, Task, TaskGraph, TaskStatus};

type TestResult = Result<(), Box<dyn Error>>;

type Record = HashMap<String, i64>;

fn record(pairs: &[(&str, i64)]) -> Record {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[tokio::test]
async fn false_guard_skips_task_without_invoking_it() -> TestResult {
    init_tracing();
    let log = StartLog::new();

    let mut graph = TaskGraph::new();
    let a = graph.add_task(logged_task("A", record(&[("x", 1)]), &log))?;
    graph.add_task(
        logged_task("B", record(&[("y", 2)]), &log)
            .depends_on(&a)
            .with_condition(|_inputs| false),
    )?;

    let output = with_timeout(graph.execute(&RunContext::new())).await?;

    assert_eq!(output.results.len(), 1);
    assert_eq!(output.results["A"]["x"], 1);
    assert!(!output.results.contains_key("B"));
    assert!(!log.contains("B"));
    assert_eq!(output.status("B"), Some(TaskStatus::Skipped));
    assert_eq!(graph.task_status("B")?, TaskStatus::Skipped);
    Ok(())
}

/// Mirrors a VIP-privileges lookup that only runs for high tiers.
fn vip_graph(vip_level: i64) -> Result<TaskGraph<Record>, Box<dyn Error>> {
    let mut graph = TaskGraph::new();
    let user = graph.add_task(const_task(
        "get_user",
        record(&[("user_id", 123), ("vip_level", vip_level)]),
    ))?;
    let orders = graph.add_task(
        Task::new("get_orders", |_ctx, inputs: Inputs<Record>| async move {
            let user_id = inputs["get_user"]["user_id"];
            anyhow::Ok(record(&[("user_id", user_id), ("total", 300)]))
        })
        .depends_on(&user),
    )?;
    let vip = graph.add_task(
        const_task("get_vip_privileges", record(&[("discount_pct", 20)]))
            .depends_on(&user)
            .with_condition(|inputs| {
                inputs
                    .get("get_user")
                    .and_then(|u| u.get("vip_level"))
                    .is_some_and(|lvl| *lvl > 1)
            }),
    )?;
    graph.add_task(
        Task::new("calculate_discount", |_ctx, inputs: Inputs<Record>| async move {
            let total = inputs["get_orders"]["total"];
            // A skipped dependency simply has no input.
            let pct = inputs
                .get("get_vip_privileges")
                .map_or(0, |p| p["discount_pct"]);
            anyhow::Ok(record(&[("discount", total * pct / 100)]))
        })
        .depends_on(&orders)
        .depends_on(&vip),
    )?;
    Ok(graph)
}

#[tokio::test]
async fn guard_sees_dependency_results() -> TestResult {
    init_tracing();
    let graph = vip_graph(2)?;

    let output = with_timeout(graph.execute(&RunContext::new())).await?;

    assert_eq!(output.status("get_vip_privileges"), Some(TaskStatus::Completed));
    assert_eq!(output.results["calculate_discount"]["discount"], 60);
    Ok(())
}

#[tokio::test]
async fn dependents_of_skipped_task_still_run_without_its_input() -> TestResult {
    init_tracing();
    let graph = vip_graph(1)?;

    let output = with_timeout(graph.execute(&RunContext::new())).await?;

    assert_eq!(output.status("get_vip_privileges"), Some(TaskStatus::Skipped));
    assert_eq!(output.status("calculate_discount"), Some(TaskStatus::Completed));
    assert_eq!(output.results["calculate_discount"]["discount"], 0);
    assert_eq!(output.results.len(), 3);
    Ok(())
}
