#![cfg(feature = "simulation")]

use rd_cache::test::sim_app::SimApp;

#[tokio::test]
async fn full_simulation() -> Result<(), Box<dyn std::error::Error>> {
    // Keep the run short; the scenario verifies call counts itself and fails otherwise.
    let app = SimApp::from_args(vec![
        "full_simulation_test",
        "--quiet",
        "--workflows=10",
        "--reads=20",
    ])?;

    let report = app.execute().await?;
    assert_eq!(report.cached_calls, 1);
    assert_eq!(report.uncached_calls, 20);
    assert_eq!(report.refresh_calls, 2);
    assert_eq!(report.indexed_calls, 1);
    assert_eq!(report.scoped_calls, 22);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn full_simulation_with_latency() -> Result<(), Box<dyn std::error::Error>> {
    let app = SimApp::from_args(vec!["latency_test", "-q", "--workflows=3", "--reads=5", "--latency-ms=50"])?;
    let report = app.execute().await?;
    assert_eq!(report.uncached_calls, 5);
    Ok(())
}
