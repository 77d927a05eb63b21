use rd_cache::test::sim_app::SimApp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    SimApp::run().await.inspect_err(|err| {
        eprintln!("Simulation errored out: {err:#}");
    })
}
