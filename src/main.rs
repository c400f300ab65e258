#[tokio::main]
async fn main() -> anyhow::Result<()> {
    panel_anchor::server::run().await
}
