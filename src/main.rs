#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ecoproof::server::run().await
}
