use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    auth_service::app::run().await
}
