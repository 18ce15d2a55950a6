use anyhow::Result;
use orchat::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
