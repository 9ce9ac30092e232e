use anyhow::Result;
use numguess::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run_cli().await
}
