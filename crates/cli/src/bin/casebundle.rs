use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    casebundle_cli::main_entry().await
}
