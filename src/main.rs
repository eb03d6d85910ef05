/*
 * Responsibility
 * - tokio runtime start-up
 * - delegates to app::run(); no logic here
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    crud_api::app::run().await
}
