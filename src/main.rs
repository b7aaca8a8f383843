//! Wirelog CLI entry point.

use wirelog::cli::{self, Cli};
use wirelog::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Execute the command
    cli::execute(cli).await
}
