use clap::Parser;
use nwp_station_forecast::cli::{run, Cli};
use nwp_station_forecast::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
