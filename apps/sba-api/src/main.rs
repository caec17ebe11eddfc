use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = sba_api::Args::parse();
	sba_api::run(args).await
}
