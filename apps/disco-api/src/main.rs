use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = disco_api::Args::parse();
	disco_api::run(args).await
}
