use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = idlink_api::Args::parse();
	idlink_api::run(args).await
}
