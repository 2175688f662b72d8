#[tokio::main]
async fn main() -> anyhow::Result<()> {
    neurocursor_lib::run().await
}
