#[tokio::main]
async fn main() -> anyhow::Result<()> {
    budgetwise_api::cli::run_with_sys_args().await
}
