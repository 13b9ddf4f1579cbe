use anyhow::Result;

use take_test_engine::app::App;
use take_test_engine::config::Config;
use take_test_engine::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::load();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
