use bloomtree::AppConfig;

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    )
    .init();

    if let Err(err) = bloomtree::run(AppConfig::default()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
