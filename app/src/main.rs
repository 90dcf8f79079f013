use prism_app::{DefaultHeadersArgs, HeadersArgs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    prism_app::init();

    let args = DefaultHeadersArgs::parse();
    if let Err(err) = prism_app::run(&args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
