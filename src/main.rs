use env_logger::Env;
use story_spoiler::{Settings, Suite};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let selected: Vec<String> = std::env::args().skip(1).collect();

    let configured = Settings::from_env()
        .and_then(|settings| Suite::new(settings).select(selected.as_slice()));
    let suite = match configured {
        Ok(suite) => suite,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    match suite.run().await {
        Ok(report) => {
            println!("{}", report);
            if !report.is_success() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            log::error!("Suite setup failed: {}", e);
            std::process::exit(1);
        }
    }
}
