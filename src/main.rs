use argh::FromArgs;
use meteolog::{run, Config, OpenWeatherClient};
use std::path::PathBuf;
use std::time::Duration;

#[derive(FromArgs)]
/// Collect current weather for every configured location, keep a per-location
/// history and forecast tomorrow's temperatures from it.
struct Args {
    /// directory holding one CSV log per location
    #[argh(option, default = "PathBuf::from(\"data\")")]
    data_dir: PathBuf,

    /// file listing the locations, one `name,region[,lat,lon]` per line
    #[argh(option, default = "PathBuf::from(\"locations.txt\")")]
    locations: PathBuf,

    /// where to write the per-location forecasts
    #[argh(option, default = "PathBuf::from(\"forecasts.json\")")]
    forecast_output: PathBuf,

    /// where to write the map summary
    #[argh(option, default = "PathBuf::from(\"city_locations.json\")")]
    map_output: PathBuf,

    /// clean daily rows required before a local forecast is made
    #[argh(option, default = "10")]
    min_records: usize,

    /// pause between calls to the weather service, in milliseconds
    #[argh(option, default = "1100")]
    delay_ms: u64,

    /// language of the weather descriptions
    #[argh(option, default = "String::from(\"es\")")]
    lang: String,

    /// move logs that cannot be migrated aside and start new ones
    #[argh(switch)]
    discard_unreadable_logs: bool,

    /// log a hold-out error report for every location
    #[argh(switch)]
    evaluate: bool,
}

#[tokio::main]
async fn main() {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let api_key = match Config::api_key_from_env() {
        Ok(key) => key,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let config = Config::builder()
        .api_key(api_key)
        .data_dir(args.data_dir)
        .locations_file(args.locations)
        .forecast_output(args.forecast_output)
        .map_output(args.map_output)
        .min_records(args.min_records)
        .request_delay(Duration::from_millis(args.delay_ms))
        .language(args.lang)
        .discard_unreadable_logs(args.discard_unreadable_logs)
        .evaluate(args.evaluate)
        .build();

    let client = OpenWeatherClient::new(&config);
    match run(&config, &client).await {
        Ok(report) if report.persist_failures > 0 => {
            log::error!("{} output file(s) could not be written", report.persist_failures);
            std::process::exit(2);
        }
        Ok(_) => {}
        Err(e) => {
            log::error!("Run aborted: {}", e);
            std::process::exit(1);
        }
    }
}
