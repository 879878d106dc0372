use anyhow::{bail, Context};
use carsxe::{CancellationToken, CarsxeClient, CarsxeConfig, Endpoint, JsonMap, Params};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(author, version, about = "🚗 Query the CarsXE vehicle data API", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    CARSXE_API_KEY       API key (required unless --api-key is given)
    CARSXE_BASE_URL      Override the API base URL
    CARSXE_SOURCE        Override the source tag sent with every request
    CARSXE_TIMEOUT_SECS  Per-request timeout in seconds
    RUST_LOG             Log filter, e.g. carsxe=debug

EXAMPLES:
    carsxe call specs -p vin=WBAFR7C57CC811956
    carsxe call plate-decoder -p plate=7XER187 -p state=CA
    carsxe call vin-ocr -p imageURL=https://example.com/vin.jpg
    carsxe get v1/lien-theft -p vin=WBAFR7C57CC811956
    carsxe endpoints")]
struct Args {
    #[arg(long, env = "CARSXE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "CARSXE_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "CARSXE_SOURCE")]
    source: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CARSXE_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Print JSON on one line instead of pretty-printed
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Call a known endpoint (see `carsxe endpoints`)
    Call {
        endpoint: Endpoint,
        /// Request parameter as name=value; repeatable
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// GET any path under the base URL
    Get {
        path: String,
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// List known endpoints and their parameters
    Endpoints,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("parameter name is empty in '{raw}'"));
    }
    Ok((name.trim().to_string(), value.to_string()))
}

fn build_config(args: &Args) -> anyhow::Result<CarsxeConfig> {
    let Some(api_key) = args.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        bail!("no API key: pass --api-key or set CARSXE_API_KEY");
    };
    let mut config = CarsxeConfig::new(api_key);
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(source) = &args.source {
        config = config.with_source(source.as_str());
    }
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

fn connect(config: CarsxeConfig) -> anyhow::Result<CarsxeClient> {
    CarsxeClient::new(config).context("failed to create CarsXE client")
}

fn print_endpoints() {
    println!("{:<28} {:<5} {:<32} PARAMETERS", "NAME", "VERB", "PATH");
    for endpoint in Endpoint::ALL {
        let spec = endpoint.spec();
        let mut params: Vec<String> = spec.required.iter().map(|p| p.to_string()).collect();
        params.extend(spec.optional.iter().map(|p| format!("[{p}]")));
        println!("{:<28} {:<5} {:<32} {}", spec.name, spec.method, spec.path, params.join(" "));
    }
}

fn print_json(map: &JsonMap, compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(map)
    } else {
        serde_json::to_string_pretty(map)
    }
    .context("failed to render response")?;
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();
    let compact = args.compact;
    let config = build_config(&args);

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let map = match args.command {
        Command::Endpoints => {
            print_endpoints();
            return Ok(());
        }
        Command::Call { endpoint, params } => {
            let client = connect(config?)?;
            debug!(endpoint = %endpoint, params = params.len(), "Calling endpoint");
            let params: Params = params.into_iter().collect();
            client
                .call_with_cancel(endpoint, params, &token)
                .await
                .with_context(|| format!("{endpoint} failed"))?
        }
        Command::Get { path, params } => {
            let client = connect(config?)?;
            let params: Params = params.into_iter().collect();
            tokio::select! {
                () = token.cancelled() => bail!("interrupted"),
                result = client.get(&path, params) => result.with_context(|| format!("GET {path} failed"))?,
            }
        }
    };

    print_json(&map, compact)
}
