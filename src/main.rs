use std::process::ExitCode;

use clap::Parser;
use log::{error, info, log_enabled, Level};
use webroute::{load_config, router::Action, Router, WebrouteError};

#[derive(Parser)]
#[command(
    name = "webroute",
    version,
    about = "webroute - resolve requests against a virtual host config",
    long_about = r#"
webroute - resolve requests against a virtual host config

Usage:
    webroute [OPTIONS] <CONFIG>

Options:
    -h, --help       Print help information
    -V, --version    Print version information
        --host       <HOST>    Request host [default: localhost]
        --port       <PORT>    Request port [default: 8080]
        --uri        <URI>     Request URI [default: /]
        --method     <METHOD>  Request method [default: GET]
        --dump       Print the parsed configuration as YAML
"#
)]
struct Args {
    #[arg(help = "Config file to use.")]
    config: String,

    #[arg(long, default_value = "localhost", help = "Request host.")]
    host: String,

    #[arg(long, default_value_t = 8080, help = "Request port.")]
    port: u16,

    #[arg(long, default_value = "/", help = "Request URI.")]
    uri: String,

    #[arg(long, default_value = "GET", help = "Request method.")]
    method: String,

    #[arg(long, help = "Print the parsed configuration as YAML.")]
    dump: bool,
}

fn run(args: Args) -> Result<(), WebrouteError> {
    let tree = load_config(&args.config)?;

    if args.dump {
        print!("{}", tree.to_yaml()?);
    }

    let method = http::Method::from_bytes(
        args.method
            .as_bytes(),
    )
    .map_err(|_| webroute::RouteError::MethodNotAllowed(args.method.clone()))?;

    let router = Router::new(tree);
    let decision = router.resolve(&args.host, args.port, &args.uri, &method)?;

    info!(
        "{} {}:{}{} matched location {}",
        method,
        args.host,
        args.port,
        args.uri,
        decision
            .matched_location()
            .path()
    );

    match decision.action() {
        Action::Redirect(url) => println!("Redirect to: {}", url),
        Action::Autoindex(path) => println!("Autoindex enabled for: {}", path),
        Action::File(path) => println!("Serve file: {}", path),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        if !log_enabled!(Level::Error) {
            eprintln!("Error: {}", e);
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
