use clap::{Parser, Subcommand};
use serde_json::Value;

use httper::config::ClientConfig;
use httper::{Client, ContentType, Method, Params, Request, Response};

#[derive(Parser)]
#[command(name = "httper-cli")]
#[command(about = "Send HTTP requests with declared body and response content types", long_about = None)]
struct Cli {
    /// Prefix prepended to every URL
    #[arg(short, long, default_value = "")]
    prefix: String,

    /// Per-request timeout in milliseconds
    #[arg(short, long, default_value_t = 5000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a URL and print the body as JSON
    Get { url: String },
    /// POST a JSON document and print the JSON reply
    Post { url: String, json: String },
    /// Send any request with a raw body and decode the reply as the given type
    Send {
        method: String,
        url: String,
        /// Raw request body
        #[arg(short, long, default_value = "")]
        data: String,
        /// Content-Type header for the raw body
        #[arg(short, long)]
        content_type: Option<String>,
        /// How to decode the reply: application/json, text/plain or text/html
        #[arg(long, default_value = "text/plain")]
        decode: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new(&ClientConfig {
        prefix: cli.prefix,
        timeout_ms: cli.timeout_ms,
    })?;

    match cli.command {
        Commands::Get { url } => {
            let mut json = Value::Null;
            let res = client.get_json(&url, &mut json).await?;
            print_status(&res);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Post { url, json } => {
            let body: Value = serde_json::from_str(&json)?;
            let mut reply = Value::Null;
            let res = client.post_json(&url, &body, &mut reply).await?;
            print_status(&res);
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Commands::Send {
            method,
            url,
            data,
            content_type,
            decode,
        } => {
            let method: Method = method.parse()?;
            let decode = ContentType::from(decode.as_str());

            let mut params = Params::new(method, url).byte_body(data);
            if let Some(content_type) = content_type {
                params = params.header(reqwest::header::CONTENT_TYPE, content_type.parse()?);
            }

            if decode == ContentType::Json {
                let mut json = Value::Null;
                let res = client.execute(Request::new(params.unmarshal(decode, &mut json))?).await?;
                print_status(&res);
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                let mut text = String::new();
                let res = client.execute(Request::new(params.unmarshal(decode, &mut text))?).await?;
                print_status(&res);
                println!("{}", text);
            }
        }
    }

    Ok(())
}

fn print_status(res: &Response) {
    if !res.status().is_success() {
        eprintln!("Error: {} returned status {}", res.url(), res.status());
    }
}
