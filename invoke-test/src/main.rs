use aws_config::BehaviorVersion;
use aws_sdk_lambda::Client;
use clap::Parser;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;

const TITLES: &[&str] = &[
    "The Matrix",
    "Spirited Away",
    "Interstellar",
    "Amelie",
    "Parasite",
    "Alien",
    "Heat",
    "Arrival",
];

#[derive(Default)]
struct Stats {
    success_count: usize,
    error_count: usize,
    total_latency_ms: f64,
}

/// The part of the proxy response we care about.
#[derive(Deserialize)]
struct ProxyResponse {
    #[serde(rename = "statusCode")]
    status_code: u16,
}

#[derive(Parser, Debug)]
#[command(name = "invoke-test")]
#[command(about = "Invoke the API handler function with random movie records")]
struct Args {
    /// Lambda function name
    function: String,

    /// Number of iterations to run
    #[arg(long, default_value = "1000")]
    iters: usize,

    /// Number of parallel tasks
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Send empty bodies so the function writes its default record
    #[arg(long)]
    default_record: bool,
}

/// Wraps `body` in an API Gateway REST proxy event.
fn proxy_event(body: Option<String>, thread_id: usize, i: usize) -> serde_json::Value {
    serde_json::json!({
        "resource": "/",
        "path": "/",
        "httpMethod": "POST",
        "headers": { "Content-Type": "application/json" },
        "multiValueHeaders": { "Content-Type": ["application/json"] },
        "queryStringParameters": null,
        "multiValueQueryStringParameters": null,
        "pathParameters": null,
        "stageVariables": null,
        "requestContext": {
            "resourcePath": "/",
            "httpMethod": "POST",
            "path": "/prod/",
            "stage": "prod",
            "requestId": format!("invoke-test-{thread_id}-{i}"),
            "identity": { "sourceIp": "127.0.0.1" }
        },
        "body": body,
        "isBase64Encoded": false
    })
}

fn random_movie(rng: &mut StdRng) -> serde_json::Value {
    serde_json::json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "year": rng.gen_range(1950..=2025),
        "title": TITLES.choose(rng).copied().unwrap_or("Untitled"),
    })
}

async fn run_invocations(
    client: Arc<Client>,
    function_name: String,
    thread_id: usize,
    start: usize,
    end: usize,
    total: usize,
    default_record: bool,
    stats: Arc<Mutex<Stats>>,
) -> anyhow::Result<()> {
    let mut rng = StdRng::from_entropy();

    for i in start..=end {
        let body = if default_record {
            None
        } else {
            Some(random_movie(&mut rng).to_string())
        };
        let description = body.clone().unwrap_or_else(|| "<default record>".to_string());
        let payload = serde_json::to_vec(&proxy_event(body, thread_id, i))?;

        let started = Instant::now();
        let result = client
            .invoke()
            .function_name(&function_name)
            .payload(aws_sdk_lambda::primitives::Blob::new(payload))
            .send()
            .await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(response) => {
                let response_payload = response
                    .payload()
                    .map(|b| String::from_utf8_lossy(b.as_ref()).to_string())
                    .unwrap_or_else(|| "No response".to_string());

                // Function errors come back as a 200 invoke with an error payload
                let is_error = response.function_error().is_some()
                    || serde_json::from_str::<ProxyResponse>(&response_payload)
                        .map(|proxy| proxy.status_code != 200)
                        .unwrap_or(true);

                {
                    let mut stats = stats.lock().await;
                    if is_error {
                        stats.error_count += 1;
                    } else {
                        stats.success_count += 1;
                        stats.total_latency_ms += latency_ms;
                    }
                }

                println!(
                    "[Thread {}: {}/{}] Inserting {} => {} ({:.3}ms)",
                    thread_id, i, total, description, response_payload, latency_ms
                );
            }
            Err(e) => {
                {
                    let mut stats = stats.lock().await;
                    stats.error_count += 1;
                }

                eprintln!(
                    "[Thread {}: {}/{}] Error inserting {}: {}",
                    thread_id, i, total, description, e
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.threads > 0, "--threads must be at least 1");

    println!(
        "Running {} invocations across {} task(s)",
        args.iters, args.threads
    );

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = Arc::new(Client::new(&config));

    let stats = Arc::new(Mutex::new(Stats::default()));

    let iters_per_thread = args.iters / args.threads;
    let remainder = args.iters % args.threads;

    let mut tasks = JoinSet::new();

    let total_iters = args.iters;
    let default_record = args.default_record;

    let mut start = 1;
    for t in 1..=args.threads {
        let end = if t == args.threads {
            start + iters_per_thread - 1 + remainder
        } else {
            start + iters_per_thread - 1
        };

        let client = Arc::clone(&client);
        let function_name = args.function.clone();
        let stats = Arc::clone(&stats);

        tasks.spawn(async move {
            run_invocations(
                client,
                function_name,
                t,
                start,
                end,
                total_iters,
                default_record,
                stats,
            )
            .await
        });

        start = end + 1;
    }

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => eprintln!("Task failed: {:#}", e),
            Err(e) => eprintln!("Task panicked: {}", e),
        }
    }

    let stats = stats.lock().await;
    println!("Completed {} invocations", args.iters);
    println!();
    println!("Results:");
    println!("  Success: {}", stats.success_count);
    println!("  Errors:  {}", stats.error_count);
    if stats.success_count > 0 {
        let avg_latency = stats.total_latency_ms / stats.success_count as f64;
        println!("  Avg latency: {:.3}ms", avg_latency);
    }

    Ok(())
}
