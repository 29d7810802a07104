use anyhow::{Error, bail};
use clap::Parser;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Fires concurrent votes at a running server and checks that none were lost.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:1111")]
    url: String,

    #[arg(long, default_value_t = 1)]
    effect_id: u32,

    #[arg(long, default_value_t = 100)]
    votes: usize,

    #[arg(long, default_value = "A")]
    variant: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EffectDetail {
    title: String,
    votes_a: u64,
    votes_b: u64,
}

async fn read_effect(client: &Client, args: &Args) -> Result<EffectDetail, Error> {
    let detail = client
        .get(format!("{}/effect/{}", args.url, args.effect_id))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(detail)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    let client = Client::new();

    let before = read_effect(&client, &args).await?;
    println!(
        "{}: A={} B={}",
        before.title, before.votes_a, before.votes_b
    );

    let body = json!({ "effectId": args.effect_id, "variant": args.variant });
    let requests = (0..args.votes).map(|_| {
        client
            .post(format!("{}/vote", args.url))
            .json(&body)
            .send()
    });

    let mut failed = 0;
    for response in join_all(requests).await {
        match response.and_then(|r| r.error_for_status()) {
            Ok(_) => {}
            Err(e) => {
                failed += 1;
                println!("Vote failed: {e}");
            }
        }
    }

    let after = read_effect(&client, &args).await?;
    println!("{}: A={} B={}", after.title, after.votes_a, after.votes_b);

    let expected = (before.votes_a + before.votes_b) + (args.votes - failed) as u64;
    let actual = after.votes_a + after.votes_b;

    println!(
        "Sent: {}, Failed: {failed}, Expected Total: {expected}, Actual Total: {actual}",
        args.votes
    );

    if actual < expected {
        bail!("Lost {} votes", expected - actual);
    }

    Ok(())
}
