use clap::Parser;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of a running raffle server.
    #[arg(default_value = "http://localhost:3000")]
    server: String,

    /// How many mock entries to send.
    #[arg(default_value_t = 8)]
    count: u32,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let client = reqwest::Client::new();

    for i in 1..=args.count {
        let phone = format!("0912{:07}", i);

        let response = client
            .post(format!("{}/api/sms-webhook", args.server))
            .json(&json!({ "from": phone, "message": "9" }))
            .send()
            .await
            .unwrap();

        println!("{} -> {}", phone, response.status());
    }

    let participants: serde_json::Value = client
        .get(format!("{}/api/participants", args.server))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    println!(
        "Registered participants: {}",
        participants.as_array().map(|a| a.len()).unwrap_or(0)
    );
}
