use mailtm_api::client::MailtmExtension;
use std::time::Duration;
use tempbox::http::Client;
use tempbox::Tempbox;
use tracing::info;

fn main() {
    let filter = tracing_subscriber::EnvFilter::builder()
        .parse_lossy("info,tempbox=debug,mailtm_api=debug");
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .init();

    let client = Client::mailtm_client()
        .user_agent("tempbox-cli/0.1.0")
        .connect_timeout(Duration::from_secs(60))
        .request_timeout(Duration::from_secs(3 * 60))
        .build()
        .expect("Failed to build client");

    let tempbox = Tempbox::new(client);

    let address = tempbox
        .generate_random_mailbox()
        .expect("Failed to generate mailbox");
    println!("Your disposable address: {address}");

    info!("Polling every 5 seconds - Ctrl+C to quit");
    loop {
        if let Some(output) = tempbox.poll() {
            for message in &output.new {
                println!(
                    "New message from {}: {}",
                    message.sender(),
                    message.subject()
                );
            }
        }
        std::thread::sleep(Duration::from_secs(5));
    }
}
