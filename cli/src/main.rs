mod commands;
mod terminal;

use std::sync::Arc;

use commands::CommandLine;
use vaxwatch_common::config::MailConfig;
use vaxwatch_core::fetch::{self, CowinClient, District};
use vaxwatch_core::notify::{DedupNotifier, MailTransport, SmtpMailer};
use vaxwatch_core::poll::{PollOptions, Poller};

use crate::terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging();

    if let Some(state) = &commands.find_district {
        return print_district_ids(state).await;
    }

    // Recipients imply mail; the credentials file must be valid before
    // any polling starts.
    let transport: Option<Box<dyn MailTransport>> = if commands.recipients.is_empty() {
        None
    } else {
        let config: MailConfig = MailConfig::load(&commands.mail_config)?;
        Some(Box::new(SmtpMailer::from_config(
            &config,
            &commands.recipients,
        )?))
    };

    let options = PollOptions {
        queries: commands.queries(),
        criteria: commands.criteria(),
        date: commands.date.clone(),
        repeat: commands.repeat,
    };

    let mut poller = Poller::new(
        Arc::new(CowinClient::new()),
        DedupNotifier::new(transport),
    );
    poller.run(&options).await
}

async fn print_district_ids(state: &str) -> anyhow::Result<()> {
    let client: CowinClient = CowinClient::new();
    let districts: Vec<District> = fetch::districts_for_state(&client, state).await?;

    println!("\nDistricts:\n");
    for district in &districts {
        println!("{} - {}", district.district_name, district.district_id);
    }
    Ok(())
}
