use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use nevnap_core::config::DEFAULT_API_BASE;
use nevnap_core::{ClientConfig, Locale, NameDayClient, NameDayError, NameList};
use std::io::{self, Write};
use tokio::io::AsyncBufReadExt;

#[derive(Parser, Debug)]
#[clap(
    name = "nevnap",
    version = "0.1.0",
    about = "Browse name days by calendar date"
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(long, default_value = DEFAULT_API_BASE, help = "Base URL of the name day service")]
    api_base: String,

    #[clap(long, default_value = "hu", help = "Locale for weekday names ('hu' or 'en')")]
    locale: Locale,

    #[clap(long, help = "Start date as YYYY-MM-DD, defaults to today")]
    date: Option<NaiveDate>,

    #[clap(long, short, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the names celebrated on the selected date (default command)
    Show,
    /// Step through days interactively: n(ext), p(rev), t(oday), q(uit)
    Browse,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let config = ClientConfig::default()
        .with_api_base(cli.api_base.clone())
        .with_locale(cli.locale);
    let client = match cli.date {
        Some(date) => NameDayClient::starting_at(config, date),
        None => NameDayClient::new(config),
    };

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => run_show(&client).await,
        Commands::Browse => run_browse(&client).await,
    }
}

async fn run_show(client: &NameDayClient) -> Result<()> {
    let names = client.refresh().await?;
    print_day(client, &names).await;
    Ok(())
}

async fn run_browse(client: &NameDayClient) -> Result<()> {
    println!("Commands: n(ext), p(rev), t(oday), q(uit)");

    show_step(client, client.refresh().await).await;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        match line.trim() {
            "n" | "next" => show_step(client, client.go_to_next_day().await).await,
            "p" | "prev" => show_step(client, client.go_to_previous_day().await).await,
            "t" | "today" => show_step(client, client.jump_to_today().await).await,
            "q" | "quit" => break,
            "" => {}
            other => println!("unknown command '{}'", other),
        }
    }

    Ok(())
}

async fn show_step(client: &NameDayClient, outcome: Result<NameList, NameDayError>) {
    match outcome {
        Ok(names) => print_day(client, &names).await,
        Err(err) => {
            eprintln!("lookup failed: {}", err);
            if let Some(names) = client.last_names().await {
                println!("last known list:");
                print_day(client, &names).await;
            }
        }
    }
}

async fn print_day(client: &NameDayClient, names: &[String]) {
    let label = client.current_label().await;
    println!("{} ({})", label.long_date, label.weekday);
    if names.is_empty() {
        println!("  no name days on this date");
    } else {
        for name in names {
            println!("  {}", name);
        }
    }
}
