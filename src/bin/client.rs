//! Standalone client binary for a featureboard server
//!
//! Provides a command-line interface for browsing and editing features

use featureboard::{Client, Feature, FeatureSummary};
use std::env;
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let server_addr = args.get(1).unwrap_or(&"127.0.0.1:8080".to_string()).clone();

    println!("Connecting to featureboard server at {}...", server_addr);
    let mut client = Client::connect(&server_addr).await?;
    println!("Connected! Type 'help' for available commands or 'quit' to exit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input {
            "quit" | "exit" => {
                println!("Goodbye!");
                break;
            }
            "help" => {
                print_help();
            }
            _ => {
                if let Err(e) = handle_command(&mut client, input).await {
                    println!("Error: {}", e);
                }
            }
        }
    }

    client.close().await?;
    Ok(())
}

async fn handle_command(client: &mut Client, input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (verb, rest) = match input.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (input, ""),
    };

    match verb {
        "list" => {
            let summaries = client.list().await?;
            if summaries.is_empty() {
                println!("(no features)");
            }
            for summary in &summaries {
                print_summary(summary);
            }
        }
        "top" => {
            let summary = client.top().await?;
            print_summary(&summary);
        }
        "get" => {
            let id = match parse_id(rest) {
                Some(id) => id,
                None => {
                    println!("Usage: get <id>");
                    return Ok(());
                }
            };

            let feature = client.get(id).await?;
            print_feature(&feature);
        }
        "add" => {
            if rest.is_empty() {
                println!("Usage: add <title> [| <description> [| <details>]]");
                return Ok(());
            }

            let mut fields = rest.splitn(3, '|').map(|s| s.trim().to_string());
            let title = fields.next().unwrap_or_default();
            let description = fields.next().unwrap_or_default();
            let details = fields.next().unwrap_or_default();

            let feature = client.add(&title, &description, &details).await?;
            println!("Created feature #{}: {}", feature.id, feature.title);
        }
        "vote" => {
            let id = match parse_id(rest) {
                Some(id) => id,
                None => {
                    println!("Usage: vote <id>");
                    return Ok(());
                }
            };

            let feature = client.vote(id).await?;
            println!("Feature #{} now has {} upvotes", feature.id, feature.upvotes);
        }
        "complete" => {
            let id = match parse_id(rest) {
                Some(id) => id,
                None => {
                    println!("Usage: complete <id>");
                    return Ok(());
                }
            };

            let feature = client.complete(id).await?;
            println!("Feature #{} marked as completed", feature.id);
        }
        "delete" | "del" => {
            let id = match parse_id(rest) {
                Some(id) => id,
                None => {
                    println!("Usage: delete <id>");
                    return Ok(());
                }
            };

            client.delete(id).await?;
            println!("OK");
        }
        _ => {
            println!("Unknown command: {}. Type 'help' for available commands.", verb);
        }
    }

    Ok(())
}

fn parse_id(arg: &str) -> Option<u64> {
    arg.parse().ok()
}

fn print_summary(summary: &FeatureSummary) {
    let marker = if summary.completed { " [completed]" } else { "" };
    println!(
        "#{:<4} {:<28} {:>5} upvotes{}",
        summary.id, summary.title, summary.upvotes, marker
    );
}

fn print_feature(feature: &Feature) {
    println!("#{} {}", feature.id, feature.title);
    println!("Upvotes:   {}", feature.upvotes);
    println!("Completed: {}", feature.completed);
    if !feature.description.is_empty() {
        println!("Description: {}", feature.description);
    }
    if !feature.details.is_empty() {
        println!("Details:\n{}", feature.details);
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  list                                    - List all features by upvotes");
    println!("  top                                     - Show the most upvoted feature");
    println!("  get <id>                                - Show full details for a feature");
    println!("  add <title> [| <description> [| <details>]] - Create a feature request");
    println!("  vote <id>                               - Upvote a feature");
    println!("  complete <id>                           - Mark a feature as completed");
    println!("  delete <id>                             - Delete a feature");
    println!("  help                                    - Show this help message");
    println!("  quit                                    - Exit the client");
}
