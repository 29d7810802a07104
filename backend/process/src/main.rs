use std::{
    io::{self, BufRead},
    path::PathBuf,
};

use anyhow::Error;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Slug categories, trim text and sort a catalog file
    Normalize {
        input: PathBuf,

        /// Defaults to overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a catalog file into a SQLite database
    Seed {
        catalog: PathBuf,

        #[arg(default_value = "data/effects.db")]
        database: PathBuf,
    },

    /// Print an argon2 hash for ADMIN_PASSWORD_HASH, reads the password from stdin if not given
    HashPassword {
        #[arg(env = "ADMIN_PASSWORD")]
        password: Option<String>,
    },

    /// Print site stats and categories of a catalog file
    Summary { catalog: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    match args.command {
        Command::Normalize { input, output } => {
            let output = output.unwrap_or_else(|| input.clone());
            process::normalize_catalog(&input, &output)?;
            println!("Wrote {}", output.display());
        }
        Command::Seed { catalog, database } => {
            let seeded = process::seed_database(&catalog, &database).await?;
            println!("Seeded {seeded} effects into {}", database.display());
        }
        Command::HashPassword { password } => {
            let password = match password {
                Some(password) => password,
                None => {
                    let mut line = String::new();
                    io::stdin().lock().read_line(&mut line)?;
                    line.trim_end_matches(['\r', '\n']).to_string()
                }
            };

            println!("{}", process::hash_admin_password(&password)?);
        }
        Command::Summary { catalog } => {
            let (stats, categories) = process::summarize(&catalog)?;

            println!("Effects: {}", stats.total_effects);
            println!("Votes: {}", stats.total_votes);
            println!("Estimated Participants: {}\n", stats.estimated_participants);

            for category in categories {
                println!(
                    "{} {} ({}): {}",
                    category.emoji, category.name, category.category, category.count
                );
            }
        }
    }

    Ok(())
}
