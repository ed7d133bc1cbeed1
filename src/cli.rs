//! Command-line interface.

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};

use jiraby::api::{JiraClient, SearchQuery};
use jiraby::config::{secrets, Config, Profile};
use jiraby::error::{AppError, Result};

/// Talk to a JIRA server from the command line.
#[derive(Parser, Debug)]
#[command(name = "jiraby", version, about, long_about = None)]
pub struct Args {
    /// Profile from config.toml to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save the profile's password in the OS keyring (read from stdin)
    StorePassword,

    /// Remove the profile's password from the OS keyring
    ForgetPassword,

    /// Show an issue
    Issue {
        key: String,
    },

    /// Change one field of an issue, by field name or id
    Set {
        key: String,
        field: String,
        value: String,
        /// Parse VALUE as JSON instead of taking it as a string
        #[arg(long)]
        json: bool,
    },

    /// Create an issue
    Create {
        project: String,
        issue_type: String,
        summary: String,
    },

    /// List issues matching a JQL query
    Search {
        jql: String,
        /// Stop after this many issues
        #[arg(short, long)]
        limit: Option<usize>,
        /// Comma-separated fields to fetch
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Count issues matching a JQL query
    Count {
        jql: String,
    },

    /// List the server's fields as id and label
    Fields,

    /// Show a project and its issue types
    Project {
        key: String,
    },
}

/// Run one command against the configured profile.
pub async fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let profile = config.profile(args.profile.as_deref())?;

    match args.command {
        Command::StorePassword => return store_password(profile),
        Command::ForgetPassword => return forget_password(profile),
        _ => {}
    }

    let client = connect(&config, profile).await?;
    let result = dispatch(&client, args.command).await;

    if let Err(e) = client.logout().await {
        warn!("Logout failed: {}", e);
    }
    result
}

async fn connect(config: &Config, profile: &Profile) -> Result<JiraClient> {
    let client = JiraClient::new(config.client_config(profile))?;
    let password = secrets::get_password(&profile.name)?;
    client.login(&profile.username, &password).await?;
    info!(profile = %profile.name, "Session opened");
    Ok(client)
}

async fn dispatch(client: &JiraClient, command: Command) -> Result<()> {
    match command {
        Command::StorePassword | Command::ForgetPassword => Ok(()),
        Command::Issue { key } => {
            let issue = client.issue(&key).await?;
            println!("{}", to_pretty(issue.data())?);
            Ok(())
        }
        Command::Set {
            key,
            field,
            value,
            json,
        } => {
            let value = if json {
                serde_json::from_str::<Value>(&value)
                    .map_err(|e| AppError::other(format!("VALUE is not valid JSON: {}", e)))?
            } else {
                Value::String(value)
            };
            let mut issue = client.issue(&key).await?;
            issue.set(&field, value).await?;
            issue.save().await?;
            println!("Updated {}", key);
            Ok(())
        }
        Command::Create {
            project,
            issue_type,
            summary,
        } => {
            let issue = client.create_issue(&project, &issue_type, &summary).await?;
            println!("Created {}", issue.key().unwrap_or("(no key)"));
            Ok(())
        }
        Command::Search { jql, limit, fields } => {
            let mut query = SearchQuery::new(jql);
            if !fields.is_empty() {
                query = query.with_fields(fields);
            }
            let limit = limit.unwrap_or(usize::MAX);
            let mut issues = client.issues(&query);
            let mut shown = 0;
            while shown < limit {
                let Some(issue) = issues.next().await else {
                    break;
                };
                let issue = issue?;
                println!(
                    "{}\t{}",
                    issue.key().unwrap_or_default(),
                    issue.summary().unwrap_or_default()
                );
                shown += 1;
            }
            Ok(())
        }
        Command::Count { jql } => {
            println!("{}", client.count(&jql).await?);
            Ok(())
        }
        Command::Fields => {
            for (label, id) in client.field_labels().await? {
                println!("{}\t{}", id, label);
            }
            Ok(())
        }
        Command::Project { key } => {
            let project = client.project(&key).await?;
            println!(
                "{}\t{}",
                project.key().unwrap_or_default(),
                project.name().unwrap_or_default()
            );
            for issue_type in project.issue_types() {
                println!("  {}", issue_type.get_str("name").unwrap_or_default());
            }
            Ok(())
        }
    }
}

fn store_password(profile: &Profile) -> Result<()> {
    eprint!("Password for {}@{}: ", profile.username, profile.url);
    io::stderr().flush()?;

    let mut password = String::new();
    io::stdin().lock().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(AppError::other("No password given"));
    }

    secrets::store_password(&profile.name, password)?;
    println!("Password stored for profile '{}'", profile.name);
    Ok(())
}

fn forget_password(profile: &Profile) -> Result<()> {
    secrets::delete_password(&profile.name)?;
    println!("Password removed for profile '{}'", profile.name);
    Ok(())
}

fn to_pretty(value: &impl serde::Serialize) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::other(e.to_string()))
}
