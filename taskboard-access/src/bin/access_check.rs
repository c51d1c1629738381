// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replay access decisions from JSON request files.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use taskboard_access::request::AccessCheckRequest;
use taskboard_access::{
    AccessResolver, DomainRecords, Principal, ResolverConfig, SelectorList, Snapshot, Timestamp,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

#[derive(Parser)]
struct Args {
    /// Resolver configuration (JSON). Defaults apply when omitted.
    #[arg(short = 'c', long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the view and manage decision for an access-check request.
    Check {
        /// Request document (JSON).
        #[arg(value_name = "REQUEST")]
        request: PathBuf,
    },

    /// Print the email recipients matched by a list of selectors.
    Recipients {
        /// Selectors, e.g. "all", "role-admin", "Design-lead".
        #[arg(short = 't', long = "target", value_name = "SELECTOR", required = true)]
        targets: Vec<String>,

        /// List of user documents (JSON).
        #[arg(short = 'u', long, value_name = "USERS")]
        users: PathBuf,

        /// List of domain records (JSON).
        #[arg(short = 'd', long, value_name = "DOMAINS")]
        domains: Option<PathBuf>,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    setup_logging();

    let args = Args::parse();

    let config: ResolverConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => ResolverConfig::default(),
    };
    info!(?config, "loaded resolver configuration");
    let resolver = AccessResolver::new(config);

    match args.command {
        Command::Check { request } => {
            let request: AccessCheckRequest = read_json(&request)?;
            let report = request.evaluate(&resolver);
            let target = request.target.as_target();

            println!("target: {} {}", target.kind(), target.id());
            match &request.principal {
                Some(principal) => println!("principal: {}", principal.id),
                None => println!("principal: none"),
            }
            println!("view: {}", report.view);
            println!("manage: {}", report.manage);
        }
        Command::Recipients {
            targets,
            users,
            domains,
        } => {
            let users: Vec<Principal> = read_json(&users)?;
            let domains: DomainRecords = match &domains {
                Some(path) => read_json(path)?,
                None => DomainRecords::default(),
            };

            let selectors = SelectorList::parse(&targets);
            for rejected in selectors.rejected() {
                eprintln!("ignoring malformed selector '{rejected}'");
            }

            let snapshot = Snapshot::new(&domains, Timestamp::now());
            for email in resolver.resolve_recipients(&selectors, &users, &snapshot) {
                println!("{email}");
            }
        }
    }

    Ok(())
}
