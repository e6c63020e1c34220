//! redwire CLI
//!
//! Command-line client for driving a Redis server with redwire.

use std::time::{Duration, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use redwire::{Config, ExpirationTime, RedisClient, SetMode};
use tracing_subscriber::{fmt, EnvFilter};

/// redwire CLI
#[derive(Parser, Debug)]
#[command(name = "redwire-cli")]
#[command(about = "CLI for the redwire Redis client")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// Connect timeout in milliseconds
    #[arg(long, default_value = "2000")]
    connect_timeout_ms: u64,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Ping the server
    Ping,

    /// Switch to the logical database with the given index
    Select { index: i64 },

    /// Get a value by key
    Get { key: String },

    /// Set a key-value pair
    Set {
        key: String,
        value: String,

        /// Expire after this many seconds
        #[arg(long)]
        ex: Option<u64>,

        /// Only set if the key does not exist
        #[arg(long, conflicts_with = "xx")]
        nx: bool,

        /// Only set if the key already exists
        #[arg(long)]
        xx: bool,
    },

    /// Set a timeout on a key, in seconds
    Expire { key: String, seconds: i64 },

    /// Set an absolute expiration instant (unix seconds) on a key
    ExpireAt { key: String, unix_seconds: u64 },

    /// Remaining time to live of a key
    Ttl { key: String },

    /// Add members to a set
    Sadd {
        key: String,
        #[arg(required = true)]
        members: Vec<String>,
    },

    /// Number of members in a set
    Scard { key: String },

    /// Members of the first set not present in the others
    Sdiff {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Store the difference of sets into a destination key
    SdiffStore {
        dest: String,
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Intersection of sets
    Sinter {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Store the intersection of sets into a destination key
    SinterStore {
        dest: String,
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Test set membership
    Sismember { key: String, member: String },

    /// Get hash fields
    Hget {
        key: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Set hash fields from field/value pairs
    Hset {
        key: String,
        #[arg(required = true)]
        pairs: Vec<String>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,redwire=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    tracing::debug!("redwire v{}", redwire::VERSION);

    let config = Config::builder()
        .connect_timeout(Duration::from_millis(args.connect_timeout_ms))
        .build();

    let mut client = match RedisClient::with_config(&args.server, config) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(&mut client, args.command) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(client: &mut RedisClient, command: Cmd) -> redwire::Result<()> {
    match command {
        Cmd::Ping => {
            client.ping()?;
            println!("PONG");
        }
        Cmd::Select { index } => {
            client.select(index)?;
            println!("OK");
        }
        Cmd::Get { key } => match client.get(&key)? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(nil)"),
        },
        Cmd::Set {
            key,
            value,
            ex,
            nx,
            xx,
        } => {
            let mode = if nx {
                SetMode::IfNotExist
            } else if xx {
                SetMode::IfExist
            } else {
                SetMode::Anyhow
            };
            let expiration = ex.map(|secs| ExpirationTime::after(Duration::from_secs(secs)));
            client.set(&key, &value, expiration, mode)?;
            println!("OK");
        }
        Cmd::Expire { key, seconds } => {
            client.expire(&key, seconds)?;
            println!("OK");
        }
        Cmd::ExpireAt { key, unix_seconds } => {
            client.expire_at(&key, UNIX_EPOCH + Duration::from_secs(unix_seconds))?;
            println!("OK");
        }
        Cmd::Ttl { key } => println!("{}", client.ttl(&key)?),
        Cmd::Sadd { key, members } => println!("{}", client.sadd(&key, &members)?),
        Cmd::Scard { key } => println!("{}", client.scard(&key)?),
        Cmd::Sdiff { keys } => print_members(client.sdiff(&keys)?),
        Cmd::SdiffStore { dest, keys } => println!("{}", client.sdiff_store(&dest, &keys)?),
        Cmd::Sinter { keys } => print_members(client.sinter(&keys)?),
        Cmd::SinterStore { dest, keys } => println!("{}", client.sinter_store(&dest, &keys)?),
        Cmd::Sismember { key, member } => println!("{}", client.sismember(&key, &member)?),
        Cmd::Hget { key, fields } => {
            for (field, value) in client.hget(&key, &fields)? {
                println!(
                    "{}: {}",
                    String::from_utf8_lossy(&field),
                    String::from_utf8_lossy(&value)
                );
            }
        }
        Cmd::Hset { key, pairs } => {
            if pairs.len() % 2 != 0 {
                return Err(redwire::RedisError::Validation(
                    "HSET requires field/value pairs".to_string(),
                ));
            }
            let pairs: Vec<(String, String)> = pairs
                .chunks_exact(2)
                .map(|pair| (pair[0].clone(), pair[1].clone()))
                .collect();
            client.hset(&key, &pairs)?;
            println!("OK");
        }
    }

    Ok(())
}

fn print_members(members: Vec<Vec<u8>>) {
    for member in members {
        println!("{}", String::from_utf8_lossy(&member));
    }
}
