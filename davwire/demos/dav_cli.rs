// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! WebDAV client validation tool.
//!
//! A standalone CLI for exercising the WebDAV method layer against real
//! servers. It drives the blocking forms of the client, so no async
//! runtime is set up here.

use std::error::Error;
use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize as _;
use davwire::{
    AuthMethod, CopyFlags, DavClient, DavConfig, DavError, Depth, LockFlags, LockScope,
    LockTimeout, MoveFlags, MultiStatus, PROPERTY, PropFindType, Property, PropertySet,
    PropertyUpdate, TypeId, registry,
};
use tracing_subscriber::EnvFilter;

/// WebDAV client validation tool.
#[derive(Parser)]
#[command(name = "dav_cli")]
#[command(about = "WebDAV client validation tool", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file; flags and environment override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// WebDAV server URL
    #[arg(long)]
    server: Option<String>,
    /// Username for basic auth
    #[arg(long)]
    username: Option<String>,
    /// Password for basic auth
    #[arg(long)]
    password: Option<String>,
    /// Bearer token for OAuth
    #[arg(long)]
    token: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DepthArg {
    #[value(name = "0")]
    Zero,
    #[value(name = "1")]
    One,
    #[value(name = "infinity")]
    Infinity,
}

impl From<DepthArg> for Depth {
    fn from(depth: DepthArg) -> Self {
        match depth {
            DepthArg::Zero => Self::Zero,
            DepthArg::One => Self::One,
            DepthArg::Infinity => Self::Infinity,
        }
    }
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Show methods and compliance classes
    Options {
        /// Resource href
        #[arg(default_value = "")]
        href: String,
    },
    /// Read properties
    Propfind {
        /// Resource href
        #[arg(default_value = "")]
        href: String,
        /// Property element names (e.g. displayname, getetag); all when omitted
        #[arg(long = "prop")]
        props: Vec<String>,
        /// List property names instead of values
        #[arg(long, conflicts_with = "props")]
        names: bool,
        /// Request depth
        #[arg(long, value_enum, default_value = "0")]
        depth: DepthArg,
    },
    /// Set or remove a text property
    Proppatch {
        /// Resource href
        href: String,
        /// Property element name
        prop: String,
        /// New value; removes the property when omitted
        value: Option<String>,
    },
    /// Create a collection
    Mkcol {
        /// Collection href
        href: String,
    },
    /// Delete a resource
    Delete {
        /// Resource href
        href: String,
    },
    /// Copy a resource
    Copy {
        /// Source href
        href: String,
        /// Destination href
        destination: String,
        /// Fail if the destination exists
        #[arg(long)]
        no_overwrite: bool,
    },
    /// Move a resource
    Move {
        /// Source href
        href: String,
        /// Destination href
        destination: String,
        /// Fail if the destination exists
        #[arg(long)]
        no_overwrite: bool,
    },
    /// Lock a resource
    Lock {
        /// Resource href
        href: String,
        /// Take a shared instead of an exclusive lock
        #[arg(long)]
        shared: bool,
        /// Lock owner
        #[arg(long)]
        owner: Option<String>,
        /// Timeout in seconds; negative means infinite
        #[arg(long, default_value = "600", allow_hyphen_values = true)]
        timeout: i64,
    },
    /// Release a lock
    Unlock {
        /// Resource href
        href: String,
        /// Lock token
        token: String,
    },
}

impl Cli {
    fn build_config(&self) -> Result<DavConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => DavConfig::default(),
        };

        if let Some(server) = self
            .server
            .clone()
            .or_else(|| std::env::var("DAVWIRE_SERVER").ok())
        {
            config.base_url = server;
        }
        if config.base_url.is_empty() {
            return Err(
                "DAVWIRE_SERVER must be provided via --server, --config or DAVWIRE_SERVER env var"
                    .into(),
            );
        }

        let username = self
            .username
            .clone()
            .or_else(|| std::env::var("DAVWIRE_USERNAME").ok());
        let password = self
            .password
            .clone()
            .or_else(|| std::env::var("DAVWIRE_PASSWORD").ok());
        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("DAVWIRE_TOKEN").ok());

        if let Some(token) = token {
            config.auth = AuthMethod::Bearer { token };
        } else if let (Some(username), Some(password)) = (username, password) {
            config.auth = AuthMethod::Basic { username, password };
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }

        Ok(config)
    }
}

/// Finds a registered property type by its element name.
fn property_type(name: &str) -> Result<TypeId, String> {
    registry()
        .subtypes(TypeId::of(&PROPERTY))
        .into_iter()
        .find(|ty| !ty.is_abstract() && ty.element_name() == Some(name))
        .ok_or_else(|| format!("Unknown property: {name}"))
}

fn describe(property: &Property) -> String {
    if !property.is_set() {
        return "-".dimmed().to_string();
    }
    property
        .write_data()
        .unwrap_or_else(|| format!("{:?}", property.value()))
}

fn print_multi_status(ms: &MultiStatus) {
    for response in ms.responses() {
        for href in response.hrefs() {
            println!("{}", href.as_str().bold());
        }
        if response.status().code != 0 {
            println!("  {}", response.status());
        }
        for propstat in response.propstats() {
            let status = propstat.status().to_string();
            let status = if propstat.status().is_success() {
                status.green()
            } else {
                status.yellow()
            };
            println!("  {status}");
            let Some(prop) = propstat.prop() else {
                continue;
            };
            for property in prop.list_all() {
                let ty = property.property_type();
                println!(
                    "    {:<36} {}",
                    ty.element_name().unwrap_or(ty.name()),
                    describe(&property)
                );
            }
        }
        if let Some(description) = response.description() {
            println!("  {}", description.italic());
        }
    }
}

fn cmd_options(client: &DavClient, href: &str) -> Result<(), DavError> {
    let caps = client.options_blocking(href, None)?;
    println!("Allow: {:?}", caps.allow);
    println!("DAV:   {:?}", caps.compliance);
    Ok(())
}

fn cmd_propfind(
    client: &DavClient,
    href: &str,
    props: &[String],
    names: bool,
    depth: Depth,
) -> Result<(), Box<dyn Error>> {
    let (kind, prop) = if names {
        (PropFindType::PropName, None)
    } else if props.is_empty() {
        (PropFindType::AllProp, None)
    } else {
        let types = props
            .iter()
            .map(|name| property_type(name))
            .collect::<Result<Vec<_>, _>>()?;
        (PropFindType::Prop, Some(PropertySet::from_types(types)?))
    };

    let ms = client.propfind_blocking(href, kind, prop.as_ref(), depth, None)?;
    print_multi_status(&ms);
    Ok(())
}

fn cmd_proppatch(
    client: &DavClient,
    href: &str,
    prop: &str,
    value: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let ty = property_type(prop)?;
    let mut update = PropertyUpdate::new();
    match value {
        Some(value) => update.set(Property::from_data(ty, value)?),
        None => update.remove(ty)?,
    }

    let ms = client.proppatch_blocking(href, &update, None)?;
    print_multi_status(&ms);
    if ms.has_errors() {
        return Err("Some properties were not updated".into());
    }
    Ok(())
}

fn cmd_lock(
    client: &DavClient,
    href: &str,
    shared: bool,
    owner: Option<&str>,
    timeout: i64,
) -> Result<(), DavError> {
    let scope = if shared {
        LockScope::Shared
    } else {
        LockScope::Exclusive
    };
    let flags = LockFlags {
        owner_is_uri: owner.is_some_and(|o| o.contains(':')),
        ..Default::default()
    };
    let result = client.lock_blocking(
        href,
        scope,
        flags,
        owner,
        LockTimeout::from_seconds(timeout),
        None,
    )?;

    println!("{}", "✓ Resource locked".green());
    if let Some(token) = &result.lock_token {
        println!("Lock-Token: {token}");
    }
    for lock in &result.active_locks {
        println!(
            "  {:?} {:?} depth={} timeout={}",
            lock.scope,
            lock.lock_type,
            lock.depth,
            lock.timeout.map_or_else(|| "-".to_string(), |t| t.to_string())
        );
    }
    Ok(())
}

/// Format error for user-friendly display.
fn format_error(err: &(dyn Error + 'static)) -> String {
    let prefix = "Error:".red().bold();
    match err.downcast_ref::<DavError>() {
        Some(DavError::Status { status: 401 | 403, .. }) => {
            format!("{prefix} Authentication failed")
        }
        Some(DavError::Status { status: 404, .. }) => format!("{prefix} Resource not found"),
        Some(DavError::Status { status: 423, .. }) => format!("{prefix} Resource is locked"),
        Some(DavError::PartialFailure(ms)) => {
            print_multi_status(ms);
            format!("{prefix} {err}")
        }
        Some(DavError::Transport(_)) => format!(
            "{prefix} Network error - check server URL and connection: {err}"
        ),
        _ => format!("{prefix} {err}"),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.build_config()?;
    let client = DavClient::new(config)?;

    match cli.command {
        Commands::Options { href } => cmd_options(&client, &href)?,
        Commands::Propfind {
            href,
            props,
            names,
            depth,
        } => cmd_propfind(&client, &href, &props, names, depth.into())?,
        Commands::Proppatch { href, prop, value } => {
            cmd_proppatch(&client, &href, &prop, value.as_deref())?;
        }
        Commands::Mkcol { href } => {
            client.mkcol_blocking(&href, None)?;
            println!("{}", "✓ Collection created".green());
        }
        Commands::Delete { href } => {
            client.delete_blocking(&href, None)?;
            println!("{}", "✓ Resource deleted".green());
        }
        Commands::Copy {
            href,
            destination,
            no_overwrite,
        } => {
            let flags = CopyFlags {
                no_overwrite,
                ..Default::default()
            };
            client.copy_blocking(&href, &destination, flags, None)?;
            println!("{}", "✓ Resource copied".green());
        }
        Commands::Move {
            href,
            destination,
            no_overwrite,
        } => {
            client.move_blocking(&href, &destination, MoveFlags { no_overwrite }, None)?;
            println!("{}", "✓ Resource moved".green());
        }
        Commands::Lock {
            href,
            shared,
            owner,
            timeout,
        } => cmd_lock(&client, &href, shared, owner.as_deref(), timeout)?,
        Commands::Unlock { href, token } => {
            client.unlock_blocking(&href, &token, None)?;
            println!("{}", "✓ Lock released".green());
        }
    }
    Ok(())
}

fn main() {
    // Priority: .env.local (highest) -> .env -> existing environment variables (lowest)
    dotenvy::dotenv().ok();
    dotenvy::from_filename(".env.local").ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        std::io::stdout().flush().ok();
        eprintln!("{}", format_error(e.as_ref()));
        std::process::exit(1);
    }
}
