//! Cartwheel CLI - browse the store, manage your cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (prompts for the password when --password is omitted)
//! cartwheel login -u ada
//!
//! # Browse and search the catalog
//! cartwheel products --page 2
//! cartwheel products --search mug
//! cartwheel product 7
//!
//! # Work with the cart
//! cartwheel cart add 7 --qty 2
//! cartwheel cart set 12 3
//! cartwheel cart show
//!
//! # Check out with the default address
//! cartwheel checkout
//! ```
//!
//! # Environment Variables
//!
//! See `cartwheel_storefront::config` for the full list; `CARTWHEEL_API_URL`
//! selects the storefront and `RUST_LOG` controls log verbosity.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartwheel_core::{AddressId, CartItemId, OrderId, OrderStatus, ProductId, Rating};
use cartwheel_storefront::api::{NewAddress, Registration};
use cartwheel_storefront::{ClientConfig, Dispatcher};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "cartwheel")]
#[command(author, version, about = "Cartwheel storefront client")]
struct Cli {
    /// Storefront API base URL (overrides `CARTWHEEL_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from standard input when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,
        /// Read from standard input when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out of this device
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List products
    Products {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Filter by name
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a product and its reviews
    Product { id: ProductId },
    /// Review a product
    Review {
        id: ProductId,
        /// 1 to 5 stars
        #[arg(short, long)]
        rating: Rating,
        #[arg(short, long, default_value = "")]
        comment: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Manage saved addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Place an order for the cart
    Checkout {
        /// Ship to this saved address instead of the default
        #[arg(short, long)]
        address: Option<AddressId>,
    },
    /// View orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        product: ProductId,
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set a line's quantity (0 removes it)
    Set { item: CartItemId, qty: u32 },
    /// Add one unit to a line
    Inc { item: CartItemId },
    /// Take one unit off a line
    Dec { item: CartItemId },
    /// Remove a line
    Remove { item: CartItemId },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List saved products
    List,
    /// Save or unsave a product
    Toggle { product: ProductId },
    /// Unsave a product
    Remove { product: ProductId },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add {
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        postal_code: String,
        #[arg(long)]
        country: String,
        /// Make this the default address
        #[arg(long)]
        default: bool,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List past orders
    List,
    /// Show one order
    Show { id: OrderId },
    /// Change an order's status (administrators)
    SetStatus { id: OrderId, status: OrderStatus },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn load_config(api_url: Option<&str>) -> Result<ClientConfig, CliError> {
    let config = ClientConfig::from_env().map_err(cartwheel_storefront::ClientError::from)?;
    match api_url {
        Some(url) => {
            let overridden = ClientConfig::new(url).map_err(cartwheel_storefront::ClientError::from)?;
            Ok(ClientConfig {
                api_url: overridden.api_url,
                ..config
            })
        }
        None => Ok(config),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.api_url.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "{e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartwheel=warn,cartwheel_storefront=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli.command, &config).await {
        if e.is_unexpected() {
            tracing::error!(error = %e, "Command failed");
        }
        let _ = writeln!(std::io::stderr(), "{e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &ClientConfig) -> Result<(), CliError> {
    let dispatcher = Dispatcher::from_config(config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Login { username, password } => {
            let password =
                commands::account::resolve_password(password, &mut std::io::stdin().lock(), &mut out)?;
            commands::account::login(&dispatcher, &username, &password, &mut out).await
        }
        Commands::Register {
            username,
            email,
            name,
            password,
        } => {
            let password =
                commands::account::resolve_password(password, &mut std::io::stdin().lock(), &mut out)?;
            let registration = Registration {
                username,
                email,
                password,
                name,
            };
            commands::account::register(&dispatcher, &registration, &mut out).await
        }
        Commands::Logout => commands::account::logout(&dispatcher, &mut out),
        Commands::Whoami => commands::account::whoami(&dispatcher, &mut out),
        Commands::Products { page, search } => {
            commands::catalog::list(&dispatcher, page, search, &mut out).await
        }
        Commands::Product { id } => commands::catalog::show(&dispatcher, id, &mut out).await,
        Commands::Review {
            id,
            rating,
            comment,
        } => commands::catalog::review(&dispatcher, id, rating, &comment, &mut out).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&dispatcher, &mut out).await,
            CartAction::Add { product, qty } => {
                commands::cart::add(&dispatcher, product, qty, &mut out).await
            }
            CartAction::Set { item, qty } => {
                commands::cart::set(&dispatcher, item, qty, &mut out).await
            }
            CartAction::Inc { item } => commands::cart::increment(&dispatcher, item, &mut out).await,
            CartAction::Dec { item } => commands::cart::decrement(&dispatcher, item, &mut out).await,
            CartAction::Remove { item } => commands::cart::remove(&dispatcher, item, &mut out).await,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::List => commands::wishlist::list(&dispatcher, &mut out),
            WishlistAction::Toggle { product } => {
                commands::wishlist::toggle(&dispatcher, product, &mut out).await
            }
            WishlistAction::Remove { product } => {
                commands::wishlist::remove(&dispatcher, product, &mut out)
            }
        },
        Commands::Addresses { action } => match action {
            AddressAction::List => commands::addresses::list(&dispatcher, &mut out).await,
            AddressAction::Add {
                street,
                city,
                postal_code,
                country,
                default,
            } => {
                let address = NewAddress {
                    street,
                    city,
                    postal_code,
                    country,
                    is_default: default,
                };
                commands::addresses::add(&dispatcher, &address, &mut out).await
            }
        },
        Commands::Checkout { address } => {
            commands::orders::checkout(&dispatcher, address, &mut out).await
        }
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list(&dispatcher, &mut out).await,
            OrderAction::Show { id } => commands::orders::show(&dispatcher, id, &mut out).await,
            OrderAction::SetStatus { id, status } => {
                commands::orders::set_status(&dispatcher, id, status, &mut out).await
            }
        },
    }
}
