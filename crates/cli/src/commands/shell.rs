//! Interactive register session.
//!
//! Reads one command per line from stdin. The store stays silent when a
//! request hits a stock ceiling; the shell is what tells the operator.

#![allow(clippy::print_stdout)]

use std::io::Write as _;
use std::str::FromStr;

use stockcart_core::CurrencyCode;
use stockcart_shop::{CheckoutOutcome, ShopService, ShopStore};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::warn;

use crate::render;

const HELP: &str = "\
Commands:
  list            show products and available stock
  cart            show cart lines and total
  add CODE        add one unit of CODE
  inc CODE        increase CODE's line by one
  dec CODE        decrease CODE's line by one (removes it at zero)
  rm CODE         remove CODE's line
  clear           empty the cart (asks for confirmation)
  total           show the cart total
  checkout        submit the cart
  refresh         reload products from the shop
  help            show this help
  quit            leave the shell
";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Cart,
    Add(String),
    Increment(String),
    Decrement(String),
    Remove(String),
    Clear,
    Total,
    Checkout,
    Refresh,
    Help,
    Quit,
}

/// Errors parsing a shell line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellParseError {
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),
    #[error("'{0}' needs a product code")]
    MissingCode(String),
}

impl FromStr for ShellCommand {
    type Err = ShellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().unwrap_or_default().to_lowercase();
        let code = words.next().map(str::to_string);

        let with_code = |make: fn(String) -> Self| {
            code.clone()
                .map(make)
                .ok_or_else(|| ShellParseError::MissingCode(verb.clone()))
        };

        match verb.as_str() {
            "list" | "ls" => Ok(Self::List),
            "cart" => Ok(Self::Cart),
            "add" => with_code(Self::Add),
            "inc" | "+" => with_code(Self::Increment),
            "dec" | "-" => with_code(Self::Decrement),
            "rm" | "remove" => with_code(Self::Remove),
            "clear" => Ok(Self::Clear),
            "total" => Ok(Self::Total),
            "checkout" => Ok(Self::Checkout),
            "refresh" => Ok(Self::Refresh),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(ShellParseError::Unknown(verb.clone())),
        }
    }
}

/// Whether a confirmation answer means yes.
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// Run the shell on stdin until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn run<S: ShopService>(
    store: &ShopStore<S>,
    currency: CurrencyCode,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");
    run_session(store, currency, &mut lines).await
}

async fn run_session<S: ShopService, R: AsyncRead + Unpin>(
    store: &ShopStore<S>,
    currency: CurrencyCode,
    lines: &mut Lines<BufReader<R>>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        prompt("> ");
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            ShellCommand::List => print!("{}", render::catalog_table(&store.snapshot(), currency)),
            ShellCommand::Cart => print!("{}", render::cart_table(&store.cart(), currency)),
            ShellCommand::Add(code) => {
                if store.catalog().find(&code).is_none() {
                    println!("No product {code}");
                } else if !store.add_to_cart(&code) {
                    println!("{code} is at its stock limit");
                }
            }
            ShellCommand::Increment(code) => {
                if store.quantity_in_cart(&code) == 0 {
                    println!("{code} is not in the cart");
                } else if !store.update_quantity(&code, 1) {
                    println!("Not enough stock for {code}");
                }
            }
            ShellCommand::Decrement(code) => {
                if !store.update_quantity(&code, -1) {
                    println!("Cannot decrease {code}");
                }
            }
            ShellCommand::Remove(code) => {
                if !store.remove_item(&code) {
                    println!("{code} is not in the cart");
                }
            }
            ShellCommand::Clear => {
                if store.cart().is_empty() {
                    println!("Cart is empty");
                    continue;
                }
                prompt("Clear the whole cart? [y/N] ");
                let answer = lines.next_line().await?.unwrap_or_default();
                if store.clear_cart(|| is_yes(&answer)) {
                    println!("Cart cleared");
                }
            }
            ShellCommand::Total => println!("{}", store.cart_total().display(currency)),
            ShellCommand::Checkout => match store.checkout().await {
                Ok(CheckoutOutcome::EmptyCart) => println!("Cart is empty"),
                Ok(CheckoutOutcome::Completed(receipt)) => {
                    println!("Sale completed: {}", receipt.total.display(currency));
                    if let Ok(Err(e)) = receipt.refresh.await {
                        warn!(error = %e, "Catalog refresh after sale failed");
                        println!("Could not reload products: {}", e.user_message());
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Checkout failed");
                    println!("Checkout failed: {}", e.user_message());
                }
            },
            ShellCommand::Refresh => {
                if let Err(e) = store.refresh_catalog().await {
                    warn!(error = %e, "Catalog refresh failed");
                    println!("Could not reload products: {}", e.user_message());
                }
            }
            ShellCommand::Help => print!("{HELP}"),
            ShellCommand::Quit => return Ok(()),
        }
    }
}
