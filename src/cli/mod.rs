use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::application::{LedgerError, LedgerOperation, LedgerService, TransferResult};
use crate::config::Config;
use crate::domain::{
    Account, AccountNumber, Amount, CANONICAL_CURRENCY, NewAccount, RateTable, format_amount,
    parse_amount,
};
use crate::storage::RecordStore;

/// fxledger - account ledger with currency conversion
#[derive(Parser)]
#[command(name = "fxledger")]
#[command(about = "Deposits, withdrawals and transfers with currency conversion")]
#[command(version)]
pub struct Cli {
    /// Database file path (overrides FXLEDGER_DATABASE)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Report failures with the flattened messages of the older API
    #[arg(long, global = true)]
    pub legacy_errors: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a new account with a zero balance
    Open {
        /// Account number (must be unique)
        account_number: AccountNumber,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,
    },

    /// Deposit into an account
    Deposit {
        account_number: AccountNumber,

        /// Amount in the given currency (e.g., "20" or "4115.70")
        #[arg(value_parser = parse_amount)]
        amount: Amount,

        /// Currency of the amount (defaults to USD)
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// Withdraw from an account
    Withdraw {
        account_number: AccountNumber,

        /// Amount in the given currency
        #[arg(value_parser = parse_amount)]
        amount: Amount,

        /// Currency of the amount (defaults to USD)
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// Transfer between two accounts
    Transfer {
        /// Amount in the given currency
        #[arg(value_parser = parse_amount)]
        amount: Amount,

        /// Source account number
        #[arg(long)]
        from: AccountNumber,

        /// Destination account number
        #[arg(long)]
        to: AccountNumber,

        /// Currency of the amount (defaults to USD)
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// Show account details
    Show { account_number: AccountNumber },

    /// Show an account balance in a currency
    Balance {
        account_number: AccountNumber,

        /// Currency to report in (defaults to USD)
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// List the configured exchange rates
    Rates,
}

impl Commands {
    fn operation(&self) -> Option<LedgerOperation> {
        match self {
            Commands::Open { .. } => Some(LedgerOperation::OpenAccount),
            Commands::Deposit { .. } => Some(LedgerOperation::Deposit),
            Commands::Withdraw { .. } => Some(LedgerOperation::Withdraw),
            Commands::Transfer { .. } => Some(LedgerOperation::Transfer),
            Commands::Show { .. } => Some(LedgerOperation::GetAccount),
            Commands::Balance { .. } => Some(LedgerOperation::GetBalanceIn),
            Commands::Rates => None,
        }
    }
}

/// What a command produced, ready for rendering.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Account(Account),
    Transfer {
        withdrawal: Account,
        deposit: Account,
    },
    Balance {
        account_number: AccountNumber,
        currency: String,
        amount: Amount,
    },
    Rates(Vec<(String, f64)>),
}

impl From<TransferResult> for Output {
    fn from(result: TransferResult) -> Self {
        Output::Transfer {
            withdrawal: result.withdrawal,
            deposit: result.deposit,
        }
    }
}

impl Cli {
    pub async fn run(self, config: Config) -> Result<()> {
        let legacy = self.legacy_errors || config.legacy_errors;

        let output = match self.command.operation() {
            None => rate_rows(&config.rates),
            Some(operation) => {
                let database = self.database.as_deref().unwrap_or(&config.database_path);
                let service = LedgerService::init(database, config.converter()).await?;
                match execute(&service, &self.command).await {
                    Ok(output) => output,
                    Err(err) if legacy => return Err(anyhow!(err.legacy_message(operation))),
                    Err(err) => return Err(err.into()),
                }
            }
        };

        render(&output, self.json)
    }
}

/// Run a ledger command against a service.
pub async fn execute<S: RecordStore>(
    service: &LedgerService<S>,
    command: &Commands,
) -> Result<Output, LedgerError> {
    let output = match command {
        Commands::Open {
            account_number,
            first_name,
            last_name,
            email,
        } => Output::Account(
            service
                .open_account(NewAccount::new(
                    *account_number,
                    first_name.as_str(),
                    last_name.as_str(),
                    email.as_str(),
                ))
                .await?,
        ),
        Commands::Deposit {
            account_number,
            amount,
            currency,
        } => Output::Account(
            service
                .deposit(*account_number, *amount, currency.as_deref())
                .await?,
        ),
        Commands::Withdraw {
            account_number,
            amount,
            currency,
        } => Output::Account(
            service
                .withdraw(*account_number, *amount, currency.as_deref())
                .await?,
        ),
        Commands::Transfer {
            amount,
            from,
            to,
            currency,
        } => service
            .transfer(*from, *to, *amount, currency.as_deref())
            .await?
            .into(),
        Commands::Show { account_number } => {
            Output::Account(service.get_account(*account_number).await?)
        }
        Commands::Balance {
            account_number,
            currency,
        } => {
            let amount = service
                .get_balance_in(*account_number, currency.as_deref())
                .await?;
            Output::Balance {
                account_number: *account_number,
                currency: currency
                    .clone()
                    .unwrap_or_else(|| CANONICAL_CURRENCY.to_string()),
                amount,
            }
        }
        Commands::Rates => rate_rows(service.converter().rates()),
    };
    Ok(output)
}

fn rate_rows(rates: &RateTable) -> Output {
    Output::Rates(
        rates
            .currencies()
            .into_iter()
            .filter_map(|name| rates.rate(name).map(|rate| (name.to_string(), rate)))
            .collect(),
    )
}

fn render(output: &Output, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    match output {
        Output::Account(account) => print_account(account),
        Output::Transfer {
            withdrawal,
            deposit,
        } => {
            println!("Transfer committed");
            print_account(withdrawal);
            print_account(deposit);
        }
        Output::Balance {
            account_number,
            currency,
            amount,
        } => {
            println!(
                "Account {}: {} {}",
                account_number,
                format_amount(*amount),
                currency.to_uppercase()
            );
        }
        Output::Rates(rates) => {
            println!("{:<10} {:>12}", "CURRENCY", "PER USD");
            println!("{}", "-".repeat(23));
            for (name, rate) in rates {
                println!("{:<10} {:>12}", name, rate);
            }
        }
    }
    Ok(())
}

fn print_account(account: &Account) {
    println!("Account {}", account.account_number);
    println!("  Holder:   {}", account.display_name());
    println!("  Email:    {}", account.email);
    println!(
        "  Balance:  {} {}",
        format_amount(account.balance),
        CANONICAL_CURRENCY
    );
    println!(
        "  Updated:  {}",
        account.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
}
