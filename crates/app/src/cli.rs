use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{ConnectionType, CrossShopKind, Money, OnExisting, TransactionStatus};

#[derive(Parser, Debug)]
#[command(name = "shopnet")]
#[command(about = "Shop hierarchy and cross-shop ledger of a multi-tenant POS")]
pub struct Cli {
    /// Optional settings file (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Database connection string, overrides the settings file.
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    /// Log level (`error`, `warn`, `info`, `debug`, `trace`).
    #[arg(long, global = true)]
    pub level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Shops and their hierarchy.
    Shop(Shop),
    /// Users, ownership and master shop.
    User(User),
    /// What users owe to shops.
    Debt(Debt),
    /// Cross-shop transactions.
    Tx(Tx),
    /// Network-wide figures of a master shop.
    Network(Network),
}

// Shops and identifiers are looked up by id first, then by name.

#[derive(Args, Debug)]
pub struct Shop {
    #[command(subcommand)]
    pub command: ShopCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShopCommand {
    Create {
        name: String,
    },
    Show {
        shop: String,
    },
    List,
    /// Adds to the shop's revenue.
    Revenue {
        shop: String,
        #[arg(value_parser = parse_amount)]
        amount: i64,
    },
    /// Adds to the shop's expenses.
    Expense {
        shop: String,
        #[arg(value_parser = parse_amount)]
        amount: i64,
    },
    DesignateMaster {
        shop: String,
    },
    Connect(ConnectArgs),
    Disconnect {
        child: String,
        master: String,
    },
    /// Connection entries of a master shop.
    Connections {
        master: String,
        /// Include deactivated entries.
        #[arg(long)]
        all: bool,
    },
    /// The network the shop belongs to.
    Network {
        shop: String,
    },
    /// Cross-shop transactions sent or received by the shop.
    Transactions {
        shop: String,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    pub child: String,
    pub master: String,
    #[arg(long = "type", value_enum, default_value_t = ConnectionTypeArg::Branch)]
    pub connection_type: ConnectionTypeArg,
    #[arg(long)]
    pub share_revenue: bool,
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub consolidate_reports: bool,
    #[arg(long)]
    pub shared_inventory: bool,
    /// What to do when the shops are already connected.
    #[arg(long, value_enum, default_value_t = OnExistingArg::Keep)]
    pub on_existing: OnExistingArg,
}

#[derive(Args, Debug)]
pub struct User {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Create {
        name: String,
    },
    Show {
        user: String,
    },
    /// Records that the user owns a shop.
    Own {
        user: String,
        shop: String,
        /// Make it the user's master shop.
        #[arg(long)]
        master: bool,
    },
    /// Sets the master shop of the user, `--clear` removes it.
    SetMaster {
        user: String,
        #[arg(required_unless_present = "clear")]
        shop: Option<String>,
        #[arg(long, conflicts_with = "shop")]
        clear: bool,
    },
    /// The shops the user works with.
    Network {
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct Debt {
    #[command(subcommand)]
    pub command: DebtCommand,
}

#[derive(Subcommand, Debug)]
pub enum DebtCommand {
    Show {
        user: String,
        shop: String,
    },
    /// Overwrites the amount the user owes to the shop.
    Set {
        user: String,
        shop: String,
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        amount: i64,
    },
    Total {
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct Tx {
    #[command(subcommand)]
    pub command: TxCommand,
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    /// Records a pending transaction.
    Record {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        user: String,
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
        amount: i64,
        #[arg(long)]
        master: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    Complete {
        id: String,
    },
    Cancel {
        id: String,
    },
    Show {
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct Network {
    #[command(subcommand)]
    pub command: NetworkCommand,
}

#[derive(Subcommand, Debug)]
pub enum NetworkCommand {
    Revenue { master: String },
    Report { master: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConnectionTypeArg {
    Branch,
    Subsidiary,
    Partner,
}

impl From<ConnectionTypeArg> for ConnectionType {
    fn from(value: ConnectionTypeArg) -> Self {
        match value {
            ConnectionTypeArg::Branch => ConnectionType::Branch,
            ConnectionTypeArg::Subsidiary => ConnectionType::Subsidiary,
            ConnectionTypeArg::Partner => ConnectionType::Partner,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnExistingArg {
    Keep,
    Update,
    Reject,
}

impl From<OnExistingArg> for OnExisting {
    fn from(value: OnExistingArg) -> Self {
        match value {
            OnExistingArg::Keep => OnExisting::Keep,
            OnExistingArg::Update => OnExisting::Update,
            OnExistingArg::Reject => OnExisting::Reject,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Debt,
    Payment,
    Transfer,
    Loan,
    RevenueShare,
}

impl From<KindArg> for CrossShopKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Debt => CrossShopKind::Debt,
            KindArg::Payment => CrossShopKind::Payment,
            KindArg::Transfer => CrossShopKind::Transfer,
            KindArg::Loan => CrossShopKind::Loan,
            KindArg::RevenueShare => CrossShopKind::RevenueShare,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Completed,
    Cancelled,
}

impl From<StatusArg> for TransactionStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => TransactionStatus::Pending,
            StatusArg::Completed => TransactionStatus::Completed,
            StatusArg::Cancelled => TransactionStatus::Cancelled,
        }
    }
}

/// Amounts are typed in major units (`12.50`) and kept as minor units.
/// The sign is preserved so the engine can reject negative values itself.
fn parse_amount(raw: &str) -> Result<i64, String> {
    raw.parse::<Money>()
        .map(Money::minor)
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_connect_flags() {
        let cli = Cli::parse_from([
            "shopnet",
            "shop",
            "connect",
            "Branch A",
            "Main",
            "--type",
            "partner",
            "--share-revenue",
            "--consolidate-reports",
            "false",
            "--on-existing",
            "reject",
        ]);
        let Command::Shop(Shop {
            command: ShopCommand::Connect(args),
        }) = cli.command
        else {
            panic!("expected shop connect");
        };
        assert_eq!(args.child, "Branch A");
        assert_eq!(args.master, "Main");
        assert_eq!(args.connection_type, ConnectionTypeArg::Partner);
        assert!(args.share_revenue);
        assert!(!args.consolidate_reports);
        assert!(!args.shared_inventory);
        assert_eq!(args.on_existing, OnExistingArg::Reject);
    }

    #[test]
    fn amounts_are_minor_units() {
        assert_eq!(parse_amount("12,5"), Ok(1250));
        assert_eq!(parse_amount("-3"), Ok(-300));
        assert!(parse_amount("1.234").is_err());
    }
}
