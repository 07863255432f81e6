use clap::Parser;
use engine::{
    ConnectOptions, CrossShopTransaction, Engine, EngineError, FinancialSettings, Money, Network,
    Shop, ShopConnection, User,
};
use migration::{Migrator, MigratorTrait};

use cli::{
    Cli, Command, ConnectArgs, DebtCommand, NetworkCommand, ShopCommand, TxCommand, UserCommand,
};
use error::{AppError, Result};
use settings::Settings;

mod cli;
mod error;
mod settings;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let settings = match Settings::load(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command, &settings).await {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

async fn run(command: Command, settings: &Settings) -> Result<()> {
    let db = connect_db(&settings.database).await?;
    let engine = Engine::builder().database(db).build().await?;

    match command {
        Command::Shop(shop) => run_shop(&engine, shop.command).await,
        Command::User(user) => run_user(&engine, user.command).await,
        Command::Debt(debt) => run_debt(&engine, debt.command).await,
        Command::Tx(tx) => run_tx(&engine, tx.command).await,
        Command::Network(network) => run_network(&engine, network.command).await,
    }
}

async fn connect_db(database: &settings::Database) -> Result<sea_orm::DatabaseConnection> {
    let url = database.url();
    tracing::debug!("connecting to {url}");
    let db = sea_orm::Database::connect(url).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

async fn run_shop(engine: &Engine, command: ShopCommand) -> Result<()> {
    match command {
        ShopCommand::Create { name } => {
            let shop = engine.create_shop(&name).await?;
            tracing::info!("created shop {} ({})", shop.name, shop.id);
            print_shop(&shop);
        }
        ShopCommand::Show { shop } => print_shop(&find_shop(engine, &shop).await?),
        ShopCommand::List => {
            for shop in engine.shops().await? {
                print_shop(&shop);
            }
        }
        ShopCommand::Revenue { shop, amount } => {
            let shop = find_shop(engine, &shop).await?;
            print_shop(&engine.add_shop_revenue(&shop.id, amount).await?);
        }
        ShopCommand::Expense { shop, amount } => {
            let shop = find_shop(engine, &shop).await?;
            print_shop(&engine.add_shop_expense(&shop.id, amount).await?);
        }
        ShopCommand::DesignateMaster { shop } => {
            let shop = find_shop(engine, &shop).await?;
            let shop = engine.designate_master(&shop.id).await?;
            tracing::info!("{} is now a master shop", shop.name);
            print_shop(&shop);
        }
        ShopCommand::Connect(args) => connect(engine, args).await?,
        ShopCommand::Disconnect { child, master } => {
            let child = find_shop(engine, &child).await?;
            let master = find_shop(engine, &master).await?;
            let connection = engine.disconnect_shop(&child.id, &master.id).await?;
            tracing::info!("disconnected {} from {}", child.name, master.name);
            print_connection(&connection);
        }
        ShopCommand::Connections { master, all } => {
            let master = find_shop(engine, &master).await?;
            for connection in engine.list_connected_shops(&master.id, !all).await? {
                print_connection(&connection);
            }
        }
        ShopCommand::Network { shop } => {
            let shop = find_shop(engine, &shop).await?;
            for shop in engine.shop_network(&shop.id).await? {
                print_shop(&shop);
            }
        }
        ShopCommand::Transactions { shop, status } => {
            let shop = find_shop(engine, &shop).await?;
            for tx in engine
                .shop_transactions(&shop.id, status.map(Into::into))
                .await?
            {
                print_transaction(&tx);
            }
        }
    }
    Ok(())
}

async fn connect(engine: &Engine, args: ConnectArgs) -> Result<()> {
    let child = find_shop(engine, &args.child).await?;
    let master = find_shop(engine, &args.master).await?;
    let options = ConnectOptions {
        connection_type: args.connection_type.into(),
        settings: FinancialSettings {
            share_revenue: args.share_revenue,
            consolidate_reports: args.consolidate_reports,
            shared_inventory: args.shared_inventory,
        },
        on_existing: args.on_existing.into(),
    };
    let connection = engine.connect_shop(&child.id, &master.id, options).await?;
    tracing::info!("connected {} to {}", child.name, master.name);
    print_connection(&connection);
    Ok(())
}

async fn run_user(engine: &Engine, command: UserCommand) -> Result<()> {
    match command {
        UserCommand::Create { name } => {
            let user = engine.create_user(&name).await?;
            tracing::info!("created user {} ({})", user.name, user.id);
            print_user(&user);
        }
        UserCommand::Show { user } => print_user(&find_user(engine, &user).await?),
        UserCommand::Own { user, shop, master } => {
            let user = find_user(engine, &user).await?;
            let shop = find_shop(engine, &shop).await?;
            print_user(&engine.add_owned_shop(&user.id, &shop.id, master).await?);
        }
        UserCommand::SetMaster { user, shop, clear } => {
            let user = find_user(engine, &user).await?;
            let shop = match (shop, clear) {
                (_, true) => None,
                (Some(shop), false) => Some(find_shop(engine, &shop).await?),
                (None, false) => {
                    return Err(AppError::Input("a shop or --clear is required".to_string()));
                }
            };
            let user = engine
                .set_user_master_shop(&user.id, shop.as_ref().map(|shop| shop.id.as_str()))
                .await?;
            print_user(&user);
        }
        UserCommand::Network { user } => {
            let user = find_user(engine, &user).await?;
            match engine.resolve_network(&user.id).await? {
                Network::Owned(owned) => {
                    println!("no master shop, owned shops:");
                    for owned in owned {
                        let marker = if owned.is_master { " (master)" } else { "" };
                        println!("  {}{marker}", owned.shop_id);
                    }
                }
                Network::Master(shops) => {
                    for shop in shops {
                        print_shop(&shop);
                    }
                }
            }
        }
    }
    Ok(())
}

async fn run_debt(engine: &Engine, command: DebtCommand) -> Result<()> {
    match command {
        DebtCommand::Show { user, shop } => {
            let user = find_user(engine, &user).await?;
            let shop = find_shop(engine, &shop).await?;
            let amount = engine.debt(&user.id, &shop.id).await?;
            println!("{} owes {} to {}", user.name, Money::from_minor(amount), shop.name);
        }
        DebtCommand::Set { user, shop, amount } => {
            let user = find_user(engine, &user).await?;
            let shop = find_shop(engine, &shop).await?;
            let debt = engine.set_debt(&user.id, &shop.id, amount).await?;
            tracing::info!(
                "debt of {} to {} set to {}",
                user.name,
                shop.name,
                Money::from_minor(debt.amount_owed)
            );
        }
        DebtCommand::Total { user } => {
            let user = find_user(engine, &user).await?;
            let total = engine.total_debt(&user.id).await?;
            println!("{} owes {} in total", user.name, Money::from_minor(total));
        }
    }
    Ok(())
}

async fn run_tx(engine: &Engine, command: TxCommand) -> Result<()> {
    let tx = match command {
        TxCommand::Record {
            from,
            to,
            user,
            kind,
            amount,
            master,
            note,
        } => {
            let from = find_shop(engine, &from).await?;
            let to = find_shop(engine, &to).await?;
            let user = find_user(engine, &user).await?;
            let master = match master {
                Some(master) => Some(find_shop(engine, &master).await?),
                None => None,
            };
            let tx = engine
                .record_transaction(
                    &from.id,
                    &to.id,
                    &user.id,
                    kind.into(),
                    amount,
                    master.as_ref().map(|shop| shop.id.as_str()),
                    note.as_deref(),
                )
                .await?;
            tracing::info!("recorded transaction {}", tx.id);
            tx
        }
        TxCommand::Complete { id } => engine.complete_transaction(&id).await?,
        TxCommand::Cancel { id } => engine.cancel_transaction(&id).await?,
        TxCommand::Show { id } => engine.transaction(&id).await?,
    };
    print_transaction(&tx);
    Ok(())
}

async fn run_network(engine: &Engine, command: NetworkCommand) -> Result<()> {
    match command {
        NetworkCommand::Revenue { master } => {
            let master = find_shop(engine, &master).await?;
            let revenue = engine.network_revenue(&master.id).await?;
            println!("{}: {}", master.name, Money::from_minor(revenue));
        }
        NetworkCommand::Report { master } => {
            let master = find_shop(engine, &master).await?;
            let report = engine.network_report(&master.id).await?;
            println!("network of {} ({} shops)", master.name, report.shop_count);
            println!("  revenue          {}", Money::from_minor(report.total_revenue));
            println!("  expenses         {}", Money::from_minor(report.total_expenses));
            println!("  debt             {}", Money::from_minor(report.total_debt));
            println!(
                "  network revenue  {}",
                Money::from_minor(report.network_revenue)
            );
        }
    }
    Ok(())
}

async fn find_shop(engine: &Engine, key: &str) -> Result<Shop> {
    match engine.shop(key).await {
        Err(EngineError::KeyNotFound(_)) => Ok(engine.shop_by_name(key).await?),
        other => Ok(other?),
    }
}

async fn find_user(engine: &Engine, key: &str) -> Result<User> {
    match engine.user(key).await {
        Err(EngineError::KeyNotFound(_)) => Ok(engine.user_by_name(key).await?),
        other => Ok(other?),
    }
}

fn print_shop(shop: &Shop) {
    let master = shop
        .master_shop_id
        .as_deref()
        .map(|id| format!(" under {id}"))
        .unwrap_or_default();
    println!(
        "{}  {:<24} {}{master}  revenue {}  expenses {}  debt {}",
        shop.id,
        shop.name,
        shop.level.as_str(),
        Money::from_minor(shop.financials.total_revenue),
        Money::from_minor(shop.financials.total_expenses),
        Money::from_minor(shop.financials.total_debt),
    );
}

fn print_user(user: &User) {
    println!(
        "{}  {}  master {}  owes {}",
        user.id,
        user.name,
        user.master_shop_id.as_deref().unwrap_or("-"),
        Money::from_minor(user.total_owed)
    );
    for owned in &user.owned_shops {
        let marker = if owned.is_master { " (master)" } else { "" };
        println!("  owns {}{marker}", owned.shop_id);
    }
    for debt in &user.shop_debts {
        println!(
            "  owes {} to {}",
            Money::from_minor(debt.amount_owed),
            debt.shop_id
        );
    }
}

fn print_connection(connection: &ShopConnection) {
    println!(
        "{} -> {}  {}  {}  share_revenue={} consolidate_reports={} shared_inventory={}",
        connection.master_shop_id,
        connection.child_shop_id,
        connection.connection_type.as_str(),
        if connection.active { "active" } else { "inactive" },
        connection.settings.share_revenue,
        connection.settings.consolidate_reports,
        connection.settings.shared_inventory,
    );
}

fn print_transaction(tx: &CrossShopTransaction) {
    println!(
        "{}  {} -> {}  {}  {}  {}{}",
        tx.id,
        tx.from_shop_id,
        tx.to_shop_id,
        tx.kind.as_str(),
        Money::from_minor(tx.amount_minor),
        tx.status.as_str(),
        tx.note
            .as_deref()
            .map(|note| format!("  {note}"))
            .unwrap_or_default(),
    );
}
