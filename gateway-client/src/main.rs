use gateway_client::{
    client::Client, config::Config, invocation::Invocation, Argument, Transaction,
};

use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;
    let args = Command::new("gateway-client")
        .about("Submit or evaluate chaincode transactions.")
        .version("0.1.0")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .action(clap::ArgAction::Set)
                .help(
                    "set config file, defaults to `client_config.yaml' \
                     in the same directory as gateway-client binary",
                ),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("submit")
                .about("Endorse, order and wait for the commit of a transaction")
                .arg(invocation_arg()),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Query peers without ordering")
                .arg(invocation_arg()),
        )
        .get_matches();
    let config = if let Some(path) = args.get_one::<String>("config") {
        Config::from_path(path)?
    } else {
        Config::new()?
    };
    let client = Client::new(config)?;

    match args.subcommand() {
        Some(("submit", sub_args)) => {
            let (mut transaction, arguments) = prepare(&client, sub_args)?;
            info!("submitting {}", transaction.transaction_id());
            match transaction.submit(arguments).await? {
                Some(payload) => println!("{}", String::from_utf8_lossy(&payload)),
                None => println!("(no value)"),
            }
        }
        Some(("evaluate", sub_args)) => {
            let (mut transaction, arguments) = prepare(&client, sub_args)?;
            let payload = transaction.evaluate(arguments).await?;
            println!("{}", String::from_utf8_lossy(&payload));
        }
        Some((other, _)) => return Err(anyhow!("unknown command {}", other)),
        None => return Err(anyhow!("no command given")),
    }
    Ok(())
}

fn invocation_arg() -> Arg {
    Arg::new("invocation")
        .required(true)
        .action(clap::ArgAction::Set)
        .help("YAML file with chaincode, function, args and transient data")
}

fn prepare(client: &Client, args: &ArgMatches) -> Result<(Transaction, Vec<Argument>)> {
    let path = args
        .get_one::<String>("invocation")
        .ok_or_else(|| anyhow!("missing invocation file"))?;
    let invocation = Invocation::from_path(path)?;
    let mut transaction = client
        .contract(&invocation.chaincode, invocation.namespace.as_deref())
        .create_transaction(&invocation.function);
    if let Some(transient) = invocation.transient_map() {
        transaction.set_transient(transient)?;
    }
    Ok((transaction, invocation.arguments()))
}
