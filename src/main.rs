// This is my entry point for the metahash command-line client
// I pull in the wallet helpers for offline commands and the client for node calls
use clap::Parser;
use log::{debug, LevelFilter};
use metahash_client::wallet::{
    derive_address, derive_public_key, sign, validate_address, verify, KeyPair,
    DEFAULT_NETWORK_PREFIX,
};
use metahash_client::{ClientConfig, Command, MetaHashClient, Opt, Result};
use serde_json::{json, Value};
use std::process;

fn main() {
    // I initialize logging at Info level so I can follow resolution and submission
    // Logs go to stderr; stdout carries only the JSON answer
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    // I parse the command line arguments using clap
    let opt = Opt::parse();

    // I run the command and print its JSON answer
    // If something goes wrong, I print the error as JSON and exit with code 1
    match run(opt) {
        Ok(output) => print_json(&output),
        Err(e) => {
            print_json(&json!({ "error": true, "message": e.to_string() }));
            process::exit(1);
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

// I build the client settings from the environment, then let the flags override them
fn run(opt: Opt) -> Result<Value> {
    let mut config = ClientConfig::from_env()?;
    if let Some(network) = opt.network {
        config.network = network;
    }
    if let Some(key_type) = opt.key_type {
        config.key_type = key_type;
    }
    if let Some(selection) = opt.selection {
        config.selection = selection;
    }
    debug!("Using {config:?}");

    run_command(opt.command, config)
}

// This is where I handle each CLI command
// Key and address commands work offline; the rest resolve a node first
fn run_command(command: Command, config: ClientConfig) -> Result<Value> {
    let output = match command {
        // When I want a fresh key pair on the configured curve
        Command::Generate => serde_json::to_value(KeyPair::generate(config.key_type)?)?,
        // When I need the public key that belongs to a private key
        Command::PublicKey { private_key } => {
            json!({ "public": derive_public_key(&private_key)? })
        }
        // When I want the address a public key maps to
        Command::Address { public_key } => {
            json!({ "address": derive_address(&public_key, DEFAULT_NETWORK_PREFIX)? })
        }
        // I only check the checksum here, nothing goes to the network
        Command::CheckAddress { address } => {
            json!({ "address": address, "valid": validate_address(&address) })
        }
        // Signing is deterministic unless I ask for a random nonce
        Command::Sign {
            private_key,
            message,
            randomized,
        } => json!({ "sign": sign(message.as_bytes(), &private_key, !randomized)? }),
        Command::Verify {
            signature,
            message,
            public_key,
        } => json!({ "valid": verify(&signature, message.as_bytes(), &public_key)? }),

        // When I want to see what an address holds, I ask a torrent node
        Command::Balance { address } => {
            let mut client = MetaHashClient::new(config)?;
            serde_json::to_value(client.fetch_balance(&address)?)?
        }
        // The node refuses more than 9999 transactions per request
        Command::History {
            address,
            begin,
            count,
        } => {
            let mut client = MetaHashClient::new(config)?;
            client.fetch_history(&address, begin, count)?
        }
        Command::Tx { hash } => {
            let mut client = MetaHashClient::new(config)?;
            client.get_tx(&hash)?
        }
        // The next nonce is one more than the number of spends so far
        Command::Nonce { address } => {
            let mut client = MetaHashClient::new(config)?;
            json!({ "address": address, "nonce": client.get_nonce(&address)? })
        }
        // When I send a transfer, I sign it locally and hand it to a proxy node
        // Without --nonce the client fetches it from a torrent node first
        Command::Send {
            private_key,
            to,
            value,
            fee,
            data,
            nonce,
        } => {
            let mut client = MetaHashClient::new(config)?;
            serde_json::to_value(client.send_tx(&private_key, &to, value, fee, &data, nonce)?)?
        }
        Command::CountBlocks => {
            let mut client = MetaHashClient::new(config)?;
            json!({ "count_blocks": client.get_count_blocks()? })
        }
    };
    Ok(output)
}
