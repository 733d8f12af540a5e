use crate::network::{Network, SelectionPolicy};
use crate::wallet::KeyType;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "metahash", about = "MetaHash wallet and node client")]
pub struct Opt {
    #[arg(
        long,
        global = true,
        help = "Network to talk to (main, test, dev); overrides METAHASH_NETWORK"
    )]
    pub network: Option<Network>,
    #[arg(
        long = "key-type",
        global = true,
        help = "Curve for new keys (secp256r1, secp256k1)"
    )]
    pub key_type: Option<KeyType>,
    #[arg(
        long,
        global = true,
        help = "Torrent node selection (first, highest)"
    )]
    pub selection: Option<SelectionPolicy>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "generate", about = "Generate a new key pair and address")]
    Generate,
    #[command(name = "public-key", about = "Derive the public key of a private key")]
    PublicKey {
        #[arg(help = "Private key, DER hex")]
        private_key: String,
    },
    #[command(name = "address", about = "Derive the address of a public key")]
    Address {
        #[arg(help = "Public key, DER hex")]
        public_key: String,
    },
    #[command(name = "check-address", about = "Validate an address checksum")]
    CheckAddress {
        #[arg(help = "Address to check")]
        address: String,
    },
    #[command(name = "sign", about = "Sign a UTF-8 message")]
    Sign {
        #[arg(help = "Private key, DER hex")]
        private_key: String,
        #[arg(help = "Message to sign")]
        message: String,
        #[arg(long, help = "Use a random nonce instead of RFC 6979")]
        randomized: bool,
    },
    #[command(name = "verify", about = "Verify a signature over a UTF-8 message")]
    Verify {
        #[arg(help = "Signature, DER hex")]
        signature: String,
        #[arg(help = "Signed message")]
        message: String,
        #[arg(help = "Public key, DER hex")]
        public_key: String,
    },
    #[command(name = "balance", about = "Fetch the balance of an address")]
    Balance {
        #[arg(help = "The wallet address")]
        address: String,
    },
    #[command(name = "history", about = "Fetch the transaction history of an address")]
    History {
        #[arg(help = "The wallet address")]
        address: String,
        #[arg(long, default_value_t = 0, help = "Index of the first transaction")]
        begin: u64,
        #[arg(long, default_value_t = 10, help = "Number of transactions")]
        count: u64,
    },
    #[command(name = "tx", about = "Look up a transaction by hash")]
    Tx {
        #[arg(help = "Transaction hash")]
        hash: String,
    },
    #[command(name = "nonce", about = "Nonce for the next transaction from an address")]
    Nonce {
        #[arg(help = "The wallet address")]
        address: String,
    },
    #[command(name = "send", about = "Sign and submit a transfer")]
    Send {
        #[arg(help = "Sender private key, DER hex")]
        private_key: String,
        #[arg(help = "Destination address")]
        to: String,
        #[arg(help = "Amount to send")]
        value: u64,
        #[arg(long, default_value_t = 0, help = "Fee")]
        fee: u64,
        #[arg(long, default_value = "", help = "UTF-8 data attached to the transfer")]
        data: String,
        #[arg(long, help = "Explicit nonce; fetched from the network when omitted")]
        nonce: Option<u64>,
    },
    #[command(name = "count-blocks", about = "Current chain height")]
    CountBlocks,
}
