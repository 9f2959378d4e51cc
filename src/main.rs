use std::io::{BufWriter, stdout};

use clap::Parser;

use wallet_ledger::{
    app::{self, Cli},
    common::logging,
};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let stdout = stdout();
    let writer = BufWriter::new(stdout.lock());

    if let Err(error) = app::run(cli, writer) {
        eprintln!("{}", error.user_message());
        std::process::exit(1);
    }
}
