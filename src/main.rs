use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use sshelf::{
    exit_codes, init_logging, parse_timeout, App, Cli, Error, Launcher, RegistryStore, Settings,
    TerminalUi,
};

fn main() {
    let cli = Cli::parse();

    if cli.set_timeout {
        std::process::exit(set_timeout());
    }

    if let Err(err) = run(cli) {
        tracing::error!(error = %format!("{err:#}"), "fatal");
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<Error>()
            .map_or(exit_codes::GENERAL_ERROR, Error::exit_code);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::resolve(cli.timeout, cli.history)?;
    std::fs::create_dir_all(&settings.config_dir).with_context(|| {
        format!(
            "cannot create configuration directory {}",
            settings.config_dir.display()
        )
    })?;

    if let Err(err) = init_logging(&settings.log_path()) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let store = RegistryStore::open(settings.registry_path())?;
    tracing::info!(
        registry = %store.path().display(),
        timeout_secs = settings.timeout_secs,
        "session started"
    );

    let launcher = Launcher::new(settings.ssh_program.clone());
    let mut app = App::new(store, TerminalUi::new()?, launcher, settings);
    let result = app.run();

    // drop is needed to cleanup the terminal before any error is printed
    drop(app);

    Result::Ok(result?)
}

fn set_timeout() -> i32 {
    print!("New connect timeout in seconds: ");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if let Err(err) = io::stdin().lock().read_line(&mut answer) {
        eprintln!("Error: {err}");
        return exit_codes::GENERAL_ERROR;
    }

    match parse_timeout(&answer) {
        Ok(secs) => {
            println!("Connect timeout set to {secs} seconds for this session");
            0
        }
        Err(reason) => {
            eprintln!("Error: {reason}");
            exit_codes::GENERAL_ERROR
        }
    }
}
