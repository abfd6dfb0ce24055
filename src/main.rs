use aepcli::cli::commands::api::execute_api_command;
use aepcli::cli::commands::config::run_core_command;
use aepcli::cli::errors::print_error_with_json;
use aepcli::cli::tracing_init::init_tracing;
use aepcli::cli::{install_crypto_provider, Cli};
use aepcli::config::manager::ConfigManager;
use aepcli::constants;
use aepcli::error::Error;
use aepcli::fs::OsFileSystem;
use clap::Parser;

#[tokio::main]
async fn main() {
    install_crypto_provider();
    let cli = Cli::parse();
    init_tracing(cli.log_level);
    let json_errors = cli.json_errors;

    let manager = match cli.config.clone() {
        Some(file) => ConfigManager::with_config_file(OsFileSystem, file),
        None => match ConfigManager::new() {
            Ok(manager) => manager,
            Err(e) => {
                print_error_with_json(&e, json_errors);
                std::process::exit(constants::EXIT_ERROR);
            }
        },
    };

    let code = match run(&cli, &manager).await {
        Ok(code) => code,
        Err(e) => {
            print_error_with_json(&e, json_errors);
            constants::EXIT_ERROR
        }
    };
    std::process::exit(code);
}

async fn run(cli: &Cli, manager: &ConfigManager<OsFileSystem>) -> Result<i32, Error> {
    if cli.target == constants::CORE_COMMAND {
        print_output(&run_core_command(&cli.args, manager).await?);
        return Ok(constants::EXIT_OK);
    }

    let result = execute_api_command(cli, manager).await?;
    print_output(&result.output);
    if result.is_http_error() {
        Ok(constants::EXIT_HTTP_ERROR_RESPONSE)
    } else {
        Ok(constants::EXIT_OK)
    }
}

fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}
