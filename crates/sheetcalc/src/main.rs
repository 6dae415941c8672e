//! SheetCalc-rs — character-sheet derived-attribute calculator.

use anyhow::Result;
use sheetcalc_core::CalcError;
use sheetcalc_lib::{app, config, errors};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    // Parse CLI args and run
    let config = config::AppConfig::parse();
    if let Err(error) = app::run(&config) {
        if let Some(calc_error) = error.downcast_ref::<CalcError>() {
            eprintln!("Error: {calc_error}");
            std::process::exit(errors::handle_error(calc_error));
        }
        return Err(error);
    }
    Ok(())
}
