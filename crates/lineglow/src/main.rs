#[cfg(not(target_arch = "wasm32"))]
mod cli;
#[cfg(not(target_arch = "wasm32"))]
mod paths;
#[cfg(not(target_arch = "wasm32"))]
mod run;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use cli::{Command, ConfigAction};
    use paths::AppPaths;

    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Config(config_cmd)) => {
            let paths = AppPaths::discover()?;
            match config_cmd.action {
                ConfigAction::Show => run::show_config(cli.run.config.as_deref(), &paths),
                ConfigAction::Where => {
                    run::describe_paths(&paths);
                    Ok(())
                }
            }
        }
        None => run::run(cli.run),
    }
}

// The browser build starts from the library's wasm entry point.
#[cfg(target_arch = "wasm32")]
fn main() {}
