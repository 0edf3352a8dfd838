use clap::Parser;
use watchtower::cli::{
    auth, handle_completions, handle_config_init, load_config_with_overrides, services, watch,
    AppContext, Cli, Commands, ConfigCommands, ServicesCommands,
};
use watchtower::logging::init_tracing;

fn print(result: Result<String, Box<dyn std::error::Error>>) -> Result<(), Box<dyn std::error::Error>> {
    let output = result?;
    println!("{}", output);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Local commands need neither config nor server.
    match &cli.command {
        Commands::Config(ConfigCommands::Init(args)) => return print(handle_config_init(args)),
        Commands::Completions(args) => {
            handle_completions(args);
            return Ok(());
        }
        _ => {}
    }

    let config = load_config_with_overrides(&cli.global)?;
    init_tracing(&config.logging)?;
    let mut ctx = AppContext::from_config(config)?;

    match cli.command {
        Commands::Signup(args) => print(auth::handle_signup(&args, &ctx).await),
        Commands::Login(args) => print(auth::handle_login(&args, &mut ctx).await),
        Commands::Logout => print(auth::handle_logout(&mut ctx)),
        Commands::Whoami(args) => print(auth::handle_whoami(&args, &ctx)),
        Commands::Services(cmd) => match cmd {
            ServicesCommands::List(args) => {
                print(services::handle_services_list(&args, &ctx).await)
            }
            ServicesCommands::Add(args) => print(services::handle_services_add(&args, &ctx).await),
        },
        Commands::Watch(args) => watch::handle_watch(&args, &ctx).await,
        Commands::Config(_) | Commands::Completions(_) => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
