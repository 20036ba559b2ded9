use clap::Parser;
use miette::Result;
use cdg::cli::{helpers, Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for diagnostics pointing into the JSON
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    // Let `cdg validate --format json | head` end quietly instead of panicking.
    // The server keeps the ignored disposition for closed client sockets.
    #[cfg(unix)]
    {
        if !matches!(cli.command, Commands::Serve(_)) {
            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
            }
        }
    }

    let config = helpers::load_config(&cli.global)?;

    cdg::core::logging::init(config.log_format);

    match cli.command {
        Commands::Serve(args) => cdg::cli::commands::serve::run(args, config),
        Commands::Validate(args) => cdg::cli::commands::validate::run(args),
        Commands::Render(args) => cdg::cli::commands::render::run(args, config),
        Commands::Templates(args) => cdg::cli::commands::templates::run(args, config),
    }
}
