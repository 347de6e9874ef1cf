use clap::{Parser, Subcommand};

/// `addonfn` - stateless job-card add-on event handlers.
#[derive(Parser, Debug)]
#[command(name = "addonfn")]
#[command(version)]
#[command(about = "Serve or invoke job-card add-on event handlers.", long_about = None)]
pub struct Cli {
    /// Config file (default: platform config dir/addonfn/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway (POST /event, GET /health)
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Run one event and print its response JSON
    Invoke {
        /// Event JSON file, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },
}
