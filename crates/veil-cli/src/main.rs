use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "veil", version, about = "Static analysis of SQL queries for access control")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a schema file and print its relations.
    Schema {
        /// File of `CREATE TABLE name (col TYPE, ...);` statements
        file: PathBuf,
    },

    /// Analyze a SELECT query against a schema.
    Analyze {
        /// Schema file. Defaults to `schema_file` from --config.
        #[arg(long)]
        schema: Option<PathBuf>,

        /// YAML analyzer configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full analysis report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// The query to analyze
        sql: String,
    },

    /// Parse an `EXECUTE name(args);` statement.
    Exec {
        /// The statement text
        text: String,

        /// Text whose `$n` placeholders should be replaced by the arguments
        #[arg(long)]
        template: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.cmd {
        Command::Schema { file } => commands::schema::run(&file)?,
        Command::Analyze {
            schema,
            config,
            json,
            sql,
        } => commands::analyze::run(schema.as_deref(), config.as_deref(), json, &sql)?,
        Command::Exec { text, template } => commands::exec::run(&text, template.as_deref())?,
    };

    print!("{}", output);
    Ok(())
}
