//! Fern CLI - command line front end for the Fern compiler.
//! Fern CLI - Fern 编译器的命令行前端。

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Main CLI structure.
/// 主 CLI 结构体。
#[derive(Parser)]
#[command(name = "fern")]
#[command(
    author,
    version,
    about = "Fern - a Fortran front end and ASR pass driver",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output. / 启用详细输出。
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress output. / 抑制输出。
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available CLI commands.
/// 可用的 CLI 命令。
#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of a file. / 打印文件的词法单元。
    Tokens {
        /// The file to tokenize. / 要分析的文件。
        file: String,
    },

    /// Parse a file and print syntax tree statistics. / 解析文件并打印语法树统计。
    Ast {
        /// The file to parse. / 要解析的文件。
        file: String,
    },

    /// Lower a file, run passes and print the ASR. / 降级文件、运行 pass 并打印 ASR。
    Asr {
        /// The file to lower. / 要降级的文件。
        file: String,

        /// Pass to run, in order; repeatable. Defaults to every default pass.
        /// 要运行的 pass，按顺序；可重复。
        #[arg(long = "pass", value_name = "NAME")]
        passes: Vec<String>,

        /// Skip ASR verification after each pass. / 跳过每个 pass 之后的 ASR 校验。
        #[arg(long)]
        no_verify: bool,
    },

    /// Lex, parse, lower and verify a file. / 检查文件。
    Check {
        /// The file to check. / 要检查的文件。
        file: String,
    },

    /// List the available passes. / 列出可用的 pass。
    Passes,
}

/// Install the tracing subscriber. `FERN_LOG` wins over the flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let fallback = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("FERN_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Main entry point.
/// 主入口点。
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Tokens { file } => commands::tokens::run(&file),
        Commands::Ast { file } => commands::ast::run(&file, cli.verbose),
        Commands::Asr {
            file,
            passes,
            no_verify,
        } => commands::asr::run(&file, &passes, !no_verify, cli.verbose),
        Commands::Check { file } => commands::check::run(&file, cli.verbose, cli.quiet),
        Commands::Passes => commands::asr::list_passes(),
    };

    if let Err(e) = result {
        if !cli.quiet {
            output::error(&e);
        }
        std::process::exit(1);
    }
}
