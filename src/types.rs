// types.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Resolve Kubernetes client credentials from a kubeconfig", long_about = None)]
pub struct Args {
    // Kubeconfig to load instead of $KUBECONFIG / ~/.kube/config
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    // Override current-context for this invocation
    #[arg(long, global = true)]
    pub context: Option<String>,

    // Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    // Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the name of the current context
    CurrentContext,
    /// List all contexts, marking the current one
    GetContexts,
    /// Resolve another context (in memory only)
    UseContext { name: String },
    /// Print the Authorization header value, refreshing the token if needed
    Token,
    /// Resolve all transport credentials and summarise them
    Check {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}
