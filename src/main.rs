// src/main.rs
mod types;

use clap::Parser;
use chrono::{DateTime, Utc};
use kubecred::cert::{inspect_pem, CertificateSummary};
use kubecred::config::{Bootstrap, KUBECONFIG_ENV};
use kubecred::utils::logging;
use kubecred::{Authenticator, KubeConfig, KubeConfigError, RequestOptions, Result};
use log::debug;
use serde_json::json;
use std::process::ExitCode;
use types::{Args, Command};

fn load(args: &Args) -> Result<KubeConfig> {
    let path = match &args.kubeconfig {
        Some(path) => path.clone(),
        None => Bootstrap::from_process()
            .kubeconfig_path()
            .ok_or(KubeConfigError::MissingEnvironment { key: KUBECONFIG_ENV })?,
    };
    debug!("Using kubeconfig {}", path.display());

    let mut kc = KubeConfig::load_from_file(&path)?;
    if let Some(context) = &args.context {
        kc.set_current_context(context.clone());
    }
    Ok(kc)
}

fn print_contexts(kc: &KubeConfig) {
    println!("{:<9} {:<24} {:<24} {:<24} NAMESPACE", "CURRENT", "NAME", "CLUSTER", "AUTHINFO");
    for context in kc.contexts() {
        let marker = if kc.get_current_context() == Some(context.name.as_str()) {
            "*"
        } else {
            ""
        };
        println!(
            "{:<9} {:<24} {:<24} {:<24} {}",
            marker,
            context.name,
            context.cluster,
            context.user,
            context.namespace.as_deref().unwrap_or_default()
        );
    }
}

fn summarize(material: Option<&[u8]>) -> Result<Vec<CertificateSummary>> {
    match material {
        Some(material) => inspect_pem(material),
        None => Ok(Vec::new()),
    }
}

fn print_certificates(label: &str, summaries: &[CertificateSummary], now: DateTime<Utc>) {
    if summaries.is_empty() {
        println!("{}: none", label);
    }
    for summary in summaries {
        println!(
            "{}: {} (issuer {}, expires {}, {}, sha256 {})",
            label,
            summary.subject,
            summary.issuer,
            summary.not_after.to_rfc3339(),
            summary.status(now),
            summary.fingerprint
        );
    }
}

fn certificates_json(summaries: &[CertificateSummary], now: DateTime<Utc>) -> serde_json::Value {
    summaries
        .iter()
        .map(|summary| json!({ "certificate": summary, "status": summary.status(now) }))
        .collect()
}

fn check(kc: &mut KubeConfig, as_json: bool) -> Result<()> {
    let mut opts = RequestOptions::default();
    kc.apply_to_request(&mut opts)?;
    opts.ssl_connector()?;

    let now = Utc::now();
    let ca = summarize(opts.ca.as_deref())?;
    let client = summarize(opts.cert.as_deref())?;
    let cluster = kc.current_cluster()?;
    let context = kc.get_current_context().unwrap_or_default();

    if as_json {
        let report = json!({
            "context": context,
            "server": cluster.server,
            "strictSSL": opts.strict_ssl,
            "bearer": opts.authorization().is_some(),
            "basic": opts.auth.as_ref().map(|a| a.username.as_str()),
            "ca": certificates_json(&ca, now),
            "client": certificates_json(&client, now),
        });
        println!("{:#}", report);
        return Ok(());
    }

    println!("Context:  {}", context);
    println!("Server:   {}", cluster.server);
    println!(
        "TLS:      {}",
        if opts.strict_ssl { "verify" } else { "insecure-skip-tls-verify" }
    );
    println!(
        "Bearer:   {}",
        if opts.authorization().is_some() { "yes" } else { "no" }
    );
    println!(
        "Basic:    {}",
        opts.auth.as_ref().map(|a| a.username.as_str()).unwrap_or("no")
    );
    print_certificates("CA", &ca, now);
    print_certificates("Client", &client, now);
    println!("TLS material accepted");
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let mut kc = load(args)?;

    match &args.command {
        Command::CurrentContext => {
            let context = kc.current_context_object()?;
            println!("{}", context.name);
        }
        Command::GetContexts => print_contexts(&kc),
        Command::UseContext { name } => {
            kc.set_current_context(name.clone());
            let cluster = kc.current_cluster()?;
            let user = kc.current_user()?;
            println!(
                "Context {:?}: cluster {:?} ({}), user {:?}",
                name, cluster.name, cluster.server, user.name
            );
        }
        Command::Token => match kc.authorization_token()? {
            Some(token) => println!("{}", token),
            None => eprintln!("No token configured for user {:?}", kc.current_user()?.name),
        },
        Command::Check { json } => check(&mut kc, *json)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(args.log_file.as_deref(), args.debug) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
