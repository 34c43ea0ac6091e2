use anyhow::{Context, Result};
use clap::Parser;
use directus_provision::api::DirectusApi;
use directus_provision::cli::{
    BootstrapArgs, CheckArgs, Command, CommonArgs, ProvisionArgs, RootArgs,
};
use directus_provision::logging::{self, Console};
use directus_provision::{
    orchestrator, Credentials, ProvisionConfig, RunReport, SchemaDef, UreqTransport,
};
use std::time::Duration;

fn main() -> Result<()> {
    let cli = RootArgs::parse();
    let common = cli.command.common();
    let console = if common.json {
        Console::Stderr
    } else {
        Console::Stdout
    };
    logging::init(common.log_file(), console)?;

    match cli.command {
        Command::Provision(args) => cmd_provision(args),
        Command::Bootstrap(args) => cmd_bootstrap(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_provision(args: ProvisionArgs) -> Result<()> {
    let schema = load_schema(args.schema())?;
    let credentials = resolve_credentials(
        args.credentials.token.as_deref(),
        args.credentials.email.as_deref(),
        args.credentials.password.as_deref(),
    )?;
    let config = ProvisionConfig::new(
        &args.common.url,
        credentials,
        Duration::from_millis(args.settle_ms),
    );
    provision(&config, &schema, &args.common)
}

fn cmd_bootstrap(args: BootstrapArgs) -> Result<()> {
    let schema = load_schema(args.schema())?;
    let (token, email, password) = args.credential_parts();
    let credentials = resolve_credentials(token, email, password)?;
    let config = ProvisionConfig::new(
        &args.common.url,
        credentials,
        Duration::from_millis(args.settle_ms),
    );
    provision(&config, &schema, &args.common)
}

fn cmd_check(args: CheckArgs) -> Result<()> {
    let schema = load_schema(args.schema())?;
    let transport = UreqTransport::new(&args.common.url);
    let api = if args.public {
        DirectusApi::new(transport, None)
    } else {
        let credentials = resolve_credentials(
            args.credentials.token.as_deref(),
            args.credentials.email.as_deref(),
            args.credentials.password.as_deref(),
        )?;
        let config = ProvisionConfig::new(&args.common.url, credentials, Duration::ZERO);
        orchestrator::authenticate(transport, &config).inspect_err(|err| {
            tracing::error!(error = %err, "failed to obtain authentication token");
        })?
    };
    let report = orchestrator::check_access(&api, &schema);
    emit_report(&report, args.common.json)
}

fn provision(config: &ProvisionConfig, schema: &SchemaDef, common: &CommonArgs) -> Result<()> {
    let transport = UreqTransport::new(&config.base_url);
    let report = orchestrator::run(transport, config, schema).inspect_err(|err| {
        tracing::error!(error = %err, "failed to obtain authentication token");
    })?;
    emit_report(&report, common.json)
}

fn load_schema(source: &str) -> Result<SchemaDef> {
    SchemaDef::load(source).with_context(|| format!("load schema {source}"))
}

fn resolve_credentials(
    token: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<Credentials> {
    Credentials::from_parts(token, email, password)
        .inspect_err(|err| tracing::error!(error = %err, "no usable credentials"))
        .map_err(Into::into)
}

fn emit_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("serialize run report")?;
        println!("{text}");
        return Ok(());
    }
    for outcome in report.failures() {
        println!("failed {} {}", outcome.kind, outcome.target);
    }
    println!("{}", report.summary());
    Ok(())
}
