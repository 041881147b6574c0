use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use govctl_api::ConsoleClient;
use govctl_engine::{EditSession, alerts, saga};
use govctl_registry::{ConsoleConfig, FieldKind, ProjectionRegistry, ProjectionSpec, combine_categories, connectors, feat_gate};
use govctl_types::{Alert, AlertLevel, AlertSink, FormValue, PropertyRevision, UpdatePayload};
use govctl_util::{decode_property_name, encode_property_name, parse_boolean, redact_sensitive};
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();
    let config = ConsoleConfig::load();

    // Config management needs no API client, and must work even when the
    // configured base URL is broken.
    if let Some(("config", sub)) = matches.subcommand() {
        return run_config(&config, sub);
    }

    let client = build_client(&config)?;
    let sink = StdoutAlertSink;

    match matches.subcommand() {
        Some(("categories", sub)) => run_categories(&client, &config, sub).await,
        Some(("show", sub)) => run_show(&client, &config, &sink, sub).await,
        Some(("set", sub)) => run_set(&client, &config, &sink, sub).await,
        Some(("toggle", sub)) => run_toggle(&client, &config, &sink, sub).await,
        Some(("revert", sub)) => run_revert(&client, &config, &sink, sub).await,
        _ => unreachable!("subcommand is required"),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    let connector_arg = Arg::new("connector")
        .required(true)
        .help("Canonical connector name (e.g. account.lock.handler)");

    Command::new("govctl")
        .about("Inspect and edit identity-server governance connectors")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("categories")
                .about("List connector categories")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("show")
                .about("Show a connector's current configuration")
                .arg(connector_arg.clone())
                .arg(
                    Arg::new("category-id")
                        .long("category-id")
                        .action(ArgAction::Set)
                        .help("Category identifier, for connectors without a built-in projection"),
                )
                .arg(
                    Arg::new("connector-id")
                        .long("connector-id")
                        .action(ArgAction::Set)
                        .help("Connector identifier, for connectors without a built-in projection"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("set")
                .about("Edit connector fields and submit the update")
                .arg(connector_arg.clone())
                .arg(
                    Arg::new("assignment")
                        .required(true)
                        .num_args(1..)
                        .help("field=value pairs to stage"),
                )
                .arg(
                    Arg::new("category-id")
                        .long("category-id")
                        .action(ArgAction::Set)
                        .help("Category identifier, for connectors without a built-in projection"),
                )
                .arg(
                    Arg::new("connector-id")
                        .long("connector-id")
                        .action(ArgAction::Set)
                        .help("Connector identifier, for connectors without a built-in projection"),
                )
                .arg(dry_run_flag()),
        )
        .subcommand(
            Command::new("toggle")
                .about("Enable or disable a connector")
                .arg(connector_arg.clone())
                .arg(
                    Arg::new("state")
                        .required(true)
                        .value_parser(["on", "off"])
                        .help("Target state"),
                )
                .arg(dry_run_flag()),
        )
        .subcommand(
            Command::new("revert")
                .about("Revert a connector's configuration to server defaults")
                .arg(connector_arg)
                .arg(dry_run_flag()),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the deployment configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("path").about("Print the configuration file location"))
                .subcommand(
                    Command::new("init").about("Write the effective configuration to disk for editing"),
                ),
        )
}

fn run_config(config: &ConsoleConfig, matches: &ArgMatches) -> Result<()> {
    let path = govctl_registry::config::default_config_path();
    match matches.subcommand() {
        Some(("path", _)) => {
            println!("{}", path.display());
            Ok(())
        }
        Some(("init", _)) => {
            config
                .save()
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
            Ok(())
        }
        _ => unreachable!("subcommand is required"),
    }
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Emit JSON instead of text")
}

fn dry_run_flag() -> Arg {
    Arg::new("dry-run")
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help("Print the request payload without sending it")
}

fn build_client(config: &ConsoleConfig) -> Result<ConsoleClient> {
    let client = match &config.base_url {
        Some(base_url) => ConsoleClient::new_with_base(base_url),
        None => ConsoleClient::new_from_env(),
    };
    client.context("failed to construct API client")
}

/// Writes alerts to stdout (success) or stderr (everything else).
struct StdoutAlertSink;

impl AlertSink for StdoutAlertSink {
    fn emit(&self, alert: Alert) {
        match alert.level {
            AlertLevel::Success => println!("{}: {}", alert.message, alert.description),
            _ => eprintln!("{}: {}", alert.message, alert.description),
        }
    }
}

/// Resolve a connector argument to its projection spec, rejecting connectors
/// hidden by the deployment config.
fn resolve_spec(config: &ConsoleConfig, connector: &str) -> Result<Option<&'static ProjectionSpec>> {
    if config.is_connector_hidden(connector) {
        bail!("connector '{}' is hidden in this deployment", connector);
    }
    Ok(ProjectionRegistry::builtin().find(connector))
}

async fn run_categories(client: &ConsoleClient, config: &ConsoleConfig, matches: &ArgMatches) -> Result<()> {
    let fetched = client.list_categories().await?;

    // The server can list the same title more than once; fold duplicates into
    // a single category.
    let mut categories = combine_categories(&[], &fetched);
    for category in &mut categories {
        category
            .connectors
            .retain(|connector| !config.is_connector_hidden(&connector.name));
    }

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    for category in &categories {
        println!("{}", category.title);
        for connector in &category.connectors {
            println!("  {} ({})", connector.friendly_name, connector.name);
        }
    }
    Ok(())
}

async fn run_show(
    client: &ConsoleClient,
    config: &ConsoleConfig,
    sink: &dyn AlertSink,
    matches: &ArgMatches,
) -> Result<()> {
    let name = matches.get_one::<String>("connector").context("connector name")?;

    let Some(spec) = resolve_spec(config, name)? else {
        return run_show_raw(client, matches, name).await;
    };

    let connector = fetch_or_alert(client, sink, &spec.category_id, &spec.connector_id).await?;
    let state = govctl_engine::project(&connector.catalog(&spec.category_id), spec);

    if matches.get_flag("json") {
        let mut out = serde_json::Map::new();
        for (field, value) in state.iter() {
            out.insert(field.clone(), serde_json::Value::String(value.to_wire()));
        }
        println!("{}", serde_json::to_string_pretty(&serde_json::Value::Object(out))?);
        return Ok(());
    }

    println!("{} ({})", connector.friendly_name, connector.name);
    for field in &spec.fields {
        match state.get(&field.name) {
            Some(value) => println!("  {} = {}", field.name, value.to_wire()),
            None => println!("  {} (unset)", field.name),
        }
    }
    Ok(())
}

/// Raw property listing for connectors without a built-in projection. Keys
/// are printed dash-encoded so they can be pasted straight into `set`.
async fn run_show_raw(client: &ConsoleClient, matches: &ArgMatches, name: &str) -> Result<()> {
    if !feat_gate::feature_raw_edits() {
        bail!(
            "no built-in projection for connector '{}'; set GOVCTL_FEATURE_RAW_EDITS=1 to list raw properties",
            name
        );
    }
    let category_id = matches
        .get_one::<String>("category-id")
        .context("--category-id is required for raw listings")?;
    let connector_id = matches
        .get_one::<String>("connector-id")
        .context("--connector-id is required for raw listings")?;

    let connector = client.fetch_connector(category_id, connector_id).await?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&connector)?);
        return Ok(());
    }

    println!("{} ({})", connector.friendly_name, connector.name);
    for property in &connector.properties {
        println!("  {} = {}", encode_property_name(&property.name), property.value);
    }
    Ok(())
}

async fn run_set(
    client: &ConsoleClient,
    config: &ConsoleConfig,
    sink: &dyn AlertSink,
    matches: &ArgMatches,
) -> Result<()> {
    let name = matches.get_one::<String>("connector").context("connector name")?;
    let assignments: Vec<(String, String)> = matches
        .get_many::<String>("assignment")
        .context("field assignments")?
        .map(|raw| parse_assignment(raw))
        .collect::<Result<_>>()?;
    let dry_run = matches.get_flag("dry-run");

    let Some(spec) = resolve_spec(config, name)? else {
        return run_set_raw(client, sink, matches, name, &assignments, dry_run).await;
    };

    let connector = fetch_or_alert(client, sink, &spec.category_id, &spec.connector_id).await?;

    let mut session = EditSession::new(spec.clone());
    let generation = session.begin_fetch();
    session.complete_fetch(generation, &connector.catalog(&spec.category_id));

    for (field, raw) in &assignments {
        if config.is_feature_disabled(name, field) {
            bail!("field '{}' is disabled for '{}' in this deployment", field, name);
        }
        let value = typed_value(spec, field, raw)?;
        session.edit(field, value)?;
    }

    let errors = session.validate()?;
    if !errors.is_empty() {
        for (field, message) in errors.iter() {
            eprintln!("{}: {}", field, message);
        }
        bail!("{} field(s) failed validation", errors.len());
    }

    let mut payload = session.build_payload()?;
    apply_auto_enable(config, name, &mut payload);

    if dry_run {
        return print_dry_run(client, &spec.category_id, &spec.connector_id, &payload);
    }

    match client.update_connector(&spec.category_id, &spec.connector_id, &payload).await {
        Ok(()) => {
            session.complete_submit();
            sink.emit(alerts::update_success_alert(&connector.friendly_name));
            Ok(())
        }
        Err(error) => {
            sink.emit(alerts::update_error_alert(&error));
            Err(error.into())
        }
    }
}

/// Raw property passthrough for connectors without a built-in projection.
/// Gated behind the raw-edits feature flag; assignment keys are dash-encoded
/// property names.
async fn run_set_raw(
    client: &ConsoleClient,
    sink: &dyn AlertSink,
    matches: &ArgMatches,
    name: &str,
    assignments: &[(String, String)],
    dry_run: bool,
) -> Result<()> {
    if !feat_gate::feature_raw_edits() {
        bail!(
            "no built-in projection for connector '{}'; set GOVCTL_FEATURE_RAW_EDITS=1 to edit raw properties",
            name
        );
    }
    let category_id = matches
        .get_one::<String>("category-id")
        .context("--category-id is required for raw edits")?;
    let connector_id = matches
        .get_one::<String>("connector-id")
        .context("--connector-id is required for raw edits")?;

    let properties = assignments
        .iter()
        .map(|(key, value)| PropertyRevision::new(decode_property_name(key), value))
        .collect();
    let payload = UpdatePayload::update(properties);

    if dry_run {
        return print_dry_run(client, category_id, connector_id, &payload);
    }

    match client.update_connector(category_id, connector_id, &payload).await {
        Ok(()) => {
            sink.emit(alerts::update_success_alert(name));
            Ok(())
        }
        Err(error) => {
            sink.emit(alerts::update_error_alert(&error));
            Err(error.into())
        }
    }
}

async fn run_toggle(
    client: &ConsoleClient,
    config: &ConsoleConfig,
    sink: &dyn AlertSink,
    matches: &ArgMatches,
) -> Result<()> {
    let name = matches.get_one::<String>("connector").context("connector name")?;
    let enabled = matches.get_one::<String>("state").map(String::as_str) == Some("on");
    let dry_run = matches.get_flag("dry-run");

    // Bot detection spans three connectors and runs as a compensated saga.
    if name == connectors::BOT_DETECTION_CONNECTOR {
        let update = saga::bot_detection_toggle(enabled, config);
        if dry_run {
            for step in update.steps() {
                println!("{}: {}", step.label, serde_json::to_string(&step.payload)?);
            }
            return Ok(());
        }
        return match update.run(client).await {
            Ok(()) => {
                sink.emit(alerts::update_success_alert("Bot Detection"));
                Ok(())
            }
            Err(error) => {
                sink.emit(Alert::error("Update error", error.to_string()));
                Err(error.into())
            }
        };
    }

    let Some(spec) = resolve_spec(config, name)? else {
        bail!("no built-in projection for connector '{}'", name);
    };
    let toggle_property = config
        .toggle_property(name)
        .with_context(|| format!("no toggle property configured for '{}'", name))?;

    let payload = UpdatePayload::update(vec![PropertyRevision::new(toggle_property, enabled.to_string())]);
    if dry_run {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match client.update_connector(&spec.category_id, &spec.connector_id, &payload).await {
        Ok(()) => {
            sink.emit(alerts::update_success_alert(name));
            Ok(())
        }
        Err(error) => {
            sink.emit(alerts::update_error_alert(&error));
            Err(error.into())
        }
    }
}

async fn run_revert(
    client: &ConsoleClient,
    config: &ConsoleConfig,
    sink: &dyn AlertSink,
    matches: &ArgMatches,
) -> Result<()> {
    let name = matches.get_one::<String>("connector").context("connector name")?;
    let dry_run = matches.get_flag("dry-run");

    let Some(spec) = resolve_spec(config, name)? else {
        bail!("no built-in projection for connector '{}'", name);
    };

    let mut property_names: Vec<String> = spec
        .fields
        .iter()
        .flat_map(|field| field.property_names())
        .map(str::to_string)
        .collect();
    if let Some(toggle) = config.toggle_property(name) {
        property_names.push(toggle.to_string());
    }

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&property_names)?);
        return Ok(());
    }

    match client.revert_connector(&spec.category_id, &spec.connector_id, &property_names).await {
        Ok(()) => {
            sink.emit(alerts::revert_success_alert(name));
            Ok(())
        }
        Err(error) => {
            sink.emit(alerts::update_error_alert(&error));
            Err(error.into())
        }
    }
}

/// Fetch a connector, surfacing a failure as a retrieval alert before
/// propagating it.
async fn fetch_or_alert(
    client: &ConsoleClient,
    sink: &dyn AlertSink,
    category_id: &str,
    connector_id: &str,
) -> Result<govctl_types::GovernanceConnector> {
    match client.fetch_connector(category_id, connector_id).await {
        Ok(connector) => Ok(connector),
        Err(error) => {
            sink.emit(alerts::fetch_error_alert(&error));
            Err(error.into())
        }
    }
}

/// Print the update request that would be sent, with secrets redacted from
/// the headers.
fn print_dry_run(
    client: &ConsoleClient,
    category_id: &str,
    connector_id: &str,
    payload: &UpdatePayload,
) -> Result<()> {
    let path = format!("/governance-connectors/{}/connectors/{}", category_id, connector_id);
    let request = client.request(reqwest::Method::PATCH, &path).json(payload).build()?;

    let mut headers = serde_json::Map::new();
    for (name, value) in request.headers() {
        let line = format!("{}: {}", name.as_str(), value.to_str().unwrap_or(""));
        let redacted = redact_sensitive(&line);
        let shown = redacted.splitn(2, ':').nth(1).map(str::trim).unwrap_or("").to_string();
        headers.insert(name.as_str().to_string(), serde_json::Value::String(shown));
    }

    let out = serde_json::json!({
        "method": request.method().as_str(),
        "url": request.url().as_str(),
        "headers": headers,
        "body": payload,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn parse_assignment(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => bail!("expected field=value, got '{}'", raw),
    }
}

/// Convert a raw CLI value into the typed form value its field expects.
fn typed_value(spec: &ProjectionSpec, field: &str, raw: &str) -> Result<FormValue> {
    let declared = spec
        .field(field)
        .with_context(|| format!("unknown field '{}' for connector '{}'", field, spec.connector))?;

    Ok(match &declared.kind {
        FieldKind::Toggle { .. } => FormValue::Bool(parse_boolean(raw)),
        FieldKind::RadioGroup { .. } => FormValue::Choice(raw.to_string()),
        FieldKind::Number { .. } | FieldKind::Text { .. } => FormValue::Text(raw.to_string()),
    })
}

/// Submit the connector's enable toggle as `"true"` alongside the update when
/// the deployment config asks for it and the form did not already set it.
fn apply_auto_enable(config: &ConsoleConfig, connector: &str, payload: &mut UpdatePayload) {
    if !config.auto_enable_connector_toggle {
        return;
    }
    if let Some(toggle) = config.toggle_property(connector)
        && payload.value_of(toggle).is_none()
    {
        payload.properties.push(PropertyRevision::new(toggle, "true"));
    }
}
