//! `OnlyConfig` console for the terminal.
//!
//! Every command enters a console route first, so the auth guard applies
//! exactly as it does for the web pages: protected commands without a session
//! stop before any request is sent, and a 401 clears the stored session.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use onlyconfig_core::views::{
    ChangePasswordPage, ConfigureBrowser, Dialog, EnvAndDcPage, LoginPage, OrgManagementPage,
    Page, RegisterPage,
};
use onlyconfig_core::{
    Console, ConsoleConfig, ContentType, EnvDcKind, Id, NamespaceType, Route, SESSION_KEY,
};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ── CLI structure ────────────────────────────────────────────────────

/// `OnlyConfig` console.
#[derive(Parser)]
#[command(
    name = "onlyconfig",
    version,
    about = "OnlyConfig console: manage applications, environments, organizations and configuration",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         ONLYCONFIG_ADDR   Backend origin\n  \
         ONLYCONFIG_HOME   Session directory (default: ~/.onlyconfig)\n  \
         ONLYCONFIG_LOG    Log filter (default: warn)\n\n\
         {DIM}Examples:{RESET}\n  \
         onlyconfig login admin --password secret\n  \
         onlyconfig apps list\n  \
         onlyconfig config list web prod us1\n  \
         onlyconfig config create web prod us1 db url --content pg://db:5432"
    ),
)]
struct Cli {
    /// Backend origin (default depends on the build profile).
    #[arg(long, env = "ONLYCONFIG_ADDR")]
    addr: Option<String>,

    /// Directory holding the session record.
    #[arg(long, env = "ONLYCONFIG_HOME")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session.
    Login {
        username: String,
        #[arg(long, env = "ONLYCONFIG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the stored session.
    Logout,
    /// Create a user account.
    Register {
        username: String,
        #[arg(long)]
        password: String,
        /// Must match --password.
        #[arg(long)]
        confirm_password: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        display_name: String,
    },
    /// Change the password of the logged-in user.
    #[command(name = "change-password")]
    ChangePassword {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        /// Must match --new.
        #[arg(long)]
        confirm: String,
    },
    /// Show backend origin and session state.
    Status,
    /// Navigate to a console path and show where the guard lands.
    Open { path: String },
    /// Applications.
    Apps {
        #[command(subcommand)]
        action: AppCommands,
    },
    /// Environment and datacenter registry.
    #[command(name = "env-dc")]
    EnvDc {
        #[command(subcommand)]
        action: EnvDcCommands,
    },
    /// Organizations.
    Org {
        #[command(subcommand)]
        action: OrgCommands,
    },
    /// Namespaces of an application.
    Ns {
        #[command(subcommand)]
        action: NsCommands,
    },
    /// Configuration entries.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum AppCommands {
    /// List applications and their environment/datacenter attachments.
    List,
    /// Create an application under an organization.
    Create {
        name: String,
        /// Organization name or id (default: first organization).
        #[arg(long)]
        org: Option<String>,
    },
    /// Attach an environment/datacenter pair to an application.
    Attach { app: String, env: String, dc: String },
}

#[derive(Subcommand)]
enum EnvDcCommands {
    /// List registered environments and datacenters.
    List,
    /// Register an environment.
    #[command(name = "add-env")]
    AddEnv { name: String },
    /// Register a datacenter.
    #[command(name = "add-dc")]
    AddDc { name: String },
}

#[derive(Subcommand)]
enum OrgCommands {
    /// List organizations.
    List,
    /// Create an organization.
    Create { name: String },
    /// Add an owner to an organization.
    #[command(name = "add-owner")]
    AddOwner { org: String, username: String },
}

#[derive(Subcommand)]
enum NsCommands {
    /// List namespaces of an application.
    List { app: String },
    /// Create a namespace.
    Create {
        app: String,
        name: String,
        /// Create a public namespace instead of an application one.
        #[arg(long)]
        public: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List configuration keys by namespace.
    List { app: String, env: String, dc: String },
    /// Show one configuration entry.
    Get { configure_id: String },
    /// Create a configuration entry.
    Create {
        app: String,
        env: String,
        dc: String,
        namespace: String,
        key: String,
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Replace the content of a configuration entry.
    Edit {
        configure_id: String,
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Show client snippets for one configuration entry.
    Usage {
        app: String,
        env: String,
        dc: String,
        configure_id: String,
    },
}

#[derive(clap::Args)]
struct ContentArgs {
    /// Content given inline.
    #[arg(long)]
    content: Option<String>,
    /// Read the content from a file (ignored when --content is given).
    #[arg(long)]
    file: Option<PathBuf>,
    /// Content type.
    #[arg(long = "type", default_value = "general")]
    content_type: String,
}

impl ContentArgs {
    fn resolve(self) -> Result<(ContentType, String)> {
        let content_type: ContentType = self.content_type.parse().map_err(anyhow::Error::msg)?;
        let content = match (self.content, self.file) {
            (Some(content), _) => content,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            (None, None) => bail!("either --content or --file is required"),
        };
        Ok((content_type, content))
    }
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<20}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = ConsoleConfig::from_env();
    if cli.addr.is_some() {
        config.addr = cli.addr;
    }
    if cli.home.is_some() {
        config.home = cli.home;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &ConsoleConfig, cmd: Commands) -> Result<()> {
    let console = Console::from_config(config).context("failed to set up the console")?;

    match cmd {
        Commands::Login { username, password } => cmd_login(&console, username, password).await,
        Commands::Logout => cmd_logout(&console),
        Commands::Register {
            username,
            password,
            confirm_password,
            email,
            display_name,
        } => {
            let mut page = RegisterPage::new();
            page.username = username;
            page.password = password;
            page.confirm_password = confirm_password;
            page.email = email;
            page.display_name = display_name;
            cmd_register(&console, page).await
        }
        Commands::ChangePassword { old, new, confirm } => {
            cmd_change_password(&console, old, new, confirm).await
        }
        Commands::Status => {
            cmd_status(&console, config);
            Ok(())
        }
        Commands::Open { path } => cmd_open(&console, &path),
        Commands::Apps { action } => cmd_apps(&console, action).await,
        Commands::EnvDc { action } => cmd_env_dc(&console, action).await,
        Commands::Org { action } => cmd_org(&console, action).await,
        Commands::Ns { action } => cmd_ns(&console, action).await,
        Commands::Config { action } => cmd_config(&console, action).await,
    }
}

// ── Guard helpers ────────────────────────────────────────────────────

/// Enter a route; fail if the guard redirected to the login page.
fn enter(console: &Console, route: Route) -> Result<()> {
    let entered = console.enter(route)?;
    if entered.route == Route::Login {
        bail!("not logged in, run `onlyconfig login` first");
    }
    Ok(())
}

/// Surface what a page is left with after an action: a logout redirect or a
/// pending alert become errors.
fn check(console: &Console, page: &mut impl Page) -> Result<()> {
    if page.navigation() == Some(Route::Logout) {
        console.follow(&*page)?;
        bail!("session expired on {}, run `onlyconfig login` again", page.route());
    }
    if let Some(alert) = page.status_mut().take_alert() {
        bail!("{alert}");
    }
    Ok(())
}

// ── Session commands ─────────────────────────────────────────────────

async fn cmd_login(console: &Console, username: String, password: String) -> Result<()> {
    let mut page = LoginPage::new();
    page.username = username;
    page.password = password;
    page.submit(console.client()).await;

    if let Some(error) = page.error_display() {
        bail!("{error}");
    }
    check(console, &mut page)?;
    if page.navigation() != Some(Route::Home) {
        bail!("login did not complete");
    }
    success(&format!("Logged in as {}", page.username));
    Ok(())
}

fn cmd_logout(console: &Console) -> Result<()> {
    console.enter(Route::Logout)?;
    success("Logged out");
    Ok(())
}

async fn cmd_register(console: &Console, mut page: RegisterPage) -> Result<()> {
    enter(console, Route::Register)?;
    page.submit(console.client()).await;

    if let Some(error) = page.error_display() {
        bail!("{error}");
    }
    check(console, &mut page)?;
    success(&format!("User {} registered, run `onlyconfig login` to continue", page.username));
    Ok(())
}

async fn cmd_change_password(
    console: &Console,
    old: String,
    new: String,
    confirm: String,
) -> Result<()> {
    enter(console, Route::ChangePassword)?;
    let mut page = ChangePasswordPage::new();
    page.old = old;
    page.new = new;
    page.confirm = confirm;
    page.submit(console.client()).await;

    check(console, &mut page)?;
    if let Some(error) = page.error_display() {
        bail!("{error}");
    }
    success("Password changed");
    Ok(())
}

fn cmd_status(console: &Console, config: &ConsoleConfig) {
    header("⚙", "OnlyConfig Console");
    kv_line("Backend", console.client().endpoint().origin());
    if let Some(home) = &config.home {
        kv_line("Session dir", &home.display().to_string());
    }
    kv_line("Session key", SESSION_KEY);
    if console.session().is_logged_in() {
        kv_line("Logged in", &format!("{GREEN}yes{RESET}"));
    } else {
        kv_line("Logged in", &format!("{RED}no{RESET}"));
    }
}

fn cmd_open(console: &Console, path: &str) -> Result<()> {
    let route = Route::parse(path);
    if let Route::NotFound(path) = &route {
        bail!("page not found: {path}");
    }
    let entered = console.enter(route.clone())?;
    for hop in &entered.redirects {
        println!("  {DIM}→ redirect{RESET} {hop}");
    }
    if entered.route == route {
        success(&format!("{} renders", entered.route));
    } else {
        warning(&format!("{route} redirected to {}", entered.route));
    }
    Ok(())
}

// ── Applications ─────────────────────────────────────────────────────

/// Load the browser and select the application named `app`.
async fn browse_app(console: &Console, app: &str) -> Result<ConfigureBrowser> {
    enter(console, Route::Home)?;
    let mut browser = ConfigureBrowser::new();
    browser.load_applications(console.client()).await;
    check(console, &mut browser)?;
    if !browser.select_app_by_name(app) {
        bail!("application not found: {app}");
    }
    Ok(browser)
}

/// [`browse_app`] plus the (env, dc) selection and its configuration list.
async fn browse_env_dc(
    console: &Console,
    app: &str,
    env: &str,
    dc: &str,
) -> Result<ConfigureBrowser> {
    let mut browser = browse_app(console, app).await?;
    let Some(fetch) = browser.select_env_dc(env, dc) else {
        bail!("{env}/{dc} is not attached to {app}");
    };
    let result = fetch.run(console.client()).await;
    browser.apply_configure_list(&fetch, result);
    check(console, &mut browser)?;
    Ok(browser)
}

async fn cmd_apps(console: &Console, action: AppCommands) -> Result<()> {
    match action {
        AppCommands::List => {
            enter(console, Route::Home)?;
            let mut browser = ConfigureBrowser::new();
            browser.load_applications(console.client()).await;
            check(console, &mut browser)?;

            header("📦", "Applications");
            for app in browser.applications().loaded().into_iter().flatten() {
                let owner = app.app_owner_org_name.as_deref().unwrap_or("-");
                println!("  {BOLD}{}{RESET} {DIM}(id {}, org {owner}){RESET}", app.app_name, app.app_id);
                for attached in &app.env_and_dc {
                    println!("    {CYAN}{}{RESET}: {}", attached.env, attached.dc_list.join(", "));
                }
            }
        }
        AppCommands::Create { name, org } => {
            enter(console, Route::Home)?;
            let mut browser = ConfigureBrowser::new();
            browser.open_new_application(console.client()).await;
            check(console, &mut browser)?;

            if let Some(Dialog::NewApplication(dialog)) = browser.dialog_mut() {
                if let Some(org) = &org {
                    let found = dialog
                        .organizations
                        .loaded()
                        .into_iter()
                        .flatten()
                        .find(|o| &o.org_name == org || o.org_id.as_str() == org)
                        .map(|o| o.org_id.clone());
                    let Some(org_id) = found else {
                        bail!("organization not found: {org}");
                    };
                    dialog.org_id = Some(org_id);
                }
                dialog.app_name = name.clone();
            }
            browser.submit_new_application(console.client()).await;
            check(console, &mut browser)?;
            success(&format!("Application {name} created"));
        }
        AppCommands::Attach { app, env, dc } => {
            let mut browser = browse_app(console, &app).await?;
            browser.open_attach_env_dc(console.client()).await;
            check(console, &mut browser)?;

            if let Some(Dialog::AttachEnvDc(dialog)) = browser.dialog_mut() {
                dialog.env = env.clone();
                dialog.dc = dc.clone();
            }
            browser.submit_attach_env_dc(console.client()).await;
            check(console, &mut browser)?;
            success(&format!("{env}/{dc} attached to {app}"));
        }
    }
    Ok(())
}

// ── Environments and datacenters ─────────────────────────────────────

async fn cmd_env_dc(console: &Console, action: EnvDcCommands) -> Result<()> {
    enter(console, Route::EnvAndDc)?;
    let mut page = EnvAndDcPage::new();

    let added = match action {
        EnvDcCommands::List => None,
        EnvDcCommands::AddEnv { name } => {
            page.env_input = name;
            Some(EnvDcKind::Env)
        }
        EnvDcCommands::AddDc { name } => {
            page.dc_input = name;
            Some(EnvDcKind::Dc)
        }
    };
    match added {
        Some(kind) => {
            page.submit_new(console.client(), kind).await;
            check(console, &mut page)?;
            success(&format!("{} registered", kind.as_str()));
        }
        None => {
            page.load(console.client()).await;
            check(console, &mut page)?;
        }
    }

    if let Some(registry) = page.registry().loaded() {
        header("🌐", "Environments & Datacenters");
        kv_line("Environments", &registry.env.join(", "));
        kv_line("Datacenters", &registry.dc.join(", "));
    }
    Ok(())
}

// ── Organizations ────────────────────────────────────────────────────

async fn cmd_org(console: &Console, action: OrgCommands) -> Result<()> {
    enter(console, Route::OrgManagement)?;
    let mut page = OrgManagementPage::new();

    match action {
        OrgCommands::List => {
            page.load(console.client()).await;
            check(console, &mut page)?;

            header("🏢", "Organizations");
            for org in page.organizations().loaded().into_iter().flatten() {
                println!("  {BOLD}{}{RESET} {DIM}(id {}){RESET}", org.org_name, org.org_id);
                kv_line("Owners", &org.owner_list.join(", "));
                kv_line("Users", &org.user_list.join(", "));
            }
        }
        OrgCommands::Create { name } => {
            page.new_org_input = name.clone();
            page.create_organization(console.client()).await;
            check(console, &mut page)?;
            success(&format!("Organization {name} created"));
        }
        OrgCommands::AddOwner { org, username } => {
            page.load(console.client()).await;
            check(console, &mut page)?;
            if !page.select_by_name(&org) {
                bail!("organization not found: {org}");
            }
            page.owner_input = username.clone();
            page.add_owner(console.client()).await;
            check(console, &mut page)?;
            success(&format!("{username} is now an owner of {org}"));
        }
    }
    Ok(())
}

// ── Namespaces ───────────────────────────────────────────────────────

async fn cmd_ns(console: &Console, action: NsCommands) -> Result<()> {
    match action {
        NsCommands::List { app } => {
            let browser = browse_app(console, &app).await?;
            let Some(app_id) = browser.selected_app().map(|a| a.app_id.clone()) else {
                bail!("application not found: {app}");
            };
            let namespaces = match console.client().namespaces(&app_id).await {
                Ok(namespaces) => namespaces,
                Err(e) if e.is_unauthorized() => {
                    console.enter(Route::Logout)?;
                    bail!("session expired, run `onlyconfig login` again");
                }
                Err(e) => return Err(e).context("Get app namespaces data error"),
            };

            header("🗂", &format!("Namespaces of {app}"));
            for ns in namespaces {
                println!("  {ns}");
            }
        }
        NsCommands::Create { app, name, public } => {
            let mut browser = browse_app(console, &app).await?;
            browser.open_add_namespace();
            if let Some(Dialog::AddNamespace(dialog)) = browser.dialog_mut() {
                dialog.name = name.clone();
                dialog.kind = if public {
                    NamespaceType::Public
                } else {
                    NamespaceType::Application
                };
            }
            browser.submit_add_namespace(console.client()).await;
            check(console, &mut browser)?;
            success(&format!("Namespace {name} created in {app}"));
        }
    }
    Ok(())
}

// ── Configuration entries ────────────────────────────────────────────

async fn cmd_config(console: &Console, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::List { app, env, dc } => {
            let browser = browse_env_dc(console, &app, &env, &dc).await?;
            header("📄", &format!("{app} · {env}/{dc}"));
            for ns in browser.configures().loaded().into_iter().flatten() {
                println!("  {BOLD}{}{RESET}", ns.namespace);
                for entry in &ns.configure_list {
                    println!("    {:<30} {DIM}id {}{RESET}", entry.key, entry.configure_id);
                }
            }
        }
        ConfigCommands::Get { configure_id } => {
            enter(console, Route::Home)?;
            let mut browser = ConfigureBrowser::new();
            browser
                .open_edit_configure(console.client(), &Id::new(configure_id))
                .await;
            check(console, &mut browser)?;

            if let Some(Dialog::EditConfigure(dialog)) = browser.dialog() {
                if let Some(detail) = dialog.previous.loaded() {
                    header("📄", &format!("{}/{}", detail.cfg_ns, detail.cfg_key));
                    kv_line("Environment", &detail.cfg_env);
                    kv_line("Datacenter", &detail.cfg_dc);
                    kv_line("Content type", &detail.cfg_ct);
                    println!();
                    println!("{}", detail.cfg_content);
                }
            }
        }
        ConfigCommands::Create {
            app,
            env,
            dc,
            namespace,
            key,
            content,
        } => {
            let (content_type, content) = content.resolve()?;
            let mut browser = browse_env_dc(console, &app, &env, &dc).await?;
            browser.open_add_configure(console.client()).await;
            check(console, &mut browser)?;

            if let Some(Dialog::AddConfigure(dialog)) = browser.dialog_mut() {
                dialog.namespace = namespace.clone();
                dialog.key = key.clone();
                dialog.content_type = content_type;
                dialog.content = content;
            }
            browser.submit_add_configure(console.client()).await;
            check(console, &mut browser)?;
            success(&format!("{namespace}/{key} created"));
        }
        ConfigCommands::Edit {
            configure_id,
            content,
        } => {
            let (content_type, content) = content.resolve()?;
            enter(console, Route::Home)?;
            let mut browser = ConfigureBrowser::new();
            browser
                .open_edit_configure(console.client(), &Id::new(configure_id.as_str()))
                .await;
            check(console, &mut browser)?;

            if let Some(Dialog::EditConfigure(dialog)) = browser.dialog_mut() {
                dialog.content_type = content_type;
                dialog.content = content;
            }
            browser.submit_edit_configure(console.client()).await;
            check(console, &mut browser)?;
            success(&format!("Configuration {configure_id} updated"));
        }
        ConfigCommands::Usage {
            app,
            env,
            dc,
            configure_id,
        } => {
            let mut browser = browse_env_dc(console, &app, &env, &dc).await?;
            if !browser.open_usage(&Id::new(configure_id.as_str())) {
                bail!("configuration {configure_id} not found in {app} {env}/{dc}");
            }
            if let Some(Dialog::Usage(snippet)) = browser.dialog() {
                header("🧩", "Go client");
                println!("{}", snippet.go_client());
                println!();
                header("🧩", "General client");
                println!("{}", snippet.general_client());
                println!();
                header("🧩", "OnlyAgent");
                println!("onlyagent {}", snippet.agent_flags());
            }
        }
    }
    Ok(())
}
