//! Interactive console.
//!
//! A rustyline REPL with two loops: an unauthenticated one (login /
//! signup) and the dashboard one (gate commands, activity log, views,
//! pricing, admin overview). Backend failures are shown inline next to
//! the originating prompt and retried only when the user retries.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;

use gatehouse_application::{
    ActivityFeed, AdminOverview, GateService, SensorPulse, SessionController, ViewState,
};
use gatehouse_core::auth::{SignInRequest, SignUpRequest};
use gatehouse_core::gate::{GateCommand, GateState};
use gatehouse_core::session::Session;
use gatehouse_core::subscription::Plan;
use gatehouse_core::view::ActiveView;

use crate::bootstrap::AppServices;

const DASHBOARD_COMMANDS: [&str; 11] = [
    "/open", "/close", "/status", "/log", "/view", "/plans", "/select", "/admin", "/whoami",
    "/logout", "/quit",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: DASHBOARD_COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

type Repl = Editor<CliHelper, DefaultHistory>;

enum DashboardExit {
    Logout,
    Quit,
}

/// Runs the console until the user quits.
pub async fn run(services: AppServices) -> Result<()> {
    let AppServices {
        controller,
        gate,
        ambient,
        mut pulses,
        feed,
        view,
        demo,
    } = services;

    let mut rl: Repl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Gatehouse Console ===".bright_magenta().bold());
    if demo {
        println!(
            "{}",
            "Demo mode: try admin@gatehouse.demo / sentinel or resident@gatehouse.demo / welcome1"
                .bright_black()
        );
    }
    println!();

    // A session may still be live from the service's point of view.
    let mut session = match controller.initialize().await {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(target: "session", "initial session resolution failed: {err}");
            None
        }
    };

    gate.seed_boot_entries();
    let ambient_cancel = ambient.spawn();

    loop {
        let current = match session.take() {
            Some(current) => current,
            None => match auth_loop(&mut rl, &controller).await? {
                Some(signed_in) => signed_in,
                None => break,
            },
        };

        let exit = dashboard_loop(
            &mut rl,
            &controller,
            &gate,
            &feed,
            &view,
            &mut pulses,
            current,
        )
        .await?;
        match exit {
            DashboardExit::Logout => {
                view.set(ActiveView::Dashboard);
                session = None;
            }
            DashboardExit::Quit => break,
        }
    }

    // Stop the ambient timers; an in-flight gate transition dies with the
    // process.
    ambient_cancel.cancel();
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

/// Unauthenticated loop. Returns the new session, or `None` when the user
/// quits.
async fn auth_loop(rl: &mut Repl, controller: &Arc<SessionController>) -> Result<Option<Session>> {
    println!("{}", "Commands: login, signup, quit".bright_black());

    loop {
        let Ok(line) = read_line(rl, "auth> ") else {
            return Ok(None);
        };

        match line.trim() {
            "login" => {
                let email = prompt(rl, "email: ");
                let password = prompt(rl, "password: ");

                match controller.sign_in(SignInRequest { email, password }).await {
                    Ok(session) => {
                        println!(
                            "{}",
                            format!("Welcome back, {}!", session.display_name()).bright_green()
                        );
                        return Ok(Some(session));
                    }
                    Err(err) => show_error(&err),
                }
            }
            "signup" => {
                let full_name = prompt(rl, "full name: ");
                let phone = prompt(rl, "phone: ");
                let email = prompt(rl, "email: ");
                let password = prompt(rl, "password: ");

                let request = SignUpRequest {
                    email,
                    password,
                    full_name,
                    phone,
                };
                match controller.sign_up(request).await {
                    Ok(_) => {
                        println!("{}", "Registration complete! Signing in...".bright_green());
                        if let Some(session) = controller.session().await {
                            return Ok(Some(session));
                        }
                        println!(
                            "{}",
                            "Account created; use 'login' to sign in.".bright_black()
                        );
                    }
                    Err(err) => show_error(&err),
                }
            }
            "quit" | "exit" => return Ok(None),
            "" => {}
            other => {
                println!("{}", format!("Unknown command: {other}").bright_black());
            }
        }
    }
}

/// Authenticated dashboard loop.
async fn dashboard_loop(
    rl: &mut Repl,
    controller: &Arc<SessionController>,
    gate: &Arc<GateService>,
    feed: &ActivityFeed,
    view: &ViewState,
    pulses: &mut mpsc::UnboundedReceiver<SensorPulse>,
    session: Session,
) -> Result<DashboardExit> {
    view.set(ActiveView::Dashboard);
    feed.push(format!("user signed in: {}", session.display_name()));

    // Keep the auth-state stream attached for the lifetime of the
    // dashboard so session changes land in the logs as they happen.
    let subscription = controller.subscribe(|change, _session| {
        tracing::info!(target: "session", "auth state changed: {}", change.kind());
    });

    println!();
    render_header(&session);
    println!(
        "{}",
        "Commands: /open /close /status /log /view <name> /plans /select <plan> /admin /whoami /logout /quit"
            .bright_black()
    );

    loop {
        drain_pulses(pulses);

        let Ok(line) = read_line(rl, ">> ") else {
            subscription.unsubscribe();
            return Ok(DashboardExit::Quit);
        };
        let mut parts = line.trim().split_whitespace();
        let command = parts.next().unwrap_or("");
        let argument = parts.next();

        match command {
            "/open" => issue_gate_command(gate, GateCommand::Open),
            "/close" => issue_gate_command(gate, GateCommand::Close),
            "/status" => render_status(gate, &controller.session().await),
            "/log" => render_log(feed),
            "/view" => match argument.map(str::parse::<ActiveView>) {
                Some(Ok(target)) => switch_view(controller, view, target).await,
                _ => println!(
                    "{}",
                    "Usage: /view <dashboard|cameras|pricing|admin>".bright_black()
                ),
            },
            "/plans" => render_plans(&controller.session().await),
            "/select" => match argument.map(str::parse::<Plan>) {
                Some(Ok(plan)) => select_plan(controller, feed, plan).await,
                _ => println!("{}", "Usage: /select <core|signature|elite>".bright_black()),
            },
            "/admin" => switch_view(controller, view, ActiveView::Admin).await,
            "/whoami" => match controller.current_user().await {
                Ok(Some(_)) => {
                    if let Some(session) = controller.session().await {
                        render_header(&session);
                    }
                }
                Ok(None) => println!("{}", "Not signed in".bright_black()),
                Err(err) => show_error(&err),
            },
            "/logout" => {
                subscription.unsubscribe();
                if let Err(err) = controller.sign_out().await {
                    tracing::error!(target: "session", "sign out failed: {err}");
                }
                println!("{}", "Signed out.".bright_green());
                return Ok(DashboardExit::Logout);
            }
            "/quit" | "quit" | "exit" => {
                subscription.unsubscribe();
                return Ok(DashboardExit::Quit);
            }
            "" => {}
            other => {
                println!("{}", format!("Unknown command: {other}").bright_black());
            }
        }
    }
}

/// Reads one line without starving the runtime's worker threads.
fn read_line(rl: &mut Repl, label: &str) -> rustyline::Result<String> {
    tokio::task::block_in_place(|| rl.readline(label))
}

fn prompt(rl: &mut Repl, label: &str) -> String {
    read_line(rl, label).unwrap_or_default().trim().to_string()
}

fn show_error(err: &gatehouse_core::GatehouseError) {
    tracing::error!(target: "session", "{err}");
    println!("{}", err.display_message().red());
}

fn drain_pulses(pulses: &mut mpsc::UnboundedReceiver<SensorPulse>) {
    while let Ok(pulse) = pulses.try_recv() {
        println!("{}", format!("~ sensor pulse: {}", pulse.sensor).bright_black());
    }
}

fn issue_gate_command(gate: &Arc<GateService>, command: GateCommand) {
    if gate.command(command) {
        println!("{}", format!("Command sent: {command} main gate").yellow());
    } else {
        println!(
            "{}",
            format!("Gate is {}; command ignored", gate.state().status_label()).bright_black()
        );
    }
}

fn render_header(session: &Session) {
    let plan = session.plan_label().unwrap_or_else(|| "NO PLAN".to_string());
    let role = if session.is_admin() { " [admin]" } else { "" };
    println!(
        "{} {} {}",
        session.display_name().bright_white().bold(),
        format!("<{}>", session.user.email).bright_black(),
        format!("{plan}{role}").bright_yellow()
    );
}

fn render_status(gate: &Arc<GateService>, session: &Option<Session>) {
    let state = gate.state();
    let badge = match state {
        GateState::Open => state.status_label().green(),
        GateState::Closed => state.status_label().red(),
        _ => state.status_label().yellow(),
    };
    println!("main gate: {badge}");
    if let Some(session) = session {
        render_header(session);
    }
}

fn render_log(feed: &ActivityFeed) {
    for entry in feed.snapshot() {
        println!(
            "  {}  {}",
            entry.recorded_at.format("%H:%M:%S").to_string().bright_black(),
            entry.message
        );
    }
}

fn render_plans(session: &Option<Session>) {
    let current = session
        .as_ref()
        .and_then(|s| s.subscription.as_ref())
        .map(|s| s.plan);
    for plan in Plan::ALL {
        let marker = if current == Some(plan) { "*" } else { " " };
        println!("  {marker} {}", plan.label());
    }
    println!(
        "{}",
        "Select with /select <core|signature|elite>".bright_black()
    );
}

async fn select_plan(controller: &Arc<SessionController>, feed: &ActivityFeed, plan: Plan) {
    match controller.select_plan(plan).await {
        Ok(subscription) => {
            feed.push(format!("plan updated to: {}", subscription.plan.label()));
            println!(
                "{}",
                format!("Plan updated to {}", subscription.plan.label()).bright_green()
            );
        }
        Err(err) => show_error(&err),
    }
}

async fn switch_view(controller: &Arc<SessionController>, view: &ViewState, target: ActiveView) {
    if target == ActiveView::Admin {
        match controller.admin_overview().await {
            Ok(overview) => {
                view.set(ActiveView::Admin);
                render_admin(&overview);
            }
            Err(err) => show_error(&err),
        }
        return;
    }

    view.set(target);
    println!("{}", format!("Now viewing: {target}").bright_black());
}

fn render_admin(overview: &AdminOverview) {
    println!("{}", "Community overview".bright_white().bold());
    println!("  users: {}", overview.total_users);
    println!("  properties: {}", overview.total_properties);
    println!("  events today: {}", overview.events_today);
    println!("  active subscriptions: {}", overview.active_subscriptions);
    println!(
        "  plans: core {}, signature {}, elite {}",
        overview.plan_counts.core, overview.plan_counts.signature, overview.plan_counts.elite
    );

    if !overview.recent_profiles.is_empty() {
        println!("{}", "Recent users".bright_white());
        for profile in &overview.recent_profiles {
            println!(
                "  {}  {}",
                profile.full_name,
                profile.role.to_string().bright_yellow()
            );
        }
    }

    if overview.recent_events.is_empty() {
        println!("{}", "No recorded events".bright_black());
    } else {
        println!("{}", "Recent events".bright_white());
        for event in &overview.recent_events {
            println!(
                "  {}  {}",
                event.created_at.format("%H:%M:%S").to_string().bright_black(),
                event.message
            );
        }
    }
}
