use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use plugctl_core::kernel::constants;
use plugctl_core::plugin_system::PlannedAction;
use plugctl_core::{
    ActivationStore, AppConfig, Plugin, PluginHost, PluginLoader, PluginRegistry, PluginSystemError,
    ResolutionPlan, Resolver, Result,
};

/// plugctl: activate and deactivate plugins with respect to their requirements and conflicts
#[derive(Parser, Debug)]
#[command(name = constants::APP_NAME, author, version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file (JSON, YAML or TOML, chosen by extension)
    #[arg(long, global = true, env = "PLUGCTL_CONFIG", default_value = constants::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory of installed plugins, overriding the configuration
    #[arg(long, global = true, env = "PLUGCTL_PLUGINS_DIR")]
    pub plugins_dir: Option<PathBuf>,

    /// File holding the active plugin ids, overriding the configuration
    #[arg(long, global = true, env = "PLUGCTL_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List installed plugins and whether they are active
    List {
        /// Only active plugins
        #[arg(long, conflicts_with = "inactive")]
        active: bool,
        /// Only inactive plugins
        #[arg(long)]
        inactive: bool,
    },
    /// Show a plugin's manifest, active dependents and unmet requirements
    Show {
        /// Plugin id
        id: String,
    },
    /// Activate plugins
    Activate(ChangeArgs),
    /// Deactivate plugins
    Deactivate(ChangeArgs),
    /// Report active plugins whose requirements or conflicts are violated
    Check,
}

#[derive(Args, Debug)]
pub struct ChangeArgs {
    /// Plugin ids, processed in order
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Also deactivate conflicts and dependents, and activate requirements
    #[arg(short, long)]
    pub force: bool,

    /// Print what would change without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Registry loaded from disk together with the store its active set came from.
struct Session {
    registry: PluginRegistry,
    store: ActivationStore,
}

impl Session {
    async fn open(config: &AppConfig) -> Result<Self> {
        let mut registry = PluginRegistry::new().with_enforcement(config.enforce_requirements);
        let mut loader = PluginLoader::new();
        loader.add_plugin_dir(&config.plugins_dir);
        let count = loader.register_all_plugins(&mut registry).await?;

        let store = ActivationStore::new(&config.state_file);
        registry.restore_active(store.load().await?);
        log::debug!(
            "Loaded {} plugin(s) from {:?}, {} active",
            count,
            loader.plugin_dirs(),
            registry.active_count()
        );

        Ok(Self { registry, store })
    }

    /// Run `action` for each id in order, then persist the active set if it changed.
    async fn change(&mut self, action: PlannedAction, args: &ChangeArgs) -> Result<bool> {
        let before = self.registry.active_plugin_ids();
        let outcome = if args.dry_run {
            self.preview_each(action, args).map(|()| true)
        } else {
            self.apply_each(action, args)
        };

        // Persist whatever was applied, even if a later id failed
        let after = self.registry.active_plugin_ids();
        if after != before {
            self.store.save(&after).await?;
        }
        outcome
    }

    fn apply_each(&mut self, action: PlannedAction, args: &ChangeArgs) -> Result<bool> {
        let mut resolver = Resolver::new(&mut self.registry);
        let mut all_ok = true;

        for id in &args.ids {
            let before = resolver.host().active_plugin_ids();
            let ok = match action {
                PlannedAction::Activate => resolver.activate(id, args.force)?,
                PlannedAction::Deactivate => resolver.deactivate(id, args.force)?,
            };
            let after = resolver.host().active_plugin_ids();

            if ok {
                let verb = match action {
                    PlannedAction::Activate => "Activated",
                    PlannedAction::Deactivate => "Deactivated",
                };
                println!("{} '{}'", verb, id);
            } else {
                println!("Could not {} '{}'", action, id);
                all_ok = false;
            }
            for other in after.iter().filter(|p| !before.contains(p) && *p != id) {
                println!("  + {}", other);
            }
            for other in before.iter().filter(|p| !after.contains(p) && *p != id) {
                println!("  - {}", other);
            }
        }

        Ok(all_ok)
    }

    fn preview_each(&mut self, action: PlannedAction, args: &ChangeArgs) -> Result<()> {
        let resolver = Resolver::new(&mut self.registry);

        for id in &args.ids {
            if args.force {
                let plan = match action {
                    PlannedAction::Activate => resolver.plan_activation(id)?,
                    PlannedAction::Deactivate => resolver.plan_deactivation(id)?,
                };
                print_plan(&plan);
                continue;
            }

            let registry = resolver.host();
            let issues = registry.check_requirements(id)?;
            let already = registry.is_active(id) == (action == PlannedAction::Activate);
            if already {
                println!("Nothing to do: '{}' is already {}d", id, action);
                continue;
            }
            println!("Would {} '{}'", action, id);
            if registry.enforces_requirements() {
                match action {
                    PlannedAction::Activate => {
                        for issue in issues {
                            println!("  refused: {}", issue);
                        }
                    }
                    PlannedAction::Deactivate => {
                        for dependent in registry.active_dependents(id) {
                            println!("  refused: required by active plugin '{}'", dependent);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn print_plan(plan: &ResolutionPlan) {
    if plan.is_noop() {
        println!("Nothing to do: '{}' is already {}d", plan.root(), plan.action());
        return;
    }
    println!("Would {} '{}':", plan.action(), plan.root());
    for step in plan.steps().iter().filter(|s| s.changes_state) {
        println!("  {} {}", step.action, step.plugin_id);
    }
}

fn list(registry: &PluginRegistry, active_only: bool, inactive_only: bool) {
    let mut shown = 0;
    for plugin in registry.iter_plugins() {
        let active = registry.is_active(plugin.id());
        if (active_only && !active) || (inactive_only && active) {
            continue;
        }
        let status = if active { "active" } else { "inactive" };
        let version = plugin.version().unwrap_or("(no manifest)");
        println!("{:<9} {:<24} {}", status, plugin.id(), version);
        shown += 1;
    }
    if shown == 0 {
        println!("No plugins found.");
    }
}

fn show(registry: &PluginRegistry, id: &str) -> Result<()> {
    let plugin = registry
        .get_plugin(id)
        .ok_or_else(|| PluginSystemError::invalid_reference(id))?;
    let manifest = plugin
        .manifest()
        .ok_or_else(|| PluginSystemError::invalid_manifest(id))?;
    let issues = registry.check_requirements(id)?;

    println!("{} ({})", manifest.name, manifest.id);
    println!("  version:    {}", manifest.version);
    println!(
        "  status:     {}",
        if registry.is_active(id) { "active" } else { "inactive" }
    );
    if !manifest.description.is_empty() {
        println!("  about:      {}", manifest.description);
    }
    println!("  author:     {}", manifest.author);
    if let Some(website) = &manifest.website {
        println!("  website:    {}", website);
    }
    if let Some(license) = &manifest.license {
        println!("  license:    {}", license);
    }
    if !manifest.tags.is_empty() {
        println!("  tags:       {}", manifest.tags.join(", "));
    }
    for dep in manifest.requires() {
        println!("  requires:   {}", dep);
    }
    for dep in manifest.conflicts() {
        println!("  conflicts:  {}", dep);
    }
    for dependent in registry.active_dependents(id) {
        println!("  needed by:  {}", dependent);
    }
    for issue in &issues {
        println!("  issue:      {}", issue);
    }
    Ok(())
}

fn check(registry: &PluginRegistry) -> bool {
    let report = registry.consistency_report();
    if report.is_empty() {
        println!("All {} active plugin(s) are consistent.", registry.active_count());
        return true;
    }
    for (id, issues) in report {
        for issue in issues {
            println!("{}: {}", id, issue);
        }
    }
    false
}

/// Execute the parsed command. `Ok(false)` means the command ran but something
/// was refused or inconsistent.
pub async fn run(args: &CliArgs, config: &AppConfig) -> Result<bool> {
    let mut session = Session::open(config).await?;

    match &args.command {
        Commands::List { active, inactive } => {
            list(&session.registry, *active, *inactive);
            Ok(true)
        }
        Commands::Show { id } => show(&session.registry, id).map(|()| true),
        Commands::Activate(change) => session.change(PlannedAction::Activate, change).await,
        Commands::Deactivate(change) => session.change(PlannedAction::Deactivate, change).await,
        Commands::Check => Ok(check(&session.registry)),
    }
}
