use colored::Colorize;

use super::{
    Context,
    database::{Database, database_names},
    env_file::{development_overrides, rewrite, testing_overrides},
    preconditions::{assert_directory, normalize_name},
    setup::run_steps,
    vhost,
};
use crate::{
    config::{CredentialSource, load_root_password},
    docker::compose::warn_missing_services,
    error::Result,
};

/// Resolve the MySQL admin password from the stack's .env
fn resolve_root_password(ctx: &Context) -> String {
    let env_path = ctx.root().join(".env");
    let password = load_root_password(&env_path, &ctx.settings.database.default_root_password);

    match &password.source {
        CredentialSource::EnvFile | CredentialSource::FileAbsent => {}
        CredentialSource::KeyAbsent => {
            println!(
                "{} MYSQL_ROOT_PASSWORD not set in {}, using default",
                "ℹ".blue(),
                env_path.display()
            );
        }
        CredentialSource::Malformed(e) => {
            println!(
                "{} Warning: Could not parse {} ({}), using default MySQL root password",
                "⚠".yellow(),
                env_path.display(),
                e
            );
        }
    }

    password.value
}

/// Create vhost, databases and hosts entry for a project
pub fn new(ctx: &Context, raw_name: &str) -> Result<()> {
    let name = normalize_name(raw_name)?;
    let stack = &ctx.settings.stack;
    assert_directory(&ctx.base_dir, &stack.root)?;

    let root = ctx.root();
    let root_password = resolve_root_password(ctx);

    println!(
        "{}",
        format!("Creating new Laradock project {} configuration...", name).blue()
    );

    let vhost_path = vhost::create(&root, stack, &name)?;
    println!("{} Created {}", "✓".green(), vhost_path.display());

    warn_missing_services(&root, &[stack.web_service.as_str(), stack.database_service.as_str()]);

    // Restart so nginx reloads its sites when the stack is already running
    let compose = ctx.compose();
    compose.restart_core()?;

    let database = Database {
        compose: &compose,
        service: &stack.database_service,
        root_password: &root_password,
    };
    for db in database_names(&name) {
        println!(
            "{}",
            format!("Creating {} database and user...", db).blue()
        );
        database.create(&db)?;
    }

    let domain = ctx.settings.domain(&name);
    println!(
        "{}",
        format!(
            "Updating {} to make {} accessible...",
            ctx.settings.hosts.path.display(),
            domain
        )
        .blue()
    );
    ctx.hosts_editor().add(&ctx.settings.hosts.address, &domain)?;

    println!();
    println!(
        "{} Project {} configured at {}",
        "✓".green(),
        name.bright_white(),
        ctx.settings.app_url(&name)
    );

    Ok(())
}

/// Remove vhost, databases and hosts entry of a project
pub fn rm(ctx: &Context, raw_name: &str) -> Result<()> {
    let name = normalize_name(raw_name)?;
    let stack = &ctx.settings.stack;
    assert_directory(&ctx.base_dir, &stack.root)?;

    let root = ctx.root();
    let root_password = resolve_root_password(ctx);

    println!(
        "{}",
        format!("Deleting Laradock project {} configuration...", name).blue()
    );

    if vhost::remove(&root, stack, &name)? {
        println!(
            "{} Removed {}",
            "✓".green(),
            vhost::vhost_path(&root, stack, &name).display()
        );
    } else {
        println!(
            "{} No vhost found at {}",
            "⚠".yellow(),
            vhost::vhost_path(&root, stack, &name).display()
        );
    }

    warn_missing_services(&root, &[stack.web_service.as_str(), stack.database_service.as_str()]);

    let compose = ctx.compose();
    compose.up_core()?;

    let database = Database {
        compose: &compose,
        service: &stack.database_service,
        root_password: &root_password,
    };
    for db in database_names(&name) {
        println!(
            "{}",
            format!("Deleting {} database and user...", db).blue()
        );
        database.drop(&db)?;
    }

    ctx.hosts_editor().remove(&ctx.settings.domain(&name))?;

    println!();
    println!("{} Project {} removed", "✓".green(), name.bright_white());

    Ok(())
}

/// Write env files and run the setup steps for an existing project checkout
pub fn init(ctx: &Context, raw_name: &str) -> Result<()> {
    let name = normalize_name(raw_name)?;
    let stack = &ctx.settings.stack;
    assert_directory(&ctx.base_dir, &stack.root)?;
    assert_directory(&ctx.base_dir, &name)?;

    println!(
        "{}",
        format!(
            "Initializing {} laravel project inside {} directory...",
            name, name
        )
        .blue()
    );
    println!("{}", "Updating .env and .env.testing...".blue());

    let project_dir = ctx.project_dir(&name);
    let template = project_dir.join(".env.example");

    let targets = [
        (".env", development_overrides(&ctx.settings, &name)),
        (".env.testing", testing_overrides(&ctx.settings, &name)),
    ];
    for (file_name, overrides) in &targets {
        let missing = rewrite(&template, &project_dir.join(file_name), overrides)?;
        if !missing.is_empty() {
            println!(
                "{} {} has no {} entries; left unchanged",
                "⚠".yellow(),
                template.display(),
                missing.join(", ")
            );
        }
        println!("{} Wrote {}", "✓".green(), project_dir.join(file_name).display());
    }

    let root = ctx.root();
    warn_missing_services(
        &root,
        &[
            stack.web_service.as_str(),
            stack.database_service.as_str(),
            stack.workspace_service.as_str(),
        ],
    );

    let compose = ctx.compose();
    compose.up_core()?;

    println!(
        "{}",
        format!("Running setup in {} container...", stack.workspace_service).blue()
    );
    run_steps(&compose, stack, &name, &ctx.settings.setup.steps)?;

    println!();
    println!(
        "{} Project {} initialized, visit {}",
        "✓".green(),
        name.bright_white(),
        ctx.settings.app_url(&name)
    );

    Ok(())
}

/// Placeholder for reconciling on-disk projects with generated configuration
pub fn discover(ctx: &Context) -> Result<()> {
    assert_directory(&ctx.base_dir, &ctx.settings.stack.root)?;

    println!(
        "{} Updating existing configuration to reflect directory structure is not implemented yet",
        "ℹ".blue()
    );

    Ok(())
}
