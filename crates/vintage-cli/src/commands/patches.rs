//! Patch listing command.

use clap::Args;
use vintage_config::{
    FACTORY_PATCH_NAMES, Patch, get_factory_patch, list_user_patches, patch_name_from_path,
    resolve_patch, user_patches_dir, validate_patch,
};

#[derive(Args)]
pub struct PatchesArgs {
    /// Print one patch (factory name, user name or path) as TOML
    #[arg(long, value_name = "NAME")]
    show: Option<String>,
}

pub fn run(args: PatchesArgs) -> anyhow::Result<()> {
    match args.show {
        Some(name) => show_patch(&name),
        None => list_patches(),
    }
}

fn list_patches() -> anyhow::Result<()> {
    println!("Factory Patches:");
    println!("================");
    for id in FACTORY_PATCH_NAMES {
        if let Some(patch) = get_factory_patch(id) {
            let desc = patch.description.as_deref().unwrap_or("");
            println!("  {:12} {:14} - {}", id, patch.name, desc);
        }
    }
    println!();

    println!("User Patches ({}):", user_patches_dir().display());
    println!("=============");
    let user_patches = list_user_patches();
    if user_patches.is_empty() {
        println!("  (none)");
    }
    for path in user_patches {
        let name = patch_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
        match Patch::load(&path) {
            Ok(patch) => {
                let desc = patch.description.as_deref().unwrap_or("");
                println!("  {:26} - {}", name, desc);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "{e}");
                println!("  {:26} - (error loading)", name);
            }
        }
    }
    println!();

    Ok(())
}

fn show_patch(name: &str) -> anyhow::Result<()> {
    let patch = resolve_patch(name)?;

    print!("{}", patch.to_toml()?);

    if let Err(e) = validate_patch(&patch) {
        println!();
        println!("# warning: {e}");
    }

    Ok(())
}
