use crate::install::{remove_prefixed_md, BUNDLE_DIR, PREFIX};
use crate::runtime::{Runtime, Target};
use infra_core::io;

/// Remove only what the installer writes: commands, the bundle directory and
/// `infra-*.md` agents. Returns the number of removed groups.
pub fn uninstall(target: &Target) -> anyhow::Result<usize> {
    println!(
        "  Uninstalling Infra from {} at {}\n",
        target.runtime.label(),
        target.label
    );
    if !target.dir.is_dir() {
        println!("  ⚠ Directory does not exist: {}", target.label);
        println!("  Nothing to uninstall.\n");
        return Ok(0);
    }

    let mut removed = 0;

    if target.runtime == Runtime::OpenCode {
        if remove_prefixed_md(&target.dir.join("command"))? > 0 {
            removed += 1;
            println!("  ✓ Removed infra commands from command/");
        }
    } else if io::remove_if_exists(&target.dir.join("commands").join(PREFIX))? {
        removed += 1;
        println!("  ✓ Removed commands/{PREFIX}/");
    }

    if io::remove_if_exists(&target.dir.join(BUNDLE_DIR))? {
        removed += 1;
        println!("  ✓ Removed {BUNDLE_DIR}/");
    }

    let agents = remove_prefixed_md(&target.dir.join("agents"))?;
    if agents > 0 {
        removed += 1;
        println!("  ✓ Removed {agents} infra agents");
    }

    if removed == 0 {
        println!("  ⚠ No infra files found to remove.");
    }
    println!(
        "\n  Done! Infra has been uninstalled from {}.\n  Your other files and settings have been preserved.\n",
        target.runtime.label()
    );
    Ok(removed)
}
