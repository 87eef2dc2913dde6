use crate::cli::LintArgs;
use color_eyre::eyre::{Result, WrapErr};
use duct::cmd;

fn step(msg: &str) {
    println!("\x1b[0;36m\x1b[1m==>\x1b[0m {msg}");
}

/// Run the same checks CI runs, stopping at the first failure.
pub fn lint(args: &LintArgs) -> Result<()> {
    if args.fix {
        step("Formatting");
        cmd!("cargo", "fmt", "--all").run().wrap_err("cargo fmt failed")?;
    } else {
        step("Checking formatting");
        cmd!("cargo", "fmt", "--all", "--", "--check")
            .run()
            .wrap_err("cargo fmt --check failed")?;
    }

    step("Running clippy");
    cmd!(
        "cargo",
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings"
    )
    .run()
    .wrap_err("cargo clippy failed")?;

    if !args.no_test {
        step("Running tests");
        cmd!("cargo", "test", "--workspace", "--all-targets")
            .run()
            .wrap_err("cargo test failed")?;
    }

    println!("\x1b[0;32mSUCCESS:\x1b[0m all checks passed");
    Ok(())
}
