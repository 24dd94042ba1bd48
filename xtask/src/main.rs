use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use ui_assets_core::manifest::{AssetManifest, MANIFEST_FILE_NAME};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "ui_assets_lambda";
const LAMBDA_BIN: &str = "ui_copy_assets";
const DEFAULT_MANIFEST: &str = "crates/ui_assets_lambda/ui-manifest.json";
const DIST_DIR: &str = "dist";
const ARTIFACT_NAME: &str = "ui-copy-assets.zip";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the UI asset deployer workspace",
    long_about = "Packages the asset deployer Lambda, regenerates the website\n\
                  asset manifest, and runs CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Write the asset manifest for a built website directory
    UiManifest {
        /// Directory holding the built website
        #[arg(long)]
        website_dir: PathBuf,
        /// Output file path
        #[arg(long, default_value = DEFAULT_MANIFEST)]
        output: PathBuf,
    },
    /// Build the asset deployer and package it with its manifest
    ServerlessPackage {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Asset manifest bundled next to the bootstrap binary
        #[arg(long, env = "UI_MANIFEST_PATH", default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Unit and integration tests
    Test,
    /// Lint + test
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    exit(1);
}

// ── packaging ──────────────────────────────────────────────────────

fn package_asset_deployer(target: &str, profile: BuildProfile, manifest: &Path) {
    ensure_rust_target_installed(target);
    check_manifest(manifest);

    step("Build asset deployer binary");
    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--target",
        target,
        "--bin",
        LAMBDA_BIN,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifact");
    let binary = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(LAMBDA_BIN);
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir)
        .unwrap_or_else(|error| fail(format!("failed to create {DIST_DIR}: {error}")));

    let artifact = dist_dir.join(ARTIFACT_NAME);
    package_lambda_zip(&binary, manifest, &artifact);
    eprintln!("\nPackaged artifact:\n- {}", artifact.display());
}

fn ensure_rust_target_installed(target: &str) {
    let output = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && !installed.lines().any(|line| line.trim() == target) {
        fail(format!(
            "rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- serverless-package`"
        ));
    }
}

fn check_manifest(manifest: &Path) {
    match validate_manifest(manifest) {
        Ok(assets) => eprintln!("asset manifest lists {} entries", assets.len()),
        Err(message) => fail(message),
    }
}

/// Loads the manifest with the deployer's own parser, so packaging refuses
/// anything the deployer would reject at runtime. An empty manifest would
/// deploy nothing and is rejected too.
fn validate_manifest(manifest: &Path) -> Result<AssetManifest, String> {
    let assets = AssetManifest::load(manifest).map_err(|error| error.to_string())?;
    if assets.is_empty() {
        let path = manifest.display();
        return Err(format!("asset manifest '{path}' lists no assets"));
    }
    Ok(assets)
}

fn package_lambda_zip(binary_path: &Path, manifest_path: &Path, zip_path: &Path) {
    let binary = fs::read(binary_path).unwrap_or_else(|error| {
        fail(format!(
            "expected lambda binary at '{}': {error}",
            binary_path.display()
        ))
    });
    let manifest = fs::read(manifest_path)
        .unwrap_or_else(|error| fail(format!("failed to read asset manifest: {error}")));

    let file = fs::File::create(zip_path)
        .unwrap_or_else(|error| fail(format!("failed to create lambda zip: {error}")));
    if let Err(error) = write_lambda_zip(file, &binary, &manifest) {
        fail(format!("failed to write lambda zip: {error}"));
    }
}

fn write_lambda_zip(file: fs::File, binary: &[u8], manifest: &[u8]) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(file);
    let executable = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    let readable = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    zip.start_file("bootstrap", executable)?;
    zip.write_all(binary)?;
    zip.start_file(MANIFEST_FILE_NAME, readable)?;
    zip.write_all(manifest)?;
    zip.finish()?;
    Ok(())
}

// ── asset manifest ─────────────────────────────────────────────────

fn write_ui_manifest(website_dir: &Path, output: &Path) {
    let mut assets = Vec::new();
    collect_assets(website_dir, website_dir, &mut assets);
    if assets.is_empty() {
        fail(format!("no assets found under '{}'", website_dir.display()));
    }
    assets.sort();

    let manifest: Map<String, Value> = assets
        .into_iter()
        .map(|asset| (asset.clone(), Value::String(asset)))
        .collect();
    let text = serde_json::to_string_pretty(&manifest)
        .unwrap_or_else(|error| fail(format!("failed to serialize asset manifest: {error}")));
    fs::write(output, text + "\n")
        .unwrap_or_else(|error| fail(format!("failed to write '{}': {error}", output.display())));

    eprintln!("wrote {} entries to {}", manifest.len(), output.display());
}

/// Collects `/`-separated paths of every file below `dir`, relative to `root`.
fn collect_assets(root: &Path, dir: &Path, assets: &mut Vec<String>) {
    let entries = fs::read_dir(dir)
        .unwrap_or_else(|error| fail(format!("failed to read '{}': {error}", dir.display())));
    for entry in entries {
        let path = entry
            .unwrap_or_else(|error| fail(format!("failed to read directory entry: {error}")))
            .path();
        if path.is_dir() {
            collect_assets(root, &path, assets);
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            let key: Vec<String> = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned())
                .collect();
            assets.push(key.join("/"));
        }
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test ui_assets_core");
    run_cargo(&["test", "-p", "ui_assets_core"]);

    step("Test ui_assets_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);

    step("Test xtask");
    run_cargo(&["test", "-p", "xtask"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::Check => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::UiManifest {
            website_dir,
            output,
        } => write_ui_manifest(&website_dir, &output),
        Commands::ServerlessPackage {
            target,
            profile,
            manifest,
        } => package_asset_deployer(&target, profile, &manifest),
    }
}
