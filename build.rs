// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("simmer")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Simmer Contributors")
        .about("Cook CMake library recipes into installable packages")
        .subcommand_required(true)
        .subcommand(
            Command::new("cook")
                .about("Cook a recipe: generate, configure, build, package and publish")
                .arg(Arg::new("recipe").required(true).help("Path to the recipe file"))
                .arg(
                    Arg::new("root")
                        .long("root")
                        .value_name("DIR")
                        .help("Recipe root (default: the folder containing the recipe)"),
                )
                .arg(
                    Arg::new("setting")
                        .short('s')
                        .long("setting")
                        .value_name("KEY=VALUE")
                        .action(ArgAction::Append)
                        .help("Override a recipe setting, e.g. build_type=Debug"),
                )
                .arg(
                    Arg::new("package_dir")
                        .long("package-dir")
                        .value_name("DIR")
                        .help("Install into this folder instead of <root>/package/<build_type>"),
                )
                .arg(
                    Arg::new("deps_root")
                        .long("deps-root")
                        .value_name("DIR")
                        .help("Folder holding installed dependency packages"),
                )
                .arg(
                    Arg::new("cmake")
                        .long("cmake")
                        .value_name("PATH")
                        .help("Path to the cmake executable"),
                )
                .arg(
                    Arg::new("generator")
                        .short('G')
                        .long("generator")
                        .help("CMake generator, e.g. Ninja"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Number of parallel build jobs"),
                )
                .arg(
                    Arg::new("print_info")
                        .long("print-info")
                        .action(ArgAction::SetTrue)
                        .help("Print the published package metadata as JSON"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("simmer.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
