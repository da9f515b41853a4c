use std::{env, fs, path::PathBuf};

fn long_arg(name: &'static str, value_name: &'static str, help: &'static str) -> clap::Arg {
    clap::Arg::new(name).long(name).value_name(value_name).help(help)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let read = clap::Command::new("read")
        .about("Read a page, a saved HTML file or stdin as reflowed paragraphs")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (html, text, json)")
                .value_name("FORMAT")
                .default_value("html")
                .value_parser(["html", "text", "json"]),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(long_arg("user-agent", "UA", "Custom User-Agent for the first attempt"))
        .arg(long_arg("fallback-user-agent", "UA", "Custom User-Agent for the retry after an empty extraction"))
        .arg(
            long_arg("allow-domain", "HOST", "Only fetch from this host (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(long_arg("soft-cap", "CHARS", "Target maximum length of a regrouped paragraph").default_value("480"))
        .arg(long_arg("oversize-threshold", "CHARS", "Paragraphs longer than this are regrouped").default_value("700"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    let digest = clap::Command::new("digest")
        .about("Build the morning paper and email it")
        .arg(
            clap::arg!(-c --config <FILE> "Config file (default: ~/.config/broadsheet/digest.json)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("dry-run")
                .long("dry-run")
                .action(clap::ArgAction::SetTrue)
                .help("Build the paper without sending it"),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Also write the rendered HTML to this file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    let completions = clap::Command::new("completions")
        .about("Print a shell completion script")
        .arg(clap::arg!(<SHELL> "Shell to generate for").value_parser(["bash", "elvish", "fish", "powershell", "zsh"]));

    let mut cmd = clap::Command::new("broadsheet")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Broadsheet Contributors")
        .about("Read web pages as reflowed paragraphs and build a morning paper")
        .subcommand_required(true)
        .subcommand(read)
        .subcommand(digest)
        .subcommand(completions);

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "broadsheet", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "broadsheet", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "broadsheet", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "broadsheet", &completions_dir).unwrap();

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
}
