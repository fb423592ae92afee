//! `contentkit`: command-line access to the contentkit helpers.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use env_logger::fmt::WriteStyle;
use log::{LevelFilter, debug, info};
use serde::Serialize;
use uuid::Uuid;

use contentkit_core::paths::write_default_config;
use contentkit_core::{
    AppConfig, AppPaths, CommandLine, HashMethod, REPO_URL, filename, files, hash,
};

const APP_NAME: &str = env!("CARGO_BIN_NAME");

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = RuntimeContext::new(cli.common.clone())?;
    ctx.init_logging();
    debug!("resolved paths: {}", ctx.paths);

    match cli.command {
        Command::Args(cmd) => handle_args(&ctx, cmd),
        Command::Guid { command } => handle_guid(&ctx, command),
        Command::File { command } => handle_file(&ctx, command),
        Command::Hash(cmd) => handle_hash(&ctx, cmd),
        Command::Init(cmd) => handle_init(&ctx, cmd),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Completions { shell } => {
            handle_completions(shell);
            Ok(())
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Command-line tokenizing, filename GUID tagging and digest helpers.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Enable debug logging (equivalent to -vv)
    #[arg(long, global = true)]
    debug: bool,
    /// Enable trace logging (overrides other levels)
    #[arg(long, global = true)]
    trace: bool,
    /// Output machine readable JSON
    #[arg(long, global = true, conflicts_with = "yaml")]
    json: bool,
    /// Output machine readable YAML
    #[arg(long, global = true)]
    yaml: bool,
    /// Disable ANSI colors in output
    #[arg(long = "no-color", global = true, conflicts_with = "color")]
    no_color: bool,
    /// Control color output (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    color: ColorOption,
    /// Do not change anything on disk
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    /// Assume "yes" for interactive prompts
    #[arg(short = 'y', long = "yes", global = true)]
    assume_yes: bool,
    /// Emit additional diagnostics for troubleshooting
    #[arg(long = "diagnostics", global = true)]
    diagnostics: bool,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorOption {
    /// Detect terminal capabilities automatically.
    Auto,
    /// Always emit ANSI color codes.
    Always,
    /// Never emit ANSI color codes.
    Never,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Tokenize a raw command line and map its -name/value parameters
    Args(ArgsCommand),
    /// Detect, add, remove and rearrange GUIDs in file names
    Guid {
        #[command(subcommand)]
        command: GuidCommand,
    },
    /// Classify and clean up file names
    File {
        #[command(subcommand)]
        command: FileCommand,
    },
    /// Compute a SHA-2 digest of text or a file
    Hash(HashCommand),
    /// Create the default config file
    Init(InitCommand),
    /// Inspect and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Args)]
struct ArgsCommand {
    /// Full command line, executable first; defaults to this process's own arguments
    #[arg(value_name = "LINE")]
    line: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
enum GuidCommand {
    /// Report whether the name carries a GUID
    Contains {
        /// File name or locator
        name: String,
    },
    /// Print the embedded GUID (nil when absent)
    Parse {
        /// File name or locator
        name: String,
    },
    /// Tag the name with a GUID
    Add {
        /// File name or locator
        name: String,
        /// GUID to embed; a random one is generated when omitted
        #[arg(long, value_name = "UUID")]
        guid: Option<Uuid>,
    },
    /// Remove the GUID, keeping directory, extension and fragment
    Remove {
        /// File name or locator
        name: String,
    },
    /// Print the bare file name without directory, fragment or GUID
    Strip {
        /// File name or locator
        name: String,
    },
    /// Insert a suffix before the last `_` segment
    Suffix {
        /// File name or text
        name: String,
        /// Text to insert
        suffix: String,
        /// Treat NAME as plain text rather than a file locator
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum FileCommand {
    /// Report MIME type and XML/image classification
    Info {
        /// File name, path or URL
        name: String,
    },
    /// Remove characters that are unsafe in file names
    Clean {
        /// File name
        name: String,
        /// Keep whitespace instead of converting it to `_`
        #[arg(long)]
        keep_spaces: bool,
        /// Replace reserved characters with `-` instead of removing unsafe ones
        #[arg(long, conflicts_with = "keep_spaces")]
        replace: bool,
    },
}

#[derive(Debug, Clone, Args)]
struct HashCommand {
    /// Text to digest
    #[arg(value_name = "TEXT", required_unless_present = "file", conflicts_with = "file")]
    text: Option<String>,
    /// Digest the contents of a file instead
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Digest algorithm (defaults to the configured method)
    #[arg(long, value_enum)]
    method: Option<MethodArg>,
    /// Keep only this many leading digest bytes (defaults to the configured length)
    #[arg(long = "max-length", value_name = "BYTES")]
    max_length: Option<usize>,
    /// Digest the UTF-16LE encoding of TEXT
    #[arg(long, conflicts_with = "file")]
    xml: bool,
}

/// Digest algorithm as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
}

impl From<MethodArg> for HashMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Sha256 => Self::Sha256,
            MethodArg::Sha512 => Self::Sha512,
        }
    }
}

#[derive(Debug, Clone, Copy, Args)]
struct InitCommand {
    /// Recreate configuration even if it already exists
    #[arg(long = "force")]
    force: bool,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Output the effective configuration
    Show,
    /// Print the resolved config file path
    Path,
    /// Print the JSON schema for the config file
    Schema,
    /// Regenerate the default configuration file
    Reset,
}

#[derive(Debug, Clone)]
struct RuntimeContext {
    common: CommonOpts,
    paths: AppPaths,
    config: AppConfig,
}

impl RuntimeContext {
    fn new(common: CommonOpts) -> Result<Self> {
        let paths = AppPaths::discover(common.config.clone())?;
        let config = AppConfig::load(&paths, common.dry_run)?;
        Ok(Self {
            common,
            paths,
            config,
        })
    }

    fn init_logging(&self) {
        if self.common.quiet {
            log::set_max_level(LevelFilter::Off);
            return;
        }

        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

        builder.filter_level(self.effective_log_level());

        let force_color = matches!(self.common.color, ColorOption::Always)
            || env::var_os("FORCE_COLOR").is_some();
        let disable_color = self.common.no_color
            || matches!(self.common.color, ColorOption::Never)
            || env::var_os("NO_COLOR").is_some()
            || (!force_color && !io::stderr().is_terminal());

        if disable_color {
            builder.write_style(WriteStyle::Never);
        } else if force_color {
            builder.write_style(WriteStyle::Always);
        } else {
            builder.write_style(WriteStyle::Auto);
        }

        if self.common.diagnostics {
            builder.format_timestamp_millis();
            builder.format_module_path(true);
            builder.format_target(true);
        }

        if let Err(err) = builder.try_init() {
            if self.common.verbose > 0 {
                eprintln!("logger already initialized: {err}");
            }
        }
    }

    fn effective_log_level(&self) -> LevelFilter {
        if self.common.trace {
            LevelFilter::Trace
        } else if self.common.debug {
            LevelFilter::Debug
        } else {
            match self.common.verbose {
                0 => self.config.logging.level.into(),
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    /// Print `value` as JSON or YAML when requested, otherwise as `plain`.
    fn emit<T: Serialize>(&self, value: &T, plain: impl FnOnce() -> String) -> Result<()> {
        let output = if self.common.json {
            serde_json::to_string_pretty(value).context("serializing output to JSON")?
        } else if self.common.yaml {
            serde_yaml::to_string(value).context("serializing output to YAML")?
        } else {
            plain()
        };
        println!("{}", output.trim_end());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ArgsReport<'a> {
    executable_path: &'a str,
    tokens: &'a [String],
    parameters: &'a contentkit_core::Parameters,
    unterminated_quote: bool,
}

fn handle_args(ctx: &RuntimeContext, cmd: ArgsCommand) -> Result<()> {
    let parsed = match cmd.line {
        Some(line) => CommandLine::parse(&line),
        None => CommandLine::from_env(),
    }
    .context("parsing command line")?;

    let report = ArgsReport {
        executable_path: parsed.executable_path(),
        tokens: parsed.tokens(),
        parameters: parsed.parameters(),
        unterminated_quote: parsed.has_unterminated_quote(),
    };

    ctx.emit(&report, || {
        let mut out = format!("executable: {}\n", report.executable_path);
        out.push_str(&format!("tokens:     {:?}\n", report.tokens));
        for (name, value) in report.parameters.iter() {
            out.push_str(&format!("  {name} = {value:?}\n"));
        }
        if report.unterminated_quote {
            out.push_str("warning: line ends inside an open quote\n");
        }
        out
    })
}

#[derive(Debug, Serialize)]
struct TransformReport {
    input: String,
    result: serde_json::Value,
}

fn handle_guid(ctx: &RuntimeContext, command: GuidCommand) -> Result<()> {
    let (input, result) = match command {
        GuidCommand::Contains { name } => {
            let found = filename::contains_guid(&name);
            (name, serde_json::Value::Bool(found))
        }
        GuidCommand::Parse { name } => {
            let guid = filename::parse_guid(&name);
            (name, serde_json::Value::String(guid.to_string()))
        }
        GuidCommand::Add { name, guid } => {
            let guid = guid.unwrap_or_else(Uuid::new_v4);
            let tagged = filename::add_guid_with_extension(
                &name,
                guid,
                &ctx.config.names.default_extension,
            );
            (name, serde_json::Value::String(tagged))
        }
        GuidCommand::Remove { name } => {
            let removed = filename::remove_guid(&name);
            (name, serde_json::Value::String(removed))
        }
        GuidCommand::Strip { name } => {
            let stripped = filename::strip_guid(&name);
            (name, serde_json::Value::String(stripped))
        }
        GuidCommand::Suffix {
            name,
            suffix,
            plain,
        } => {
            let out = if plain {
                filename::append_suffix(&name, &suffix)
            } else {
                filename::append_file_name_suffix(&name, &suffix)
            };
            (name, serde_json::Value::String(out))
        }
    };

    let report = TransformReport { input, result };
    ctx.emit(&report, || match &report.result {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[derive(Debug, Serialize)]
struct FileInfoReport {
    name: String,
    file_name: String,
    mime_type: &'static str,
    xml: bool,
    image: bool,
    browser_image: bool,
    thumbnail: bool,
}

fn handle_file(ctx: &RuntimeContext, command: FileCommand) -> Result<()> {
    match command {
        FileCommand::Info { name } => {
            let report = FileInfoReport {
                file_name: files::file_name(&name),
                mime_type: files::find_mime_type(&name),
                xml: files::file_is_xml(&name),
                image: files::is_image_file(&name),
                browser_image: files::is_browser_image(&name),
                thumbnail: files::can_create_thumbnail(&name),
                name,
            };
            ctx.emit(&report, || {
                format!(
                    "file name: {}\nmime type: {}\nxml: {}\n\
                     image: {}\nbrowser image: {}\nthumbnail: {}",
                    report.file_name,
                    report.mime_type,
                    report.xml,
                    report.image,
                    report.browser_image,
                    report.thumbnail
                )
            })
        }
        FileCommand::Clean {
            name,
            keep_spaces,
            replace,
        } => {
            let cleaned = if replace {
                files::format_file_name(&name)
            } else if keep_spaces {
                files::clean_file_name_with(&name, None, files::UNSAFE_CHARS)
            } else {
                files::clean_file_name(&name)
            };
            let report = TransformReport {
                input: name,
                result: serde_json::Value::String(cleaned),
            };
            ctx.emit(&report, || match &report.result {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct HashReport {
    method: HashMethod,
    digest: String,
}

fn handle_hash(ctx: &RuntimeContext, cmd: HashCommand) -> Result<()> {
    let method = cmd.method.map_or(ctx.config.hash.method, HashMethod::from);
    let max_length = cmd.max_length.unwrap_or(ctx.config.hash.max_length);

    let digest = match (cmd.file, cmd.text) {
        (Some(path), _) => {
            hash::hash_file_string(&path, method, max_length)
                .with_context(|| format!("hashing {}", path.display()))?
        }
        (None, Some(text)) if cmd.xml => hash::xml_hash_string(&text, method, max_length),
        (None, Some(text)) => hash::hash_string(&text, method, max_length),
        (None, None) => return Err(anyhow!("either TEXT or --file is required")),
    };

    let report = HashReport { method, digest };
    ctx.emit(&report, || report.digest.clone())
}

fn handle_init(ctx: &RuntimeContext, cmd: InitCommand) -> Result<()> {
    if ctx.paths.config_file.exists() && !(cmd.force || ctx.common.assume_yes) {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            ctx.paths.config_file.display()
        ));
    }

    if ctx.common.dry_run {
        info!(
            "dry-run: would write default config to {}",
            ctx.paths.config_file.display()
        );
        return Ok(());
    }

    write_default_config(&ctx.paths.config_file)
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => ctx.emit(&ctx.config, || format!("{:#?}", ctx.config)),
        ConfigCommand::Path => {
            println!("{}", ctx.paths.config_file.display());
            Ok(())
        }
        ConfigCommand::Schema => {
            println!("{}", contentkit_core::generate_schema(REPO_URL)?);
            Ok(())
        }
        ConfigCommand::Reset => {
            if ctx.common.dry_run {
                info!(
                    "dry-run: would reset config at {}",
                    ctx.paths.config_file.display()
                );
                return Ok(());
            }
            write_default_config(&ctx.paths.config_file)
        }
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}
