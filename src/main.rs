use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use livedict::core::{print_error_message, read_input, write_output, LivedictError};
use livedict::env::{self, core::LogLevel, core::NoColor, EnvVar};
use livedict::parsers::html::{serialize_document, HtmlTree};
use livedict::translation::config::constants::BILINGUAL_SETTING_KEY;
use livedict::translation::{
    merge_seed_files, ConfigManager, DictionaryLoader, Engine, ExportSink, FrameBudget,
    JsonFileSettings, MemorySettings, SettingsStore, TermExport, TranslationConfig,
};

#[derive(Parser)]
#[command(name = "livedict", about = "Dictionary-driven translation of HTML documents", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to config file (TOML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate an HTML document and print the result
    Translate {
        /// Input file, http(s) URL, or `-` for stdin
        input: String,

        /// Dictionary source: file path, http(s) URL or inline JSON (repeatable)
        #[arg(long = "dictionary", short = 'd')]
        dictionaries: Vec<String>,

        /// Append the original phrase after each translation
        #[arg(long)]
        bilingual: bool,

        /// Output file (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<String>,
    },

    /// Extract candidate phrases from HTML documents into a seed dictionary
    ExportTerms {
        /// Input files or http(s) URLs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output file (stdout when omitted or unwritable)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Fill empty translations in TARGET from SOURCE
    Merge { target: PathBuf, source: PathBuf },

    /// Flip the persisted bilingual mode
    ToggleBilingual,

    /// Force-load the dictionary and report the result
    Refresh {
        /// Dictionary source (repeatable)
        #[arg(long = "dictionary", short = 'd')]
        dictionaries: Vec<String>,
    },

    /// Print the supported environment variables as Markdown
    EnvDocs,
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "off".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        LogLevel::get_or_default("warn".to_string())
    };

    let ansi = !NoColor::get_or_default(false) && atty::is(atty::Stream::Stderr);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_ansi(ansi)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        print_error_message(&format!("Error: {}", e));
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<TranslationConfig, LivedictError> {
    let manager = match path {
        Some(path) => ConfigManager::from_file(&path.to_string_lossy())?,
        None => ConfigManager::new()?,
    };
    Ok(manager.into_config())
}

fn open_settings(config: &TranslationConfig) -> Box<dyn SettingsStore> {
    let path = config
        .settings_path
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .or_else(JsonFileSettings::default_path);

    match path {
        Some(path) => Box::new(JsonFileSettings::open(path)),
        None => {
            tracing::warn!("无法确定设置目录，双语开关不会被保存");
            Box::new(MemorySettings::new())
        }
    }
}

fn run(cli: Cli) -> Result<(), LivedictError> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Translate {
            input,
            dictionaries,
            bilingual,
            output,
        } => {
            if !dictionaries.is_empty() {
                config.dictionary_sources = dictionaries;
            }
            // 命令行参数与环境变量优先于保存的设置
            let forced = if bilingual {
                Some(true)
            } else {
                env::engine::Bilingual::get_if_set().and_then(Result::ok)
            };
            config.bilingual = match forced {
                Some(enabled) => enabled,
                None => open_settings(&config).get_bool(BILINGUAL_SETTING_KEY, config.bilingual),
            };

            let data = read_input(&input, config.request_timeout())?;
            let tree = HtmlTree::parse_bytes(&data);
            let charset = tree.charset().unwrap_or_default();

            let mut engine = Engine::new(tree, &config)?;
            if let Some(dictionary) = DictionaryLoader::from_config(&config).load() {
                engine.install_dictionary(dictionary);
            }

            if engine.start() {
                let processed = engine.run_until_idle(&mut FrameBudget::from_config(&config));
                let stats = engine.stats();
                tracing::info!(
                    "处理 {} 个节点，改写文本 {} 处、属性 {} 处，缓存命中率 {:.1}%",
                    processed,
                    stats.texts_rewritten,
                    stats.attributes_rewritten,
                    engine.cache_stats().hit_rate() * 100.0
                );
            }

            let result = serialize_document(engine.tree(), &charset);
            write_output(output.as_deref(), &result)?;
        }

        Commands::ExportTerms { inputs, output } => {
            let mut export = TermExport::new();
            for input in &inputs {
                let data = read_input(input, config.request_timeout())?;
                export.collect(&HtmlTree::parse_bytes(&data));
            }

            if let ExportSink::File(path) = export.write(output.as_deref())? {
                eprintln!("Written {} terms to {}", export.len(), path.display());
            }
        }

        Commands::Merge { target, source } => {
            let updated = merge_seed_files(&target, &source)?;
            println!("Successfully updated {} entries.", updated);
        }

        Commands::ToggleBilingual => {
            let mut settings = open_settings(&config);
            let enabled = !settings.get_bool(BILINGUAL_SETTING_KEY, config.bilingual);
            settings.set_bool(BILINGUAL_SETTING_KEY, enabled)?;
            println!("bilingual mode: {}", if enabled { "on" } else { "off" });
        }

        Commands::Refresh { dictionaries } => {
            if !dictionaries.is_empty() {
                config.dictionary_sources = dictionaries;
            }
            match DictionaryLoader::from_config(&config).load() {
                Some(dictionary) => println!("loaded {} entries", dictionary.len()),
                None => return Err(LivedictError::new("no dictionary could be loaded")),
            }
        }

        Commands::EnvDocs => {
            print!("{}", env::generate_env_docs());
        }
    }

    Ok(())
}
