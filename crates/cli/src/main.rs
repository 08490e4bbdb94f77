//! Rhymelab CLI — pairwise rhyme scoring and verse flow analysis.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use rhymelab_core::{
    EngineConfig, FlowConfig, Lexicon, PhraseMode, RarityIndex, RhymeEngine, StaticStoplist,
    TableFrequencyProvider, Transcription,
};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "rhymelab",
    about = "Phonetic rhyme classification and verse analysis",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score one pair of words, phrases, or raw transcriptions
    Pair(PairArgs),
    /// Analyze a verse, one line per input line
    Verse(VerseArgs),
}

// ─── Shared arguments ────────────────────────────────────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// CMU-format pronunciation dictionary
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Emit JSON instead of human-readable output
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct PairArgs {
    /// First word or phrase
    word_a: String,

    /// Second word or phrase
    word_b: String,

    #[command(flatten)]
    shared: SharedArgs,

    /// Treat inputs as raw ARPABET transcriptions, e.g. "W IH0 DH AW1 T"
    #[arg(long, default_value_t = false)]
    arpabet: bool,

    /// Extract the tail across whole phrases instead of the final
    /// content word
    #[arg(long, default_value_t = false)]
    whole_span: bool,
}

#[derive(Parser, Debug)]
struct VerseArgs {
    /// Verse file, "-" for stdin
    #[arg(default_value = "-")]
    input: String,

    #[command(flatten)]
    shared: SharedArgs,

    /// Maximum line distance compared pairwise
    #[arg(long, default_value_t = 4)]
    window: usize,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let log_level = match &cli.command {
        Command::Pair(a) if a.shared.verbose => "debug",
        Command::Verse(a) if a.shared.verbose => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Pair(args) => run_pair(args),
        Command::Verse(args) => run_verse(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Build an engine from the CLI flags.
fn build_engine(lexicon: Option<&PathBuf>, config: EngineConfig) -> Result<RhymeEngine> {
    let lexicon = match lexicon {
        Some(path) => Lexicon::from_path(path)?,
        None => Lexicon::default(),
    };
    Ok(RhymeEngine::with_config(
        Box::new(lexicon),
        Box::new(StaticStoplist),
        RarityIndex::new(Box::new(TableFrequencyProvider::default())),
        config,
    ))
}

// ─── Pair runner ─────────────────────────────────────────────────

fn run_pair(args: PairArgs) -> Result<()> {
    let mut config = EngineConfig::default();
    if args.whole_span {
        config.phrase_mode = PhraseMode::WholeSpan;
    }

    if args.arpabet {
        let engine = build_engine(args.shared.lexicon.as_ref(), config)?;
        let a = Transcription::parse(&args.word_a)
            .with_context(|| format!("bad transcription: {}", args.word_a))?;
        let b = Transcription::parse(&args.word_b)
            .with_context(|| format!("bad transcription: {}", args.word_b))?;
        let eval = engine.evaluate(&a, &b);
        if args.shared.json {
            println!("{}", serde_json::to_string_pretty(&eval)?);
        } else {
            println!("{}  [WRS {:.3}]", eval.explanation, eval.wrs);
        }
        return Ok(());
    }

    if args.shared.lexicon.is_none() {
        bail!("word-level evaluation needs --lexicon (or use --arpabet)");
    }
    let engine = build_engine(args.shared.lexicon.as_ref(), config)?;
    let result = engine.evaluate_words(&args.word_a, &args.word_b)?;

    if args.shared.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{} / {}  [{} {}]",
            args.word_a, args.word_b, result.pron_a, result.pron_b
        );
        println!("{}  [WRS {:.3}]", result.evaluation.explanation, result.evaluation.wrs);
        if let Some(warning) = &result.warning {
            let classes: Vec<String> =
                warning.classes.iter().map(|c| c.to_string()).collect();
            println!("note: pronunciation variants disagree ({})", classes.join(", "));
        }
    }
    Ok(())
}

// ─── Verse runner ────────────────────────────────────────────────

fn run_verse(args: VerseArgs) -> Result<()> {
    let Some(lexicon) = args.shared.lexicon.as_ref() else {
        bail!("verse analysis needs --lexicon");
    };

    let text = if args.input == "-" {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        std::fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read verse file: {}", args.input))?
    };
    let lines: Vec<String> = text
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        bail!("no verse lines in input");
    }

    let config = EngineConfig {
        flow: FlowConfig { window: args.window },
        ..EngineConfig::default()
    };
    let engine = build_engine(Some(lexicon), config)?;
    let analysis = engine.analyze_verse(&lines);

    if args.shared.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("scheme:  {}", analysis.scheme);
    if let Some(template) = analysis.template {
        println!("template: {:?}", template);
    }
    println!("density: {:.2} matches per 16 syllables", analysis.density);
    for chain in analysis.graph.chains() {
        let nums: Vec<String> = chain.iter().map(|i| (i + 1).to_string()).collect();
        println!("chain:   lines {}", nums.join(", "));
    }
    for (i, (line, class)) in lines.iter().zip(&analysis.per_line_best).enumerate() {
        println!("{:>3}  {:<18} {}", i + 1, class.to_string(), line);
    }
    Ok(())
}
