use clap::{ArgGroup, Parser, ValueEnum};
use deducer::{assemble_message, AlphabetMap, Error, ExamineOrder, IndexCache, Solver, SolverConfig};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

macro_rules! time {
    ($e:expr) => {{
        let mut time = stopwatch::Stopwatch::start_new();
        let result = $e;
        time.stop();
        (time.elapsed(), result)
    }};
}

#[derive(Parser)]
#[command(name = "deducer", about = "Deduce the key of a monoalphabetic substitution cipher")]
#[command(group(ArgGroup::new("source").required(true).args(["message", "message_file"])))]
struct Cli {
    /// An encrypted message
    #[arg(short, long)]
    message: Option<String>,
    /// An encrypted message text file ('#' lines are ignored)
    #[arg(short = 'f', long)]
    message_file: Option<PathBuf>,
    /// Dictionary (words) files, one word per line
    #[arg(short, long, num_args = 1.., default_value = "words/dictionary.txt")]
    words_files: Vec<PathBuf>,
    /// The word examine order
    #[arg(short, long, value_enum, default_value_t = Order::LongestToShortest)]
    order: Order,
    /// More output: -v for progress, -vv for every deduction step
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Don't echo the encrypted message
    #[arg(short, long)]
    suppress_encrypted_text_output: bool,
    /// Give up on a word after this many candidate tuples
    #[arg(long, default_value_t = deducer::solver::DEFAULT_MAX_TUPLES_PER_STEP)]
    max_tuples: u64,
    /// Never give up, however long the search takes
    #[arg(long, conflicts_with = "max_tuples")]
    unbounded: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    #[value(name = "LONGEST_TO_SHORTEST")]
    LongestToShortest,
    #[value(name = "FEWEST_TO_MOST_MATCHES")]
    FewestToMostMatches,
    #[value(name = "MATCHES_DIVIDED_BY_LENGTH")]
    MatchesDividedByLength,
}

impl From<Order> for ExamineOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::LongestToShortest => ExamineOrder::LongestToShortest,
            Order::FewestToMostMatches => ExamineOrder::FewestToMostMatches,
            Order::MatchesDividedByLength => ExamineOrder::MatchesDividedByLength,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let mut cache = IndexCache::new();
    let (elapsed, index) = time!(cache.build_or_load(cli.words_files.as_slice()));
    let index = index?;
    println!(
        "Indexed {} words under {} patterns in {:?}",
        index.len(),
        index.pattern_count(),
        elapsed
    );

    let message = match (&cli.message, &cli.message_file) {
        (Some(message), _) => message.clone(),
        (None, Some(path)) => assemble_message(BufReader::new(File::open(path)?))?,
        (None, None) => String::new(),
    };

    let limit = if cli.unbounded { None } else { Some(cli.max_tuples) };
    let config = SolverConfig::new(cli.order.into()).with_max_tuples_per_step(limit);
    let solver = Solver::new(&index, config);

    println!("Decrypting...");
    let (elapsed, deduction) = time!(solver.deduce(&message).map(|deduction| {
        let decrypted = deduction.alphabet.render(&message);
        (deduction, decrypted)
    }));
    let (deduction, decrypted) = deduction?;

    println!();
    print_alphabets(&deduction.alphabet);
    println!();
    println!("Total tuples examined: {}", deduction.tuples_compared);
    println!("Total time to decrypt: {:?}", elapsed);

    if !cli.suppress_encrypted_text_output {
        println!("\nEncrypted message:\n{}", message);
    }
    println!("\nDecrypted message:\n{}", decrypted);

    Ok(())
}

/// One column per ciphertext letter; ambiguous letters spill their extra candidates into
/// further rows.
fn print_alphabets(alphabet: &AlphabetMap) {
    const CIPHER: &str = "Cipher alphabet";
    const PLAIN: &str = "Plain alphabet";
    let width = CIPHER.len().max(PLAIN.len());

    let columns: Vec<(char, Vec<char>)> = alphabet.iter().map(|(k, d)| (k, d.symbols())).collect();
    let rows = columns.iter().map(|(_, symbols)| symbols.len()).max().unwrap_or(0);

    let header: String = columns.iter().map(|(k, _)| format!(" {}", k)).collect();
    println!("{:width$} |{}", CIPHER, header, width = width);
    println!("{}-+{}", "-".repeat(width), "-".repeat(header.len()));

    for row in 0..rows {
        let label = if row == 0 { PLAIN } else { "" };
        let line: String = columns
            .iter()
            .map(|(_, symbols)| format!(" {}", symbols.get(row).copied().unwrap_or(' ')))
            .collect();
        println!("{:width$} |{}", label, line.trim_end(), width = width);
    }
}
