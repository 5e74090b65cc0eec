//! 辞書の読みを漢字ごとに割り振るユーティリティ
//!
//! このバイナリは、標準入力からCSV形式の辞書を読み込み、読みの列を漢字ごとに
//! ドットで区切って標準出力に書き出します。割り振れなかった行は標準エラー出力に書き出します。
//!
//! ```text
//! split [-r|--test-readings] kanjidic2.xml [other_readings.tsv] < dict.csv > dict.furi.csv
//! ```

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use warifuri::batch::DEFAULT_QUEUE_CAPACITY;
use warifuri::{AlignMode, Aligner, BatchRunner, ReadingDictionaryBuilder, WarifuriError};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(
    name = "split",
    version,
    about = "Splits dictionary readings into per-kanji furigana"
)]
struct Args {
    /// KANJIDIC2 file (XML).
    #[clap(value_name = "DICTIONARY")]
    dictionary: PathBuf,

    /// Additional readings (TSV: kanji or compound, reading).
    #[clap(value_name = "OVERRIDES")]
    overrides: Option<PathBuf>,

    /// Tests the readings: rows that cannot be split are written to stderr.
    #[clap(short = 'r', long)]
    test_readings: bool,

    /// Prints the elapsed time to stderr.
    #[clap(short = 't', long)]
    time: bool,

    /// Number of worker threads. Defaults to the available parallelism.
    #[clap(short = 'j', long)]
    jobs: Option<usize>,

    /// Capacity of the row and result queues.
    #[clap(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_size: usize,
}

/// 実行中に発生する可能性のあるエラー
#[derive(Debug, Error)]
enum SplitError {
    /// 辞書の読み込み中のエラー
    #[error("failed to load the readings: {0}")]
    Dictionary(#[source] WarifuriError),

    /// 設定の誤り
    #[error(transparent)]
    Config(WarifuriError),

    /// 入力の処理中のエラー
    #[error("failed to process the input: {0}")]
    Batch(#[source] WarifuriError),
}

/// ログの出力先を標準エラー出力に設定します。
///
/// レベルは `RUST_LOG` で変更でき、デフォルトは `warn` です。
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn run(args: Args) -> Result<(), SplitError> {
    log::info!("Loading the readings...");
    let dict = ReadingDictionaryBuilder::from_paths(&args.dictionary, args.overrides.as_ref())
        .map_err(SplitError::Dictionary)?;

    let mode = if args.test_readings {
        AlignMode::Strict
    } else {
        AlignMode::Lenient
    };
    let mut runner = BatchRunner::new(Aligner::new(&dict).mode(mode))
        .queue_capacity(args.queue_size)
        .map_err(SplitError::Config)?;
    if let Some(jobs) = args.jobs {
        runner = runner.num_workers(jobs).map_err(SplitError::Config)?;
    }

    let start = Instant::now();
    let stats = runner
        .run(
            io::stdin().lock(),
            BufWriter::new(io::stdout()),
            BufWriter::new(io::stderr()),
        )
        .map_err(SplitError::Batch)?;
    if args.time {
        eprintln!("Took {:.3}s", start.elapsed().as_secs_f64());
    }
    log::info!("{} rows split, {} left unsplit", stats.aligned, stats.unresolved);

    Ok(())
}

/// メイン関数
///
/// 引数の誤りと実行中のエラーはいずれも終了コード1で終了します。
fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                return ExitCode::from(1);
            }
        },
    };

    init_logging();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(1)
        }
    }
}
