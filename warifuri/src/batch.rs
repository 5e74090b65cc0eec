//! 辞書ファイル全体に対する並列の割り振り
//!
//! 呼び出し元のスレッドが入力を1行ずつ読み、上限付きのチャネルでワーカーに渡します。
//! ワーカーは割り振りの結果を2本目のチャネルで1つのライターに渡し、
//! ライターだけが出力先に書き込みます。チャネルが閉じることが入力の終わりを表します。
//! 出力の順序は入力の順序と一致するとは限りません。

use std::any::Any;
use std::io::{BufRead, Write};
use std::num::NonZeroUsize;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::aligner::Aligner;
use crate::errors::{Result, WarifuriError};
use crate::furigana::strip_marks;
use crate::utils::{write_csv_row, CsvRecords};

/// キューの容量のデフォルト値
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// 漢字列の列番号のデフォルト値
pub const DEFAULT_KANJI_COLUMN: usize = 0;

/// 読みの列番号のデフォルト値
pub const DEFAULT_READING_COLUMN: usize = 11;

/// 1行の処理結果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowOutcome {
    /// 割り振られた行。出力先に書き込まれます。
    Aligned(Vec<String>),
    /// 寛容モードで分割されなかった行。出力先に書き込まれます。
    Unresolved(Vec<String>),
    /// 厳密モードで割り振れなかった行、または列が足りない行。
    /// 元の行がエラー出力先に書き込まれます。
    Failed(Vec<String>),
}

/// バッチ処理の集計
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// 処理した行の数
    pub rows: usize,
    /// 割り振られた行の数
    pub aligned: usize,
    /// 分割されずに出力された行の数
    pub unresolved: usize,
    /// エラー出力先に書き込まれた行の数
    pub failed: usize,
}

impl BatchStats {
    fn record(&mut self, outcome: &RowOutcome) {
        self.rows += 1;
        match outcome {
            RowOutcome::Aligned(_) => self.aligned += 1,
            RowOutcome::Unresolved(_) => self.unresolved += 1,
            RowOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// CSV形式の辞書の各行に割り振りを適用するランナー
///
/// # 例
///
/// ```
/// use warifuri::dictionary::ReadingDictionaryBuilder;
/// use warifuri::{Aligner, BatchRunner};
///
/// let mut builder = ReadingDictionaryBuilder::new();
/// builder.add_readings("間", &["かん"]);
/// builder.add_readings("接", &["せつ"]);
/// let dict = builder.build();
///
/// let runner = BatchRunner::new(Aligner::new(&dict)).num_workers(2)?;
/// let input = "間接,1,2,3,名詞,一般,*,*,*,*,間接,かんせつ,カンセツ\n";
/// let mut output: Vec<u8> = vec![];
/// let mut errors: Vec<u8> = vec![];
/// let stats = runner.run(input.as_bytes(), &mut output, &mut errors)?;
///
/// assert_eq!(stats.aligned, 1);
/// assert_eq!(
///     String::from_utf8(output)?,
///     "間接,1,2,3,名詞,一般,*,*,*,*,間接,かん.せつ,カンセツ\n",
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct BatchRunner<'d> {
    aligner: Aligner<'d>,
    num_workers: usize,
    queue_capacity: usize,
    kanji_column: usize,
    reading_column: usize,
}

impl<'d> BatchRunner<'d> {
    /// 新しいランナーを作成します。
    ///
    /// ワーカー数は利用可能な並列度、キューの容量は64、
    /// 漢字列と読みの列番号はそれぞれ0と11です。
    pub fn new(aligner: Aligner<'d>) -> Self {
        let num_workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self {
            aligner,
            num_workers,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            kanji_column: DEFAULT_KANJI_COLUMN,
            reading_column: DEFAULT_READING_COLUMN,
        }
    }

    /// ワーカーの数を設定します。
    ///
    /// # エラー
    ///
    /// `num_workers` が0の場合、[`WarifuriError`] が返されます。
    pub fn num_workers(mut self, num_workers: usize) -> Result<Self> {
        if num_workers == 0 {
            return Err(WarifuriError::invalid_argument(
                "num_workers",
                "must be at least 1",
            ));
        }
        self.num_workers = num_workers;
        Ok(self)
    }

    /// キューの容量を設定します。
    ///
    /// 入力と結果の両方のキューがこの容量を持ちます。
    ///
    /// # エラー
    ///
    /// `capacity` が0の場合、[`WarifuriError`] が返されます。
    pub fn queue_capacity(mut self, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(WarifuriError::invalid_argument(
                "queue_capacity",
                "must be at least 1",
            ));
        }
        self.queue_capacity = capacity;
        Ok(self)
    }

    /// 漢字列の列番号を設定します。
    pub const fn kanji_column(mut self, column: usize) -> Self {
        self.kanji_column = column;
        self
    }

    /// 読みの列番号を設定します。
    pub const fn reading_column(mut self, column: usize) -> Self {
        self.reading_column = column;
        self
    }

    /// 1行を処理します。
    ///
    /// 読みの列から区切り記号を取り除いて割り振り、結果をドット区切りで読みの列に書き戻します。
    pub fn process_row(&self, mut row: Vec<String>) -> RowOutcome {
        let result = match (row.get(self.kanji_column), row.get(self.reading_column)) {
            (Some(kanji), Some(reading)) => self.aligner.align(kanji, &strip_marks(reading)),
            _ => return RowOutcome::Failed(row),
        };
        match result {
            Ok(alignment) => {
                row[self.reading_column] = alignment.to_dotted();
                if alignment.is_resolved() {
                    RowOutcome::Aligned(row)
                } else {
                    RowOutcome::Unresolved(row)
                }
            }
            Err(e) => {
                log::debug!("{}: {e}", row[self.kanji_column]);
                RowOutcome::Failed(row)
            }
        }
    }

    /// 入力のすべての行を処理し、結果を出力先とエラー出力先に書き込みます。
    ///
    /// 引用符で囲まれたセルは改行を含んでもかまいません。空行は読み飛ばされます。
    ///
    /// # 引数
    ///
    /// * `input` - CSV形式の辞書のリーダー
    /// * `output` - 割り振られた行と未解決の行の書き込み先
    /// * `errors` - 失敗した行の書き込み先
    ///
    /// # エラー
    ///
    /// 入力の読み込み、出力の書き込みに失敗した場合、
    /// またはワーカーかライターがパニックした場合に [`WarifuriError`] を返します。
    pub fn run<R, W, E>(&self, input: R, output: W, errors: E) -> Result<BatchStats>
    where
        R: BufRead,
        W: Write + Send,
        E: Write + Send,
    {
        thread::scope(|s| {
            let (row_tx, row_rx) = crossbeam_channel::bounded(self.queue_capacity);
            let (outcome_tx, outcome_rx) = crossbeam_channel::bounded(self.queue_capacity);

            let writer = s.spawn(move || write_outcomes(outcome_rx, output, errors));
            let workers: Vec<_> = (0..self.num_workers)
                .map(|_| {
                    let row_rx = row_rx.clone();
                    let outcome_tx = outcome_tx.clone();
                    s.spawn(move || self.work(row_rx, outcome_tx))
                })
                .collect();
            drop(row_rx);
            drop(outcome_tx);

            let fed = self.feed(input, row_tx);

            let mut panicked = None;
            for worker in workers {
                if let Err(e) = worker.join() {
                    panicked = Some(panic_message(e));
                }
            }
            let stats = writer
                .join()
                .map_err(|e| WarifuriError::ThreadPanic(panic_message(e)))??;
            if let Some(msg) = panicked {
                return Err(WarifuriError::ThreadPanic(msg));
            }
            fed?;

            log::info!(
                "Processed {} rows: {} aligned, {} unresolved, {} failed",
                stats.rows,
                stats.aligned,
                stats.unresolved,
                stats.failed,
            );
            Ok(stats)
        })
    }

    /// 入力を1レコードずつ読み、キューに送ります。
    ///
    /// 空白だけの行は読み飛ばします。受け手がいなくなった場合はそこで読み込みをやめます。
    fn feed<R>(&self, input: R, tx: Sender<Vec<String>>) -> Result<()>
    where
        R: BufRead,
    {
        for row in CsvRecords::new(input) {
            let row = row?;
            if let [field] = row.as_slice() {
                if field.trim().is_empty() {
                    continue;
                }
            }
            if tx.send(row).is_err() {
                break;
            }
        }
        Ok(())
    }

    fn work(&self, rx: Receiver<Vec<String>>, tx: Sender<RowOutcome>) {
        for row in rx.iter() {
            if tx.send(self.process_row(row)).is_err() {
                break;
            }
        }
    }
}

/// 結果を受け取り、種類に応じた書き込み先に1行ずつ書き込みます。
fn write_outcomes<W, E>(rx: Receiver<RowOutcome>, mut output: W, mut errors: E) -> Result<BatchStats>
where
    W: Write,
    E: Write,
{
    let mut stats = BatchStats::default();
    for outcome in rx.iter() {
        stats.record(&outcome);
        match &outcome {
            RowOutcome::Aligned(row) | RowOutcome::Unresolved(row) => {
                write_csv_row(&mut output, row)?;
            }
            RowOutcome::Failed(row) => write_csv_row(&mut errors, row)?,
        }
    }
    output.flush()?;
    errors.flush()?;
    Ok(stats)
}

fn panic_message(e: Box<dyn Any + Send>) -> String {
    if let Some(s) = e.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = e.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::aligner::AlignMode;
    use crate::utils::reading_dictionary;

    fn row(kanji: &str, reading: &str) -> Vec<String> {
        let mut row: Vec<String> = ["*"; 13].iter().map(|s| s.to_string()).collect();
        row[0] = kanji.to_string();
        row[11] = reading.to_string();
        row
    }

    #[test]
    fn test_process_row_aligned() {
        let dict = reading_dictionary! {
            "間" => ["かん"],
            "接" => ["せつ"],
        };
        let runner = BatchRunner::new(Aligner::new(&dict));
        assert_eq!(
            runner.process_row(row("間接", "かん.せつ")),
            RowOutcome::Aligned(row("間接", "かん.せつ"))
        );
        assert_eq!(
            runner.process_row(row("間接", "カンセツ")),
            RowOutcome::Aligned(row("間接", "カン.セツ"))
        );
    }

    #[test]
    fn test_process_row_unresolved() {
        let dict = reading_dictionary! {};
        let runner = BatchRunner::new(Aligner::new(&dict));
        assert_eq!(
            runner.process_row(row("", "か.な")),
            RowOutcome::Unresolved(row("", "かな"))
        );
    }

    #[test]
    fn test_process_row_strict_failure_keeps_original() {
        let dict = reading_dictionary! {
            "子" => ["こ"],
        };
        let runner = BatchRunner::new(Aligner::new(&dict).mode(AlignMode::Strict));
        assert_eq!(
            runner.process_row(row("子供", "こ.ども")),
            RowOutcome::Failed(row("子供", "こ.ども"))
        );
    }

    #[test]
    fn test_process_row_short() {
        let dict = reading_dictionary! {};
        let runner = BatchRunner::new(Aligner::new(&dict));
        let short = vec!["間接".to_string(), "名詞".to_string()];
        assert_eq!(
            runner.process_row(short.clone()),
            RowOutcome::Failed(short)
        );
    }

    #[test]
    fn test_custom_columns() {
        let dict = reading_dictionary! {
            "間" => ["かん"],
            "接" => ["せつ"],
        };
        let runner = BatchRunner::new(Aligner::new(&dict))
            .kanji_column(1)
            .reading_column(2);
        let input = vec!["x".to_string(), "間接".to_string(), "かんせつ".to_string()];
        let expected = vec!["x".to_string(), "間接".to_string(), "かん.せつ".to_string()];
        assert_eq!(runner.process_row(input), RowOutcome::Aligned(expected));
    }

    #[test]
    fn test_invalid_settings() {
        let dict = reading_dictionary! {};
        assert!(BatchRunner::new(Aligner::new(&dict)).num_workers(0).is_err());
        assert!(BatchRunner::new(Aligner::new(&dict)).queue_capacity(0).is_err());
    }

    #[test]
    fn test_panic_message() {
        let e: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(e), "boom");
        let e: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(e), "bang");
        let e: Box<dyn Any + Send> = Box::new(1);
        assert_eq!(panic_message(e), "Unknown panic");
    }
}
