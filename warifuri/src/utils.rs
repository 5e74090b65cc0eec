//! CSV処理のユーティリティ関数を提供するモジュール
//!
//! 辞書の行は `csv_core` を使って読み書きします。主に以下の機能を提供します：
//!
//! - 区切り文字を指定した行の解析と引用符処理
//! - 複数行にまたがるセルを含むCSVのレコード単位の読み込み
//! - CSVセルの必要最小限の引用符付き書き出し
//! - テスト用のマクロ

use std::io::{BufRead, Write};

use csv_core::{ReadFieldResult, ReadRecordResult, Reader, ReaderBuilder, WriteResult, Writer};

use crate::errors::Result;

/// CSVセルのデータを適切に引用符で囲んで書き出す
///
/// この関数は、バイト列をCSV形式のセルとして書き出します。
/// 区切り文字や引用符を含む場合にだけ、ダブルクォートやエスケープ処理を自動的に行います。
///
/// # 引数
///
/// * `wtr` - 書き込み先のWriterオブジェクト
/// * `data` - CSVセルとして書き込むバイト列
///
/// # 戻り値
///
/// * `Ok(())` - 書き込みに成功した場合
/// * `Err(std::io::Error)` - 書き込み中にI/Oエラーが発生した場合
pub fn quote_csv_cell<W>(mut wtr: W, mut data: &[u8]) -> std::io::Result<()>
where
    W: Write,
{
    let mut output = [0; 4096];
    let mut writer = Writer::new();
    loop {
        let (result, nin, nout) = writer.field(data, &mut output);
        wtr.write_all(&output[..nout])?;
        if result == WriteResult::InputEmpty {
            break;
        }
        data = &data[nin..];
    }
    let (result, nout) = writer.finish(&mut output);
    debug_assert_eq!(result, WriteResult::InputEmpty);
    wtr.write_all(&output[..nout])?;
    Ok(())
}

/// フィールドの列をカンマ区切りの1行として書き出す
///
/// 行末には改行 `\n` を付けます。空のセルは何も書き出しませんが、
/// 空のセル1つだけの行は空行と区別するため `""` と書き出します。
pub fn write_csv_row<W, S>(mut wtr: W, fields: &[S]) -> std::io::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for (i, field) in fields.iter().enumerate() {
        if i != 0 {
            wtr.write_all(b",")?;
        }
        let field = field.as_ref();
        if !field.is_empty() || fields.len() == 1 {
            quote_csv_cell(&mut wtr, field.as_bytes())?;
        }
    }
    wtr.write_all(b"\n")
}

/// 区切り文字を指定して1行を解析し、フィールドのベクターに分割する
///
/// ダブルクォートで囲まれたフィールドや、フィールド内の区切り文字も正しく処理します。
///
/// # 引数
///
/// * `row` - 解析する1行分の文字列
/// * `delimiter` - 区切り文字
///
/// # エラー
///
/// フィールドがUTF-8として不正な場合にエラーを返します。
///
/// # 例
///
/// ```
/// # use warifuri::utils::parse_delimited_row;
/// let fields = parse_delimited_row("一人\tひとり", b'\t').unwrap();
/// assert_eq!(fields, vec!["一人", "ひとり"]);
/// ```
pub fn parse_delimited_row(row: &str, delimiter: u8) -> Result<Vec<String>> {
    let mut fields = vec![];
    let mut rdr = ReaderBuilder::new().delimiter(delimiter).build();
    let mut bytes = row.as_bytes();
    let mut output = vec![0; row.len().max(1)];
    let mut field = vec![];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        field.extend_from_slice(&output[..nout]);
        bytes = &bytes[nin..];
        let end = match result {
            ReadFieldResult::InputEmpty => {
                // The input of `read_field` is the whole row, so an empty input ends it.
                if !bytes.is_empty() {
                    continue;
                }
                true
            }
            ReadFieldResult::OutputFull => continue,
            ReadFieldResult::Field { record_end } => record_end,
            ReadFieldResult::End => true,
        };
        fields.push(std::str::from_utf8(&field)?.to_string());
        field.clear();
        if end {
            break;
        }
    }
    Ok(fields)
}

/// CSV形式の行を解析してフィールドのベクターに分割する
///
/// # 例
///
/// ```
/// # use warifuri::utils::parse_csv_row;
/// let fields = parse_csv_row("間接,名詞,カンセツ").unwrap();
/// assert_eq!(fields, vec!["間接", "名詞", "カンセツ"]);
///
/// let fields_with_quote = parse_csv_row("名詞,\"1,2-ジクロロエタン\"").unwrap();
/// assert_eq!(fields_with_quote, vec!["名詞", "1,2-ジクロロエタン"]);
/// ```
#[inline]
pub fn parse_csv_row(row: &str) -> Result<Vec<String>> {
    parse_delimited_row(row, b',')
}

/// CSVのレコードを順に読み出すイテレータ
///
/// 引用符で囲まれたセルの中の改行はセルの一部として扱われるため、
/// 1つのレコードが複数行にまたがってもかまいません。空行は読み飛ばされます。
///
/// # 例
///
/// ```
/// # use warifuri::utils::CsvRecords;
/// let data = "間接,かんせつ\n\n\"注\n記\",ちゅうき\n";
/// let records: Vec<Vec<String>> = CsvRecords::new(data.as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(records, vec![vec!["間接", "かんせつ"], vec!["注\n記", "ちゅうき"]]);
/// ```
pub struct CsvRecords<R> {
    rdr: R,
    parser: Reader,
    output: Vec<u8>,
    ends: Vec<usize>,
    finished: bool,
}

impl<R> CsvRecords<R>
where
    R: BufRead,
{
    /// 新しいイテレータを作成します。
    pub fn new(rdr: R) -> Self {
        Self {
            rdr,
            parser: ReaderBuilder::new().build(),
            output: vec![0; 1024],
            ends: vec![0; 32],
            finished: false,
        }
    }

    fn next_record(&mut self) -> Result<Option<Vec<String>>> {
        let mut outlen = 0;
        let mut endlen = 0;
        loop {
            let (result, nin, nout, nend) = {
                let input = self.rdr.fill_buf()?;
                self.parser.read_record(
                    input,
                    &mut self.output[outlen..],
                    &mut self.ends[endlen..],
                )
            };
            self.rdr.consume(nin);
            outlen += nout;
            endlen += nend;
            match result {
                ReadRecordResult::InputEmpty => continue,
                ReadRecordResult::OutputFull => {
                    let len = self.output.len();
                    self.output.resize(len * 2, 0);
                }
                ReadRecordResult::OutputEndsFull => {
                    let len = self.ends.len();
                    self.ends.resize(len * 2, 0);
                }
                ReadRecordResult::Record => {
                    let mut fields = Vec::with_capacity(endlen);
                    let mut start = 0;
                    for &end in &self.ends[..endlen] {
                        fields.push(std::str::from_utf8(&self.output[start..end])?.to_string());
                        start = end;
                    }
                    return Ok(Some(fields));
                }
                ReadRecordResult::End => return Ok(None),
            }
        }
    }
}

impl<R> Iterator for CsvRecords<R>
where
    R: BufRead,
{
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
/// 辞書を簡潔に組み立てるためのマクロ
///
/// 漢字または漢字列と、その読みのリストを`=>`演算子で指定します。
///
/// # 例
///
/// ```ignore
/// let dict = reading_dictionary! {
///     "間" => ["かん"],
///     "一人" => ["ひとり"],
/// };
/// ```
///
/// # 注意
///
/// このマクロはテスト時のみ利用可能です。
macro_rules! reading_dictionary {
    ( $($k:expr => [$($v:expr),* $(,)?]),* $(,)? ) => {
        {
            #[allow(unused_mut)]
            let mut builder = $crate::dictionary::ReadingDictionaryBuilder::new();
            $(
                builder.add_readings($k, &[$($v),*] as &[&str]);
            )*
            builder.build()
        }
    };
}

#[cfg(test)]
pub(crate) use reading_dictionary;
