//! ドット区切りの振り仮名表記
//!
//! 辞書の読みの列では、各セグメントの読みの後ろに、そのセグメントの漢字の文字数と
//! 同じ数の `.` を付けて区切りを表します。
//! 例えば `間接` / `かんせつ` は `かん.せつ`、`一人前` / `ひとりまえ` は `ひとり..まえ` となります。
//! 最後のセグメントの後ろには何も付けません。

use crate::kana::is_kana_only;

/// セグメントの区切りを表す記号
pub const SEGMENT_MARK: char = '.';

/// 読みの表示を省略する表層形
const BARE_NUMERALS: &str = "1234567890１２３４５６７８９０";

/// 読みから区切り記号を取り除きます。
///
/// # 例
///
/// ```
/// use warifuri::furigana::strip_marks;
///
/// assert_eq!(strip_marks("ひとり..まえ"), "ひとりまえ");
/// ```
pub fn strip_marks(reading: &str) -> String {
    reading.chars().filter(|&c| c != SEGMENT_MARK).collect()
}

/// 割り振り結果をドット区切りの読みに変換します。
///
/// 最後以外の各セグメントの読みの後ろに、対応する漢字セグメントの文字数だけ `.` を付けます。
///
/// # 例
///
/// ```
/// use warifuri::furigana::encode_dotted;
///
/// assert_eq!(encode_dotted(&["一人", "前"], &["ひとり", "まえ"]), "ひとり..まえ");
/// assert_eq!(encode_dotted(&["子供"], &["こども"]), "こども");
/// ```
pub fn encode_dotted<K, R>(kanji: &[K], reading: &[R]) -> String
where
    K: AsRef<str>,
    R: AsRef<str>,
{
    let mut dotted = String::new();
    for (i, r) in reading.iter().enumerate() {
        dotted.push_str(r.as_ref());
        if i + 1 == reading.len() {
            break;
        }
        if let Some(k) = kanji.get(i) {
            dotted.extend(std::iter::repeat(SEGMENT_MARK).take(k.as_ref().chars().count()));
        }
    }
    dotted
}

/// 表層形とその振り仮名
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Furigana {
    /// 表層形
    pub surface: String,
    /// 振り仮名。表示する必要がない場合は `None`
    pub reading: Option<String>,
}

impl Furigana {
    /// 新しい組を作成します。
    ///
    /// 読みが空の場合、表層形と同じ場合、表層形がかなだけの場合は読みを `None` にします。
    pub fn new<S, R>(surface: S, reading: R) -> Self
    where
        S: Into<String>,
        R: Into<String>,
    {
        let surface = surface.into();
        let reading = reading.into();
        let redundant = reading.is_empty() || reading == surface || is_kana_only(&surface);
        Self {
            reading: (!redundant).then_some(reading),
            surface,
        }
    }
}

/// ドット区切りの読みを表層形に割り当てます。
///
/// 区切りがない場合は表層形全体に読みを割り当てます（数字だけの表層形では読みを落とします）。
/// 区切りがある場合は、表層形のi文字目にi番目の読みを割り当て、
/// 読みが空または存在しない文字は直前の組に連結します。
///
/// # 例
///
/// ```
/// use warifuri::furigana::{decode_dotted, Furigana};
///
/// assert_eq!(
///     decode_dotted("一人前", "ひとり..まえ"),
///     vec![Furigana::new("一人", "ひとり"), Furigana::new("前", "まえ")],
/// );
/// ```
pub fn decode_dotted(surface: &str, dotted: &str) -> Vec<Furigana> {
    let parts: Vec<&str> = dotted.split(SEGMENT_MARK).collect();
    if parts.len() == 1 {
        let is_numeral = !surface.is_empty() && surface.chars().all(|c| BARE_NUMERALS.contains(c));
        let reading = if is_numeral { "" } else { dotted };
        return vec![Furigana::new(surface, reading)];
    }

    let mut pieces: Vec<(String, String)> = vec![];
    for (i, c) in surface.chars().enumerate() {
        let part = parts.get(i).copied().unwrap_or_default();
        match pieces.last_mut() {
            Some((prev, _)) if part.is_empty() => prev.push(c),
            _ => pieces.push((c.to_string(), part.to_string())),
        }
    }
    pieces
        .into_iter()
        .map(|(surface, reading)| Furigana::new(surface, reading))
        .collect()
}
