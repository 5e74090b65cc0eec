//! 読みの音韻変化規則
//!
//! 辞書に載っている読みから、複合語の中で実際に現れる表層形を派生させる
//! 純粋関数群です。
//!
//! - 送り仮名の活用: `ま.う` → `まい`, `まう`
//! - 語幹の抽出: `-ま.う` → `ま`
//! - 促音化: `がく` → `がっ` （学校 → がっこう）
//! - 連濁: `ちゅう` → `ぢゅう`, `じゅう` （年中 → ねんじゅう）
//!
//! 派生した読みは重複を除いた後、片仮名表記も候補に加えます。

use hashbrown::HashSet;

use crate::kana::{to_hiragana, to_katakana};

/// 送り仮名の区切り記号
pub const OKURIGANA_SEPARATOR: char = '.';

/// 接頭・接尾を表す記号
pub const AFFIX_MARKER: char = '-';

/// 促音化の対象となる語末の音
const GEMINATING_MORAE: &[char] = &['つ', 'ち', 'く', 'き'];

/// 促音
const SOKUON: char = 'っ';

/// 連濁の対応表
///
/// は行は濁音と半濁音の両方に対応します。
const VOICING_TABLE: &[(char, &[char])] = &[
    ('か', &['が']),
    ('き', &['ぎ']),
    ('く', &['ぐ']),
    ('け', &['げ']),
    ('こ', &['ご']),
    ('さ', &['ざ']),
    ('し', &['じ']),
    ('す', &['ず']),
    ('せ', &['ぜ']),
    ('そ', &['ぞ']),
    ('た', &['だ']),
    ('ち', &['ぢ', 'じ']),
    ('つ', &['づ', 'ず']),
    ('て', &['で']),
    ('と', &['ど']),
    ('は', &['ば', 'ぱ']),
    ('ひ', &['び', 'ぴ']),
    ('ふ', &['ぶ', 'ぷ']),
    ('へ', &['べ', 'ぺ']),
    ('ほ', &['ぼ', 'ぽ']),
];

/// 送り仮名の活用表
///
/// 送り仮名全体をキーとし、置き換え得る末尾の音を並べます。
const CONJUGATION_TABLE: &[(&str, &str)] = &[
    ("う", "いう"),
    ("く", "きく"),
    ("ぐ", "ぎぐ"),
    ("す", "しす"),
    ("つ", "ちつ"),
    ("ぶ", "びぶ"),
    ("む", "みむ"),
    ("る", "りる"),
    ("ぬ", "にぬ"),
    ("い", "い"),
    ("か", "か"),
    ("さ", "さ"),
    ("た", "た"),
    ("ま", "ま"),
    ("や", "や"),
    ("ら", "ら"),
];

/// 活用表にない送り仮名のうち、先頭1音だけを残した形が現れ得るもの
const SINGLE_MORA_INFLECTIONS: &[char] = &[
    'い', 'え', 'け', 'げ', 'き', 'せ', 'て', 'ち', 'び', 'め', 'み', 'れ', 'り',
];

/// 辞書の読みから正規化された語幹を取り出します。
///
/// 最初の送り仮名区切りより前の部分を取り、接頭・接尾記号を除いて平仮名に変換します。
///
/// # 例
///
/// ```
/// use warifuri::phonology::base_stem;
///
/// assert_eq!(base_stem("ま.う"), "ま");
/// assert_eq!(base_stem("-カン"), "かん");
/// assert_eq!(base_stem("おお-"), "おお");
/// ```
pub fn base_stem(raw: &str) -> String {
    let head = raw
        .split(OKURIGANA_SEPARATOR)
        .next()
        .unwrap_or_default();
    let head: String = head.chars().filter(|&c| c != AFFIX_MARKER).collect();
    to_hiragana(&head)
}

/// 送り仮名付きの読みから、活用した表層形を生成します。
///
/// 返される読みは送り仮名区切りを含まず、接頭・接尾記号は残ったままです。
/// 送り仮名を持たない読みに対しては空のベクターを返します。
///
/// # 例
///
/// ```
/// use warifuri::phonology::inflections;
///
/// assert_eq!(inflections("ま.う"), vec!["まい", "まう"]);
/// assert_eq!(inflections("かえ.る"), vec!["かえり", "かえる"]);
/// assert_eq!(inflections("たす.ける"), vec!["たすけ"]);
/// assert_eq!(inflections("-ば.え"), vec!["-ばえ"]);
/// assert!(inflections("かん").is_empty());
/// ```
pub fn inflections(raw: &str) -> Vec<String> {
    let Some((base, okurigana)) = raw.split_once(OKURIGANA_SEPARATOR) else {
        return vec![];
    };
    if let Some((_, endings)) = CONJUGATION_TABLE.iter().find(|(o, _)| *o == okurigana) {
        return endings.chars().map(|c| format!("{base}{c}")).collect();
    }
    match okurigana.chars().next() {
        Some(first) if SINGLE_MORA_INFLECTIONS.contains(&first) => {
            vec![format!("{base}{first}")]
        }
        _ => vec![],
    }
}

/// 語末の音を促音に置き換えた読みを返します。
///
/// 2文字以上で、語末が `つ` `ち` `く` `き` のいずれかの場合にのみ `Some` を返します。
///
/// # 例
///
/// ```
/// use warifuri::phonology::gemination;
///
/// assert_eq!(gemination("がく").as_deref(), Some("がっ"));
/// assert_eq!(gemination("つ"), None);
/// assert_eq!(gemination("かん"), None);
/// ```
pub fn gemination(stem: &str) -> Option<String> {
    let mut chars = stem.chars();
    let last = chars.next_back()?;
    let head = chars.as_str();
    if head.is_empty() || !GEMINATING_MORAE.contains(&last) {
        return None;
    }
    let mut geminated = String::with_capacity(stem.len());
    geminated.push_str(head);
    geminated.push(SOKUON);
    Some(geminated)
}

/// 語頭の音を濁音・半濁音に置き換えた読みを返します。
///
/// # 例
///
/// ```
/// use warifuri::phonology::voicing;
///
/// assert_eq!(voicing("ちゅう"), vec!["ぢゅう", "じゅう"]);
/// assert_eq!(voicing("ひと"), vec!["びと", "ぴと"]);
/// assert!(voicing("ねん").is_empty());
/// ```
pub fn voicing(stem: &str) -> Vec<String> {
    let mut chars = stem.chars();
    let Some(first) = chars.next() else {
        return vec![];
    };
    let rest = chars.as_str();
    VOICING_TABLE
        .iter()
        .find(|(unvoiced, _)| *unvoiced == first)
        .map(|(_, voiced)| voiced.iter().map(|v| format!("{v}{rest}")).collect())
        .unwrap_or_default()
}

/// 出現順を保ったまま重複を取り除きます。
pub(crate) fn dedup_in_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// 重複を除いた読みの後ろに、それぞれの片仮名表記を加えます。
///
/// 振り仮名はどちらの表記でも書かれ得るため、すべての候補集合はこの形にそろえます。
pub fn with_katakana<I>(readings: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let readings = dedup_in_order(readings);
    let katakana: Vec<String> = readings.iter().map(|r| to_katakana(r)).collect();
    dedup_in_order(readings.into_iter().chain(katakana))
}

/// 1文字の漢字に対する辞書の読みを、割り振りに使う候補の集合に展開します。
///
/// 送り仮名の活用、語幹の抽出、促音化、連濁の順に適用し、
/// 重複を除いてから片仮名表記を加えます。空になった語幹は捨てられます。
///
/// # 例
///
/// ```
/// use warifuri::phonology::expand_kanji_readings;
///
/// assert_eq!(
///     expand_kanji_readings(&["がく"]),
///     vec!["がく", "がっ", "ガク", "ガッ"],
/// );
/// ```
pub fn expand_kanji_readings<S>(raw_readings: &[S]) -> Vec<String>
where
    S: AsRef<str>,
{
    let inflected = raw_readings
        .iter()
        .flat_map(|raw| inflections(raw.as_ref()));
    let mut stems: Vec<String> = raw_readings
        .iter()
        .map(|raw| raw.as_ref().to_string())
        .chain(inflected)
        .map(|raw| base_stem(&raw))
        .filter(|stem| !stem.is_empty())
        .collect();

    let geminated: Vec<String> = stems.iter().filter_map(|s| gemination(s)).collect();
    stems.extend(geminated);

    let voiced: Vec<String> = stems.iter().flat_map(|s| voicing(s)).collect();
    stems.extend(voiced);

    with_katakana(stems)
}

/// 熟字訓の1位置分の読みを、割り振りに使う候補の集合に展開します。
///
/// 平仮名に正規化した読みに連濁形を加え、片仮名表記を加えます。
/// 空の読みは空文字列の候補1つになります。
pub fn expand_compound_position(reading: &str) -> Vec<String> {
    let reading = to_hiragana(reading);
    let voiced = voicing(&reading);
    with_katakana(std::iter::once(reading).chain(voiced))
}
