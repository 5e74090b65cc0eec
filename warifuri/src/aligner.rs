//! 漢字列と読みの割り振り
//!
//! 候補パスの木をパターンにコンパイルして読みにマッチさせ、捕獲グループを
//! 元のセグメントに対応付けます。

use crate::dictionary::ReadingDictionary;
use crate::errors::AlignmentError;
use crate::furigana::{encode_dotted, Furigana};
use crate::path::PathBuilder;
use crate::pattern::Pattern;

/// パターンの大きさの上限のデフォルト値（32 MiB）
pub const DEFAULT_PATTERN_SIZE_LIMIT: usize = 32 * (1 << 20);

/// 割り振りに失敗した場合の扱い
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlignMode {
    /// 失敗をエラーとして返します。辞書の読みの検証に使います。
    ///
    /// 楽観的なまとめを行わないため、すべての漢字が辞書の読みと一致する必要があります。
    Strict,

    /// 失敗した場合は漢字列と読みを分割せずに返します。
    #[default]
    Lenient,
}

/// 割り振りの結果
///
/// 漢字のセグメントと読みのセグメントは同じ数だけあり、それぞれを連結すると
/// 入力の漢字列と読みに戻ります。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    kanji: Vec<String>,
    reading: Vec<String>,
    resolved: bool,
}

impl Alignment {
    /// 分割せずに1組だけを持つ結果を作成します。
    pub fn unresolved<K, R>(kanji: K, reading: R) -> Self
    where
        K: Into<String>,
        R: Into<String>,
    {
        Self {
            kanji: vec![kanji.into()],
            reading: vec![reading.into()],
            resolved: false,
        }
    }

    /// 漢字のセグメントを返します。
    #[inline(always)]
    pub fn kanji(&self) -> &[String] {
        &self.kanji
    }

    /// 読みのセグメントを返します。
    #[inline(always)]
    pub fn reading(&self) -> &[String] {
        &self.reading
    }

    /// すべてのセグメントが辞書の読みか熟字訓で割り振られた場合に `true` を返します。
    ///
    /// 寛容モードで、ワイルドカードで覆われた漢字の連続を含む結果と、
    /// 分割をあきらめた結果は `false` です。
    #[inline(always)]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// セグメントの数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.kanji.len()
    }

    /// セグメントを持たない場合に `true` を返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.kanji.is_empty()
    }

    /// 漢字と読みの組を順に返します。
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.kanji
            .iter()
            .zip(&self.reading)
            .map(|(k, r)| (k.as_str(), r.as_str()))
    }

    /// 漢字と読みのセグメントに分解します。
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.kanji, self.reading)
    }

    /// ドット区切りの読みに変換します。
    ///
    /// # 例
    ///
    /// ```
    /// use warifuri::dictionary::ReadingDictionaryBuilder;
    /// use warifuri::Aligner;
    ///
    /// let mut builder = ReadingDictionaryBuilder::new();
    /// builder.add_readings("一人", &["ひとり"]);
    /// builder.add_readings("前", &["まえ"]);
    /// let dict = builder.build();
    ///
    /// let alignment = Aligner::new(&dict).align("一人前", "ひとりまえ")?;
    /// assert_eq!(alignment.to_dotted(), "ひとり..まえ");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn to_dotted(&self) -> String {
        encode_dotted(&self.kanji, &self.reading)
    }

    /// 表示用の振り仮名の列に変換します。
    pub fn furigana(&self) -> Vec<Furigana> {
        self.pairs().map(|(k, r)| Furigana::new(k, r)).collect()
    }
}

/// 漢字列と読みを割り振るアライナー
///
/// 辞書への参照を持つだけなので、複数のスレッドから共有して使えます。
///
/// # 例
///
/// ```
/// use warifuri::dictionary::ReadingDictionaryBuilder;
/// use warifuri::{AlignMode, Aligner};
///
/// let mut builder = ReadingDictionaryBuilder::new();
/// builder.add_readings("学", &["がく"]);
/// builder.add_readings("校", &["こう"]);
/// let dict = builder.build();
///
/// let aligner = Aligner::new(&dict).mode(AlignMode::Strict);
/// let alignment = aligner.align("学校", "がっこう")?;
/// assert_eq!(alignment.kanji(), &["学", "校"]);
/// assert_eq!(alignment.reading(), &["がっ", "こう"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy)]
pub struct Aligner<'d> {
    dict: &'d ReadingDictionary,
    mode: AlignMode,
    pattern_size_limit: usize,
}

impl<'d> Aligner<'d> {
    /// 新しいアライナーを作成します。
    pub fn new(dict: &'d ReadingDictionary) -> Self {
        Self {
            dict,
            mode: AlignMode::default(),
            pattern_size_limit: DEFAULT_PATTERN_SIZE_LIMIT,
        }
    }

    /// 失敗時の扱いを設定します。
    pub const fn mode(mut self, mode: AlignMode) -> Self {
        self.mode = mode;
        self
    }

    /// コンパイル後のパターンの大きさの上限をバイト単位で設定します。
    ///
    /// 上限を超える漢字列は割り振りの失敗として扱われます。
    pub const fn pattern_size_limit(mut self, bytes: usize) -> Self {
        self.pattern_size_limit = bytes;
        self
    }

    /// 辞書への参照を返します。
    pub fn dictionary(&self) -> &'d ReadingDictionary {
        self.dict
    }

    /// 設定されている失敗時の扱いを返します。
    pub fn align_mode(&self) -> AlignMode {
        self.mode
    }

    /// 割り振りを試み、失敗した場合はモードにかかわらずエラーを返します。
    ///
    /// # 引数
    ///
    /// * `kanji` - 漢字列
    /// * `reading` - 区切り記号を取り除いた読み
    ///
    /// # エラー
    ///
    /// 入力が空の場合、読みがどの候補パスにもマッチしない場合、
    /// またはグループ数がセグメント数と一致しない場合に [`AlignmentError`] を返します。
    pub fn try_align(&self, kanji: &str, reading: &str) -> Result<Alignment, AlignmentError> {
        if kanji.is_empty() || reading.is_empty() {
            return Err(AlignmentError::EmptyInput);
        }
        let path = PathBuilder::new(self.dict)
            .optimistic(self.mode == AlignMode::Lenient)
            .build(kanji);
        let pattern = Pattern::new(path.root(), self.pattern_size_limit)?;
        let matched = pattern.find(reading).ok_or(AlignmentError::NoMatch)?;
        let (segments, _) = path.into_parts();
        let (kanji, reading) = reconcile(segments, &matched.groups)?;
        Ok(Alignment {
            kanji,
            reading,
            resolved: !matched.wildcard,
        })
    }

    /// 漢字列と読みを割り振ります。
    ///
    /// 寛容モードでは失敗しません。割り振れなかった場合は、入力全体を1組とした
    /// 未解決の結果を返します。
    ///
    /// # エラー
    ///
    /// 厳密モードで割り振りに失敗した場合に [`AlignmentError`] を返します。
    pub fn align(&self, kanji: &str, reading: &str) -> Result<Alignment, AlignmentError> {
        match self.try_align(kanji, reading) {
            Ok(alignment) => Ok(alignment),
            Err(e) if self.mode == AlignMode::Lenient => {
                log::debug!("{kanji}/{reading}: {e}");
                Ok(Alignment::unresolved(kanji, reading))
            }
            Err(e) => Err(e),
        }
    }
}

/// マッチした捕獲グループを元のセグメントに対応付けます。
///
/// 先頭以外の空のグループは、直前のセグメントと現在のセグメントを1つにまとめます。
/// これにより、熟字訓の読みを持たない位置やワイルドカードの詰め物が
/// 隣のセグメントに吸収されます。空のグループを取り除いた後の数が
/// セグメント数と一致すれば成功です。
fn reconcile(
    mut segments: Vec<String>,
    groups: &[&str],
) -> Result<(Vec<String>, Vec<String>), AlignmentError> {
    let mut s = 0;
    for (i, group) in groups.iter().enumerate() {
        if i > 0 && group.is_empty() && s > 0 && s < segments.len() {
            let next = segments.remove(s);
            segments[s - 1].push_str(&next);
        } else {
            s += 1;
        }
    }
    let groups: Vec<String> = groups
        .iter()
        .filter(|g| !g.is_empty())
        .map(|g| g.to_string())
        .collect();
    if groups.len() != segments.len() {
        return Err(AlignmentError::SegmentCountMismatch {
            segments: segments.len(),
            groups: groups.len(),
        });
    }
    Ok((segments, groups))
}
