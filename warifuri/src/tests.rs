//! Warifuriのテストモジュール群
//!
//! 割り振り、辞書の読み込み、バッチ処理の動作を
//! 組み合わせて検証するテストを含みます。
