//! HostRegistration - ホストのコールバック登録ハンドル
//!
//! ホストの `Register*` 系 API は「登録解除関数」を返します。
//! それを trait object として表現したものです。

/// ホスト側で登録したコールバックを解除するためのハンドル
///
/// 実装は二重呼び出しに備える必要はありません。
/// 呼び出し回数の保証は `app::Subscription` が持ちます。
pub trait HostRegistration: Send + Sync {
    fn unregister(&self);
}
